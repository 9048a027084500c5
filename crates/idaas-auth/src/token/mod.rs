//! Token lifecycle: issuance, rotation, validation, revocation, cleanup.

pub mod cleanup;
pub mod hash;
pub mod manager;

pub use cleanup::{CleanupReport, TokenCleanup};
pub use hash::sha256_hex;
pub use manager::{IssuedToken, ServiceAccessToken, TokenManager, TokenValidation};
