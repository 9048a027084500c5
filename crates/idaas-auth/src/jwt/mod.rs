//! Token signing, verification, and claims.

pub mod claims;
pub mod error;
pub mod signer;

pub use claims::{SERVICE_TOKEN_AUDIENCE, SERVICE_TOKEN_ISSUER, ServiceClaims, TokenClaims, UserClaims};
pub use error::JwtError;
pub use signer::Signer;
