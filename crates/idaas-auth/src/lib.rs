//! # idaas-auth
//!
//! Token and scope engine for the IDaaS platform.
//!
//! ## Modules
//!
//! - `jwt`: algorithm-polymorphic signer and typed claims per principal kind
//! - `password`: Argon2 hashing and random credential generation
//! - `token`: issuance, rotation, validation and revocation of tokens
//! - `scope`: scope grants and single/any/all permission checks

pub mod jwt;
pub mod password;
pub mod scope;
pub mod token;

pub use jwt::{JwtError, ServiceClaims, Signer, TokenClaims, UserClaims};
pub use password::PasswordHasher;
pub use scope::{ScopeAuthorizer, ScopeRequirement};
pub use token::{TokenCleanup, TokenManager};
