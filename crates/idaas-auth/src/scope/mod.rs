//! Scope grants and permission checks for internal-service clients.

pub mod authorizer;
pub mod requirement;

pub use authorizer::ScopeAuthorizer;
pub use requirement::ScopeRequirement;
