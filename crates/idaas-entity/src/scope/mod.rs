//! Scope catalogue and grant entities.

pub mod grant;
pub mod model;

pub use grant::{ClientScopeGrant, CreateGrant};
pub use model::{CreateScope, Scope};
