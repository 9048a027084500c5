//! Internal-service client entities.

pub mod model;

pub use model::{CreateInternalClient, InternalClient};
