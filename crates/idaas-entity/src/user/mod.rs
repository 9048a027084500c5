//! End-user entities.

pub mod model;

pub use model::{CreateUser, UpdateUser, User};
