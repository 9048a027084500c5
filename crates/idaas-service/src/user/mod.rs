//! End-user registration, login and token refresh.

pub mod service;

pub use service::{LoginResult, RegisterUserRequest, UpdateUserRequest, UserProfile, UserService};
