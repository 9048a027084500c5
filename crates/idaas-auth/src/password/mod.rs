//! Secret hashing and random credential generation.

pub mod generator;
pub mod hasher;

pub use hasher::PasswordHasher;
