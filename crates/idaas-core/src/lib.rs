//! # idaas-core
//!
//! Core crate for the IDaaS token engine. Contains configuration schemas,
//! the unified error system, and the HTTP rendering of errors.
//!
//! This crate has **no** internal dependencies on other IDaaS crates.

pub mod config;
pub mod error;
pub mod response;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
