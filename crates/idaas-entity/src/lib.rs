//! # idaas-entity
//!
//! Entity models for the IDaaS token engine. Every struct in this crate
//! represents a credential-store row or a domain value object. Stored
//! entities additionally derive `sqlx::FromRow`.
//!
//! Plaintext secrets never appear here: clients, tenants and users carry
//! only slow salted hashes, and tokens carry only SHA-256 digests.

pub mod access_log;
pub mod client;
pub mod principal;
pub mod scope;
pub mod tenant;
pub mod token;
pub mod user;
