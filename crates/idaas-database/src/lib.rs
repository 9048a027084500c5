//! # idaas-database
//!
//! The credential store: one async trait per record family, a PostgreSQL
//! implementation built on sqlx, and an in-memory implementation for tests
//! and single-node development runs.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::Stores;
