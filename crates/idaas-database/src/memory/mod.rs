//! In-memory credential store for tests and single-node development runs.

pub mod store;

pub use store::MemoryStore;
