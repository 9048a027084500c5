//! Service access logs and aggregates.

pub mod model;
pub mod statistics;

pub use model::{CreateAccessLog, ServiceAccessLog};
pub use statistics::ClientStatistics;
