//! Best-effort recording of internal-service access logs.

pub mod recorder;

pub use recorder::{AccessLogRecorder, AccessLogWorker};
