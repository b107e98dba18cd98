//! Operation log: capture, asynchronous persistence and administration.

pub mod entry;
pub mod service;
pub mod sink;

pub use entry::CapturedExchange;
pub use service::OperationLogService;
pub use sink::OperationLogSink;
