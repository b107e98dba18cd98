//! Operation (audit) log entities.

pub mod model;

pub use model::{NewOperationLog, OperationLog, OperationLogFilter, OperationOutcome};
