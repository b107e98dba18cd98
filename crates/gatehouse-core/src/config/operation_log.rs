//! Operation log sink configuration.

use serde::{Deserialize, Serialize};

/// Settings for the buffered, batching operation-log writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationLogConfig {
    /// Whether requests are recorded at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Channel capacity between request tasks and the writer.
    #[serde(default = "default_buffer")]
    pub buffer_size: usize,
    /// Entries per batch insert.
    #[serde(default = "default_batch")]
    pub batch_size: usize,
    /// Flush interval for partial batches in milliseconds.
    #[serde(default = "default_flush_interval")]
    pub flush_interval_ms: u64,
    /// Truncation length for recorded params and results, in characters.
    #[serde(default = "default_max_field")]
    pub max_field_chars: usize,
    /// Age in days after which `log purge` removes entries.
    #[serde(default = "default_retention")]
    pub retention_days: u32,
}

impl Default for OperationLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            buffer_size: default_buffer(),
            batch_size: default_batch(),
            flush_interval_ms: default_flush_interval(),
            max_field_chars: default_max_field(),
            retention_days: default_retention(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_buffer() -> usize {
    1000
}

fn default_batch() -> usize {
    100
}

fn default_flush_interval() -> u64 {
    5000
}

fn default_max_field() -> usize {
    500
}

fn default_retention() -> u32 {
    30
}
