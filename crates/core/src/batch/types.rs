//! Batch result types.

use serde::Serialize;

/// One failed ticket in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub sequence_number: u64,
    /// Error message, truncated to `max_error_len` characters.
    pub error: String,
}

/// Outcome of a batch run. `success_count + fail_count == total`.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Zip bytes: one image per success, one error record per failure.
    pub archive: Vec<u8>,
    pub total: u64,
    pub success_count: u64,
    pub fail_count: u64,
    /// Failures in input order.
    pub failures: Vec<FailureRecord>,
}
