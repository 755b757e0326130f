//! Batch-level summary artifact

use crate::crawler::BatchResult;

/// Serializes the per-seed results as a pretty JSON list, in seed order
pub fn format_batch_json(batch: &BatchResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&batch.results)
}
