//! Response shaping: `spectrum_<n>` keyed JSON in input order.

use serde_json::{json, Map, Value};

use csmp_core::types::{AnnotationResult, AnnotationStatus};

/// Successes (including `NoCandidates`) carry a `candidates` array; failures
/// carry an explicit `{status, reason}` object. One entry per spectrum,
/// input order preserved.
pub fn response_json(results: &[AnnotationResult]) -> Value {
    let mut map = Map::with_capacity(results.len());
    for result in results {
        let key = format!("spectrum_{}", result.spectrum_index);
        let entry = match result.status {
            AnnotationStatus::Failed => json!({
                "status": "Failed",
                "reason": result
                    .error
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
            }),
            _ => json!({ "candidates": result.candidates }),
        };
        map.insert(key, entry);
    }
    Value::Object(map)
}
