//! Result size budget.

use serde_json::Value;

/// Default character budget of a serialized tool result.
pub const DEFAULT_RESULT_BUDGET: usize = 20_000;

/// Cuts `data` to `budget` characters of its JSON form.
///
/// Results within budget are returned untouched. Larger results become a
/// string holding the first `budget` characters followed by a hint to narrow
/// the request. The second value reports whether anything was cut.
pub fn truncate_result(data: Value, budget: usize) -> (Value, bool) {
    let serialized = match &data {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let Some((cut, _)) = serialized.char_indices().nth(budget) else {
        return (data, false);
    };
    let total = serialized.chars().count();
    let text = format!(
        "{}\n\n[truncated: showing {budget} of {total} characters; narrow the query, \
         e.g. request a line range, a smaller directory or fewer results]",
        &serialized[..cut]
    );
    (Value::String(text), true)
}
