//! Strict JSON handling for model output.
//!
//! Models run in JSON mode, so the only wrapper tolerated is one enclosing
//! markdown fence. Prose around the object, trailing braces and anything
//! else past the closing brace are left in place for `serde_json` to reject.

/// Remove a single enclosing ```` ``` ```` / ```` ```json ```` fence.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };

    let inner = inner.strip_prefix("json").unwrap_or(inner);
    if !inner.starts_with(['\n', '\r', ' ']) {
        // Some other language tag, or the fence is not a fence.
        return trimmed;
    }
    inner.trim()
}
