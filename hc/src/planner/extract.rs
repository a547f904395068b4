//! Tolerant JSON extraction from free-form model replies
//!
//! Models are asked for bare JSON but routinely wrap it in prose or
//! markdown fences. These helpers carve the object out without attempting
//! a full parse - that happens afterwards with serde.

use tracing::debug;

/// Extract the first complete JSON object from arbitrary text
///
/// Scans from the first `{`, counting brace depth while respecting string
/// literals and escapes, and returns the slice up to the matching close.
/// When no balanced close exists before end of input, falls back to slicing
/// at the last `}`. Returns the empty string when either delimiter is
/// absent.
pub fn extract_json(text: &str) -> &str {
    let Some(start) = text.find('{') else {
        return "";
    };

    let bytes = text.as_bytes();
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return &text[start..=i];
                }
            }
            _ => {}
        }
    }

    debug!("extract_json: no balanced close, falling back to last brace");
    match text.rfind('}') {
        Some(end) if end > start => &text[start..=end],
        _ => "",
    }
}

/// Strip a surrounding markdown code fence, if present
///
/// Handles replies of the shape ```` ```json { ... } ``` ````; anything
/// else passes through trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let parts: Vec<&str> = trimmed.split("```").collect();
    if parts.len() >= 3 {
        let inner = parts[1];
        let inner = inner.strip_prefix("json").unwrap_or(inner);
        return inner.trim();
    }

    trimmed
}
