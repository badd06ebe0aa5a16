//! Fence-tolerant JSON extraction and coordinate normalization for model
//! replies. Both models are instructed to answer with bare JSON but routinely
//! wrap it in a Markdown code fence anyway.

use serde_json::Value;

/// Strips the first fenced segment from a reply, preferring a ```json fence
/// over a bare one. Text without a fence is returned trimmed. A missing
/// closing fence keeps everything after the opening one.
pub fn strip_code_fence(text: &str) -> &str {
    let inner = if let Some((_, rest)) = text.split_once("```json") {
        rest.split_once("```").map(|(seg, _)| seg).unwrap_or(rest)
    } else if let Some((_, rest)) = text.split_once("```") {
        rest.split_once("```").map(|(seg, _)| seg).unwrap_or(rest)
    } else {
        text
    };
    inner.trim()
}

/// Parses a model reply as JSON after fence stripping.
pub fn parse_reply(text: &str) -> serde_json::Result<Value> {
    serde_json::from_str(strip_code_fence(text))
}

/// Normalizes a coordinate field that may arrive as a scalar or as a
/// single-element list. An absent field, an empty list, or a non-numeric
/// value normalizes to 0 rather than failing; the locator caller treats a
/// zero coordinate as-is.
pub fn normalize_coord(value: &Value) -> i32 {
    let scalar = match value {
        Value::Array(items) => items.first().unwrap_or(&Value::Null),
        other => other,
    };
    match scalar {
        Value::Number(n) => n
            .as_i64()
            .map(|v| v as i32)
            .or_else(|| n.as_f64().map(|v| v as i32))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<f64>().map(|v| v as i32).unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAYLOAD: &str = r#"{"thought": "ok", "action": "FINISH", "parameters": {"message": "done"}}"#;

    #[test]
    fn unfenced_reply_parses_directly() {
        let v = parse_reply(PAYLOAD).unwrap();
        assert_eq!(v["action"], "FINISH");
    }

    #[test]
    fn json_fence_is_stripped_losslessly() {
        let fenced = format!("```json\n{PAYLOAD}\n```");
        assert_eq!(parse_reply(&fenced).unwrap(), parse_reply(PAYLOAD).unwrap());
    }

    #[test]
    fn bare_fence_is_stripped_losslessly() {
        let fenced = format!("```\n{PAYLOAD}\n```");
        assert_eq!(parse_reply(&fenced).unwrap(), parse_reply(PAYLOAD).unwrap());
    }

    #[test]
    fn fence_with_leading_prose_is_stripped() {
        let fenced = format!("Here is my answer:\n```json\n{PAYLOAD}\n```\nDone.");
        assert_eq!(parse_reply(&fenced).unwrap(), parse_reply(PAYLOAD).unwrap());
    }

    #[test]
    fn unterminated_fence_keeps_the_tail() {
        let fenced = format!("```json\n{PAYLOAD}");
        assert_eq!(parse_reply(&fenced).unwrap(), parse_reply(PAYLOAD).unwrap());
    }

    #[test]
    fn stripping_is_idempotent() {
        let fenced = format!("```json\n{PAYLOAD}\n```");
        let once = strip_code_fence(&fenced);
        assert_eq!(strip_code_fence(once), once);
    }

    #[test]
    fn scalar_coordinate_passes_through() {
        assert_eq!(normalize_coord(&json!(640)), 640);
        assert_eq!(normalize_coord(&json!(412.7)), 412);
    }

    #[test]
    fn single_element_list_takes_the_sole_element() {
        assert_eq!(normalize_coord(&json!([640])), 640);
        assert_eq!(normalize_coord(&json!([412.7])), 412);
    }

    #[test]
    fn empty_list_coordinate_normalizes_to_zero() {
        // Deliberate compatibility quirk: an empty list silently becomes 0,
        // which is a plausible-looking but wrong click target.
        assert_eq!(normalize_coord(&json!([])), 0);
    }

    #[test]
    fn absent_coordinate_normalizes_to_zero() {
        assert_eq!(normalize_coord(&Value::Null), 0);
    }

    #[test]
    fn numeric_string_coordinate_is_parsed() {
        assert_eq!(normalize_coord(&json!("512")), 512);
        assert_eq!(normalize_coord(&json!("junk")), 0);
    }
}
