use tcoord_models::AgentSignal;

use crate::error::AgentError;

/// Extract the first JSON object from agent stdout that may contain
/// surrounding text.
///
/// Handles the formats external signal processes emit in practice:
/// - Clean JSON: `{"key": "value"}`
/// - Markdown-wrapped: ```json\n{"key": "value"}\n```
/// - Prefix text: `analysis follows:\n{"key": "value"}`
pub fn extract_json(text: &str) -> Result<String, AgentError> {
    let trimmed = text.trim();

    if trimmed.starts_with('{') && serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Ok(trimmed.to_string());
    }

    if let Some(json_str) = extract_from_markdown_block(trimmed) {
        if serde_json::from_str::<serde_json::Value>(&json_str).is_ok() {
            return Ok(json_str);
        }
    }

    if let Some(json_str) = extract_balanced_object(trimmed) {
        if serde_json::from_str::<serde_json::Value>(&json_str).is_ok() {
            return Ok(json_str);
        }
    }

    Err(AgentError::Parse(format!(
        "No JSON object found in agent output ({} bytes)",
        text.len()
    )))
}

fn extract_from_markdown_block(text: &str) -> Option<String> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // Skip an optional language tag on the fence line.
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim().to_string())
}

fn extract_balanced_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..start + offset + 1].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse an AgentSignal from raw agent stdout. Confidence outside [0, 1]
/// is a parse failure: a malformed opinion must not enter aggregation.
pub fn parse_agent_signal(raw: &str) -> Result<AgentSignal, AgentError> {
    let json_str = extract_json(raw)?;
    let signal: AgentSignal = serde_json::from_str(&json_str)
        .map_err(|e| AgentError::Parse(format!("AgentSignal decode failed: {e}")))?;

    if !signal.confidence_in_bounds() {
        return Err(AgentError::Parse(format!(
            "confidence {} outside [0, 1]",
            signal.confidence
        )));
    }

    Ok(signal)
}
