use crate::event::{AgentEvent, EventKind};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Placeholder sender used when a frame omits `content.sender`.
pub const DEFAULT_SENDER: &str = "sender";
/// Placeholder recipient used when a frame omits `content.recipient`.
pub const DEFAULT_RECIPIENT: &str = "agent";
/// Display sender substituted for tool-role tool responses.
pub const TOOL_FUNCTION_SENDER: &str = "tool function";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Syntax(String),
    #[error("frame is not a JSON object")]
    NotAnObject,
}

/// Decodes one streamed text frame into a normalized event.
///
/// Missing fields degrade to defaults and never fail; only a frame that is
/// not a JSON object at all produces an error, so the caller can route it
/// to a diagnostics channel instead of the log. `Ok(None)` means the frame
/// parsed but carried no usable body text and was dropped.
pub fn decode_frame(raw: &str) -> Result<Option<AgentEvent>, DecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| DecodeError::Syntax(err.to_string()))?;
    let frame = value.as_object().ok_or(DecodeError::NotAnObject)?;
    let content = frame.get("content").and_then(Value::as_object);

    let body = content
        .and_then(|c| c.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    if body.trim().is_empty() {
        return Ok(None);
    }

    let kind = frame
        .get("type")
        .and_then(Value::as_str)
        .map(EventKind::from_wire)
        .unwrap_or(EventKind::Unknown);

    let mut sender = non_empty_str(content, "sender")
        .unwrap_or(DEFAULT_SENDER)
        .to_string();
    let recipient = non_empty_str(content, "recipient")
        .unwrap_or(DEFAULT_RECIPIENT)
        .to_string();

    // A tool-role tool response is attributed to the tool itself rather
    // than the agent relaying it.
    if kind == EventKind::ToolResponse {
        let first_role = content
            .and_then(|c| c.get("tool_responses"))
            .and_then(Value::as_array)
            .and_then(|list| list.first())
            .and_then(|entry| entry.get("role"))
            .and_then(Value::as_str);
        if first_role == Some("tool") {
            sender = TOOL_FUNCTION_SENDER.to_string();
        }
    }

    let id = non_empty_str(content, "uuid")
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Ok(Some(AgentEvent {
        id,
        kind,
        sender,
        recipient,
        body: body.to_string(),
    }))
}

fn non_empty_str<'a>(
    content: Option<&'a serde_json::Map<String, Value>>,
    key: &str,
) -> Option<&'a str> {
    content
        .and_then(|c| c.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
