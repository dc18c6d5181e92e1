use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a streamed agent message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Text,
    ToolResponse,
    Termination,
    Unknown,
}

impl EventKind {
    /// Maps a wire-level `type` string to a kind. Anything unrecognized
    /// collapses to `Unknown` rather than failing.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "text" => Self::Text,
            "tool_response" => Self::ToolResponse,
            "termination" => Self::Termination,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::ToolResponse => "tool_response",
            Self::Termination => "termination",
            Self::Unknown => "unknown",
        }
    }

    /// Human-facing label used by transcript views.
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "Agent Message",
            Self::ToolResponse => "Tool Response",
            Self::Termination => "Terminating",
            Self::Unknown => "Unknown Type",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized entry of the message stream. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentEvent {
    pub id: String,
    pub kind: EventKind,
    pub sender: String,
    pub recipient: String,
    pub body: String,
}

/// Append-only log of accepted events, owned by a single controller.
/// Consumers get an immutable snapshot via [`EventLog::events`]; entries
/// are never mutated or removed.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<AgentEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: AgentEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[AgentEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_kinds_map_to_variants() {
        assert_eq!(EventKind::from_wire("text"), EventKind::Text);
        assert_eq!(EventKind::from_wire("tool_response"), EventKind::ToolResponse);
        assert_eq!(EventKind::from_wire("termination"), EventKind::Termination);
        assert_eq!(EventKind::from_wire("agent"), EventKind::Unknown);
        assert_eq!(EventKind::from_wire(""), EventKind::Unknown);
    }

    #[test]
    fn log_preserves_arrival_order() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        for n in 0..3 {
            log.push(AgentEvent {
                id: format!("id-{n}"),
                kind: EventKind::Text,
                sender: "planner".to_string(),
                recipient: "executor".to_string(),
                body: format!("step {n}"),
            });
        }

        assert_eq!(log.len(), 3);
        let ids: Vec<&str> = log.events().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["id-0", "id-1", "id-2"]);
    }
}
