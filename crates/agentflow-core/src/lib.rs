pub mod event;
pub mod graph;
pub mod ingest;
pub mod lesson;

pub use event::{AgentEvent, EventKind, EventLog};
pub use graph::{project, FlowEdge, FlowGraph, FlowNode, NodeRole, Viewport};
pub use ingest::{decode_frame, DecodeError};
pub use lesson::{extract_lesson, Lesson};
