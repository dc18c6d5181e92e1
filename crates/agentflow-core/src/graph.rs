use crate::event::{AgentEvent, EventKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::f64::consts::TAU;

/// Floor for the square layout canvas, in layout units.
pub const BASE_CANVAS: f64 = 600.0;
/// Canvas growth per participant.
pub const NODE_SPACING: f64 = 60.0;
/// Base ring radius before per-participant growth.
pub const BASE_RADIUS: f64 = 50.0;
/// Ring radius growth per participant.
pub const RADIUS_PER_NODE: f64 = 12.0;
/// Divisor applied to the shorter viewport dimension to cap the ring.
pub const VIEWPORT_RADIUS_DIVISOR: f64 = 2.2;

/// Identifier prefix that marks a participant as a tool.
pub const TOOL_ID_PREFIX: &str = "tool";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Agent,
    Tool,
}

impl NodeRole {
    pub fn for_id(id: &str) -> Self {
        if id.starts_with(TOOL_ID_PREFIX) {
            Self::Tool
        } else {
            Self::Agent
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Tool => "tool",
        }
    }
}

/// On-screen dimensions available to the renderer. An explicit input so
/// the projection stays a pure function of its arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowNode {
    pub id: String,
    pub name: String,
    pub role: NodeRole,
    pub x: f64,
    pub y: f64,
    /// Body of the event that first mentioned this participant.
    pub last_output: String,
}

/// Directed communication link. One edge per qualifying event, never
/// deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    /// Side length of the square layout canvas.
    pub canvas: f64,
}

impl FlowGraph {
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Display radius for node markers, shrinking as the graph grows.
    pub fn marker_radius(&self) -> f64 {
        (20.0 + (10.0 - self.nodes.len() as f64)).clamp(10.0, 28.0)
    }
}

/// Projects the full event log into a node ring plus directed edges.
///
/// Pure function of the snapshot: participants are placed on a circle in
/// first-sighting order, every event contributes a sender->recipient edge,
/// and a tool response also contributes the reverse edge. An empty log
/// short-circuits to an empty graph before any of the angular math runs.
pub fn project(events: &[AgentEvent], viewport: Viewport) -> FlowGraph {
    let mut participants: HashSet<&str> = HashSet::new();
    for event in events {
        participants.insert(event.sender.as_str());
        participants.insert(event.recipient.as_str());
    }
    let count = participants.len();
    if count == 0 {
        return FlowGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
            canvas: BASE_CANVAS,
        };
    }

    let canvas = BASE_CANVAS.max(count as f64 * NODE_SPACING);
    let center = canvas / 2.0;
    let max_radius = viewport.width.min(viewport.height) / VIEWPORT_RADIUS_DIVISOR;
    let radius = max_radius.min(BASE_RADIUS + count as f64 * RADIUS_PER_NODE);
    let angle_step = TAU / count as f64;

    let mut seen: HashSet<&str> = HashSet::with_capacity(count);
    let mut nodes: Vec<FlowNode> = Vec::with_capacity(count);
    let mut edges: Vec<FlowEdge> = Vec::with_capacity(events.len());

    for event in events {
        for id in [event.sender.as_str(), event.recipient.as_str()] {
            if !seen.insert(id) {
                continue;
            }
            let angle = nodes.len() as f64 * angle_step;
            nodes.push(FlowNode {
                id: id.to_string(),
                name: id.to_string(),
                role: NodeRole::for_id(id),
                x: center + radius * angle.cos(),
                y: center + radius * angle.sin(),
                last_output: event.body.clone(),
            });
        }

        edges.push(FlowEdge {
            from: event.sender.clone(),
            to: event.recipient.clone(),
        });
        if event.kind == EventKind::ToolResponse {
            edges.push(FlowEdge {
                from: event.recipient.clone(),
                to: event.sender.clone(),
            });
        }
    }

    FlowGraph {
        nodes,
        edges,
        canvas,
    }
}
