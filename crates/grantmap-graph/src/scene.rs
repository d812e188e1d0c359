//! Draw instructions handed to the rendering surface.
//!
//! The engine owns geometry and visual state; the surface just draws what is
//! here, applying `transform` to every coordinate.

use crate::geometry::Vec2;
use crate::path::EdgePath;
use crate::style::{Color, EdgeEmphasis, EdgeStyle, NodeColors, NodeVisual};
use crate::view::ViewTransform;
use grantmap_core::{AccessKind, NodeId};
use serde::{Deserialize, Serialize};

/// Draw instruction for one node, at its live center position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInstruction {
    pub id: NodeId,
    pub label: String,
    /// Live center, graph coordinates.
    pub pos: Vec2,
    pub half_extent: Vec2,
    pub colors: NodeColors,
    pub accent: Color,
    pub visual: NodeVisual,
}

/// Draw instruction for one edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInstruction {
    pub source: NodeId,
    pub target: NodeId,
    pub access: AccessKind,
    pub path: EdgePath,
    pub style: EdgeStyle,
    pub emphasis: EdgeEmphasis,
    /// Whether the router had to fall back to the detour route.
    pub detour: bool,
}

/// One frame's worth of draw instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub nodes: Vec<NodeInstruction>,
    pub edges: Vec<EdgeInstruction>,
    pub transform: ViewTransform,
}

impl Scene {
    /// True when there is nothing to draw at all - the content-empty state.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
