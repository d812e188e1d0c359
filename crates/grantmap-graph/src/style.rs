//! Fixed palette for the permission diagram.
//!
//! Maps node kinds and access kinds to draw colors, and selection-derived
//! visual states to emphasis (opacity, marker).

use grantmap_core::{AccessKind, NodeKind};
use serde::{Deserialize, Serialize};

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn darken(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) * (1.0 - factor)) as u8,
            g: ((self.g as f32) * (1.0 - factor)) as u8,
            b: ((self.b as f32) * (1.0 - factor)) as u8,
            a: self.a,
        }
    }

    pub fn lighten(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) + (255.0 - self.r as f32) * factor) as u8,
            g: ((self.g as f32) + (255.0 - self.g as f32) * factor) as u8,
            b: ((self.b as f32) + (255.0 - self.b as f32) * factor) as u8,
            a: self.a,
        }
    }

    /// CSS hex form, used by the SVG snapshot.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Visual state of a node relative to the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeVisual {
    /// No selection active anywhere.
    Neutral,
    Selected,
    /// Directly connected to the selected node.
    Connected,
    /// Not in the selected node's neighborhood.
    Unselected,
}

/// Visual emphasis of an edge relative to the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeEmphasis {
    Neutral,
    /// Touches the selected node.
    Connected,
    /// Unrelated to the selected node; drawn nearly invisible.
    Dimmed,
}

/// Arrowhead variant at the edge target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    Arrow,
    DimmedArrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeColors {
    pub fill: Color,
    pub border: Color,
    pub text: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub color: Color,
    pub width: f32,
    pub dashed: bool,
    pub marker: MarkerKind,
    pub opacity: f32,
}

const PERMISSION_SET_FILL: Color = Color::rgb(0x4d, 0x7c, 0xc9);
const PERMISSION_GROUP_FILL: Color = Color::rgb(0x8e, 0x6b, 0xbf);
const CONTROL_FILL: Color = Color::rgb(0xd9, 0x8e, 0x32);
const OTHER_FILL: Color = Color::rgb(0x9a, 0xa5, 0xb1);

const ALLOW_COLOR: Color = Color::rgb(0x3a, 0x8f, 0x5c);
const DENY_COLOR: Color = Color::rgb(0xc0, 0x45, 0x3e);

/// Opacity of edges outside the selected neighborhood.
pub const DIMMED_EDGE_OPACITY: f32 = 0.05;

pub fn node_colors(kind: NodeKind, enabled: bool) -> NodeColors {
    let fill = match kind {
        NodeKind::PERMISSION_SET => PERMISSION_SET_FILL,
        NodeKind::PERMISSION_GROUP => PERMISSION_GROUP_FILL,
        NodeKind::CONTROL => CONTROL_FILL,
        NodeKind::OTHER => OTHER_FILL,
    };
    let fill = if enabled { fill } else { fill.lighten(0.55) };
    NodeColors {
        fill,
        border: fill.darken(0.35),
        text: Color::rgb(0xff, 0xff, 0xff),
    }
}

/// Accent color cycled from the node's visual category.
pub fn group_accent(group: i32) -> Color {
    const ACCENTS: [Color; 5] = [
        Color::rgb(0x4d, 0x7c, 0xc9),
        Color::rgb(0x3a, 0x8f, 0x5c),
        Color::rgb(0xd9, 0x8e, 0x32),
        Color::rgb(0x8e, 0x6b, 0xbf),
        Color::rgb(0xc0, 0x45, 0x3e),
    ];
    ACCENTS[group.rem_euclid(ACCENTS.len() as i32) as usize]
}

pub fn edge_style(access: AccessKind, emphasis: EdgeEmphasis) -> EdgeStyle {
    let color = match access {
        AccessKind::ALLOW => ALLOW_COLOR,
        AccessKind::DENY => DENY_COLOR,
    };
    let (marker, opacity) = match emphasis {
        EdgeEmphasis::Dimmed => (MarkerKind::DimmedArrow, DIMMED_EDGE_OPACITY),
        EdgeEmphasis::Neutral | EdgeEmphasis::Connected => (MarkerKind::Arrow, 1.0),
    };
    EdgeStyle {
        color,
        width: if emphasis == EdgeEmphasis::Connected { 2.0 } else { 1.5 },
        dashed: access == AccessKind::DENY,
        marker,
        opacity,
    }
}
