use crate::geometry::{CubicBezier, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// One drawing command of an edge path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    /// Quadratic joint; `control` is the sharp 90-degree corner the joint
    /// rounds off.
    QuadTo {
        control: Vec2,
        to: Vec2,
    },
    CubicTo {
        control1: Vec2,
        control2: Vec2,
        to: Vec2,
    },
}

/// A drawable edge path as an ordered command list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgePath {
    pub commands: Vec<PathCommand>,
}

impl EdgePath {
    pub fn start(&self) -> Option<Vec2> {
        match self.commands.first() {
            Some(PathCommand::MoveTo(p)) => Some(*p),
            _ => None,
        }
    }

    pub fn end(&self) -> Option<Vec2> {
        match self.commands.last() {
            Some(PathCommand::MoveTo(p)) | Some(PathCommand::LineTo(p)) => Some(*p),
            Some(PathCommand::QuadTo { to, .. }) | Some(PathCommand::CubicTo { to, .. }) => {
                Some(*to)
            }
            None => None,
        }
    }

    /// SVG path-data serialization of the command list.
    pub fn svg_data(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            match command {
                PathCommand::MoveTo(p) => {
                    let _ = write!(out, "M{:.2},{:.2}", p.x, p.y);
                }
                PathCommand::LineTo(p) => {
                    let _ = write!(out, "L{:.2},{:.2}", p.x, p.y);
                }
                PathCommand::QuadTo { control, to } => {
                    let _ = write!(
                        out,
                        "Q{:.2},{:.2} {:.2},{:.2}",
                        control.x, control.y, to.x, to.y
                    );
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    to,
                } => {
                    let _ = write!(
                        out,
                        "C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
                        control1.x, control1.y, control2.x, control2.y, to.x, to.y
                    );
                }
            }
        }
        out
    }
}

/// Builds the orthogonal silhouette drawn for hierarchical edges: a
/// horizontal run from each anchor to a vertical spine centered between the
/// anchors, joined by two rounded 90-degree corners.
#[derive(Debug, Clone)]
pub struct OrthogonalPathBuilder {
    pub radius_factor: f32,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for OrthogonalPathBuilder {
    fn default() -> Self {
        Self {
            radius_factor: 0.3,
            min_radius: 8.0,
            max_radius: 20.0,
        }
    }
}

const FLAT_EPSILON: f32 = 1e-3;

impl OrthogonalPathBuilder {
    /// Render a routed curve as the orthogonal silhouette. Only the curve's
    /// anchors matter here; the control points belong to the collision
    /// search, not the final hierarchical look.
    pub fn build(&self, curve: &CubicBezier) -> EdgePath {
        self.build_between(curve.start, curve.end)
    }

    pub fn build_between(&self, start: Vec2, end: Vec2) -> EdgePath {
        // Degenerate anchors collapse to a straight segment; forcing the
        // minimum corner radius onto a zero-length run would fold the path
        // back over itself.
        if (end.y - start.y).abs() < FLAT_EPSILON || (end.x - start.x).abs() < FLAT_EPSILON {
            return EdgePath {
                commands: vec![PathCommand::MoveTo(start), PathCommand::LineTo(end)],
            };
        }

        let middle_x = (start.x + end.x) * 0.5;
        let run1 = (middle_x - start.x).abs();
        let run2 = (end.x - middle_x).abs();
        let vertical_run = (end.y - start.y).abs();

        let radius = (self.radius_factor * run1.min(run2).min(vertical_run))
            .clamp(self.min_radius, self.max_radius);

        // Which way each corner turns: into the spine along the incoming
        // horizontal direction, out of it toward the target.
        let h1 = (middle_x - start.x).signum();
        let h2 = (end.x - middle_x).signum();
        let v = (end.y - start.y).signum();

        let commands = vec![
            PathCommand::MoveTo(start),
            PathCommand::LineTo(Vec2::new(middle_x - h1 * radius, start.y)),
            PathCommand::QuadTo {
                control: Vec2::new(middle_x, start.y),
                to: Vec2::new(middle_x, start.y + v * radius),
            },
            PathCommand::LineTo(Vec2::new(middle_x, end.y - v * radius)),
            PathCommand::QuadTo {
                control: Vec2::new(middle_x, end.y),
                to: Vec2::new(middle_x + h2 * radius, end.y),
            },
            PathCommand::LineTo(end),
        ];

        EdgePath { commands }
    }
}

/// Render a routed curve as a plain cubic path. Used for the grid-scatter
/// strategy, where there is no rank spine to dock into.
pub fn curved_path(curve: &CubicBezier) -> EdgePath {
    EdgePath {
        commands: vec![
            PathCommand::MoveTo(curve.start),
            PathCommand::CubicTo {
                control1: curve.control1,
                control2: curve.control2,
                to: curve.end,
            },
        ],
    }
}
