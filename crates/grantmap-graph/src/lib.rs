//! Geometry engine and interaction controller for permission-model access
//! diagrams.
//!
//! The data layer hands over nodes and access edges ([`grantmap_core`]); this
//! crate lays them out, routes collision-aware edge curves, renders them as
//! orthogonal paths, and keeps viewport, drag, and selection state consistent
//! through [`controller::DiagramController`]. The rendering surface consumes
//! the resulting [`scene::Scene`].

pub mod controller;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod path;
pub mod router;
pub mod scene;
pub mod style;
pub mod view;

pub use controller::{ControlAction, DiagramController};
pub use geometry::{CubicBezier, Rect, Vec2};
pub use layout::{
    GridScatterLayouter, HierarchicalLayouter, LayoutOptions, Layouter, content_bounds,
    layouter_for,
};
pub use model::{DiagramEdge, DiagramNode, EdgeIndex, GraphModel, NodeIndex};
pub use path::{EdgePath, OrthogonalPathBuilder, PathCommand, curved_path};
pub use router::{
    ConnectionSide, CurveRouter, Obstacle, RoutedCurve, RouterConfig, anchor_point,
    connection_sides,
};
pub use scene::{EdgeInstruction, NodeInstruction, Scene};
pub use style::{Color, EdgeEmphasis, EdgeStyle, MarkerKind, NodeColors, NodeVisual};
pub use view::{ViewAnimation, ViewTransform, resolve_viewport};
