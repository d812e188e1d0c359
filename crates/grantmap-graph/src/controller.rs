use crate::geometry::Vec2;
use crate::layout::{LayoutOptions, content_bounds, layouter_for};
use crate::model::{EdgeIndex, GraphModel, NodeIndex};
use crate::path::{EdgePath, OrthogonalPathBuilder, curved_path};
use crate::router::{
    ConnectionSide, CurveRouter, Obstacle, RoutedCurve, RouterConfig, anchor_point,
    connection_sides,
};
use crate::scene::{EdgeInstruction, NodeInstruction, Scene};
use crate::style::{self, EdgeEmphasis, NodeVisual};
use crate::view::{RESET_ANIMATION_MS, ViewAnimation, ViewTransform, resolve_viewport};
use grantmap_core::{GraphData, LayoutStrategy, NodeId, RankDirection};

const FIT_PADDING_FACTOR: f32 = 0.85;
const FIT_MAX_SCALE: f32 = 1.5;

/// Headless form of the user-facing control panel actions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    SetDirection(RankDirection),
    SetStrategy(LayoutStrategy),
    /// Animate the viewport back to the last fit transform.
    ResetZoom,
    /// Recompute the layout while keeping viewport and selection.
    ResetLayout,
}

/// Per-edge cached geometry for one layout pass. Connection sides are
/// assigned here and stay fixed until the next full layout, even while the
/// endpoints move.
#[derive(Debug, Clone, PartialEq)]
struct EdgeGeometry {
    sides: (ConnectionSide, ConnectionSide),
    routed: RoutedCurve,
    path: EdgePath,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    node: NodeIndex,
    /// Node center minus pointer at grab time, so the node does not jump to
    /// the pointer.
    grab_offset: Vec2,
}

/// Owns every piece of interactive state: the live model, per-edge cached
/// geometry, the viewport transform, selection, and the drag state machine.
///
/// All methods run synchronously on the caller's thread; within one drag
/// tick the node position is written before any dependent edge geometry is
/// read back.
pub struct DiagramController {
    model: GraphModel,
    options: LayoutOptions,
    viewport: Vec2,
    router: CurveRouter,
    path_builder: OrthogonalPathBuilder,
    geometry: Vec<EdgeGeometry>,
    transform: ViewTransform,
    fit: ViewTransform,
    selection: Option<NodeId>,
    node_visuals: Vec<NodeVisual>,
    edge_emphasis: Vec<EdgeEmphasis>,
    drag: Option<DragState>,
    animation: Option<ViewAnimation>,
}

impl DiagramController {
    /// Build the controller from a wire payload and run the initial layout
    /// with a fit-to-viewport transform.
    pub fn new(
        data: &GraphData,
        viewport_width: Option<f32>,
        viewport_height: Option<f32>,
        options: LayoutOptions,
    ) -> Self {
        let model = GraphModel::from_data(data);
        let node_count = model.node_count();
        let edge_count = model.edge_count();

        let mut controller = Self {
            model,
            options,
            viewport: resolve_viewport(viewport_width, viewport_height),
            router: CurveRouter::default(),
            path_builder: OrthogonalPathBuilder::default(),
            geometry: Vec::with_capacity(edge_count),
            transform: ViewTransform::default(),
            fit: ViewTransform::default(),
            selection: None,
            node_visuals: vec![NodeVisual::Neutral; node_count],
            edge_emphasis: vec![EdgeEmphasis::Neutral; edge_count],
            drag: None,
            animation: None,
        };
        controller.relayout(false);
        controller
    }

    /// Full layout pass. Replaces every node position, every cached
    /// connection side, and every edge path; the viewport transform is reset
    /// to the new fit unless `preserve_viewport` is set (the reset-layout
    /// action, as opposed to a data or direction change).
    ///
    /// An in-flight drag is superseded and discarded.
    pub fn relayout(&mut self, preserve_viewport: bool) {
        self.drag = None;
        self.animation = None;

        // Scatter cells sit much closer than rank gaps; the tight offset
        // band keeps its curves from ballooning.
        self.router = match self.options.strategy {
            LayoutStrategy::Hierarchical => CurveRouter::default(),
            LayoutStrategy::GridScatter => CurveRouter::new(RouterConfig::compact()),
        };

        let positions = layouter_for(&self.options).execute(&self.model);
        let indices: Vec<NodeIndex> = self.model.node_indices().collect();
        for idx in indices {
            self.model[idx].pos = positions.get(&idx).copied().unwrap_or(Vec2::ZERO);
        }

        self.geometry.clear();
        let obstacles = self.obstacles();
        for edge_idx in self.model.edge_indices().collect::<Vec<_>>() {
            let edge = &self.model[edge_idx];
            let sides = connection_sides(
                self.model[edge.source_idx].pos,
                self.model[edge.target_idx].pos,
            );
            let (routed, path) = self.route_edge(edge_idx, sides, &obstacles);
            self.geometry.push(EdgeGeometry {
                sides,
                routed,
                path,
            });
        }

        self.fit = ViewTransform::fit(
            content_bounds(&self.model, &self.options),
            self.viewport,
            FIT_PADDING_FACTOR,
            FIT_MAX_SCALE,
        );
        if !preserve_viewport {
            self.transform = self.fit;
        }

        self.refresh_visuals();
    }

    pub fn apply_action(&mut self, action: ControlAction) {
        match action {
            ControlAction::SetDirection(direction) => {
                self.options.direction = direction;
                self.relayout(false);
            }
            ControlAction::SetStrategy(strategy) => {
                self.options.strategy = strategy;
                self.relayout(false);
            }
            ControlAction::ResetZoom => self.reset_zoom(),
            ControlAction::ResetLayout => self.relayout(true),
        }
    }

    // ----- pan / zoom -------------------------------------------------

    pub fn pan_by(&mut self, delta: Vec2) {
        self.animation = None;
        self.transform = self.transform.panned_by(delta);
    }

    /// Zoom about `focus` (screen coordinates). Scale stays within
    /// [0.1, 10].
    pub fn zoom_by(&mut self, factor: f32, focus: Vec2) {
        self.animation = None;
        self.transform = self.transform.zoomed_about(factor, focus);
    }

    /// Start the animated return to the last fit transform.
    pub fn reset_zoom(&mut self) {
        self.animation = Some(ViewAnimation::new(
            self.transform,
            self.fit,
            RESET_ANIMATION_MS,
        ));
    }

    /// Advance the reset animation, if one is running.
    pub fn tick(&mut self, dt_ms: f32) {
        if let Some(animation) = &mut self.animation {
            self.transform = animation.advance(dt_ms);
            if animation.is_done() {
                self.animation = None;
            }
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    // ----- node drag --------------------------------------------------

    /// Start dragging `id`. The node's current center becomes the drag
    /// subject; `pointer` is in graph coordinates. A second concurrent drag
    /// request is ignored, as is an unknown id.
    pub fn begin_drag(&mut self, id: &NodeId, pointer: Vec2) {
        if self.drag.is_some() {
            return;
        }
        let Some(node) = self.model.index_of(id) else {
            tracing::warn!("Ignoring drag of unknown node {id}");
            return;
        };
        self.drag = Some(DragState {
            node,
            grab_offset: self.model[node].pos - pointer,
        });
    }

    /// One drag tick: overwrite the dragged node's live position, then
    /// re-route only the edges touching it. Connection sides keep their
    /// layout-time values.
    pub fn drag_move(&mut self, pointer: Vec2) {
        let Some(drag) = self.drag else {
            return;
        };

        // Position write precedes every dependent geometry read.
        self.model[drag.node].pos = pointer + drag.grab_offset;

        let touched = self.model.edges_touching(drag.node);
        let obstacles = self.obstacles();
        for edge_idx in touched {
            let sides = self.geometry[edge_idx.0].sides;
            let (routed, path) = self.route_edge(edge_idx, sides, &obstacles);
            let geometry = &mut self.geometry[edge_idx.0];
            geometry.routed = routed;
            geometry.path = path;
        }
    }

    /// End the drag; the node stays where it was released until the next
    /// full layout pass.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // ----- selection --------------------------------------------------

    /// Toggle selection: clicking the selected node clears, any other node
    /// replaces. Visual tags are recomputed as their own pass, after
    /// geometry.
    pub fn toggle_select(&mut self, id: &NodeId) {
        if self.model.index_of(id).is_none() {
            tracing::warn!("Ignoring selection of unknown node {id}");
            return;
        }
        self.selection = if self.selection.as_ref() == Some(id) {
            None
        } else {
            Some(id.clone())
        };
        self.refresh_visuals();
    }

    pub fn selection(&self) -> Option<&NodeId> {
        self.selection.as_ref()
    }

    fn refresh_visuals(&mut self) {
        let node_count = self.model.node_count();
        let edge_count = self.model.edge_count();

        let selected_idx = self
            .selection
            .as_ref()
            .and_then(|id| self.model.index_of(id));

        let Some(selected) = selected_idx else {
            self.node_visuals = vec![NodeVisual::Neutral; node_count];
            self.edge_emphasis = vec![EdgeEmphasis::Neutral; edge_count];
            return;
        };

        let mut visuals = vec![NodeVisual::Unselected; node_count];
        for neighbor in self.model.neighbors_of(selected) {
            visuals[neighbor.0] = NodeVisual::Connected;
        }
        visuals[selected.0] = NodeVisual::Selected;
        self.node_visuals = visuals;

        self.edge_emphasis = self
            .model
            .edges()
            .iter()
            .map(|edge| {
                if edge.source_idx == selected || edge.target_idx == selected {
                    EdgeEmphasis::Connected
                } else {
                    EdgeEmphasis::Dimmed
                }
            })
            .collect();
    }

    // ----- output -----------------------------------------------------

    /// Assemble the current frame: cached geometry plus cached visual tags.
    pub fn scene(&self) -> Scene {
        let nodes = self
            .model
            .nodes()
            .iter()
            .zip(&self.node_visuals)
            .map(|(node, &visual)| NodeInstruction {
                id: node.id.clone(),
                label: node.name.clone(),
                pos: node.pos,
                half_extent: self.options.footprint * 0.5,
                colors: style::node_colors(node.kind, node.enabled),
                accent: style::group_accent(node.group),
                visual,
            })
            .collect();

        let edges = self
            .model
            .edges()
            .iter()
            .zip(&self.geometry)
            .zip(&self.edge_emphasis)
            .map(|((edge, geometry), &emphasis)| EdgeInstruction {
                source: edge.source.clone(),
                target: edge.target.clone(),
                access: edge.access,
                path: geometry.path.clone(),
                style: style::edge_style(edge.access, emphasis),
                emphasis,
                detour: geometry.routed.detour,
            })
            .collect();

        Scene {
            nodes,
            edges,
            transform: self.transform,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn fit_transform(&self) -> ViewTransform {
        self.fit
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Cached connection sides of an edge, fixed for the current layout pass.
    pub fn edge_sides(&self, edge: EdgeIndex) -> Option<(ConnectionSide, ConnectionSide)> {
        self.geometry.get(edge.0).map(|g| g.sides)
    }

    /// The rendered path of an edge as of the last geometry pass.
    pub fn edge_path(&self, edge: EdgeIndex) -> Option<&EdgePath> {
        self.geometry.get(edge.0).map(|g| &g.path)
    }

    // ----- internals --------------------------------------------------

    fn obstacles(&self) -> Vec<Obstacle> {
        self.model
            .node_indices()
            .map(|idx| Obstacle {
                node: idx,
                center: self.model[idx].pos,
            })
            .collect()
    }

    fn route_edge(
        &self,
        edge_idx: EdgeIndex,
        sides: (ConnectionSide, ConnectionSide),
        obstacles: &[Obstacle],
    ) -> (RoutedCurve, EdgePath) {
        let edge = &self.model[edge_idx];
        let footprint = self.options.footprint;
        let start = anchor_point(self.model[edge.source_idx].pos, sides.0, footprint);
        let end = anchor_point(self.model[edge.target_idx].pos, sides.1, footprint);

        let routed = self.router.route(
            start,
            end,
            sides.0,
            sides.1,
            obstacles,
            footprint,
            edge.source_idx,
            edge.target_idx,
        );

        let path = match self.options.strategy {
            LayoutStrategy::Hierarchical => self.path_builder.build(&routed.curve),
            LayoutStrategy::GridScatter => curved_path(&routed.curve),
        };

        (routed, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantmap_core::{AccessKind, EdgeData, NodeData, NodeKind};

    fn node(id: &str, kind: NodeKind) -> NodeData {
        NodeData {
            id: NodeId::from(id),
            name: id.to_uppercase(),
            kind,
            group: 0,
            enabled: None,
        }
    }

    fn edge(source: &str, target: &str, access: AccessKind) -> EdgeData {
        EdgeData {
            source: NodeId::from(source),
            target: NodeId::from(target),
            access,
        }
    }

    fn sample_data() -> GraphData {
        GraphData {
            nodes: vec![
                node("ps", NodeKind::PERMISSION_SET),
                node("pg", NodeKind::PERMISSION_GROUP),
                node("ctl", NodeKind::CONTROL),
                node("misc", NodeKind::OTHER),
            ],
            edges: vec![
                edge("ps", "pg", AccessKind::ALLOW),
                edge("pg", "ctl", AccessKind::ALLOW),
                edge("misc", "ctl", AccessKind::DENY),
            ],
        }
    }

    fn controller() -> DiagramController {
        DiagramController::new(
            &sample_data(),
            Some(800.0),
            Some(600.0),
            LayoutOptions::default(),
        )
    }

    #[test]
    fn initial_layout_positions_and_fits() {
        let c = controller();
        // Layout assigned distinct positions.
        let ps = c.model().get_node(&NodeId::from("ps")).unwrap().pos;
        let ctl = c.model().get_node(&NodeId::from("ctl")).unwrap().pos;
        assert_ne!(ps, ctl);
        // Initial transform is the fit transform.
        assert_eq!(c.transform(), c.fit_transform());
        assert_eq!(c.scene().edges.len(), 3);
    }

    #[test]
    fn empty_graph_is_content_empty_not_an_error() {
        let c = DiagramController::new(
            &GraphData::default(),
            None,
            None,
            LayoutOptions::default(),
        );
        let scene = c.scene();
        assert!(scene.is_empty());
        // Origin centered on the 800x600 fallback viewport.
        assert_eq!(scene.transform.to_screen(Vec2::ZERO), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn selection_toggle_is_idempotent() {
        let mut c = controller();
        let before = c.scene();

        c.toggle_select(&NodeId::from("pg"));
        assert_eq!(c.selection(), Some(&NodeId::from("pg")));
        assert_ne!(c.scene(), before);

        c.toggle_select(&NodeId::from("pg"));
        assert_eq!(c.selection(), None);
        assert_eq!(c.scene(), before);
    }

    #[test]
    fn selection_tags_neighborhood() {
        let mut c = controller();
        c.toggle_select(&NodeId::from("pg"));
        let scene = c.scene();

        let visual_of = |id: &str| {
            scene
                .nodes
                .iter()
                .find(|n| n.id == NodeId::from(id))
                .unwrap()
                .visual
        };
        assert_eq!(visual_of("pg"), NodeVisual::Selected);
        assert_eq!(visual_of("ps"), NodeVisual::Connected);
        assert_eq!(visual_of("ctl"), NodeVisual::Connected);
        assert_eq!(visual_of("misc"), NodeVisual::Unselected);

        // Edges touching the selection stay prominent, the rest dim out.
        assert_eq!(scene.edges[0].emphasis, EdgeEmphasis::Connected);
        assert_eq!(scene.edges[1].emphasis, EdgeEmphasis::Connected);
        assert_eq!(scene.edges[2].emphasis, EdgeEmphasis::Dimmed);
        assert!(scene.edges[2].style.opacity < 0.1);
    }

    #[test]
    fn replacing_selection_switches_without_clearing() {
        let mut c = controller();
        c.toggle_select(&NodeId::from("pg"));
        c.toggle_select(&NodeId::from("misc"));
        assert_eq!(c.selection(), Some(&NodeId::from("misc")));
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut c = controller();
        let before = c.scene();
        c.toggle_select(&NodeId::from("ghost"));
        c.begin_drag(&NodeId::from("ghost"), Vec2::ZERO);
        assert!(!c.is_dragging());
        assert_eq!(c.scene(), before);
    }

    #[test]
    fn drag_updates_only_touching_edges() {
        let mut c = controller();
        let before_e2 = c.edge_path(EdgeIndex(2)).unwrap().clone();
        let before_e0 = c.edge_path(EdgeIndex(0)).unwrap().clone();

        let grab = c.model().get_node(&NodeId::from("ps")).unwrap().pos;
        c.begin_drag(&NodeId::from("ps"), grab);
        c.drag_move(grab + Vec2::new(80.0, -45.0));

        // Edge 0 (ps -> pg) moved with the node; edge 2 (misc -> ctl) is
        // byte-identical to its pre-drag value.
        assert_ne!(c.edge_path(EdgeIndex(0)).unwrap(), &before_e0);
        assert_eq!(c.edge_path(EdgeIndex(2)).unwrap(), &before_e2);
    }

    #[test]
    fn drag_keeps_grab_offset() {
        let mut c = controller();
        let start_pos = c.model().get_node(&NodeId::from("ps")).unwrap().pos;
        // Grab off-center: the node must not jump to the pointer.
        let pointer = start_pos + Vec2::new(30.0, 10.0);
        c.begin_drag(&NodeId::from("ps"), pointer);
        c.drag_move(pointer);
        assert_eq!(
            c.model().get_node(&NodeId::from("ps")).unwrap().pos,
            start_pos
        );

        c.drag_move(pointer + Vec2::new(100.0, 0.0));
        assert_eq!(
            c.model().get_node(&NodeId::from("ps")).unwrap().pos,
            start_pos + Vec2::new(100.0, 0.0)
        );
        c.end_drag();
        assert!(!c.is_dragging());
    }

    #[test]
    fn connection_sides_stay_fixed_during_drag() {
        let mut c = controller();
        // Force a deterministic left-to-right pair.
        let e0_sides = c.edge_sides(EdgeIndex(0)).unwrap();

        let ps_pos = c.model().get_node(&NodeId::from("ps")).unwrap().pos;
        c.begin_drag(&NodeId::from("ps"), ps_pos);
        // Drag far past every other node on the x axis.
        c.drag_move(ps_pos + Vec2::new(5000.0, 0.0));

        assert_eq!(c.edge_sides(EdgeIndex(0)).unwrap(), e0_sides);
        c.end_drag();

        // The next full layout may flip them again.
        c.relayout(false);
        let e0 = &c.model().edges()[0];
        let expected = connection_sides(
            c.model()[e0.source_idx].pos,
            c.model()[e0.target_idx].pos,
        );
        assert_eq!(c.edge_sides(EdgeIndex(0)).unwrap(), expected);
    }

    #[test]
    fn only_one_drag_at_a_time() {
        let mut c = controller();
        let ps_pos = c.model().get_node(&NodeId::from("ps")).unwrap().pos;
        c.begin_drag(&NodeId::from("ps"), ps_pos);
        c.begin_drag(&NodeId::from("ctl"), Vec2::ZERO);

        c.drag_move(ps_pos + Vec2::new(10.0, 0.0));
        let ctl = c.model().get_node(&NodeId::from("ctl")).unwrap().pos;
        // The second grab was ignored: ctl never moved.
        assert_eq!(c.model().get_node(&NodeId::from("ps")).unwrap().pos, ps_pos + Vec2::new(10.0, 0.0));
        assert_ne!(ctl, ps_pos + Vec2::new(10.0, 0.0));
    }

    #[test]
    fn relayout_supersedes_inflight_drag() {
        let mut c = controller();
        let ps_pos = c.model().get_node(&NodeId::from("ps")).unwrap().pos;
        c.begin_drag(&NodeId::from("ps"), ps_pos);
        c.drag_move(ps_pos + Vec2::new(50.0, 50.0));

        c.relayout(false);
        assert!(!c.is_dragging());

        // Further drag ticks are dead.
        let after = c.model().get_node(&NodeId::from("ps")).unwrap().pos;
        c.drag_move(Vec2::new(9999.0, 9999.0));
        assert_eq!(c.model().get_node(&NodeId::from("ps")).unwrap().pos, after);
    }

    #[test]
    fn reset_layout_preserves_viewport_and_selection() {
        let mut c = controller();
        c.toggle_select(&NodeId::from("ctl"));
        c.pan_by(Vec2::new(123.0, -77.0));
        c.zoom_by(1.7, Vec2::new(400.0, 300.0));
        let viewport_transform = c.transform();

        c.apply_action(ControlAction::ResetLayout);
        assert_eq!(c.transform(), viewport_transform);
        assert_eq!(c.selection(), Some(&NodeId::from("ctl")));

        // A direction change is a data-shaped change: the fit is applied.
        c.apply_action(ControlAction::SetDirection(RankDirection::LeftRight));
        assert_eq!(c.transform(), c.fit_transform());
        assert_eq!(c.options().direction, RankDirection::LeftRight);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut c = controller();
        for _ in 0..40 {
            c.zoom_by(2.0, Vec2::ZERO);
        }
        assert_eq!(c.transform().scale, crate::view::MAX_SCALE);
        for _ in 0..80 {
            c.zoom_by(0.5, Vec2::ZERO);
        }
        assert_eq!(c.transform().scale, crate::view::MIN_SCALE);
    }

    #[test]
    fn reset_zoom_animates_back_to_fit() {
        let mut c = controller();
        c.pan_by(Vec2::new(300.0, 200.0));
        c.zoom_by(3.0, Vec2::ZERO);
        assert_ne!(c.transform(), c.fit_transform());

        c.reset_zoom();
        assert!(c.is_animating());

        c.tick(375.0);
        let halfway = c.transform();
        assert_ne!(halfway, c.fit_transform());

        c.tick(375.0);
        assert!(!c.is_animating());
        let end = c.transform();
        assert!((end.scale - c.fit_transform().scale).abs() < 1e-4);
        assert!((end.translate.x - c.fit_transform().translate.x).abs() < 1e-2);
    }

    #[test]
    fn pan_cancels_reset_animation() {
        let mut c = controller();
        c.zoom_by(2.0, Vec2::ZERO);
        c.reset_zoom();
        c.pan_by(Vec2::new(5.0, 5.0));
        assert!(!c.is_animating());
    }

    #[test]
    fn scatter_strategy_renders_cubic_paths() {
        let mut c = controller();
        c.apply_action(ControlAction::SetStrategy(LayoutStrategy::GridScatter));
        let scene = c.scene();
        for edge in &scene.edges {
            assert!(edge.path.svg_data().contains('C'), "expected cubic path");
        }
    }

    #[test]
    fn hierarchical_paths_use_the_orthogonal_silhouette() {
        let c = controller();
        let scene = c.scene();
        for edge in &scene.edges {
            let data = edge.path.svg_data();
            assert!(!data.contains('C'), "unexpected cubic in {data}");
        }
    }
}
