use crate::geometry::{CubicBezier, Rect, Vec2};
use crate::model::NodeIndex;
use serde::{Deserialize, Serialize};

/// Horizontal side of a node's bounding box an edge departs from or arrives
/// at. Chosen once per layout pass and held fixed while nodes are dragged, so
/// edges do not flip sides mid-drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionSide {
    Left,
    Right,
}

impl ConnectionSide {
    /// Outward x direction implied by the side.
    pub fn dir_x(self) -> f32 {
        match self {
            ConnectionSide::Left => -1.0,
            ConnectionSide::Right => 1.0,
        }
    }
}

/// Pick connection sides for an edge from the relative horizontal position of
/// the endpoint centers: a source left of its target exits right and the
/// target receives left, and the other way around otherwise.
pub fn connection_sides(source_center: Vec2, target_center: Vec2) -> (ConnectionSide, ConnectionSide) {
    if source_center.x < target_center.x {
        (ConnectionSide::Right, ConnectionSide::Left)
    } else {
        (ConnectionSide::Left, ConnectionSide::Right)
    }
}

/// Anchor point on the node boundary for the given side, at the vertical
/// center of the node.
pub fn anchor_point(center: Vec2, side: ConnectionSide, footprint: Vec2) -> Vec2 {
    Vec2::new(center.x + side.dir_x() * footprint.x * 0.5, center.y)
}

/// A routed curve, tagged with whether the detour fallback was taken. Only
/// non-detour curves carry the collision-free guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutedCurve {
    pub curve: CubicBezier,
    pub detour: bool,
}

/// An obstacle the router must steer around: any node other than the routed
/// edge's own endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub node: NodeIndex,
    pub center: Vec2,
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Floor for the control-point offset. Also the degenerate-geometry
    /// guard: identical anchors still get a positive offset.
    pub min_control_offset: f32,
    pub max_control_offset: f32,
    /// Curvature multipliers tried in order; the first collision-free one
    /// wins.
    pub curvature_trials: Vec<f32>,
    /// Interior sample count per collision test (t = 1/(n+1) .. n/(n+1)).
    pub collision_samples: usize,
    /// Vertical displacement of the detour midpoint, in node heights.
    pub detour_rise: f32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            min_control_offset: 120.0,
            max_control_offset: 200.0,
            curvature_trials: vec![0.3, 0.5, 0.7, 0.9, 1.2],
            collision_samples: 18,
            detour_rise: 1.5,
        }
    }
}

impl RouterConfig {
    /// The tighter offset band used by compact layouts.
    pub fn compact() -> Self {
        Self {
            min_control_offset: 8.0,
            max_control_offset: 100.0,
            ..Self::default()
        }
    }
}

/// Router for collision-aware edge curves between positioned nodes.
#[derive(Debug, Clone, Default)]
pub struct CurveRouter {
    pub config: RouterConfig,
}

impl CurveRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    /// Route one edge from `start` to `end` (anchor points on the node
    /// boundaries), steering around every obstacle except the edge's own
    /// `source` and `target`. All obstacles share the `footprint` extent.
    ///
    /// Curvature options are tried in configured order and the first one
    /// whose sampled interior stays outside every obstacle rectangle is
    /// returned immediately. When none qualifies the unconditional detour is
    /// returned instead; it is not collision-checked.
    #[allow(clippy::too_many_arguments)]
    pub fn route(
        &self,
        start: Vec2,
        end: Vec2,
        source_side: ConnectionSide,
        target_side: ConnectionSide,
        obstacles: &[Obstacle],
        footprint: Vec2,
        source: NodeIndex,
        target: NodeIndex,
    ) -> RoutedCurve {
        let control_offset = self.control_offset(start, end);

        for &trial in &self.config.curvature_trials {
            let reach = control_offset * trial;
            let curve = CubicBezier {
                start,
                control1: Vec2::new(start.x + source_side.dir_x() * reach, start.y),
                control2: Vec2::new(end.x + target_side.dir_x() * reach, end.y),
                end,
            };
            if !self.collides(&curve, obstacles, footprint, source, target) {
                return RoutedCurve {
                    curve,
                    detour: false,
                };
            }
        }

        RoutedCurve {
            curve: self.detour_curve(start, end, source_side, target_side, footprint),
            detour: true,
        }
    }

    /// Base control offset: half the horizontal anchor distance, clamped to
    /// the configured band. The floor keeps zero-distance anchors from
    /// collapsing the curve onto itself.
    fn control_offset(&self, start: Vec2, end: Vec2) -> f32 {
        let dx = (end.x - start.x).abs();
        (dx * 0.5).clamp(self.config.min_control_offset, self.config.max_control_offset)
    }

    /// Sample the curve interior and test each point against every obstacle
    /// footprint, skipping the edge's own endpoints.
    fn collides(
        &self,
        curve: &CubicBezier,
        obstacles: &[Obstacle],
        footprint: Vec2,
        source: NodeIndex,
        target: NodeIndex,
    ) -> bool {
        let samples = self.config.collision_samples.max(1);
        for i in 1..=samples {
            let t = i as f32 / (samples + 1) as f32;
            let point = curve.sample(t);
            for obstacle in obstacles {
                if obstacle.node == source || obstacle.node == target {
                    continue;
                }
                let rect = Rect::from_center_size(obstacle.center, footprint);
                if rect.contains(point) {
                    return true;
                }
            }
        }
        false
    }

    /// Escape-hatch route: lift the midpoint by `detour_rise` node heights
    /// away from the congested side (opposite the vertical travel direction;
    /// level edges route upward) and pin both control points to that height,
    /// one node width out from each anchor.
    fn detour_curve(
        &self,
        start: Vec2,
        end: Vec2,
        source_side: ConnectionSide,
        target_side: ConnectionSide,
        footprint: Vec2,
    ) -> CubicBezier {
        let rise_sign = if end.y - start.y >= 0.0 { -1.0 } else { 1.0 };
        let mid_y = (start.y + end.y) * 0.5 + rise_sign * self.config.detour_rise * footprint.y;

        CubicBezier {
            start,
            control1: Vec2::new(start.x + source_side.dir_x() * footprint.x, mid_y),
            control2: Vec2::new(end.x + target_side.dir_x() * footprint.x, mid_y),
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FOOTPRINT: Vec2 = Vec2 { x: 200.0, y: 100.0 };

    fn obstacles(centers: &[(f32, f32)]) -> Vec<Obstacle> {
        centers
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Obstacle {
                node: NodeIndex(i),
                center: Vec2::new(x, y),
            })
            .collect()
    }

    #[test]
    fn sides_follow_relative_horizontal_order() {
        let (s, t) = connection_sides(Vec2::new(0.0, 0.0), Vec2::new(400.0, 0.0));
        assert_eq!((s, t), (ConnectionSide::Right, ConnectionSide::Left));

        let (s, t) = connection_sides(Vec2::new(400.0, 0.0), Vec2::new(0.0, 0.0));
        assert_eq!((s, t), (ConnectionSide::Left, ConnectionSide::Right));

        // Equal x counts as "not left of".
        let (s, t) = connection_sides(Vec2::new(5.0, 0.0), Vec2::new(5.0, 90.0));
        assert_eq!((s, t), (ConnectionSide::Left, ConnectionSide::Right));
    }

    #[test]
    fn anchor_sits_on_side_midpoint() {
        let anchor = anchor_point(Vec2::new(100.0, 50.0), ConnectionSide::Right, FOOTPRINT);
        assert_eq!(anchor, Vec2::new(200.0, 50.0));
        let anchor = anchor_point(Vec2::new(100.0, 50.0), ConnectionSide::Left, FOOTPRINT);
        assert_eq!(anchor, Vec2::new(0.0, 50.0));
    }

    #[test]
    fn unobstructed_route_accepts_first_curvature() {
        let router = CurveRouter::default();
        let start = Vec2::new(100.0, 0.0);
        let end = Vec2::new(300.0, 0.0);

        let routed = router.route(
            start,
            end,
            ConnectionSide::Right,
            ConnectionSide::Left,
            &[],
            FOOTPRINT,
            NodeIndex(0),
            NodeIndex(1),
        );

        assert!(!routed.detour);
        // First trial is 0.3 of the clamped offset (|dx| * 0.5 = 100 clamps
        // up to the 120 floor).
        assert_eq!(routed.curve.control1, Vec2::new(100.0 + 36.0, 0.0));
        assert_eq!(routed.curve.control2, Vec2::new(300.0 - 36.0, 0.0));
    }

    #[test]
    fn route_is_deterministic() {
        let router = CurveRouter::default();
        let obstacles = obstacles(&[(200.0, 0.0), (200.0, 140.0)]);
        let run = || {
            router.route(
                Vec2::new(100.0, 0.0),
                Vec2::new(300.0, 0.0),
                ConnectionSide::Right,
                ConnectionSide::Left,
                &obstacles,
                FOOTPRINT,
                NodeIndex(10),
                NodeIndex(11),
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn obstructing_node_between_endpoints_is_avoided() {
        // A at (0,0), B at (400,0), C directly between them at (200,0).
        let router = CurveRouter::default();
        let all = obstacles(&[(0.0, 0.0), (400.0, 0.0), (200.0, 0.0)]);
        let start = anchor_point(Vec2::new(0.0, 0.0), ConnectionSide::Right, FOOTPRINT);
        let end = anchor_point(Vec2::new(400.0, 0.0), ConnectionSide::Left, FOOTPRINT);

        let routed = router.route(
            start,
            end,
            ConnectionSide::Right,
            ConnectionSide::Left,
            &all,
            FOOTPRINT,
            NodeIndex(0),
            NodeIndex(1),
        );

        // The flat first candidate would run straight through C.
        let flat = CubicBezier {
            start,
            control1: Vec2::new(start.x + 36.0, start.y),
            control2: Vec2::new(end.x - 36.0, end.y),
            end,
        };
        let c_rect = Rect::from_center_size(Vec2::new(200.0, 0.0), FOOTPRINT);
        assert!((1..=18).any(|i| c_rect.contains(flat.sample(i as f32 / 19.0))));
        assert_ne!(routed.curve, flat);

        // Whatever was returned keeps its sampled interior out of C.
        if !routed.detour {
            for i in 1..=18 {
                let p = routed.curve.sample(i as f32 / 19.0);
                assert!(!c_rect.contains(p), "sample {i} landed inside the obstacle");
            }
        }
    }

    #[test]
    fn own_endpoints_are_never_obstacles() {
        let router = CurveRouter::default();
        // Only the edge's own nodes are present; any curve grazing them is
        // still accepted on the first trial.
        let all = obstacles(&[(0.0, 0.0), (150.0, 0.0)]);
        let routed = router.route(
            anchor_point(Vec2::new(0.0, 0.0), ConnectionSide::Right, FOOTPRINT),
            anchor_point(Vec2::new(150.0, 0.0), ConnectionSide::Left, FOOTPRINT),
            ConnectionSide::Right,
            ConnectionSide::Left,
            &all,
            FOOTPRINT,
            NodeIndex(0),
            NodeIndex(1),
        );
        assert!(!routed.detour);
    }

    #[test]
    fn identical_anchors_stay_finite() {
        let router = CurveRouter::default();
        let p = Vec2::new(42.0, 17.0);
        let routed = router.route(
            p,
            p,
            ConnectionSide::Right,
            ConnectionSide::Left,
            &[],
            FOOTPRINT,
            NodeIndex(0),
            NodeIndex(0),
        );
        assert!(routed.curve.control1.is_finite());
        assert!(routed.curve.control2.is_finite());
        // The offset floor keeps the control points apart from the anchors.
        assert!((routed.curve.control1.x - p.x).abs() >= 0.3 * 120.0 - 1e-3);
    }

    #[test]
    fn detour_rises_opposite_vertical_travel() {
        let router = CurveRouter::default();
        // Wall of obstacles dense enough that no curvature trial passes.
        let wall: Vec<(f32, f32)> = (0..24)
            .map(|i| (i as f32 * 60.0 - 400.0, (i % 12) as f32 * 40.0 - 220.0))
            .collect();
        let all = obstacles(&wall);

        let start = Vec2::new(-300.0, -100.0);
        let end = Vec2::new(300.0, 100.0);
        let routed = router.route(
            start,
            end,
            ConnectionSide::Right,
            ConnectionSide::Left,
            &all,
            FOOTPRINT,
            NodeIndex(100),
            NodeIndex(101),
        );

        assert!(routed.detour);
        // Downward travel routes the detour upward.
        let expected_mid_y = 0.0 - 1.5 * FOOTPRINT.y;
        assert_eq!(routed.curve.control1.y, expected_mid_y);
        assert_eq!(routed.curve.control2.y, expected_mid_y);
        assert_eq!(routed.curve.control1.x, start.x + FOOTPRINT.x);
        assert_eq!(routed.curve.control2.x, end.x - FOOTPRINT.x);
    }

    proptest! {
        /// Any non-detour route keeps all 18 interior samples outside every
        /// obstacle footprint.
        #[test]
        fn prop_accepted_curves_are_collision_free(
            start_x in -500.0f32..500.0,
            start_y in -300.0f32..300.0,
            end_x in -500.0f32..500.0,
            end_y in -300.0f32..300.0,
            centers in proptest::collection::vec((-600.0f32..600.0, -400.0f32..400.0), 0..12),
        ) {
            let router = CurveRouter::default();
            let start = Vec2::new(start_x, start_y);
            let end = Vec2::new(end_x, end_y);
            let (source_side, target_side) = connection_sides(start, end);
            let all = obstacles(&centers);

            // Endpoint indices outside the obstacle id range, so every
            // listed obstacle counts.
            let routed = router.route(
                start, end, source_side, target_side,
                &all, FOOTPRINT, NodeIndex(9000), NodeIndex(9001),
            );

            if !routed.detour {
                for i in 1..=18 {
                    let p = routed.curve.sample(i as f32 / 19.0);
                    for obstacle in &all {
                        let rect = Rect::from_center_size(obstacle.center, FOOTPRINT);
                        prop_assert!(!rect.contains(p),
                            "sample {} inside obstacle {}", i, obstacle.node);
                    }
                }
            }
        }

        /// The router always produces finite geometry, detour or not.
        #[test]
        fn prop_router_output_is_finite(
            start_x in -1000.0f32..1000.0,
            end_x in -1000.0f32..1000.0,
            dy in -500.0f32..500.0,
            centers in proptest::collection::vec((-900.0f32..900.0, -500.0f32..500.0), 0..20),
        ) {
            let router = CurveRouter::default();
            let start = Vec2::new(start_x, 0.0);
            let end = Vec2::new(end_x, dy);
            let (source_side, target_side) = connection_sides(start, end);
            let all = obstacles(&centers);

            let routed = router.route(
                start, end, source_side, target_side,
                &all, FOOTPRINT, NodeIndex(9000), NodeIndex(9001),
            );

            prop_assert!(routed.curve.start.is_finite());
            prop_assert!(routed.curve.control1.is_finite());
            prop_assert!(routed.curve.control2.is_finite());
            prop_assert!(routed.curve.end.is_finite());
        }
    }
}
