use crate::geometry::{Rect, Vec2};
use crate::model::{GraphModel, NodeIndex};
use grantmap_core::{LayoutStrategy, RankDirection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub strategy: LayoutStrategy,
    pub direction: RankDirection,
    /// Fixed footprint every node is laid out (and collision-tested) with.
    pub footprint: Vec2,
    /// Gap between neighboring nodes within one rank.
    pub node_separation: f32,
    /// Gap between consecutive ranks.
    pub rank_separation: f32,
    /// Extra padding applied around the content bounding box.
    pub margin: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            strategy: LayoutStrategy::default(),
            direction: RankDirection::default(),
            footprint: Vec2::new(200.0, 100.0),
            node_separation: 60.0,
            rank_separation: 160.0,
            margin: 40.0,
        }
    }
}

/// Assigns a center position to every node of a model. The engine treats the
/// implementation as opaque; nodes missing from the result default to the
/// origin.
pub trait Layouter {
    fn execute(&self, model: &GraphModel) -> HashMap<NodeIndex, Vec2>;
}

/// Pick the layouter for the configured strategy.
pub fn layouter_for(options: &LayoutOptions) -> Box<dyn Layouter> {
    match options.strategy {
        LayoutStrategy::Hierarchical => Box::new(HierarchicalLayouter {
            direction: options.direction,
            footprint: options.footprint,
            node_separation: options.node_separation,
            rank_separation: options.rank_separation,
        }),
        LayoutStrategy::GridScatter => Box::new(GridScatterLayouter {
            footprint: options.footprint,
            separation: options.node_separation,
        }),
    }
}

/// Rank-based hierarchical layouter: iterative longest-path ranking with
/// compression, two barycenter ordering sweeps, then centered placement of
/// each rank along the configured direction axis.
pub struct HierarchicalLayouter {
    pub direction: RankDirection,
    pub footprint: Vec2,
    pub node_separation: f32,
    pub rank_separation: f32,
}

impl HierarchicalLayouter {
    /// Upper bound on ranking relaxation rounds; cycles never converge.
    const MAX_RANKING_ITERATIONS: usize = 1000;

    fn assign_ranks(&self, model: &GraphModel) -> HashMap<NodeIndex, i32> {
        let mut ranks: HashMap<NodeIndex, i32> =
            model.node_indices().map(|idx| (idx, 0)).collect();

        let max_iterations = (model.node_count() + 2).min(Self::MAX_RANKING_ITERATIONS);
        let mut converged = false;
        for _ in 0..max_iterations {
            let mut changed = false;
            for edge in model.edges() {
                let source_rank = ranks[&edge.source_idx];
                let target_rank = ranks[&edge.target_idx];
                if target_rank <= source_rank {
                    ranks.insert(edge.target_idx, source_rank + 1);
                    changed = true;
                }
            }
            if !changed {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(
                "Rank assignment did not converge after {} iterations (cyclic graph)",
                max_iterations
            );
        }

        Self::compress_ranks(&mut ranks);
        ranks
    }

    fn compress_ranks(ranks: &mut HashMap<NodeIndex, i32>) {
        if ranks.is_empty() {
            return;
        }

        let mut unique_ranks: Vec<i32> = ranks.values().copied().collect();
        unique_ranks.sort_unstable();
        unique_ranks.dedup();

        let remap: HashMap<i32, i32> = unique_ranks
            .iter()
            .enumerate()
            .map(|(i, &rank)| (rank, i as i32))
            .collect();

        for rank in ranks.values_mut() {
            if let Some(new_rank) = remap.get(rank) {
                *rank = *new_rank;
            }
        }
    }

    fn build_layers(
        model: &GraphModel,
        ranks: &HashMap<NodeIndex, i32>,
    ) -> HashMap<i32, Vec<NodeIndex>> {
        let mut layers: HashMap<i32, Vec<NodeIndex>> = HashMap::new();
        for (&node, &rank) in ranks {
            layers.entry(rank).or_default().push(node);
        }

        for nodes in layers.values_mut() {
            nodes.sort_by(|a, b| {
                (&model[*a].name, &model[*a].id).cmp(&(&model[*b].name, &model[*b].id))
            });
        }

        layers
    }

    fn sorted_ranks(layers: &HashMap<i32, Vec<NodeIndex>>) -> Vec<i32> {
        let mut sorted: Vec<_> = layers.keys().copied().collect();
        sorted.sort_unstable();
        sorted
    }

    fn order_layer_by_barycenter(
        layer_nodes: &mut [NodeIndex],
        layer_coords: &HashMap<NodeIndex, f32>,
        neighbors: &HashMap<NodeIndex, Vec<NodeIndex>>,
    ) {
        let mut barycenters: HashMap<NodeIndex, f32> = HashMap::new();

        for &node_idx in layer_nodes.iter() {
            let mut sum = 0.0;
            let mut count = 0;
            if let Some(adjacent) = neighbors.get(&node_idx) {
                for neighbor in adjacent {
                    if let Some(&coord) = layer_coords.get(neighbor) {
                        sum += coord;
                        count += 1;
                    }
                }
            }

            let barycenter = if count > 0 {
                sum / count as f32
            } else {
                *layer_coords.get(&node_idx).unwrap_or(&0.0)
            };
            barycenters.insert(node_idx, barycenter);
        }

        layer_nodes.sort_by(|a, b| {
            barycenters
                .get(a)
                .unwrap_or(&0.0)
                .partial_cmp(barycenters.get(b).unwrap_or(&0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(b))
        });
    }

    fn run_barycenter_passes(
        &self,
        model: &GraphModel,
        layers: &mut HashMap<i32, Vec<NodeIndex>>,
        sorted_ranks: &[i32],
    ) {
        let mut incoming: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
        let mut outgoing: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
        for edge in model.edges() {
            incoming.entry(edge.target_idx).or_default().push(edge.source_idx);
            outgoing.entry(edge.source_idx).or_default().push(edge.target_idx);
        }

        let cross_step = self.cross_extent() + self.node_separation;
        let mut layer_coords: HashMap<NodeIndex, f32> = HashMap::new();
        for rank in sorted_ranks {
            if let Some(layer_nodes) = layers.get(rank) {
                for (j, &node_idx) in layer_nodes.iter().enumerate() {
                    layer_coords.insert(node_idx, j as f32 * cross_step);
                }
            }
        }

        for _ in 0..2 {
            for &rank in sorted_ranks.iter().skip(1) {
                if let Some(layer_nodes) = layers.get_mut(&rank) {
                    Self::order_layer_by_barycenter(layer_nodes, &layer_coords, &incoming);
                    for (j, &node_idx) in layer_nodes.iter().enumerate() {
                        layer_coords.insert(node_idx, j as f32 * cross_step);
                    }
                }
            }

            for i in (0..sorted_ranks.len().saturating_sub(1)).rev() {
                let rank = sorted_ranks[i];
                if let Some(layer_nodes) = layers.get_mut(&rank) {
                    Self::order_layer_by_barycenter(layer_nodes, &layer_coords, &outgoing);
                    for (j, &node_idx) in layer_nodes.iter().enumerate() {
                        layer_coords.insert(node_idx, j as f32 * cross_step);
                    }
                }
            }
        }
    }

    /// Node extent across the rank axis (the axis nodes line up on within a
    /// rank).
    fn cross_extent(&self) -> f32 {
        if self.direction.is_horizontal() {
            self.footprint.y
        } else {
            self.footprint.x
        }
    }

    fn rank_extent(&self) -> f32 {
        if self.direction.is_horizontal() {
            self.footprint.x
        } else {
            self.footprint.y
        }
    }
}

impl Layouter for HierarchicalLayouter {
    fn execute(&self, model: &GraphModel) -> HashMap<NodeIndex, Vec2> {
        let mut positions = HashMap::new();
        if model.node_count() == 0 {
            return positions;
        }

        let ranks = self.assign_ranks(model);
        let mut layers = Self::build_layers(model, &ranks);
        let sorted_ranks = Self::sorted_ranks(&layers);
        self.run_barycenter_passes(model, &mut layers, &sorted_ranks);

        let cross_step = self.cross_extent() + self.node_separation;
        let rank_step = self.rank_extent() + self.rank_separation;
        let rank_sign = self.direction.rank_sign();

        for &rank in &sorted_ranks {
            let Some(layer_nodes) = layers.get(&rank) else {
                continue;
            };
            let extent = layer_nodes.len() as f32 * cross_step - self.node_separation;
            let mut cross = -extent * 0.5 + self.cross_extent() * 0.5;
            let rank_pos = rank_sign * rank as f32 * rank_step;

            for &node_idx in layer_nodes {
                let pos = if self.direction.is_horizontal() {
                    Vec2::new(rank_pos, cross)
                } else {
                    Vec2::new(cross, rank_pos)
                };
                positions.insert(node_idx, pos);
                cross += cross_step;
            }
        }

        positions
    }
}

/// Grid layouter with per-node jitter. Nodes are pre-spaced on a near-square
/// grid, so no collision avoidance applies; jitter keeps the scatter from
/// looking machine-stamped and stays well under half a cell.
pub struct GridScatterLayouter {
    pub footprint: Vec2,
    pub separation: f32,
}

impl Layouter for GridScatterLayouter {
    fn execute(&self, model: &GraphModel) -> HashMap<NodeIndex, Vec2> {
        let count = model.node_count();
        let mut positions = HashMap::new();
        if count == 0 {
            return positions;
        }

        let columns = (count as f32).sqrt().ceil() as usize;
        let cell = Vec2::new(
            self.footprint.x + self.separation,
            self.footprint.y + self.separation,
        );
        let jitter_amplitude = self.separation * 0.4;

        for (i, node_idx) in model.node_indices().enumerate() {
            let col = i % columns;
            let row = i / columns;
            let jitter = jitter_offset(model[node_idx].id.as_str(), jitter_amplitude);
            positions.insert(
                node_idx,
                Vec2::new(
                    col as f32 * cell.x + jitter.x,
                    row as f32 * cell.y + jitter.y,
                ),
            );
        }

        positions
    }
}

/// Deterministic per-node jitter derived from an FNV-1a hash of the id, in
/// (-amplitude, amplitude) on each axis.
fn jitter_offset(id: &str, amplitude: f32) -> Vec2 {
    let h = fnv1a(id.as_bytes());
    let unit_x = ((h & 0xffff) as f32 / 65535.0) * 2.0 - 1.0;
    let unit_y = (((h >> 16) & 0xffff) as f32 / 65535.0) * 2.0 - 1.0;
    Vec2::new(unit_x * amplitude, unit_y * amplitude)
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Axis-aligned bounding box over all positioned nodes, each expanded by its
/// half footprint, padded by the configured margin. `None` for an empty model.
pub fn content_bounds(model: &GraphModel, options: &LayoutOptions) -> Option<Rect> {
    let mut bounds: Option<Rect> = None;
    for node in model.nodes() {
        let rect = Rect::from_center_size(node.pos, options.footprint);
        bounds = Some(match bounds {
            Some(acc) => acc.union(&rect),
            None => rect,
        });
    }
    bounds.map(|b| b.expand(options.margin))
}
