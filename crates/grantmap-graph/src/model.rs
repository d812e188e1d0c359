use crate::geometry::Vec2;
use grantmap_core::{AccessKind, GraphData, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeIndex(pub usize);

impl fmt::Display for EdgeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node with a live on-screen position. `pos` is the node center; it is
/// `(0, 0)` until a layout pass assigns it and is overwritten in place while
/// the node is dragged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub group: i32,
    pub enabled: bool,
    pub pos: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub access: AccessKind,
    pub source_idx: NodeIndex,
    pub target_idx: NodeIndex,
}

/// The owned, indexable store of live node positions and resolved edges.
///
/// Nodes and edges live in flat vectors addressed by `NodeIndex`/`EdgeIndex`;
/// `node_map` resolves wire ids. There is exactly one writer at a time: a
/// layout pass replaces every position, a drag tick overwrites one.
#[derive(Debug, Default)]
pub struct GraphModel {
    nodes: Vec<DiagramNode>,
    edges: Vec<DiagramEdge>,
    pub node_map: HashMap<NodeId, NodeIndex>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the model from a wire payload. Edges that reference a node id
    /// absent from the node set are dropped here, so downstream passes never
    /// see a dangling reference.
    pub fn from_data(data: &GraphData) -> Self {
        let mut model = Self::new();
        for node in &data.nodes {
            model.add_node(node.id.clone(), &node.name, node.kind, node.group, node.enabled);
        }
        for edge in &data.edges {
            model.add_edge(edge.source.clone(), edge.target.clone(), edge.access);
        }
        model
    }

    pub fn add_node(
        &mut self,
        id: NodeId,
        name: &str,
        kind: NodeKind,
        group: i32,
        enabled: Option<bool>,
    ) -> NodeIndex {
        if let Some(&existing) = self.node_map.get(&id) {
            tracing::warn!("Duplicate node id {id}, keeping the first occurrence");
            return existing;
        }
        let idx = NodeIndex(self.nodes.len());
        self.nodes.push(DiagramNode {
            id: id.clone(),
            name: name.to_string(),
            kind,
            group,
            enabled: enabled.unwrap_or(true),
            pos: Vec2::ZERO,
        });
        self.node_map.insert(id, idx);
        idx
    }

    pub fn add_edge(&mut self, source: NodeId, target: NodeId, access: AccessKind) {
        match (self.node_map.get(&source), self.node_map.get(&target)) {
            (Some(&source_idx), Some(&target_idx)) => {
                self.edges.push(DiagramEdge {
                    source,
                    target,
                    access,
                    source_idx,
                    target_idx,
                });
            }
            _ => {
                if !self.node_map.contains_key(&source) {
                    tracing::warn!("Dropping edge {source} -> {target}: source node is missing");
                } else {
                    tracing::warn!("Dropping edge {source} -> {target}: target node is missing");
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        (0..self.nodes.len()).map(NodeIndex)
    }

    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> {
        (0..self.edges.len()).map(EdgeIndex)
    }

    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[DiagramEdge] {
        &self.edges
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&DiagramNode> {
        self.node_map.get(id).map(|&idx| &self.nodes[idx.0])
    }

    pub fn index_of(&self, id: &NodeId) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Indices of all edges whose source or target is `node` - the set a
    /// drag tick has to re-route.
    pub fn edges_touching(&self, node: NodeIndex) -> Vec<EdgeIndex> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.source_idx == node || e.target_idx == node)
            .map(|(i, _)| EdgeIndex(i))
            .collect()
    }

    /// Nodes directly connected to `node` in either direction.
    pub fn neighbors_of(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        for edge in &self.edges {
            if edge.source_idx == node && !out.contains(&edge.target_idx) {
                out.push(edge.target_idx);
            } else if edge.target_idx == node && !out.contains(&edge.source_idx) {
                out.push(edge.source_idx);
            }
        }
        out
    }
}

impl Index<NodeIndex> for GraphModel {
    type Output = DiagramNode;
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}

impl IndexMut<NodeIndex> for GraphModel {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[index.0]
    }
}

impl Index<EdgeIndex> for GraphModel {
    type Output = DiagramEdge;
    fn index(&self, index: EdgeIndex) -> &Self::Output {
        &self.edges[index.0]
    }
}
