//! Positioned graph.
//!
//! Built from the extractor's descriptors: nodes are laid out on a grid, call
//! edges are resolved by name against the nodes, classes become groups, and
//! the force-directed layout refines the node positions.
//!
//! A `Graph` is a value. Edits never mutate a graph in place; each edit
//! returns a new snapshot with a bumped `version`, and the edge resolution
//! invariant is re-checked on every snapshot.

use std::collections::HashMap;

use super::descriptor::{
    CallEdgeDescriptor, Extraction, FunctionDescriptor, GroupChild, GroupDescriptor,
};
use super::layout::{apply_force_directed_layout, LayoutParams, LayoutReport};
use crate::error::GraphError;

pub const NODE_WIDTH: f64 = 140.0;
pub const NODE_HEIGHT: f64 = 70.0;
pub const GROUP_WIDTH: f64 = 200.0;
pub const GROUP_HEIGHT: f64 = 100.0;

const GRID_COLUMNS: usize = 10;
const GRID_MARGIN: f64 = 50.0;
const GROUP_DIAGONAL_STEP: f64 = 200.0;

/// Handle to a node inside a `Graph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub info: FunctionDescriptor,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PositionedNode {
    pub fn new(info: FunctionDescriptor, x: f64, y: f64) -> Self {
        Self {
            info,
            x,
            y,
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionedEdge {
    pub src: NodeId,
    pub dst: NodeId,
}

impl PositionedEdge {
    pub fn new(src: NodeId, dst: NodeId) -> Self {
        Self { src, dst }
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.src == id || self.dst == id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedGroup {
    pub info: GroupDescriptor,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rendering state only.
    pub expanded: bool,
    /// Edges with at least one endpoint among the group's children.
    pub connections: Vec<PositionedEdge>,
}

impl PositionedGroup {
    pub fn new(info: GroupDescriptor, x: f64, y: f64) -> Self {
        Self {
            info,
            x,
            y,
            width: GROUP_WIDTH,
            height: GROUP_HEIGHT,
            expanded: false,
            connections: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<PositionedNode>,
    node_index: HashMap<String, NodeId>,
    edges: Vec<PositionedEdge>,
    groups: Vec<PositionedGroup>,
    group_index: HashMap<String, usize>,
    version: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and lay out a graph from one file's descriptors.
    pub fn build(extraction: &Extraction, params: &LayoutParams) -> Self {
        Self::build_from_parts(
            &extraction.functions,
            &extraction.edges,
            &extraction.groups,
            params,
        )
    }

    pub fn build_from_parts(
        functions: &[FunctionDescriptor],
        edges: &[CallEdgeDescriptor],
        groups: &[GroupDescriptor],
        params: &LayoutParams,
    ) -> Self {
        if functions.is_empty() {
            log::warn!("No nodes provided to build the graph");
        }
        if edges.is_empty() {
            log::warn!("No edges provided to build the graph");
        }
        if groups.is_empty() {
            log::warn!("No groups provided to build the graph");
        }

        let mut graph = Graph::new();
        graph.place_nodes(functions, params);
        graph.resolve_edges(edges);
        graph.place_groups(groups);
        graph.recompute_connections();
        let report = graph.layout(params);

        log::info!(
            "Built graph: {} nodes, {} edges ({} unresolved), {} groups, {} layout iterations",
            graph.nodes.len(),
            graph.edges.len(),
            edges.len() - graph.edges.len(),
            graph.groups.len(),
            report.iterations
        );
        graph
    }

    fn place_nodes(&mut self, functions: &[FunctionDescriptor], params: &LayoutParams) {
        let cell_w = (params.canvas_width / GRID_COLUMNS as f64).floor();
        let cell_h = (params.canvas_height / GRID_COLUMNS as f64).floor();

        for (idx, info) in functions.iter().enumerate() {
            let x = (idx % GRID_COLUMNS) as f64 * cell_w + GRID_MARGIN;
            let y = (idx / GRID_COLUMNS) as f64 * cell_h + GRID_MARGIN;
            let node = PositionedNode::new(info.clone(), x, y);

            // A repeated name replaces the earlier node but keeps its slot.
            match self.node_index.get(&info.name) {
                Some(&id) => self.nodes[id.index()] = node,
                None => {
                    self.node_index
                        .insert(info.name.clone(), NodeId::new(self.nodes.len()));
                    self.nodes.push(node);
                }
            }
        }
    }

    fn resolve_edges(&mut self, edges: &[CallEdgeDescriptor]) {
        for edge in edges {
            let src = self.node_index.get(&edge.caller);
            let dst = self.node_index.get(&edge.callee);
            if let (Some(&src), Some(&dst)) = (src, dst) {
                self.edges.push(PositionedEdge::new(src, dst));
            }
        }
    }

    fn place_groups(&mut self, groups: &[GroupDescriptor]) {
        for (idx, info) in groups.iter().enumerate() {
            let offset = idx as f64 * GROUP_DIAGONAL_STEP;
            let group = PositionedGroup::new(info.clone(), offset, offset);
            match self.group_index.get(&info.name) {
                Some(&slot) => self.groups[slot] = group,
                None => {
                    self.group_index.insert(info.name.clone(), self.groups.len());
                    self.groups.push(group);
                }
            }
        }
    }

    fn recompute_connections(&mut self) {
        let nodes = &self.nodes;
        let edges = &self.edges;
        for group in &mut self.groups {
            group.connections = edges
                .iter()
                .filter(|e| {
                    group.info.contains(nodes[e.src.index()].name())
                        || group.info.contains(nodes[e.dst.index()].name())
                })
                .copied()
                .collect();
        }
    }

    /// Re-run the force-directed layout on the current positions.
    pub fn layout(&mut self, params: &LayoutParams) -> LayoutReport {
        apply_force_directed_layout(&mut self.nodes, &self.edges, params)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.groups.is_empty()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &PositionedNode> {
        self.nodes.iter()
    }

    pub fn node(&self, name: &str) -> Option<&PositionedNode> {
        self.node_id(name).map(|id| &self.nodes[id.index()])
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).copied()
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&PositionedNode> {
        self.nodes.get(id.index())
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    pub fn edges(&self) -> &[PositionedEdge] {
        &self.edges
    }

    /// Both endpoints of an edge. `None` only if the edge belongs to another graph.
    pub fn endpoints(&self, edge: &PositionedEdge) -> Option<(&PositionedNode, &PositionedNode)> {
        Some((self.node_by_id(edge.src)?, self.node_by_id(edge.dst)?))
    }

    /// Endpoint names of every edge, in edge order.
    pub fn edge_names(&self) -> Vec<(&str, &str)> {
        self.edges
            .iter()
            .filter_map(|e| self.endpoints(e))
            .map(|(s, d)| (s.name(), d.name()))
            .collect()
    }

    pub fn groups(&self) -> impl Iterator<Item = &PositionedGroup> {
        self.groups.iter()
    }

    pub fn group(&self, name: &str) -> Option<&PositionedGroup> {
        self.group_index.get(name).map(|&i| &self.groups[i])
    }

    /// Check the structural invariants: every edge endpoint is a node, and
    /// the name indexes agree with the stored records.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (index, edge) in self.edges.iter().enumerate() {
            if edge.src.index() >= self.nodes.len() || edge.dst.index() >= self.nodes.len() {
                return Err(GraphError::DanglingEdge { index });
            }
        }
        for (name, id) in &self.node_index {
            match self.nodes.get(id.index()) {
                Some(node) if node.name() == name => {}
                _ => return Err(GraphError::UnknownNode(name.clone())),
            }
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if self.node_index.get(node.name()) != Some(&NodeId::new(i)) {
                return Err(GraphError::DuplicateNode(node.name().to_string()));
            }
        }
        for (name, &slot) in &self.group_index {
            match self.groups.get(slot) {
                Some(group) if group.name() == name => {}
                _ => return Err(GraphError::UnknownGroup(name.clone())),
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Snapshot edits
    // ---------------------------------------------------------------------

    fn next_snapshot<F>(&self, edit: F) -> Result<Graph, GraphError>
    where
        F: FnOnce(&mut Graph) -> Result<(), GraphError>,
    {
        let mut next = self.clone();
        edit(&mut next)?;
        next.version = self.version + 1;
        next.recompute_connections();
        next.validate()?;
        Ok(next)
    }

    fn require_node(&self, name: &str) -> Result<NodeId, GraphError> {
        self.node_id(name)
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
    }

    /// Add a call edge between two existing nodes.
    pub fn with_edge(&self, src: &str, dst: &str) -> Result<Graph, GraphError> {
        let src = self.require_node(src)?;
        let dst = self.require_node(dst)?;
        self.next_snapshot(|g| {
            g.edges.push(PositionedEdge::new(src, dst));
            Ok(())
        })
    }

    pub fn without_edge(&self, index: usize) -> Result<Graph, GraphError> {
        let len = self.edges.len();
        if index >= len {
            return Err(GraphError::EdgeOutOfRange { index, len });
        }
        self.next_snapshot(|g| {
            g.edges.remove(index);
            Ok(())
        })
    }

    /// Remove every edge that starts or ends at `name`.
    pub fn without_edges_touching(&self, name: &str) -> Result<Graph, GraphError> {
        let id = self.require_node(name)?;
        self.next_snapshot(|g| {
            g.edges.retain(|e| !e.touches(id));
            Ok(())
        })
    }

    /// Replace a node's inputs and outputs.
    pub fn with_node_info(
        &self,
        name: &str,
        inputs: Vec<String>,
        outputs: Vec<String>,
    ) -> Result<Graph, GraphError> {
        let id = self.require_node(name)?;
        self.next_snapshot(|g| {
            let info = &mut g.nodes[id.index()].info;
            info.inputs = inputs;
            info.outputs = outputs;
            let updated = info.clone();
            for group in &mut g.groups {
                for child in &mut group.info.children {
                    if let GroupChild::Resolved(f) = child {
                        if f.name == updated.name {
                            *f = updated.clone();
                        }
                    }
                }
            }
            Ok(())
        })
    }

    /// Rename a node. Edges keep pointing at the same node; group children
    /// with the old name follow the rename.
    pub fn with_renamed_node(&self, old: &str, new: &str) -> Result<Graph, GraphError> {
        let id = self.require_node(old)?;
        if old == new {
            return self.next_snapshot(|_| Ok(()));
        }
        if self.contains_node(new) {
            return Err(GraphError::DuplicateNode(new.to_string()));
        }
        self.next_snapshot(|g| {
            g.node_index.remove(old);
            g.node_index.insert(new.to_string(), id);
            g.nodes[id.index()].info.name = new.to_string();
            for group in &mut g.groups {
                for child in &mut group.info.children {
                    if child.name() == old {
                        child.rename(new);
                    }
                }
            }
            Ok(())
        })
    }

    /// Move a node, e.g. after a drag.
    pub fn with_node_moved(&self, name: &str, x: f64, y: f64) -> Result<Graph, GraphError> {
        let id = self.require_node(name)?;
        self.next_snapshot(|g| {
            let node = &mut g.nodes[id.index()];
            node.x = x;
            node.y = y;
            Ok(())
        })
    }

    pub fn with_group_toggled(&self, name: &str) -> Result<Graph, GraphError> {
        let slot = *self
            .group_index
            .get(name)
            .ok_or_else(|| GraphError::UnknownGroup(name.to_string()))?;
        self.next_snapshot(|g| {
            let group = &mut g.groups[slot];
            group.expanded = !group.expanded;
            Ok(())
        })
    }
}
