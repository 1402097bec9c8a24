//! Force-directed layout.
//!
//! Refines grid-initialised node positions by simulating repulsion between
//! every pair of nodes and spring attraction along edges. The number of
//! iterations is fixed up front (`min(max_iterations, node_count)`), so the
//! cost is bounded at O(iterations × n²) and there is no convergence check.
//! The simulation is deterministic: identical input positions and edges give
//! identical output positions.

use serde::{Deserialize, Serialize};

use super::graph::{PositionedEdge, PositionedNode};

/// Tunables for the layout pass. Defaults match the 4000×4000 canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Upper bound on iterations; the actual count is `min(max_iterations, n)`.
    pub max_iterations: usize,
    /// Scale applied to every force before it moves a node.
    pub damping: f64,
    /// Substituted for a zero distance between two nodes.
    pub min_distance: f64,
    /// Offset added to both coordinates of a node that overlaps another.
    pub overlap_nudge: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            canvas_width: 4000.0,
            canvas_height: 4000.0,
            max_iterations: 50,
            damping: 0.1,
            min_distance: 0.01,
            overlap_nudge: 10.0,
        }
    }
}

impl LayoutParams {
    /// Ideal edge length `k = sqrt(area / n)`.
    pub fn optimal_distance(&self, node_count: usize) -> f64 {
        ((self.canvas_width * self.canvas_height) / node_count.max(1) as f64).sqrt()
    }

    pub fn iterations_for(&self, node_count: usize) -> usize {
        self.max_iterations.min(node_count)
    }
}

/// What a layout run did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutReport {
    pub iterations: usize,
    pub optimal_distance: f64,
}

/// Run the simulation in place.
///
/// Each iteration applies, in order: repulsion, attraction, bounds clamp and
/// overlap correction. Displacements are applied immediately, so the visiting
/// order of nodes (their insertion order) is part of the result.
pub fn apply_force_directed_layout(
    nodes: &mut [PositionedNode],
    edges: &[PositionedEdge],
    params: &LayoutParams,
) -> LayoutReport {
    let iterations = params.iterations_for(nodes.len());
    let k = params.optimal_distance(nodes.len());

    for _ in 0..iterations {
        repulse(nodes, k, params);
        attract(nodes, edges, k, params);
        clamp(nodes, params);
        separate_overlaps(nodes, params);
    }
    // The overlap nudge runs after the per-iteration clamp and can push a
    // node past the canvas edge.
    clamp(nodes, params);

    log::debug!(
        "layout: {} nodes, {} edges, {} iterations, k = {:.2}",
        nodes.len(),
        edges.len(),
        iterations,
        k
    );

    LayoutReport {
        iterations,
        optimal_distance: k,
    }
}

fn distance(dx: f64, dy: f64, params: &LayoutParams) -> f64 {
    let d = (dx * dx + dy * dy).sqrt();
    if d > 0.0 {
        d
    } else {
        params.min_distance
    }
}

fn repulse(nodes: &mut [PositionedNode], k: f64, params: &LayoutParams) {
    let k2 = k * k;
    for a in 0..nodes.len() {
        for b in 0..nodes.len() {
            if a == b {
                continue;
            }
            let dx = nodes[a].x - nodes[b].x;
            let dy = nodes[a].y - nodes[b].y;
            let d = distance(dx, dy, params);
            let force = k2 / d;
            nodes[a].x += (dx / d) * force * params.damping;
            nodes[a].y += (dy / d) * force * params.damping;
        }
    }
}

fn attract(nodes: &mut [PositionedNode], edges: &[PositionedEdge], k: f64, params: &LayoutParams) {
    for edge in edges {
        let (s, t) = (edge.src.index(), edge.dst.index());
        let dx = nodes[s].x - nodes[t].x;
        let dy = nodes[s].y - nodes[t].y;
        let d = distance(dx, dy, params);
        let force = (d * d) / k;
        let mx = (dx / d) * force * params.damping;
        let my = (dy / d) * force * params.damping;

        nodes[s].x -= mx;
        nodes[s].y -= my;
        nodes[t].x += mx;
        nodes[t].y += my;
    }
}

fn clamp(nodes: &mut [PositionedNode], params: &LayoutParams) {
    for node in nodes.iter_mut() {
        node.x = bound(node.x, params.canvas_width);
        node.y = bound(node.y, params.canvas_height);
    }
}

// Long spring chains can overshoot until a coordinate overflows to NaN.
// Such a coordinate is pinned to the far edge of the canvas.
fn bound(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        max
    } else {
        value.clamp(0.0, max)
    }
}

// Approximate: a node overlapping several others moves once per overlap and
// dense clusters may never fully separate.
fn separate_overlaps(nodes: &mut [PositionedNode], params: &LayoutParams) {
    for a in 0..nodes.len() {
        for b in 0..nodes.len() {
            if a == b {
                continue;
            }
            let overlaps = (nodes[a].x - nodes[b].x).abs() < nodes[a].width
                && (nodes[a].y - nodes[b].y).abs() < nodes[a].height;
            if overlaps {
                nodes[a].x += params.overlap_nudge;
                nodes[a].y += params.overlap_nudge;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::descriptor::FunctionDescriptor;
    use crate::domain::graph::NodeId;

    fn node(name: &str, x: f64, y: f64) -> PositionedNode {
        PositionedNode::new(FunctionDescriptor::new(name, vec![], vec![]), x, y)
    }

    #[test]
    fn test_parameters() {
        let params = LayoutParams::default();
        assert_eq!(params.optimal_distance(0), 4000.0);
        assert_eq!(params.optimal_distance(4), 2000.0);
        assert_eq!(params.iterations_for(3), 3);
        assert_eq!(params.iterations_for(500), 50);
    }

    #[test]
    fn test_empty_graph_is_noop() {
        let report = apply_force_directed_layout(&mut [], &[], &LayoutParams::default());
        assert_eq!(report.iterations, 0);
    }

    #[test]
    fn test_single_node_only_clamped() {
        let mut nodes = vec![node("a", 50.0, 50.0)];
        let report = apply_force_directed_layout(&mut nodes, &[], &LayoutParams::default());
        assert_eq!(report.iterations, 1);
        assert_eq!((nodes[0].x, nodes[0].y), (50.0, 50.0));
    }

    #[test]
    fn test_repulsion_pushes_apart() {
        let params = LayoutParams::default();
        let mut nodes = vec![node("a", 1000.0, 1000.0), node("b", 1200.0, 1000.0)];
        repulse(&mut nodes, params.optimal_distance(2), &params);
        assert!(nodes[0].x < 1000.0);
        assert!(nodes[1].x > 1200.0);
        assert_eq!(nodes[0].y, 1000.0);
    }

    #[test]
    fn test_coincident_nodes_do_not_produce_nan() {
        let params = LayoutParams::default();
        let mut nodes = vec![node("a", 500.0, 500.0), node("b", 500.0, 500.0)];
        repulse(&mut nodes, params.optimal_distance(2), &params);
        assert!(nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));
    }

    #[test]
    fn test_attraction_is_symmetric() {
        let params = LayoutParams::default();
        let mut nodes = vec![node("a", 0.0, 0.0), node("b", 1000.0, 0.0)];
        let edges = [PositionedEdge::new(NodeId::new(0), NodeId::new(1))];
        attract(&mut nodes, &edges, 1000.0, &params);
        // d = 1000, f = d²/k = 1000, moved by f * 0.1 each.
        assert!((nodes[0].x - 100.0).abs() < 1e-9);
        assert!((nodes[1].x - 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_self_loop_does_not_move() {
        let params = LayoutParams::default();
        let mut nodes = vec![node("a", 300.0, 300.0)];
        let edges = [PositionedEdge::new(NodeId::new(0), NodeId::new(0))];
        attract(&mut nodes, &edges, 1000.0, &params);
        assert_eq!((nodes[0].x, nodes[0].y), (300.0, 300.0));
    }

    #[test]
    fn test_overlap_nudges_first_node() {
        let params = LayoutParams::default();
        let mut nodes = vec![node("a", 100.0, 100.0), node("b", 150.0, 120.0)];
        separate_overlaps(&mut nodes, &params);
        // a moves once, then b is checked against the moved a.
        assert_eq!((nodes[0].x, nodes[0].y), (110.0, 110.0));
        assert_eq!((nodes[1].x, nodes[1].y), (160.0, 130.0));
    }

    #[test]
    fn test_clamp_bounds() {
        let params = LayoutParams::default();
        let mut nodes = vec![node("a", -20.0, 4100.0)];
        clamp(&mut nodes, &params);
        assert_eq!((nodes[0].x, nodes[0].y), (0.0, 4000.0));

        let mut nodes = vec![node("b", f64::NAN, f64::NEG_INFINITY)];
        clamp(&mut nodes, &params);
        assert_eq!((nodes[0].x, nodes[0].y), (4000.0, 0.0));
    }
}
