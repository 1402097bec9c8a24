//! Graphviz DOT exporter.
//!
//! Exports the positioned graph with pinned coordinates (`pos="x,y!"`) so
//! `neato -n` reproduces the computed layout. Each class becomes a
//! `cluster_<name>` subgraph holding its resolved methods.

use anyhow::Result;

use super::GraphExporter;
use crate::domain::{Graph, PositionedNode};

/// Graphviz works in points; the canvas is scaled down to keep images sane.
const POINTS_PER_UNIT: f64 = 0.25;

pub struct DotExporter;

impl DotExporter {
    /// Convert a Graph to a DOT string.
    pub fn to_dot(graph: &Graph) -> String {
        let mut lines = Vec::new();

        lines.push("digraph CallGraph {".to_string());
        lines.push("    splines=true;".to_string());
        lines.push("    node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10, fillcolor=\"#2d2d30\", fontcolor=\"white\", color=\"#8c8c8c\"];".to_string());
        lines.push("    edge [color=\"#c586c0\", arrowhead=normal];".to_string());
        lines.push("".to_string());

        for node in graph.nodes() {
            lines.push(format!(
                "    \"{}\" [label=\"{}\", pos=\"{:.1},{:.1}!\"];",
                Self::escape_label(node.name()),
                Self::node_label(node),
                node.x * POINTS_PER_UNIT,
                // DOT's y axis points up; the canvas' points down.
                -node.y * POINTS_PER_UNIT
            ));
        }

        lines.push("".to_string());

        for (src, dst) in graph.edge_names() {
            lines.push(format!(
                "    \"{}\" -> \"{}\";",
                Self::escape_label(src),
                Self::escape_label(dst)
            ));
        }

        for group in graph.groups() {
            let members: Vec<String> = group
                .info
                .children
                .iter()
                .filter_map(|c| c.descriptor())
                .filter(|f| graph.contains_node(&f.name))
                .map(|f| format!("\"{}\"", Self::escape_label(&f.name)))
                .collect();
            lines.push("".to_string());
            lines.push(format!(
                "    subgraph \"cluster_{}\" {{",
                Self::escape_label(group.name())
            ));
            lines.push(format!(
                "        label=\"{}\"; style=dashed; color=\"#6c7086\";",
                Self::escape_label(group.name())
            ));
            if !members.is_empty() {
                lines.push(format!("        {};", members.join("; ")));
            }
            lines.push("    }".to_string());
        }

        lines.push("}".to_string());

        lines.join("\n")
    }

    fn node_label(node: &PositionedNode) -> String {
        let mut label = Self::escape_label(node.name());
        if !node.info.inputs.is_empty() {
            label.push_str(&format!(
                "\\nin: {}",
                Self::escape_label(&node.info.inputs.join(", "))
            ));
        }
        if !node.info.outputs.is_empty() {
            label.push_str(&format!(
                "\\nout: {}",
                Self::escape_label(&node.info.outputs.join(", "))
            ));
        }
        label
    }

    fn escape_label(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}

impl GraphExporter for DotExporter {
    fn extension(&self) -> &'static str {
        "dot"
    }

    fn render(&self, graph: &Graph) -> Result<String> {
        Ok(Self::to_dot(graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CallEdgeDescriptor, FunctionDescriptor, GroupChild, GroupDescriptor, LayoutParams,
    };

    #[test]
    fn test_to_dot() {
        let functions = vec![
            FunctionDescriptor::new("main", vec![], vec![]),
            FunctionDescriptor::new("m", vec!["self".into()], vec!["out".into()]),
        ];
        let edges = vec![CallEdgeDescriptor::new("main", "m")];
        let mut group = GroupDescriptor::new("C");
        group
            .children
            .push(GroupChild::Resolved(functions[1].clone()));
        group.children.push(GroupChild::Unresolved {
            name: "ghost".into(),
        });
        let params = LayoutParams {
            max_iterations: 0,
            ..LayoutParams::default()
        };
        let graph = Graph::build_from_parts(&functions, &edges, &[group], &params);

        let dot = DotExporter::to_dot(&graph);
        assert!(dot.starts_with("digraph CallGraph {"));
        assert!(dot.contains("\"main\" [label=\"main\", pos=\"12.5,-12.5!\"];"));
        assert!(dot.contains("label=\"m\\nin: self\\nout: out\""));
        assert!(dot.contains("\"main\" -> \"m\";"));
        assert!(dot.contains("subgraph \"cluster_C\" {"));
        assert!(dot.contains("        \"m\";"));
        assert!(!dot.contains("ghost"));
        assert!(dot.ends_with("}"));
    }

    #[test]
    fn test_escape_label() {
        assert_eq!(DotExporter::escape_label("a\"b"), "a\\\"b");
        assert_eq!(DotExporter::escape_label("a\\b"), "a\\\\b");
    }
}
