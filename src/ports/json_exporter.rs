//! JSON exporter: one record per node and per edge.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::GraphExporter;
use crate::domain::Graph;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EdgeRecord {
    pub src: String,
    pub dst: String,
}

impl From<&Graph> for GraphDocument {
    fn from(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .map(|n| NodeRecord {
                name: n.info.name.clone(),
                inputs: n.info.inputs.clone(),
                outputs: n.info.outputs.clone(),
                x: n.x,
                y: n.y,
            })
            .collect();
        let edges = graph
            .edge_names()
            .into_iter()
            .map(|(src, dst)| EdgeRecord {
                src: src.to_string(),
                dst: dst.to_string(),
            })
            .collect();
        GraphDocument { nodes, edges }
    }
}

pub struct JsonExporter;

impl GraphExporter for JsonExporter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, graph: &Graph) -> Result<String> {
        let document = GraphDocument::from(graph);
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        document.serialize(&mut ser)?;
        Ok(String::from_utf8(buf)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CallEdgeDescriptor, FunctionDescriptor, LayoutParams};

    #[test]
    fn test_render_json() {
        let functions = vec![
            FunctionDescriptor::new("a", vec!["x".into()], vec!["y".into()]),
            FunctionDescriptor::new("b", vec![], vec![]),
        ];
        let edges = vec![CallEdgeDescriptor::new("a", "b")];
        let graph = Graph::build_from_parts(&functions, &edges, &[], &LayoutParams::default());

        let text = JsonExporter.render(&graph).unwrap();
        assert!(text.contains("\n    \"nodes\""));

        let doc: GraphDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[0].name, "a");
        assert_eq!(doc.nodes[0].inputs, vec!["x".to_string()]);
        assert!((doc.nodes[0].x - graph.node("a").unwrap().x).abs() < 1e-6);
        assert_eq!(
            doc.edges,
            vec![EdgeRecord {
                src: "a".into(),
                dst: "b".into()
            }]
        );
    }
}
