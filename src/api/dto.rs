use serde::{Deserialize, Serialize};

use crate::domain::{Graph, GroupChild};

/// Positioned graph as sent to a renderer.
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphDto {
    pub version: u64,
    pub nodes: Vec<NodeDto>,
    pub edges: Vec<EdgeDto>,
    pub groups: Vec<GroupDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeDto {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EdgeDto {
    pub src: String,
    pub dst: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupDto {
    pub name: String,
    pub children: Vec<String>,
    /// Children that have no function descriptor.
    pub unresolved: Vec<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub expanded: bool,
    pub connections: Vec<EdgeDto>,
}

impl From<&Graph> for GraphDto {
    fn from(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .map(|n| NodeDto {
                name: n.info.name.clone(),
                inputs: n.info.inputs.clone(),
                outputs: n.info.outputs.clone(),
                x: n.x,
                y: n.y,
                width: n.width,
                height: n.height,
            })
            .collect();

        let to_dto = |(src, dst): (&str, &str)| EdgeDto {
            src: src.to_string(),
            dst: dst.to_string(),
        };
        let edges = graph.edge_names().into_iter().map(to_dto).collect();

        let groups = graph
            .groups()
            .map(|g| GroupDto {
                name: g.info.name.clone(),
                children: g.info.child_names().map(str::to_string).collect(),
                unresolved: g
                    .info
                    .children
                    .iter()
                    .filter(|c| matches!(c, GroupChild::Unresolved { .. }))
                    .map(|c| c.name().to_string())
                    .collect(),
                x: g.x,
                y: g.y,
                width: g.width,
                height: g.height,
                expanded: g.expanded,
                connections: g
                    .connections
                    .iter()
                    .filter_map(|e| graph.endpoints(e))
                    .map(|(s, d)| to_dto((s.name(), d.name())))
                    .collect(),
            })
            .collect();

        GraphDto {
            version: graph.version(),
            nodes,
            edges,
            groups,
        }
    }
}
