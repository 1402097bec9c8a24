//! XML exporter.
//!
//! Attribute-based counterpart of the JSON document:
//!
//! ```text
//! <Graph>
//!   <Nodes>
//!     <Node name=".." x=".." y="..">
//!       <Inputs><Input>..</Input></Inputs>
//!       <Outputs><Output>..</Output></Outputs>
//!     </Node>
//!   </Nodes>
//!   <Edges>
//!     <Edge src=".." dst=".."/>
//!   </Edges>
//! </Graph>
//! ```

use std::fmt::Write;

use anyhow::Result;

use super::GraphExporter;
use crate::domain::Graph;

pub struct XmlExporter;

impl GraphExporter for XmlExporter {
    fn extension(&self) -> &'static str {
        "xml"
    }

    fn render(&self, graph: &Graph) -> Result<String> {
        let mut out = String::new();
        writeln!(out, "<?xml version='1.0' encoding='utf-8'?>")?;
        writeln!(out, "<Graph>")?;

        writeln!(out, "  <Nodes>")?;
        for node in graph.nodes() {
            writeln!(
                out,
                "    <Node name=\"{}\" x=\"{:?}\" y=\"{:?}\">",
                escape_xml(node.name()),
                node.x,
                node.y
            )?;
            write_list(&mut out, "Inputs", "Input", &node.info.inputs)?;
            write_list(&mut out, "Outputs", "Output", &node.info.outputs)?;
            writeln!(out, "    </Node>")?;
        }
        writeln!(out, "  </Nodes>")?;

        writeln!(out, "  <Edges>")?;
        for (src, dst) in graph.edge_names() {
            writeln!(
                out,
                "    <Edge src=\"{}\" dst=\"{}\"/>",
                escape_xml(src),
                escape_xml(dst)
            )?;
        }
        writeln!(out, "  </Edges>")?;

        writeln!(out, "</Graph>")?;
        Ok(out)
    }
}

fn write_list(out: &mut String, outer: &str, inner: &str, items: &[String]) -> std::fmt::Result {
    if items.is_empty() {
        return writeln!(out, "      <{}/>", outer);
    }
    write!(out, "      <{}>", outer)?;
    for item in items {
        write!(out, "<{}>{}</{}>", inner, escape_xml(item), inner)?;
    }
    writeln!(out, "</{}>", outer)
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
