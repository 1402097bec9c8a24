use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::{ExtractOptions, Extraction, Graph};

pub mod dot_exporter;
pub mod json_exporter;
pub mod xml_exporter;

pub use dot_exporter::DotExporter;
pub use json_exporter::JsonExporter;
pub use xml_exporter::XmlExporter;

/// Turns one source file into descriptors.
///
/// Implementations never fail: unreadable or malformed input is reported to
/// a diagnostic sink and yields an empty `Extraction`.
pub trait DescriptorExtractor {
    fn extract_file(&self, path: &Path, options: ExtractOptions) -> Extraction;
}

/// Append-only, best-effort channel for malformed-input reports.
pub trait DiagnosticSink {
    fn report(&self, message: &str);
}

pub trait GraphExporter {
    /// File extension written by `export` when the target has none.
    fn extension(&self) -> &'static str;

    fn render(&self, graph: &Graph) -> Result<String>;

    /// Write the rendered graph and return the path actually written.
    fn export(&self, graph: &Graph, path: &Path) -> Result<PathBuf> {
        let target = if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension(self.extension())
        };
        let content = self.render(graph)?;
        std::fs::write(&target, content)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        log::info!("Exported graph to {}", target.display());
        Ok(target)
    }
}

/// Output formats understood by the command line and the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Xml,
    Dot,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<ExportFormat> {
        match s.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "xml" => Some(ExportFormat::Xml),
            "dot" | "gv" | "graphviz" => Some(ExportFormat::Dot),
            _ => None,
        }
    }

    pub fn exporter(self) -> Box<dyn GraphExporter> {
        match self {
            ExportFormat::Json => Box::new(JsonExporter),
            ExportFormat::Xml => Box::new(XmlExporter),
            ExportFormat::Dot => Box::new(DotExporter),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ExportFormat::parse(s).ok_or_else(|| format!("unknown format '{}' (json, xml, dot)", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!(ExportFormat::parse("JSON"), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::parse("xml"), Some(ExportFormat::Xml));
        assert_eq!(ExportFormat::parse("gv"), Some(ExportFormat::Dot));
        assert_eq!(ExportFormat::parse("png"), None);
        assert!("yaml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_exporter_extensions() {
        assert_eq!(ExportFormat::Json.exporter().extension(), "json");
        assert_eq!(ExportFormat::Xml.exporter().extension(), "xml");
        assert_eq!(ExportFormat::Dot.exporter().extension(), "dot");
    }
}
