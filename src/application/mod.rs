use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::{ExtractOptions, Graph, LayoutParams};
use crate::ports::{DescriptorExtractor, GraphExporter};

/// Source file → descriptors → positioned graph → (optional) export.
pub struct AnalyzeUsecase<'a> {
    pub extractor: &'a dyn DescriptorExtractor,
    pub layout: &'a LayoutParams,
}

impl<'a> AnalyzeUsecase<'a> {
    /// Extract and lay out one file. Malformed input yields an empty graph.
    pub fn analyze(&self, path: &Path, options: ExtractOptions) -> Graph {
        let extraction = self.extractor.extract_file(path, options);
        Graph::build(&extraction, self.layout)
    }

    /// Analyze and export. Returns the graph and the file written.
    pub fn run(
        &self,
        path: &Path,
        options: ExtractOptions,
        exporter: &dyn GraphExporter,
        export_path: &Path,
    ) -> Result<(Graph, PathBuf)> {
        let graph = self.analyze(path, options);
        let written = exporter.export(&graph, export_path)?;
        Ok((graph, written))
    }
}
