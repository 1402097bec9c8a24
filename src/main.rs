// Command-line entry point for pycallmap.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pycallmap::api::server;
use pycallmap::application::AnalyzeUsecase;
use pycallmap::domain::Graph;
use pycallmap::infrastructure::{AppConfig, FileDiagnosticSink, PythonExtractor};
use pycallmap::ports::ExportFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Python source file to analyze
    #[arg(required_unless_present = "serve")]
    input: Option<PathBuf>,

    /// Output file path (extension added from --format when missing)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (json, xml, dot)
    #[arg(short, long, default_value = "json")]
    format: ExportFormat,

    /// Do not record classes as groups
    #[arg(long)]
    no_classes: bool,

    /// Do not record functions or calls
    #[arg(long)]
    no_functions: bool,

    /// TOML config file with [extract] and [layout] sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File receiving one line per unreadable or malformed input
    #[arg(long)]
    error_log: Option<PathBuf>,

    /// Serve the JSON API on 127.0.0.1:<PORT> instead of analyzing a file
    #[arg(long, value_name = "PORT")]
    serve: Option<u16>,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };
    if cli.no_classes {
        config.extract.parse_classes = false;
    }
    if cli.no_functions {
        config.extract.parse_functions = false;
    }
    if let Some(path) = &cli.error_log {
        config.error_log = path.clone();
    }
    Ok(config)
}

fn print_summary(graph: &Graph) {
    println!(
        "{} functions, {} calls, {} classes",
        graph.node_count(),
        graph.edge_count(),
        graph.group_count()
    );
    for node in graph.nodes() {
        println!(
            "  {}({}) -> [{}] at ({:.1}, {:.1})",
            node.name(),
            node.info.inputs.join(", "),
            node.info.outputs.join(", "),
            node.x,
            node.y
        );
    }
    for (src, dst) in graph.edge_names() {
        println!("  {} -> {}", src, dst);
    }
    for group in graph.groups() {
        let children: Vec<&str> = group.info.child_names().collect();
        println!("  class {} [{}]", group.name(), children.join(", "));
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Some(port) = cli.serve {
        return server::start_server(port, config);
    }

    let input = cli
        .input
        .as_deref()
        .context("An input file is required unless --serve is given")?;

    let extractor = PythonExtractor::new(FileDiagnosticSink::new(&config.error_log));
    let usecase = AnalyzeUsecase {
        extractor: &extractor,
        layout: &config.layout,
    };

    match &cli.output {
        Some(output) => {
            let exporter = cli.format.exporter();
            let (graph, written) =
                usecase.run(input, config.extract, exporter.as_ref(), output)?;
            println!(
                "Analysis completed: {} functions, {} calls written to {} ({:?})",
                graph.node_count(),
                graph.edge_count(),
                written.display(),
                cli.format
            );
        }
        None => {
            let graph = usecase.analyze(input, config.extract);
            print_summary(&graph);
        }
    }

    Ok(())
}
