//! Line-delimited JSON API for renderers.
//!
//! Each request is one JSON object per line:
//! `{"command": "PING" | "ANALYZE" | "SHUTDOWN", "params": {...}}`.
//! Each response is one line: `{"status":"success","data":...}` or
//! `{"status":"error","message":...}`. Connections are served one at a time
//! on the calling thread.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;

use crate::api::dto::GraphDto;
use crate::application::AnalyzeUsecase;
use crate::infrastructure::{AppConfig, FileDiagnosticSink, PythonExtractor};
use crate::ports::DiagnosticSink;

#[derive(Debug, Deserialize)]
struct CommandReq {
    command: String,
    params: Option<serde_json::Value>,
}

pub struct ApiServer {
    listener: TcpListener,
    config: AppConfig,
}

impl ApiServer {
    pub fn bind(address: &str, config: AppConfig) -> Result<Self> {
        let listener = TcpListener::bind(address)
            .with_context(|| format!("Failed to bind to {}", address))?;
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until a client sends `SHUTDOWN`.
    pub fn serve(self) -> Result<()> {
        log::info!("API server listening on {}", self.local_addr()?);

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => match handle_connection(stream, &self.config) {
                    Ok(true) => {
                        log::info!("Shutdown requested");
                        break;
                    }
                    Ok(false) => {}
                    Err(e) => log::warn!("Connection error: {}", e),
                },
                Err(e) => log::warn!("Accept error: {}", e),
            }
        }

        Ok(())
    }
}

pub fn start_server(port: u16, config: AppConfig) -> Result<()> {
    ApiServer::bind(&format!("127.0.0.1:{}", port), config)?.serve()
}

/// Returns `true` when the client asked the server to stop.
fn handle_connection(mut stream: TcpStream, config: &AppConfig) -> Result<bool> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            return Ok(false);
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (response, shutdown) = match process_command(trimmed, config) {
            Ok((data, shutdown)) => (
                json!({
                    "status": "success",
                    "data": data
                }),
                shutdown,
            ),
            Err(e) => (
                json!({
                    "status": "error",
                    "message": e.to_string()
                }),
                false,
            ),
        };

        let response_str = serde_json::to_string(&response)?;
        stream.write_all(response_str.as_bytes())?;
        stream.write_all(b"\n")?;

        if shutdown {
            return Ok(true);
        }
    }
}

fn process_command(json_str: &str, config: &AppConfig) -> Result<(serde_json::Value, bool)> {
    let req: CommandReq = serde_json::from_str(json_str).context("Invalid JSON format")?;

    match req.command.as_str() {
        "PING" => Ok((json!("PONG"), false)),
        "ANALYZE" => Ok((handle_analyze(req.params, config)?, false)),
        "SHUTDOWN" => Ok((json!("Shutting down..."), true)),
        _ => anyhow::bail!("Unknown command: {}", req.command),
    }
}

fn handle_analyze(params: Option<serde_json::Value>, config: &AppConfig) -> Result<serde_json::Value> {
    let params = params.ok_or_else(|| anyhow::anyhow!("Missing params for ANALYZE"))?;

    let path_str = params
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing 'path' param"))?;

    let sink = FileDiagnosticSink::new(&config.error_log);
    let path = PathBuf::from(path_str);
    if !path.is_file() {
        let message = format!("Error parsing file {}: source file not found", path.display());
        log::warn!("{}", message);
        sink.report(&message);
        anyhow::bail!("Source file not found: {}", path_str);
    }

    let mut options = config.extract;
    if let Some(v) = params.get("parse_classes").and_then(|v| v.as_bool()) {
        options.parse_classes = v;
    }
    if let Some(v) = params.get("parse_functions").and_then(|v| v.as_bool()) {
        options.parse_functions = v;
    }

    log::info!("Analyzing: {}", path_str);

    let extractor = PythonExtractor::new(sink);
    let usecase = AnalyzeUsecase {
        extractor: &extractor,
        layout: &config.layout,
    };
    let graph = usecase.analyze(&path, options);

    Ok(serde_json::to_value(GraphDto::from(&graph))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_and_unknown() {
        let config = AppConfig::default();
        let (data, shutdown) = process_command(r#"{"command": "PING"}"#, &config).unwrap();
        assert_eq!(data, json!("PONG"));
        assert!(!shutdown);

        let err = process_command(r#"{"command": "DANCE"}"#, &config).unwrap_err();
        assert!(err.to_string().contains("Unknown command"));

        assert!(process_command("not json", &config).is_err());
    }

    #[test]
    fn test_analyze_requires_path() {
        let config = AppConfig::default();
        let err = process_command(r#"{"command": "ANALYZE", "params": {}}"#, &config).unwrap_err();
        assert!(err.to_string().contains("Missing 'path' param"));
    }

    #[test]
    fn test_analyze_missing_file_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            error_log: dir.path().join("errors.txt"),
            ..AppConfig::default()
        };
        let missing = dir.path().join("gone.py");
        let request = json!({
            "command": "ANALYZE",
            "params": {"path": missing.to_string_lossy()}
        })
        .to_string();

        let err = process_command(&request, &config).unwrap_err();
        assert!(err.to_string().contains("Source file not found"));

        let log = std::fs::read_to_string(&config.error_log).unwrap();
        assert_eq!(log.lines().count(), 1);
        assert!(log.starts_with("Error parsing file"));
        assert!(log.contains("gone.py"));
    }

    #[test]
    fn test_shutdown_flag() {
        let (_, shutdown) =
            process_command(r#"{"command": "SHUTDOWN"}"#, &AppConfig::default()).unwrap();
        assert!(shutdown);
    }
}
