use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::thread;

use pycallmap::api::dto::GraphDto;
use pycallmap::api::server::ApiServer;
use pycallmap::infrastructure::AppConfig;
use serde_json::{json, Value};
use tempfile::tempdir;

struct Client {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Client {
    fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).unwrap();
        let reader = BufReader::new(stream.try_clone().unwrap());
        Self { stream, reader }
    }

    fn send(&mut self, request: Value) -> Value {
        let line = serde_json::to_string(&request).unwrap();
        self.stream.write_all(line.as_bytes()).unwrap();
        self.stream.write_all(b"\n").unwrap();

        let mut response = String::new();
        self.reader.read_line(&mut response).unwrap();
        serde_json::from_str(&response).unwrap()
    }
}

#[test]
fn serves_ping_analyze_and_shutdown() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("service.py");
    fs::write(
        &source,
        "class Api:\n    def get(self, key):\n        return lookup(key)\n\ndef lookup(key):\n    return value\n",
    )
    .unwrap();

    let config = AppConfig {
        error_log: dir.path().join("errors.txt"),
        ..AppConfig::default()
    };
    let server = ApiServer::bind("127.0.0.1:0", config).unwrap();
    let addr = server.local_addr().unwrap();
    let handle = thread::spawn(move || server.serve());

    // First connection closes without SHUTDOWN; the server keeps accepting.
    {
        let mut client = Client::connect(addr);
        let pong = client.send(json!({"command": "PING"}));
        assert_eq!(pong, json!({"status": "success", "data": "PONG"}));
    }

    let mut client = Client::connect(addr);

    let missing = client.send(json!({
        "command": "ANALYZE",
        "params": {"path": dir.path().join("absent.py").to_string_lossy()}
    }));
    assert_eq!(missing["status"], "error");
    assert!(missing["message"]
        .as_str()
        .unwrap()
        .contains("Source file not found"));
    let log = fs::read_to_string(dir.path().join("errors.txt")).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.contains("absent.py"));

    let analyzed = client.send(json!({
        "command": "ANALYZE",
        "params": {"path": source.to_string_lossy()}
    }));
    assert_eq!(analyzed["status"], "success");
    let graph: GraphDto = serde_json::from_value(analyzed["data"].clone()).unwrap();
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].src, "get");
    assert_eq!(graph.edges[0].dst, "lookup");
    assert_eq!(graph.groups.len(), 1);
    assert_eq!(graph.groups[0].children, vec!["get".to_string()]);

    let no_classes = client.send(json!({
        "command": "ANALYZE",
        "params": {"path": source.to_string_lossy(), "parse_classes": false}
    }));
    let graph: GraphDto = serde_json::from_value(no_classes["data"].clone()).unwrap();
    assert!(graph.groups.is_empty());

    let unknown = client.send(json!({"command": "REWIND"}));
    assert_eq!(unknown["status"], "error");

    let bye = client.send(json!({"command": "SHUTDOWN"}));
    assert_eq!(bye["status"], "success");

    handle.join().unwrap().unwrap();
}
