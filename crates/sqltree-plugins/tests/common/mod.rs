//! Shared fixtures: a scripted policy client, decision builders and a
//! one-shot HTTP server for exercising the real client.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use serde_json::{json, Value};
use sqltree_plugins::policy::{CompileRequest, CompileResponse, MaskResponse, PolicyClient};
use sqltree_plugins::Result;

/// Answers compile requests from a table-keyed script. Tables without a
/// scripted answer are denied.
#[derive(Debug, Default)]
pub struct StubClient {
    decisions: HashMap<String, Value>,
    masks: Option<Value>,
    requests: Arc<Mutex<Vec<CompileRequest>>>,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the residual queries returned for `table`.
    pub fn decide(mut self, table: &str, queries: Value) -> Self {
        self.decisions.insert(
            table.to_string(),
            json!({"result": {"queries": queries}}),
        );
        self
    }

    /// Scripts a raw compile response body for `table`.
    pub fn respond(mut self, table: &str, body: Value) -> Self {
        self.decisions.insert(table.to_string(), body);
        self
    }

    pub fn masks(mut self, result: Value) -> Self {
        self.masks = Some(result);
        self
    }

    /// Handle on the compile requests received so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<CompileRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl PolicyClient for StubClient {
    fn compile(&self, request: &CompileRequest) -> Result<CompileResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let table = request
            .unknowns
            .first()
            .and_then(|unknown| unknown.strip_prefix("data."))
            .unwrap_or_default();
        let body = self
            .decisions
            .get(table)
            .cloned()
            .unwrap_or_else(|| json!({"result": {}}));
        Ok(serde_json::from_value(body).unwrap())
    }

    fn masks(&self, _input: &Value) -> Result<MaskResponse> {
        Ok(MaskResponse {
            result: self.masks.clone(),
        })
    }
}

// =============================================================================
// Residual expression builders
// =============================================================================

pub fn op(name: &str) -> Value {
    json!({"type": "ref", "value": [{"type": "var", "value": name}]})
}

pub fn column(table: &str, name: &str) -> Value {
    json!({"type": "ref", "value": [
        {"type": "var", "value": "data"},
        {"type": "string", "value": table},
        {"type": "var", "value": "$01"},
        {"type": "string", "value": name}
    ]})
}

pub fn string(value: &str) -> Value {
    json!({"type": "string", "value": value})
}

/// `<op>(data.<table>[_].<name>, "<value>")`
pub fn call(name: &str, table: &str, col: &str, value: &str) -> Value {
    json!({"index": 0, "terms": [op(name), column(table, col), string(value)]})
}

/// A mask rule replacing a column with `value`.
pub fn replace(value: &str) -> Value {
    json!({"replace": {"value": value}})
}

// =============================================================================
// Loopback HTTP server
// =============================================================================

/// A request as seen by the test server.
#[derive(Debug, Clone)]
pub struct Received {
    pub method: String,
    pub path: String,
    pub body: Value,
}

/// Serves one canned `(status, body)` per connection, in order, and
/// returns what it received when joined.
pub fn serve(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<Received>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut received = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let path = parts.next().unwrap_or_default().to_string();

            let mut content_length = 0;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut raw = vec![0; content_length];
            reader.read_exact(&mut raw).unwrap();
            received.push(Received {
                method,
                path,
                body: serde_json::from_slice(&raw).unwrap_or(Value::Null),
            });

            let reason = if status == 200 { "OK" } else { "Error" };
            write!(
                stream,
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
        }
        received
    });

    (base_url, handle)
}
