//! Integration tests for the `dockcheck serve` HTTP API.
//!
//! Each test starts the server as a child process on a unique port, drives
//! reports through the workflow over HTTP, and checks status codes and
//! JSON bodies.

use std::io::Read;
use std::net::TcpStream;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use serde_json::{json, Value};

/// Base port is derived from the process id so separate test binaries
/// running in parallel don't collide on the same range.
static NEXT_PORT: AtomicU16 = AtomicU16::new(0);
static PORT_INIT: std::sync::Once = std::sync::Once::new();

fn next_port() -> u16 {
    PORT_INIT.call_once(|| {
        let base = 21000 + (std::process::id() as u16 % 20000);
        NEXT_PORT.store(base, Ordering::SeqCst);
    });
    NEXT_PORT.fetch_add(1, Ordering::SeqCst)
}

/// A running `dockcheck serve`, killed on drop.
struct Server {
    child: Child,
    port: u16,
}

impl Drop for Server {
    fn drop(&mut self) {
        self.child.kill().ok();
        self.child.wait().ok();
    }
}

fn start_server() -> Server {
    let port = next_port();
    let child = Command::new(env!("CARGO_BIN_EXE_dockcheck"))
        .arg("serve")
        .arg("--port")
        .arg(port.to_string())
        .env("RUST_LOG", "warn")
        // Output is never read; a full pipe would stall the server.
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start dockcheck serve");

    // Wait for server to be ready by polling the port
    for _ in 0..50 {
        if TcpStream::connect(format!("127.0.0.1:{}", port)).is_ok() {
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    Server { child, port }
}

impl Server {
    fn get(&self, path: &str) -> (u16, Value) {
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: localhost:{}\r\nConnection: close\r\n\r\n",
            path, self.port
        );
        self.send(&request)
    }

    fn post(&self, path: &str, body: &Value) -> (u16, Value) {
        self.post_raw(path, &body.to_string())
    }

    fn post_raw(&self, path: &str, body: &str) -> (u16, Value) {
        let request = format!(
            "POST {} HTTP/1.1\r\nHost: localhost:{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            path, self.port, body.len(), body
        );
        self.send(&request)
    }

    fn send(&self, request: &str) -> (u16, Value) {
        let mut stream =
            TcpStream::connect(format!("127.0.0.1:{}", self.port)).expect("failed to connect");
        stream
            .set_read_timeout(Some(Duration::from_secs(10)))
            .unwrap();
        std::io::Write::write_all(&mut stream, request.as_bytes()).expect("failed to write");

        let mut response = String::new();
        let _ = stream.read_to_string(&mut response);

        let (status, body) = parse_http_response(&response);
        let json = serde_json::from_str(&body).unwrap_or(Value::Null);
        (status, json)
    }
}

/// Parse an HTTP response into (status_code, body).
fn parse_http_response(response: &str) -> (u16, String) {
    let (headers, body) = response.split_once("\r\n\r\n").unwrap_or((response, ""));

    let status = headers
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(0);

    let body = if headers.to_ascii_lowercase().contains("transfer-encoding: chunked") {
        decode_chunked(body)
    } else {
        body.to_string()
    };
    (status, body)
}

/// Decode chunked transfer encoding.
fn decode_chunked(mut remaining: &str) -> String {
    let mut result = String::new();
    while let Some(line_end) = remaining.find("\r\n") {
        let size = match usize::from_str_radix(remaining[..line_end].trim(), 16) {
            Ok(0) | Err(_) => break,
            Ok(s) => s,
        };
        let chunk_start = line_end + 2;
        let chunk_end = (chunk_start + size).min(remaining.len());
        result.push_str(&remaining[chunk_start..chunk_end]);
        remaining = remaining.get(chunk_end + 2..).unwrap_or("");
    }
    result
}

// ──────────────────────────────────────────────
// Request bodies
// ──────────────────────────────────────────────

fn actor(name: &str, role: &str) -> Value {
    json!({ "name": name, "role": role })
}

fn create_body() -> Value {
    json!({
        "actor": actor("홍길동", "driver"),
        "reportDate": "2025-10-01",
        "containerNo": "TCLU8239466",
        "blNo": "CHL20251001",
        "vehicleNo": "부산12가3456",
        "driverName": "홍길동",
        "driverPhone": "010-1234-5678",
        "driverDamage": "좌측 패널 파손",
        "driverSignature": "홍길동",
    })
}

fn field_approve_body() -> Value {
    json!({
        "actor": actor("김도훈", "field"),
        "action": "approve",
        "fieldStaff": "김도훈",
        "fieldDamage": "확인함",
        "fieldSignature": "김도훈",
    })
}

fn office_approve_body() -> Value {
    json!({
        "actor": actor("이수진", "office"),
        "officeStaff": "이수진",
        "officePhone": "051-000-0000",
        "officeDamage": "최종확인",
        "officeSignature": "이수진",
    })
}

/// Create a report and return its id.
fn create(server: &Server) -> String {
    let (status, body) = server.post("/reports", &create_body());
    assert_eq!(status, 201, "create failed: {body}");
    body["id"].as_str().expect("id").to_string()
}

fn queue_ids(server: &Server, role: &str) -> Vec<String> {
    let (status, body) = server.get(&format!("/reports?role={role}"));
    assert_eq!(status, 200);
    body["reports"]
        .as_array()
        .expect("reports array")
        .iter()
        .map(|r| r["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[test]
fn health_returns_200_with_version() {
    let server = start_server();
    let (status, body) = server.get("/health");
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert!(body.get("version").is_some());
}

#[test]
fn unknown_route_returns_json_404() {
    let server = start_server();
    let (status, body) = server.get("/containers");
    assert_eq!(status, 404);
    assert_eq!(body["error"], "not found");
}

#[test]
fn full_workflow_over_http() {
    let server = start_server();
    let id = create(&server);

    let (status, body) = server.get(&format!("/reports/{id}"));
    assert_eq!(status, 200);
    assert_eq!(body["status"], "driver_submitted");
    assert_eq!(body["actionHistory"].as_array().unwrap().len(), 1);

    let (status, body) = server.post(&format!("/reports/{id}/field-review"), &field_approve_body());
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["status"], "field_submitted");

    let (status, body) =
        server.post(&format!("/reports/{id}/office-approve"), &office_approve_body());
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["status"], "completed");
    assert_eq!(body["actionHistory"].as_array().unwrap().len(), 3);

    let (status, body) = server.get(&format!("/reports/{id}/signatures/office"));
    assert_eq!(status, 200);
    assert_eq!(body["signature"], "이수진");

    let (status, body) = server.get(&format!("/reports/{id}/certificate"));
    assert_eq!(status, 200);
    assert_eq!(body["completed"], true);
    assert_eq!(body["parties"][1]["name"], "김도훈");
}

#[test]
fn reject_and_resubmit_over_http() {
    let server = start_server();
    let id = create(&server);

    let reject = json!({
        "actor": actor("김도훈", "field"),
        "action": "reject",
        "rejectionReason": "사진 필요",
    });
    let (status, body) = server.post(&format!("/reports/{id}/field-review"), &reject);
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["rejectionReason"], "사진 필요");
    assert_eq!(queue_ids(&server, "driver"), vec![id.clone()]);

    let resubmit = json!({
        "actor": actor("홍길동", "driver"),
        "driverDamage": "사진 추가함",
        "driverSignature": "홍길동",
        "damagePhotos": ["photos/left-panel-1.jpg"],
    });
    let (status, body) = server.post(&format!("/reports/{id}/resubmit"), &resubmit);
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["status"], "driver_submitted");
    assert!(body.get("rejectionReason").is_none());
    assert_eq!(body["damagePhotos"][0], "photos/left-panel-1.jpg");
    assert_eq!(body["actionHistory"].as_array().unwrap().len(), 3);
}

#[test]
fn office_reject_returns_report_to_field_queue() {
    let server = start_server();
    let id = create(&server);
    server.post(&format!("/reports/{id}/field-review"), &field_approve_body());

    let reject = json!({
        "actor": actor("이수진", "office"),
        "rejectionReason": "서명 불명확",
        "officeStaff": "이수진",
    });
    let (status, body) = server.post(&format!("/reports/{id}/office-reject"), &reject);
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["status"], "driver_submitted");

    assert_eq!(queue_ids(&server, "field"), vec![id]);
    assert!(queue_ids(&server, "driver").is_empty());
    assert!(queue_ids(&server, "office").is_empty());
}

#[test]
fn illegal_transition_returns_409_with_current_status() {
    let server = start_server();
    let id = create(&server);

    let (status, body) =
        server.post(&format!("/reports/{id}/office-approve"), &office_approve_body());
    assert_eq!(status, 409);
    assert_eq!(body["currentStatus"], "driver_submitted");

    let (_, report) = server.get(&format!("/reports/{id}"));
    assert_eq!(report["status"], "driver_submitted");
    assert_eq!(report["actionHistory"].as_array().unwrap().len(), 1);
}

#[test]
fn missing_fields_return_422_with_field_list() {
    let server = start_server();
    let mut body = create_body();
    body["driverDamage"] = json!("");
    body.as_object_mut().unwrap().remove("driverSignature");

    let (status, response) = server.post("/reports", &body);
    assert_eq!(status, 422);
    let fields: Vec<&str> = response["fields"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["driverDamage", "driverSignature"]);

    let (_, list) = server.get("/reports");
    assert!(list["reports"].as_array().unwrap().is_empty());
}

#[test]
fn wrong_role_returns_403() {
    let server = start_server();
    let id = create(&server);
    let mut body = field_approve_body();
    body["actor"] = actor("홍길동", "driver");

    let (status, _) = server.post(&format!("/reports/{id}/field-review"), &body);
    assert_eq!(status, 403);
}

#[test]
fn unknown_report_returns_404() {
    let server = start_server();
    let (status, body) = server.get("/reports/does-not-exist");
    assert_eq!(status, 404);
    assert!(body["error"].as_str().unwrap().contains("does-not-exist"));

    let (status, _) =
        server.post("/reports/does-not-exist/office-approve", &office_approve_body());
    assert_eq!(status, 404);
}

#[test]
fn bad_input_returns_400() {
    let server = start_server();
    let (status, body) = server.post_raw("/reports", "{ not json");
    assert_eq!(status, 400);
    assert!(body.get("error").is_some());

    let (status, _) = server.get("/reports?role=captain");
    assert_eq!(status, 400);

    let id = create(&server);
    let (status, _) = server.get(&format!("/reports/{id}/signatures/captain"));
    assert_eq!(status, 400);
}

#[test]
fn transitions_list_what_a_role_may_do_next() {
    let server = start_server();
    let id = create(&server);

    let (status, body) = server.get(&format!("/reports/{id}/transitions?role=field"));
    assert_eq!(status, 200);
    assert_eq!(body["role"], "field");
    assert_eq!(body["transitions"], json!(["field_approve", "field_reject"]));

    let (status, body) = server.get(&format!("/reports/{id}/transitions?role=office"));
    assert_eq!(status, 200);
    assert_eq!(body["transitions"], json!([]));

    let (status, _) = server.get(&format!("/reports/{id}/transitions"));
    assert_eq!(status, 400);
}
