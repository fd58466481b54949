#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::Command;
use std::thread;

use rpcwire::codec::{Header, JsonSerializer, MessageCodec};
use rpcwire::frame::write_frame;
use rpcwire::transport::{Endpoint, WireListener};
use serde_json::{json, Value};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/rpcwire-cmd-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

/// Bind a one-shot server that answers a single request with `reply`.
fn serve_once(endpoint: &Endpoint, error: &'static str) -> thread::JoinHandle<(Header, Value)> {
    let listener = WireListener::bind(endpoint).expect("bind should succeed");
    thread::spawn(move || {
        let stream = listener.accept().expect("accept should succeed");
        let mut codec = MessageCodec::new(stream, JsonSerializer);
        let (header, body): (Header, Value) = codec.read_message().expect("request expected");
        let reply = header.reply_with_error(error);
        codec
            .write_message(&reply, &json!({"got": body.clone()}))
            .expect("reply should send");
        let _ = codec.close();
        (header, body)
    })
}

fn cli() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_rpcwire"));
    command.args(["--log-level", "error", "--format", "json"]);
    command
}

#[test]
fn send_wait_prints_reply() {
    let dir = unique_temp_dir("send-wait");
    let endpoint = Endpoint::Unix(dir.join("server.sock"));
    let server = serve_once(&endpoint, "");

    let output = cli()
        .arg("send")
        .arg(endpoint.to_string())
        .args(["--method", "Arith.Add", "--seq", "42", "--json", "[2,3]", "--wait"])
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let (header, body) = server.join().expect("server thread should finish");
    assert_eq!(header, Header::new("Arith.Add", 42));
    assert_eq!(body, json!([2, 3]));

    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    let line: Value = serde_json::from_str(stdout.trim()).expect("stdout should be json");
    assert_eq!(line["header"]["seq"], 42);
    assert_eq!(line["body"]["got"], json!([2, 3]));
    assert_eq!(line["serializer"], "json");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn send_exits_1_on_remote_error() {
    let dir = unique_temp_dir("send-remote-error");
    let endpoint = Endpoint::Unix(dir.join("server.sock"));
    let server = serve_once(&endpoint, "no such method");

    let output = cli()
        .arg("send")
        .arg(endpoint.to_string())
        .args(["-m", "Nope.Missing", "--wait"])
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no such method"));
    let (_, body) = server.join().expect("server thread should finish");
    assert_eq!(body, Value::Null);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn send_to_missing_socket_fails() {
    let output = cli()
        .args(["send", "unix:/tmp/rpcwire-missing-socket.sock", "-m", "Echo.Say"])
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("connect failed"));
}

#[test]
fn send_rejects_invalid_json_body() {
    let output = cli()
        .args(["send", "unix:/tmp/unused.sock", "-m", "Echo.Say", "--json", "{oops"])
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn dump_decodes_capture_file() {
    let dir = unique_temp_dir("dump");
    let capture = dir.join("capture.bin");

    let mut bytes = Vec::new();
    for (seq, body) in [(1u64, json!("a")), (2, json!({"b": [1]}))] {
        let header = serde_json::to_vec(&Header::new("Echo.Say", seq)).unwrap();
        write_frame(&mut bytes, &header).unwrap();
        write_frame(&mut bytes, &serde_json::to_vec(&body).unwrap()).unwrap();
    }
    std::fs::write(&capture, &bytes).expect("capture should be writable");

    let output = cli().arg("dump").arg(&capture).output().expect("dump should run");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    let lines: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be json"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["index"], 0);
    assert_eq!(lines[1]["header"]["seq"], 2);
    assert_eq!(lines[1]["body"]["b"], json!([1]));

    // Cut the last body short.
    std::fs::write(&capture, &bytes[..bytes.len() - 2]).expect("capture should be writable");
    let output = cli().arg("dump").arg(&capture).output().expect("dump should run");
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("truncated body"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_reports_version() {
    let output = cli().arg("version").output().expect("version should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("rpcwire {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn version_extended_lists_serializers() {
    let output = cli()
        .args(["version", "--extended"])
        .output()
        .expect("version should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("serializers: application/json"));
    assert!(stdout.contains("target_os:"));
}
