//! Minimal echo server: accepts one client and answers every message with
//! its own body.
//!
//! Run with:
//!   cargo run --example echo-server
//!
//! In another terminal:
//!   cargo run --example batch-client -- unix:/tmp/rpcwire-echo-<pid>/echo.sock

use std::fs;

use rpcwire::codec::{Header, JsonSerializer, MessageCodec};
use rpcwire::transport::{Endpoint, WireListener};
use serde_json::Value;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sock_dir = std::env::temp_dir().join(format!("rpcwire-echo-{}", std::process::id()));
    fs::create_dir_all(&sock_dir)?;
    let endpoint = Endpoint::Unix(sock_dir.join("echo.sock"));

    let listener = WireListener::bind(&endpoint)?;
    eprintln!("Listening on {endpoint}");

    let stream = listener.accept()?;
    eprintln!("Client connected: {}", stream.peer_label());
    let mut codec = MessageCodec::new(stream, JsonSerializer);

    loop {
        let (header, body): (Header, Value) = match codec.read_message() {
            Ok(message) => message,
            Err(e) if e.is_disconnect() => {
                eprintln!("Client disconnected");
                break;
            }
            Err(e) => {
                eprintln!("Dropping client: {e}");
                break;
            }
        };
        eprintln!("{} #{}: {body}", header.service_method, header.seq);
        codec.write_message(&header, &body)?;
    }

    codec.close()?;
    drop(listener);
    fs::remove_dir_all(&sock_dir)?;
    Ok(())
}
