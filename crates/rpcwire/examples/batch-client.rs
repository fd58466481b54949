//! Queues several requests, flushes them in one write, then reads the
//! replies in order.
//!
//! Run against the echo server:
//!   cargo run --example batch-client -- unix:/tmp/rpcwire-echo-<pid>/echo.sock

use rpcwire::codec::{CodecConfig, FlushPolicy, Header, JsonSerializer, MessageCodec};
use rpcwire::transport::{Endpoint, WireStream};
use serde_json::{json, Value};

const BATCH: u64 = 5;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let endpoint: Endpoint = std::env::args()
        .nth(1)
        .ok_or("usage: batch-client <endpoint>")?
        .parse()?;

    let config = CodecConfig {
        flush_policy: FlushPolicy::Manual,
        ..CodecConfig::default()
    };
    let mut codec =
        MessageCodec::with_config_wire(WireStream::connect(&endpoint)?, JsonSerializer, config)?;

    for seq in 1..=BATCH {
        codec.write_message(&Header::new("Echo.Say", seq), &json!({ "n": seq }))?;
    }
    eprintln!("Queued {} bytes", codec.pending());
    codec.flush()?;

    for _ in 0..BATCH {
        let (header, body): (Header, Value) = codec.read_message()?;
        if header.is_error() {
            eprintln!("#{} failed: {}", header.seq, header.error);
        } else {
            println!("#{} -> {body}", header.seq);
        }
    }

    codec.close()?;
    Ok(())
}
