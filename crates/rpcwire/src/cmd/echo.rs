use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rpcwire_codec::{new_codec, Codec, CodecError, Header};
use rpcwire_transport::WireListener;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cmd::{install_ctrlc_handler, EchoArgs, Globals};
use crate::exit::{transport_error, CliResult, SUCCESS};

/// What happened to one request.
#[derive(Debug, PartialEq)]
enum Served {
    Echoed(Header),
    Rejected(Header),
}

pub fn run(args: EchoArgs, globals: Globals) -> CliResult<i32> {
    let listener =
        WireListener::bind(&args.endpoint).map_err(|err| transport_error("bind failed", err))?;
    info!(endpoint = %args.endpoint, serializer = %globals.serializer, "echo server listening");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut answered = 0usize;

    while running.load(Ordering::SeqCst) {
        let stream = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;
        let peer = stream.peer_label();
        debug!(peer = %peer, "connection accepted");

        let budget = args.count.map(|count| count.saturating_sub(answered));
        answered += serve_connection(new_codec(globals.serializer, stream), &peer, &running, budget);
        if args.count.is_some_and(|count| answered >= count) {
            return Ok(SUCCESS);
        }
    }

    Ok(SUCCESS)
}

/// Serve requests on one connection until the peer leaves, a request is
/// rejected, any error occurs, or `budget` requests have been answered.
/// The codec is always closed. Returns the number of requests answered.
fn serve_connection<C: Codec>(
    mut codec: C,
    peer: &str,
    running: &AtomicBool,
    budget: Option<usize>,
) -> usize {
    let mut answered = 0usize;

    while running.load(Ordering::SeqCst) && budget.is_none_or(|budget| answered < budget) {
        match serve_one(&mut codec) {
            Ok(Served::Echoed(header)) => {
                info!(peer = %peer, method = %header.service_method, seq = header.seq, "echoed");
                answered += 1;
            }
            Ok(Served::Rejected(header)) => {
                warn!(peer = %peer, seq = header.seq, error = %header.error, "rejected request body; closing connection");
                answered += 1;
                break;
            }
            Err(err) if err.is_disconnect() => {
                debug!(peer = %peer, "peer disconnected");
                break;
            }
            Err(err) => {
                warn!(peer = %peer, error = %err, "dropping connection");
                break;
            }
        }
    }

    if let Err(err) = codec.close() {
        debug!(peer = %peer, error = %err, "close failed");
    }
    answered
}

/// Answer one request with its own body.
///
/// A body that fails to decode gets a reply carrying the decode error and a
/// null body. The stream is desynchronized after that; the caller closes it.
fn serve_one<C: Codec>(codec: &mut C) -> Result<Served, CodecError> {
    let mut header = Header::default();
    codec.read_header(&mut header)?;

    let mut body = Value::Null;
    match codec.read_body(&mut body) {
        Ok(()) => {
            codec.write(&header, &body)?;
            Ok(Served::Echoed(header))
        }
        Err(err @ CodecError::Decode { .. }) => {
            let reply = header.reply_with_error(err.to_string());
            codec.write(&reply, &Value::Null)?;
            Ok(Served::Rejected(reply))
        }
        Err(err) => Err(err),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use rpcwire_codec::{JsonSerializer, MessageCodec};
    use rpcwire_transport::WireStream;
    use serde_json::json;

    use super::*;

    fn pair() -> (
        MessageCodec<WireStream, JsonSerializer>,
        MessageCodec<WireStream, JsonSerializer>,
    ) {
        let (a, b) = WireStream::pair().unwrap();
        (
            MessageCodec::new(a, JsonSerializer),
            MessageCodec::new(b, JsonSerializer),
        )
    }

    #[test]
    fn echoes_body_under_same_header() {
        let (mut client, mut server) = pair();
        let header = Header::new("Echo.Say", 9);
        client.write_message(&header, &json!({"x": [1, 2]})).unwrap();

        assert_eq!(serve_one(&mut server).unwrap(), Served::Echoed(header.clone()));

        let (reply, body): (Header, Value) = client.read_message().unwrap();
        assert_eq!(reply, header);
        assert_eq!(body, json!({"x": [1, 2]}));
    }

    #[test]
    fn undecodable_body_gets_error_reply() {
        let (a, b) = WireStream::pair().unwrap();
        let mut raw = rpcwire_frame::FrameWriter::new(a);
        raw.send(br#"{"service_method":"Echo.Say","seq":2}"#).unwrap();
        raw.send(b"{not json").unwrap();
        let mut server = MessageCodec::new(b, JsonSerializer);

        let served = serve_one(&mut server).unwrap();
        assert!(matches!(served, Served::Rejected(ref h) if h.seq == 2 && h.is_error()));

        let mut client = MessageCodec::new(raw.into_inner(), JsonSerializer);
        let (reply, body): (Header, Value) = client.read_message().unwrap();
        assert_eq!(reply.seq, 2);
        assert!(reply.error.contains("decode failed"));
        assert_eq!(body, Value::Null);
    }

    #[test]
    fn rejected_body_closes_connection() {
        let (a, b) = WireStream::pair().unwrap();
        let mut raw = rpcwire_frame::FrameWriter::new(a);
        raw.send(br#"{"service_method":"Echo.Say","seq":5}"#).unwrap();
        raw.send(b"{not json").unwrap();
        // A well-formed request after the bad one must not be answered.
        raw.send(br#"{"service_method":"Echo.Say","seq":6}"#).unwrap();
        raw.send(b"1").unwrap();

        let running = AtomicBool::new(true);
        let answered = serve_connection(
            MessageCodec::new(b, JsonSerializer),
            "test",
            &running,
            None,
        );
        assert_eq!(answered, 1);

        let mut client = MessageCodec::new(raw.into_inner(), JsonSerializer);
        let (reply, _): (Header, Value) = client.read_message().unwrap();
        assert_eq!(reply.seq, 5);
        assert!(reply.is_error());
        let err = client.read_message::<Header, Value>().unwrap_err();
        assert!(err.is_disconnect(), "expected closed connection, got {err}");
    }

    #[test]
    fn connection_stops_at_budget() {
        let (mut client, server) = pair();
        for seq in 1..=3 {
            client.write_message(&Header::new("Echo.Say", seq), &seq).unwrap();
        }

        let running = AtomicBool::new(true);
        assert_eq!(serve_connection(server, "test", &running, Some(2)), 2);

        for seq in 1..=2 {
            let (reply, body): (Header, u64) = client.read_message().unwrap();
            assert_eq!((reply.seq, body), (seq, seq));
        }
        assert!(client.read_message::<Header, Value>().unwrap_err().is_disconnect());
    }

    #[test]
    fn closed_client_is_a_disconnect() {
        let (client, mut server) = pair();
        drop(client);
        assert!(serve_one(&mut server).unwrap_err().is_disconnect());
    }
}
