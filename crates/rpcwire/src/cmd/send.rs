use std::fs;
use std::time::Duration;

use rpcwire_codec::{AnySerializer, CodecConfig, Header, MessageCodec};
use rpcwire_frame::FrameConfig;
use rpcwire_transport::WireStream;
use serde_json::Value;
use tracing::debug;

use crate::cmd::{Globals, SendArgs};
use crate::exit::{codec_error, transport_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_message, MessageView};

pub fn run(args: SendArgs, globals: Globals) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let body = resolve_body(&args)?;

    let stream =
        WireStream::connect(&args.endpoint).map_err(|err| transport_error("connect failed", err))?;
    let peer = stream.peer_label();
    let config = CodecConfig {
        frame: FrameConfig {
            read_timeout: Some(timeout),
            write_timeout: Some(timeout),
            ..FrameConfig::default()
        },
        ..CodecConfig::default()
    };
    let mut codec =
        MessageCodec::with_config_wire(stream, AnySerializer::from(globals.serializer), config)
            .map_err(|err| codec_error("configure failed", err))?;

    let header = Header::new(args.method.as_str(), args.seq);
    codec
        .write_message(&header, &body)
        .map_err(|err| codec_error("send failed", err))?;
    debug!(peer = %peer, method = %header.service_method, seq = header.seq, "message sent");

    let mut code = SUCCESS;
    if args.wait {
        let mut reply = Header::default();
        codec
            .read_header(&mut reply)
            .map_err(|err| codec_error("receive header failed", err))?;
        let mut reply_body = Value::Null;
        codec
            .read_body(&mut reply_body)
            .map_err(|err| codec_error("receive body failed", err))?;

        let view = MessageView {
            source: &peer,
            index: 0,
            serializer: globals.serializer.name(),
            header: serde_json::to_value(&reply)
                .map_err(|err| CliError::new(INTERNAL, format!("render header failed: {err}")))?,
            body: reply_body,
        };
        print_message(&view, globals.format);

        if reply.is_error() {
            eprintln!("remote error: {}", reply.error);
            code = FAILURE;
        }
    }

    if let Err(err) = codec.close() {
        if !err.is_disconnect() {
            return Err(codec_error("close failed", err));
        }
        debug!(peer = %peer, error = %err, "peer closed first");
    }
    Ok(code)
}

fn resolve_body(args: &SendArgs) -> CliResult<Value> {
    if let Some(json) = &args.json {
        return serde_json::from_str(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")));
    }
    if let Some(path) = &args.file {
        let text = fs::read_to_string(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        })?;
        return serde_json::from_str(&text).map_err(|err| {
            CliError::new(
                USAGE,
                format!("{} is not valid JSON: {err}", path.display()),
            )
        });
    }
    Ok(Value::Null)
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
