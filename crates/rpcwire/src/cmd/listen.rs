use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rpcwire_codec::new_codec;
use rpcwire_transport::WireListener;
use serde_json::Value;
use tracing::{debug, info};

use crate::cmd::{install_ctrlc_handler, Globals, ListenArgs};
use crate::exit::{codec_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_message, MessageView};

pub fn run(args: ListenArgs, globals: Globals) -> CliResult<i32> {
    let listener =
        WireListener::bind(&args.endpoint).map_err(|err| transport_error("bind failed", err))?;
    info!(endpoint = %args.endpoint, "listening");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let stream = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;
        let peer = stream.peer_label();
        let mut codec = new_codec(globals.serializer, stream);
        let mut index = 0usize;

        while running.load(Ordering::SeqCst) {
            let (header, body) = match codec.read_message::<Value, Value>() {
                Ok(message) => message,
                Err(err) if err.is_disconnect() => {
                    debug!(peer = %peer, messages = index, "peer disconnected");
                    break;
                }
                Err(err) => return Err(codec_error("receive failed", err)),
            };

            print_message(
                &MessageView {
                    source: &peer,
                    index,
                    serializer: globals.serializer.name(),
                    header,
                    body,
                },
                globals.format,
            );
            index += 1;
            printed = printed.saturating_add(1);

            if args.count.is_some_and(|count| printed >= count) {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}
