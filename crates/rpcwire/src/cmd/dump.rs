use std::fs::File;
use std::io::{self, BufRead, BufReader};

use rpcwire_codec::{AnySerializer, Serializer};
use rpcwire_frame::{FrameConfig, FrameError, FrameReader};
use serde_json::Value;
use tracing::info;

use crate::cmd::{DumpArgs, Globals};
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_message, MessageView};

pub fn run(args: DumpArgs, globals: Globals) -> CliResult<i32> {
    let (source, input): (String, Box<dyn BufRead>) = match &args.input {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path).map_err(|err| {
                io_error(&format!("failed opening {}", path.display()), err)
            })?;
            (path.display().to_string(), Box::new(BufReader::new(file)))
        }
        _ => ("stdin".to_string(), Box::new(io::stdin().lock())),
    };

    let mut config = FrameConfig::default();
    if let Some(max) = args.max_payload {
        config.max_payload_size = max;
    }

    let serializer = AnySerializer::from(globals.serializer);
    let count = dump_messages(input, config, serializer, &source, |view| {
        print_message(view, globals.format)
    })?;
    info!(source = %source, messages = count, "dump complete");
    Ok(SUCCESS)
}

/// Decode every message in `input`, handing each to `emit`.
///
/// The input must end on a message boundary; a stream that stops inside a
/// header or body frame is reported as invalid data.
fn dump_messages<R, F>(
    input: R,
    config: FrameConfig,
    serializer: AnySerializer,
    source: &str,
    mut emit: F,
) -> CliResult<usize>
where
    R: BufRead,
    F: FnMut(&MessageView<'_>),
{
    let mut frames = FrameReader::with_config(input, config);
    let mut index = 0usize;

    loop {
        let at_end = frames
            .get_mut()
            .fill_buf()
            .map_err(|err| io_error("read failed", err))?
            .is_empty();
        if at_end {
            return Ok(index);
        }

        let header = read_part(&mut frames, &serializer, index, "header")?;
        let body = read_part(&mut frames, &serializer, index, "body")?;
        emit(&MessageView {
            source,
            index,
            serializer: serializer.name(),
            header,
            body,
        });
        index += 1;
    }
}

fn read_part<R: BufRead>(
    frames: &mut FrameReader<R>,
    serializer: &AnySerializer,
    index: usize,
    part: &str,
) -> CliResult<Value> {
    let payload = frames.read_frame().map_err(|err| match err {
        FrameError::Io(ref io) if io.kind() == io::ErrorKind::UnexpectedEof => CliError::new(
            DATA_INVALID,
            format!("message {index}: truncated {part} frame"),
        ),
        other => frame_error(&format!("message {index}: {part} frame"), other),
    })?;
    serializer.decode(&payload).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("message {index}: {part} is not valid {}: {err}", serializer.name()),
        )
    })
}
