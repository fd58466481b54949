use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::{Args, Subcommand};
use rpcwire_codec::SerializerKind;
use rpcwire_transport::Endpoint;

use crate::exit::{CliError, CliResult, INTERNAL};
use crate::output::OutputFormat;

pub mod dump;
pub mod echo;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an echo server that answers every message with its own body.
    Echo(EchoArgs),
    /// Send one message.
    Send(SendArgs),
    /// Accept connections and print every message received.
    Listen(ListenArgs),
    /// Decode messages from a captured byte stream.
    Dump(DumpArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Copy)]
pub struct Globals {
    pub format: OutputFormat,
    pub serializer: SerializerKind,
}

pub fn run(command: Command, globals: Globals) -> CliResult<i32> {
    match command {
        Command::Echo(args) => echo::run(args, globals),
        Command::Send(args) => send::run(args, globals),
        Command::Listen(args) => listen::run(args, globals),
        Command::Dump(args) => dump::run(args, globals),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Endpoint to bind (unix:<path>, tcp:<host:port>, or a socket path).
    pub endpoint: Endpoint,
    /// Exit after echoing N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Endpoint to connect to.
    pub endpoint: Endpoint,
    /// Header service method, e.g. "Arith.Add".
    #[arg(long, short = 'm')]
    pub method: String,
    /// Header sequence number.
    #[arg(long, default_value = "1")]
    pub seq: u64,
    /// Body as JSON text.
    #[arg(long, conflicts_with = "file")]
    pub json: Option<String>,
    /// Read the JSON body from a file.
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,
    /// Wait for one reply message and print it.
    #[arg(long)]
    pub wait: bool,
    /// Read/write timeout on the connection (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Endpoint to bind.
    pub endpoint: Endpoint,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Capture file; reads stdin when omitted or "-".
    pub input: Option<PathBuf>,
    /// Reject frames declaring more than this many payload bytes.
    #[arg(long)]
    pub max_payload: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, std::sync::atomic::Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
