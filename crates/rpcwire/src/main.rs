mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use rpcwire_codec::SerializerKind;

use crate::cmd::{Command, Globals};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "rpcwire", version, about = "Length-prefixed RPC message codec CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Serializer for headers and bodies (name or content type).
    #[arg(long, short = 's', value_name = "NAME", default_value = "json", global = true)]
    serializer: SerializerKind,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let globals = Globals {
        format: cli.format.unwrap_or_else(OutputFormat::default_for_stdout),
        serializer: cli.serializer,
    };

    match cmd::run(cli.command, globals) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "rpcwire",
            "send",
            "/tmp/test.sock",
            "--method",
            "Echo.Say",
            "--json",
            "\"hello\"",
        ])
        .expect("send args should parse");

        assert!(matches!(cli.command, Command::Send(ref args) if args.seq == 1));
        assert_eq!(cli.serializer, SerializerKind::Json);
    }

    #[test]
    fn rejects_conflicting_body_args() {
        let err = Cli::try_parse_from([
            "rpcwire",
            "send",
            "/tmp/test.sock",
            "-m",
            "Echo.Say",
            "--json",
            "{\"x\":1}",
            "--file",
            "body.json",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn send_requires_method() {
        let err = Cli::try_parse_from(["rpcwire", "send", "tcp:127.0.0.1:9000"])
            .expect_err("missing method should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn serializer_accepts_content_type() {
        let cli = Cli::try_parse_from([
            "rpcwire",
            "dump",
            "-",
            "--serializer",
            "application/json",
        ])
        .expect("content type should parse");
        assert_eq!(cli.serializer, SerializerKind::Json);
    }

    #[test]
    fn unknown_serializer_is_rejected() {
        assert!(Cli::try_parse_from(["rpcwire", "version", "--serializer", "gob"]).is_err());
    }

    #[test]
    fn parses_tcp_listen_endpoint() {
        let cli = Cli::try_parse_from(["rpcwire", "listen", "tcp:127.0.0.1:0", "--count", "2"])
            .expect("listen args should parse");
        assert!(matches!(cli.command, Command::Listen(ref args) if args.count == Some(2)));
    }
}
