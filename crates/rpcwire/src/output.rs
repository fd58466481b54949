use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One decoded message, as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView<'a> {
    /// Where the message came from: a peer label or an input name.
    pub source: &'a str,
    /// Position of the message in its stream, starting at 0.
    pub index: usize,
    pub serializer: &'a str,
    pub header: Value,
    pub body: Value,
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    #[serde(flatten)]
    view: &'a MessageView<'a>,
    timestamp: String,
}

pub fn print_message(view: &MessageView<'_>, format: OutputFormat) {
    println!("{}", render_message(view, format));
}

pub fn render_message(view: &MessageView<'_>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                view,
                timestamp: now_unix_seconds(),
            };
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "SOURCE", "SERIALIZER", "HEADER", "BODY"])
                .add_row(vec![
                    view.index.to_string(),
                    view.source.to_string(),
                    view.serializer.to_string(),
                    view.header.to_string(),
                    view.body.to_string(),
                ]);
            table.to_string()
        }
        OutputFormat::Pretty => format!(
            "#{} source={} serializer={} header={} body={}",
            view.index, view.source, view.serializer, view.header, view.body
        ),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
