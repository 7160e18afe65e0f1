//! Output formatting: the JSON envelope, YAML, and tables for lists.
//!
//! Every command answers with `{success, message?, <payload>}` on stdout.
//! Failures use the same envelope with `success: false`.

use std::io::{self, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;

/// The response envelope. `payload` fields are flattened next to `success`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

/// No payload.
#[derive(Debug, Serialize)]
pub struct Empty {}

impl<T: Serialize> Envelope<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            message: None,
            payload,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Envelope<Empty> {
    pub fn done(message: impl Into<String>) -> Self {
        Envelope::ok(Empty {}).with_message(message)
    }
}

/// Failure payload.
#[derive(Debug, Serialize)]
pub struct Failure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

pub fn failure(message: String, status: Option<u16>) -> Envelope<Failure> {
    Envelope {
        success: false,
        message: Some(message),
        payload: Failure { status },
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render an envelope in a structured format. `Table` falls back to JSON.
pub fn render<T: Serialize>(format: OutputFormat, envelope: &Envelope<T>) -> String {
    match format {
        OutputFormat::Json | OutputFormat::Table => render_json(envelope, false),
        OutputFormat::JsonCompact => render_json(envelope, true),
        OutputFormat::Yaml => render_yaml(envelope),
    }
}

/// Render a list result: a table of `rows` for `Table`, the envelope otherwise.
pub fn render_list<T, R>(
    format: OutputFormat,
    envelope: &Envelope<T>,
    rows: impl FnOnce() -> Vec<R>,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => Table::new(rows()).with(Style::rounded()).to_string(),
        other => render(other, envelope),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Write one compact JSON line and flush, for streaming.
pub fn print_line<T: Serialize>(value: &T) {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", render_json(value, true));
    let _ = stdout.flush();
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!(r#"{{"success":false,"message":"cannot render output: {e}"}}"#))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("success: false\nmessage: cannot render output: {e}\n"))
}
