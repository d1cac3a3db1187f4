//! Machine-readable output for `--json`

use serde::Serialize;

/// How command results reach stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Human,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Human }
    }

    pub fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

#[derive(Debug, Serialize)]
struct Envelope<'a, T: Serialize> {
    ok: bool,
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Render the success envelope for `command`.
pub fn success_envelope<T: Serialize>(command: &str, data: T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Envelope {
        ok: true,
        command,
        data: Some(data),
        error: None,
    })
}

/// Render the failure envelope for `command`.
pub fn error_envelope(command: &str, message: &str) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Envelope::<()> {
        ok: false,
        command,
        data: None,
        error: Some(message.to_string()),
    })
}

/// Print the success envelope in JSON mode. Human mode prints nothing here;
/// commands render their own text.
pub fn emit_success<T: Serialize>(mode: OutputMode, command: &str, data: T) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        println!("{}", success_envelope(command, data)?);
    }
    Ok(())
}

pub fn emit_error(command: &str, message: &str) -> anyhow::Result<()> {
    println!("{}", error_envelope(command, message)?);
    Ok(())
}
