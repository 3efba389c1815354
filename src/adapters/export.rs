//! Session and application-state export

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::encryption::{self, EncryptionError};
use crate::domain::{AppState, Message, Session};

pub const EXPORT_VERSION: &str = "1.0";

const CSV_HEADERS: [&str; 9] = [
    "Timestamp",
    "Agent ID",
    "Role",
    "Content",
    "Novelty",
    "Feasibility",
    "Value Impact",
    "Safety",
    "Exploration Index",
];

/// Export format of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

pub fn export_session(session: &Session, format: ExportFormat) -> Result<String, serde_json::Error> {
    match format {
        ExportFormat::Json => export_session_json(session),
        ExportFormat::Csv => Ok(export_session_csv(session)),
    }
}

/// Pretty-printed JSON of the full session
pub fn export_session_json(session: &Session) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(session)
}

/// One CSV row per message; unscored messages leave the score cells empty
pub fn export_session_csv(session: &Session) -> String {
    let mut lines = Vec::with_capacity(session.messages().len() + 1);
    lines.push(CSV_HEADERS.join(","));
    lines.extend(session.messages().iter().map(csv_row));
    lines.join("\n")
}

fn csv_row(message: &Message) -> String {
    let mut cells = vec![
        format_timestamp(message.timestamp),
        message.agent_id.clone(),
        message.role.as_str().to_string(),
        format!("\"{}\"", message.content.replace('"', "\"\"")),
    ];

    match &message.score {
        Some(score) => cells.extend(score.axes().iter().map(|v| format!("{:.2}", v))),
        None => cells.extend(std::iter::repeat(String::new()).take(5)),
    }

    cells.join(",")
}

/// RFC 3339 UTC with millisecond precision
fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

/// Encrypted application-state envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedExport {
    pub encrypted: String,
    pub version: String,
}

/// Errors of the encrypted state export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),
}

/// Encrypt the whole state with `passphrase` into a versioned envelope
pub fn export_app_state(state: &AppState, passphrase: &str) -> Result<String, ExportError> {
    let plaintext = serde_json::to_string(state)?;
    let envelope = EncryptedExport {
        encrypted: encryption::encrypt(&plaintext, passphrase)?,
        version: EXPORT_VERSION.to_string(),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Inverse of [`export_app_state`]
pub fn import_app_state(export: &str, passphrase: &str) -> Result<AppState, ExportError> {
    let envelope: EncryptedExport = serde_json::from_str(export)?;
    let plaintext = encryption::decrypt(&envelope.encrypted, passphrase)?;
    Ok(serde_json::from_str(&plaintext)?)
}
