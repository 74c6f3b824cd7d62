use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenQuakemlError {
    #[error("Input file error for '{path}': {message}")]
    File { path: PathBuf, message: String },

    #[error("Parse error on line {line_number}: {reason} (line: '{line}')")]
    Parse {
        line_number: usize,
        line: String,
        reason: String,
    },

    #[error("Validation failed for field '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {message}")]
    Api { message: String },
}

impl GenQuakemlError {
    pub fn file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::File {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn parse(line_number: usize, line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            line_number,
            line: line.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for the most common validation failure.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::validation(field, "required field is missing")
    }

    /// Field name for validation errors, used by callers and tests to check
    /// which input line needs fixing.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<xml::writer::Error> for GenQuakemlError {
    fn from(err: xml::writer::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenQuakemlError>;
