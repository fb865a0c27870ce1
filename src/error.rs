// src/error.rs

//! Error taxonomy for every external call the announcer makes.
//!
//! The pipeline never propagates these out of a cycle: each one is logged and
//! turned into "skip this item", "no candidates" or "not delivered".

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnnouncerError>;

#[derive(Error, Debug)]
pub enum AnnouncerError {
    /// Network, DNS or timeout failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote answered with a non-2xx status.
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Malformed or unexpected JSON shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Local file could not be read or written.
    #[error("storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification, used as a log field and metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    HttpStatus,
    Parse,
    Storage,
    Config,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::HttpStatus => "http_status",
            ErrorKind::Parse => "parse",
            ErrorKind::Storage => "storage",
            ErrorKind::Config => "config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AnnouncerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnnouncerError::Transport(_) => ErrorKind::Transport,
            AnnouncerError::HttpStatus { .. } => ErrorKind::HttpStatus,
            AnnouncerError::Parse(_) => ErrorKind::Parse,
            AnnouncerError::Storage { .. } => ErrorKind::Storage,
            AnnouncerError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn storage(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn parse(context: impl fmt::Display, err: impl fmt::Display) -> Self {
        Self::Parse(format!("{context}: {err}"))
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<reqwest::Error> for AnnouncerError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return Self::HttpStatus {
                status: status.as_u16(),
                body: String::new(),
            };
        }
        if e.is_decode() {
            return Self::Parse(e.to_string());
        }
        Self::Transport(e.to_string())
    }
}
