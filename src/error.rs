// File: ./src/error.rs
// Error kinds shared by the parser, the board client and the submitter.
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Category of a card-scoped failure, used for the per-card summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Resolution,
    Network,
    Auth,
    FileAccess,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Parse => write!(f, "parse error"),
            ErrorKind::Resolution => write!(f, "resolution error"),
            ErrorKind::Network => write!(f, "network error"),
            ErrorKind::Auth => write!(f, "auth error"),
            ErrorKind::FileAccess => write!(f, "file access error"),
        }
    }
}

/// A failure attributed to a single card. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct CardError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CardError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn file_access(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::new(
            ErrorKind::FileAccess,
            format!("cannot read '{}': {}", path.display(), err),
        )
    }
}

impl From<ApiError> for CardError {
    fn from(e: ApiError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

/// Errors surfaced by the board service client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The TCP/TLS connection could not be established; nothing reached the server.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request may have reached the server but no usable response came back.
    #[error("request failed: {0}")]
    Transport(String),

    #[error("unauthorized ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited by the board service")]
    RateLimited { retry_after: Option<Duration> },

    #[error("server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthorized { .. } => ErrorKind::Auth,
            _ => ErrorKind::Network,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Classifies a non-success HTTP status.
    pub fn from_status(status: u16, body: String, retry_after: Option<Duration>) -> Self {
        match status {
            401 | 403 => ApiError::Unauthorized { status, body },
            404 => ApiError::NotFound(body),
            429 => ApiError::RateLimited { retry_after },
            500..=599 => ApiError::Server { status, body },
            _ => ApiError::Rejected { status, body },
        }
    }
}

/// Conditions that abort the whole run before any card is submitted.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("could not extract a board id from '{0}' (expected https://trello.com/b/<id>/...)")]
    InvalidBoardUrl(String),

    #[error("access to the board was denied; check the API key and token: {0}")]
    Unauthorized(ApiError),

    #[error("could not load the board: {0}")]
    BoardUnavailable(ApiError),

    #[error("unsupported document '{}': expected .docx, .md or .txt", .0.display())]
    UnsupportedDocument(PathBuf),

    #[error("could not read document '{}': {message}", .path.display())]
    Document { path: PathBuf, message: String },

    #[error("missing {0}; provide it interactively, via the environment or in the config file")]
    MissingInput(&'static str),
}

impl RunError {
    /// Board access failures split into auth vs. everything else.
    pub fn from_board_error(e: ApiError) -> Self {
        if e.is_auth() {
            RunError::Unauthorized(e)
        } else {
            RunError::BoardUnavailable(e)
        }
    }
}
