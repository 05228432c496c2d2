// error.rs
// Error values for directory resolution and EWS query operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a delegated EWS operation can surface to its caller.
///
/// An empty calendar range is not represented here; calendar queries report
/// it as `None`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no directory entry matches identity '{identity}'")]
    IdentityNotFound { identity: String },

    #[error("expected exactly one match, identity '{identity}' resulted in {matches} matches")]
    IdentityAmbiguous { identity: String, matches: usize },

    #[error("directory entry has no objectSid value")]
    MissingSidAttribute,

    #[error("invalid security identifier: {0}")]
    InvalidSid(String),

    #[error("directory lookup failed")]
    Directory(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("no folder matched any of the display names {candidates:?}")]
    FolderNotFound { candidates: Vec<String> },

    #[error("folder in response has no folder id")]
    MissingFolderId,

    #[error("{operation} response contained no response message")]
    NoResponseMessage { operation: &'static str },

    #[error("expected only one response message for {operation}, got {count}")]
    UnexpectedMultipleResponses { operation: &'static str, count: usize },

    #[error("expected {expected}, got {actual}")]
    ResponseShapeMismatch {
        expected: &'static str,
        actual: String,
    },

    #[error("server reported a fault: {code}: {message}")]
    RemoteProtocolFault { code: String, message: String },

    #[error("authentication rejected by the server")]
    Authentication,

    #[error("request failed with HTTP status {0}")]
    HttpStatus(u16),

    #[error("HTTP error")]
    Http(#[from] reqwest::Error),

    #[error("failed to write request XML")]
    XmlWrite(#[from] std::io::Error),

    #[error("failed to parse response XML")]
    XmlRead(#[from] quick_xml::DeError),

    #[error("configuration error")]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub(crate) fn shape_mismatch(expected: &'static str, actual: impl Into<String>) -> Self {
        Error::ResponseShapeMismatch {
            expected,
            actual: actual.into(),
        }
    }
}
