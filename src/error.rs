use std::io;

use thiserror::Error;

/// Errors that abort decoding a wire message or dispatching a request.
///
/// Conditions that are recoverable within a single request (an expired
/// variables reference, an expression that raised) are not represented
/// here; they are folded directly into the response body instead, since
/// the client needs to see them, not have the connection torn down.
#[derive(Error, Debug)]
pub enum DapError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("malformed message header or body")]
    BadMessage,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing required argument: {0}")]
    MissingArguments(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
