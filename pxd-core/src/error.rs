//! The wire error taxonomy shared by canvas, history, color and protocol.
//!
//! Every fallible operation in this crate returns a [`CoreError`], which
//! carries exactly the `(code, message)` pair the handler writes onto the
//! wire as `err <code> <message>` (see the protocol codec in
//! [`crate::protocol`]).

use thiserror::Error;

/// A single error family with a short lowercase wire code and a free-text
/// message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("{0}")]
    InvalidArgs(String),

    #[error("{0}")]
    InvalidColor(String),

    #[error("{0}")]
    OutOfBounds(String),

    #[error("{0}")]
    NoHistory(String),

    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    InvalidCommand(String),
}

impl CoreError {
    /// The short lowercase identifier written on the wire, e.g. `out_of_bounds`.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidArgs(_) => "invalid_args",
            CoreError::InvalidColor(_) => "invalid_color",
            CoreError::OutOfBounds(_) => "out_of_bounds",
            CoreError::NoHistory(_) => "no_history",
            CoreError::Io(_) => "io",
            CoreError::InvalidCommand(_) => "invalid_command",
        }
    }

    /// The human-readable message, as it appears after the code on the wire.
    pub fn message(&self) -> &str {
        match self {
            CoreError::InvalidArgs(m)
            | CoreError::InvalidColor(m)
            | CoreError::OutOfBounds(m)
            | CoreError::NoHistory(m)
            | CoreError::Io(m)
            | CoreError::InvalidCommand(m) => m,
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io(err.to_string())
    }
}
