use std::io;
use thiserror::Error;

use crate::types::database::DatabaseDBC;

/// Errors produced while loading a `.dbc` file.
#[derive(Debug, Error)]
pub enum DbcParseError {
    #[error("The given database file does not exist: {path}")]
    FileNotFound { path: String },
    #[error("Failed while reading '{path}'. \nError: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    /// A statement could not be interpreted. Parsing stops at the first bad
    /// statement; everything committed before it rides along in `partial`.
    #[error("Failed to load database at `{statement}`. \nError: {source}")]
    Loading {
        statement: String,
        #[source]
        source: StatementError,
        partial: Box<DatabaseDBC>,
    },
}

/// Errors raised while interpreting a single DBC statement.
#[derive(Debug, Error)]
pub enum StatementError {
    #[error("invalid {field} '{token}'")]
    InvalidNumber { field: &'static str, token: String },
    #[error("statement is missing its {field}")]
    MissingField { field: &'static str },
    #[error("message id {id_hex} is already assigned to an existing message")]
    DuplicateMessageId { id_hex: String },
    #[error("signal '{name}' is already defined in message {id_hex}")]
    DuplicateSignal { name: String, id_hex: String },
    #[error("send type index {index} is not defined by any attribute definition")]
    UnknownSendType { index: usize },
    #[error(transparent)]
    Layout(#[from] MessageLayoutError),
}

/// Errors produced while verifying that a signal fits a message layout.
#[derive(Debug, Error)]
pub enum MessageLayoutError {
    #[error("Signal bit length cannot be zero")]
    ZeroBitLength,
    #[error(
        "Out of bounds (Intel)! \nSignal end bit = {end} \nMessage total bits = {total_bits} (bytes={dlc})"
    )]
    IntelOutOfBounds {
        end: usize,
        total_bits: usize,
        dlc: u16,
    },
    #[error(
        "Out of bounds (Motorola)! \nSignal linearized start = {start} \nMessage total bits = {total_bits} (bytes={dlc})"
    )]
    MotorolaStartOutOfBounds {
        start: usize,
        total_bits: usize,
        dlc: u16,
    },
    #[error(
        "Out of bounds (Motorola)! \nSignal linearized end = {end} \nMessage total bits = {total_bits} (bytes={dlc})"
    )]
    MotorolaEndOutOfBounds {
        end: usize,
        total_bits: usize,
        dlc: u16,
    },
}
