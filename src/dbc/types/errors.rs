use std::io;
use thiserror::Error;

/// Errors produced while reading a `.dbc` file into a
/// [`Network`](crate::dbc::types::network::Network).
#[derive(Debug, Error)]
pub enum DbcParseError {
    #[error("Not a valid .dbc file: {path}")]
    InvalidExtension { path: String },
    #[error("Failed to open '{path}'. \nError: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading '{path}'. \nError: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading the DBC stream. \nError: {source}")]
    Stream {
        #[source]
        source: io::Error,
    },
}

/// Errors produced while writing a [`Network`](crate::dbc::types::network::Network)
/// back to DBC text.
#[derive(Debug, Error)]
pub enum DbcSaveError {
    #[error("Failed to create '{path}'. \nError: {source}")]
    CreateFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while writing the DBC stream. \nError: {source}")]
    Write {
        #[source]
        source: io::Error,
    },
}

/// Errors produced by the signal value conversions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Signal factor is zero; physical value cannot be converted to raw")]
    ZeroFactor,
}
