//! Error types for EVTC decoding and editing

use std::path::PathBuf;
use thiserror::Error;

/// Errors while decoding an EVTC byte buffer.
///
/// These always indicate malformed or truncated input. The input is static,
/// so none of them are retryable.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("not an EVTC log: bad magic")]
    BadMagic,

    #[error("truncated input: needed {needed} bytes, only {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("malformed build date in header: {build:?}")]
    BadBuildDate { build: String },

    #[error("unsupported format revision {revision}")]
    UnsupportedRevision { revision: u8 },

    #[error("failed to open log file {path}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to memory map file {path}")]
    MemoryMap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the narrow raw-record editing surface.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("format revision {revision} is not on the supported editing list")]
    UnsupportedRevision { revision: u8 },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
