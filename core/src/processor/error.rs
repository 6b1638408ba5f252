//! Error types for model construction

use thiserror::Error;

/// Internal invariant violations while building the typed model.
///
/// These are not bad-input errors: the parser accepted the file, so a
/// failure here means the classifier or processor disagrees with the data
/// in a way that would corrupt every statistic computed downstream.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("record at t={time} references unknown agent address {address:#x}")]
    UnknownAgent { time: i64, address: u64 },

    #[error("agent {index} ({name}) has inverted aware window {first}..{last}")]
    InvertedAwareWindow {
        index: usize,
        name: String,
        first: i64,
        last: i64,
    },

    #[error("event at t={time} references agent index {index} outside the final table")]
    DanglingAgentReference { time: i64, index: usize },

    #[error("agent {agent} has a dangling {edge} edge to {referenced}")]
    DanglingAgentEdge {
        agent: usize,
        edge: &'static str,
        referenced: usize,
    },
}
