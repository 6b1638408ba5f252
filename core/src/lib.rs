//! EVTC combat-log decoding and encounter analysis.
//!
//! The pipeline is `parse` (bytes to a flat [`evtc::RawLog`]), `process`
//! (raw log to a cross-referenced [`model::Log`]), and
//! [`model::Log::analyzer`] for the lazily computed encounter summary.
//! The buff simulator and phase splitter work over the processed log.

pub mod analyzer;
pub mod buffs;
pub mod context;
pub mod encounter;
pub mod evtc;
pub mod game_data;
pub mod model;
pub mod processor;

#[cfg(test)]
mod analyzer_tests;

pub use analyzer::LogAnalyzer;
pub use buffs::{BuffSimulator, BuffTimeline};
pub use evtc::{EditError, ParseError, anonymize_players, parse, parse_file, strip_guild_records};
pub use model::Log;
pub use processor::{LogProcessor, ProcessError};

/// Process a raw log with the default post-processing configuration.
pub fn process(raw: &evtc::RawLog) -> Result<Log, ProcessError> {
    LogProcessor::new().process(raw)
}
