//! EVTC binary log decoding.
//!
//! The layer boundary: everything in here works on flat, wire-shaped data.
//! [`parse`] turns a byte buffer into a [`RawLog`], [`classifier`] gives raw
//! records their semantic meaning, and [`editor`] hosts the two raw-buffer
//! editing operations.

pub mod classifier;
mod editor;
mod error;
mod parser;
mod raw;
mod reader;

pub use classifier::{
    CastEndKind, RecordClass, ValueKind, always_retained, classify, dst_holds_agent,
    src_holds_payload, value_kind,
};
pub use editor::{SUPPORTED_EDIT_REVISIONS, anonymize_players, strip_guild_records};
pub use error::{EditError, ParseError};
pub use parser::{parse, parse_file};
pub use raw::{
    AGENT_NAME_OFFSET, AGENT_NAME_SIZE, AGENT_SIZE, Activation, Affinity, BuffRemoval,
    EVTC_MAGIC, HEADER_SIZE, RECORD_SIZE, RawAgent, RawAgentKind, RawAgentName, RawLog,
    RawRecord, RawSkill, Revision, SKILL_SIZE, StateChange, StrikeResult,
};
pub use reader::ByteReader;
