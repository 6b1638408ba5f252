//! The terminal immutable log snapshot.

use super::agent::AgentTable;
use super::event::Event;
use super::skill::SkillTable;
use crate::encounter::EncounterData;

/// A fully processed log: final agent set, skill set, ordered event
/// sequence, and the resolved encounter. Treated as immutable by every
/// downstream consumer once the processor hands it out.
#[derive(Debug)]
pub struct Log {
    /// Build identifier from the header, e.g. `EVTC20230716`.
    pub build: String,
    pub revision: u8,
    pub trigger_id: u16,
    pub agents: AgentTable,
    pub skills: SkillTable,
    pub events: Vec<Event>,
    pub encounter: EncounterData,
}

impl Log {
    pub fn first_event_time(&self) -> Option<i64> {
        self.events.first().map(|e| e.time)
    }

    pub fn last_event_time(&self) -> Option<i64> {
        self.events.last().map(|e| e.time)
    }
}
