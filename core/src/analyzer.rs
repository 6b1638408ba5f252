//! Lazy analyzer facade over a processed log.
//!
//! Each derived value is computed on first access and memoized; the wrapped
//! log is immutable, so there is no invalidation.

use std::cell::OnceCell;

use mistlock_types::{EncounterMode, EncounterResult, EncounterSummary, PlayerSummary};

use crate::context::resolve;
use crate::encounter::phase::Phase;
use crate::model::{AgentKind, Log};

pub struct LogAnalyzer<'log> {
    log: &'log Log,
    result: OnceCell<EncounterResult>,
    mode: OnceCell<EncounterMode>,
    duration: OnceCell<i64>,
    players: OnceCell<Vec<PlayerSummary>>,
    phases: OnceCell<Vec<Phase>>,
}

impl Log {
    pub fn analyzer(&self) -> LogAnalyzer<'_> {
        LogAnalyzer {
            log: self,
            result: OnceCell::new(),
            mode: OnceCell::new(),
            duration: OnceCell::new(),
            players: OnceCell::new(),
            phases: OnceCell::new(),
        }
    }
}

impl<'log> LogAnalyzer<'log> {
    pub fn log(&self) -> &'log Log {
        self.log
    }

    /// Encounter display name.
    pub fn encounter_name(&self) -> String {
        self.log.encounter.name(&self.log.agents)
    }

    pub fn result(&self) -> EncounterResult {
        *self
            .result
            .get_or_init(|| self.log.encounter.determine_result(self.log))
    }

    pub fn mode(&self) -> EncounterMode {
        *self
            .mode
            .get_or_init(|| self.log.encounter.determine_mode(self.log))
    }

    /// Fight duration in milliseconds: from the first sighting of a target
    /// (or the first event) to the last event.
    pub fn duration_ms(&self) -> i64 {
        *self.duration.get_or_init(|| {
            let start = self
                .log
                .encounter
                .targets
                .iter()
                .filter_map(|&id| self.log.agents.get(id))
                .map(|a| a.first_aware)
                .min()
                .or_else(|| self.log.first_event_time())
                .unwrap_or(0);
            let end = self.log.last_event_time().unwrap_or(start);
            end - start
        })
    }

    /// Final health percentage of the primary target, when known.
    pub fn final_target_health(&self) -> Option<f32> {
        self.log.encounter.final_target_health(self.log)
    }

    pub fn players(&self) -> &[PlayerSummary] {
        self.players.get_or_init(|| {
            let mut players: Vec<PlayerSummary> = self
                .log
                .agents
                .players()
                .map(|agent| {
                    let AgentKind::Player {
                        account,
                        subgroup,
                        profession,
                        elite_spec,
                    } = agent.kind
                    else {
                        unreachable!("players() yields only player agents");
                    };
                    PlayerSummary {
                        character: agent.name().to_string(),
                        account: resolve(account).to_string(),
                        subgroup,
                        profession,
                        elite_spec,
                    }
                })
                .collect();
            players.sort_by(|a, b| (a.subgroup, &a.character).cmp(&(b.subgroup, &b.character)));
            players
        })
    }

    /// Phase partition of the event stream, computed once.
    pub fn phases(&self) -> &[Phase] {
        self.phases.get_or_init(|| {
            self.log.encounter.phase_splitter().split(
                &self.log.events,
                &self.log.agents,
                &self.log.skills,
                &self.log.encounter.targets,
            )
        })
    }

    /// The terminal summary value handed to external consumers.
    pub fn summary(&self) -> EncounterSummary {
        EncounterSummary {
            encounter: self.encounter_name(),
            kind: self.log.encounter.kind(),
            result: self.result(),
            mode: self.mode(),
            duration_ms: self.duration_ms(),
            players: self.players().to_vec(),
        }
    }
}
