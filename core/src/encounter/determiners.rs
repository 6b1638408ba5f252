//! Result, mode, and health determiner strategies.
//!
//! Each determiner is a small pure function over the finished log with no
//! state beyond its constructor parameters. None of them fail on missing
//! evidence: absence resolves to `Unknown`/`Normal`/`None`, because older
//! logs simply lack evidence sources the format gained later.

use mistlock_types::{EncounterMode, EncounterResult};

use crate::model::{EventKind, Log};

// ─────────────────────────────────────────────────────────────────────────────
// Result
// ─────────────────────────────────────────────────────────────────────────────

pub trait ResultDeterminer: std::fmt::Debug {
    fn determine(&self, log: &Log) -> EncounterResult;
}

/// Success exactly when the event stream carries a death for the species.
#[derive(Debug)]
pub struct AgentDeathResultDeterminer {
    pub species: u32,
}

impl AgentDeathResultDeterminer {
    pub fn new(species: u32) -> Self {
        Self { species }
    }
}

impl ResultDeterminer for AgentDeathResultDeterminer {
    fn determine(&self, log: &Log) -> EncounterResult {
        if species_died(log, self.species) {
            EncounterResult::Success
        } else {
            EncounterResult::Unknown
        }
    }
}

/// Success once every listed species has a death. Used for multi-target
/// encounters where one corpse is not a kill.
#[derive(Debug)]
pub struct AllSpeciesDeadResultDeterminer {
    pub species: Vec<u32>,
}

impl ResultDeterminer for AllSpeciesDeadResultDeterminer {
    fn determine(&self, log: &Log) -> EncounterResult {
        if !self.species.is_empty() && self.species.iter().all(|&s| species_died(log, s)) {
            EncounterResult::Success
        } else {
            EncounterResult::Unknown
        }
    }
}

/// Success when the instance handed out an end-of-encounter reward. Rewards
/// only exist on newer logs; absence proves nothing.
#[derive(Debug)]
pub struct RewardResultDeterminer;

impl ResultDeterminer for RewardResultDeterminer {
    fn determine(&self, log: &Log) -> EncounterResult {
        let rewarded = log
            .events
            .iter()
            .any(|e| matches!(e.kind, EventKind::Reward { .. }));
        if rewarded {
            EncounterResult::Success
        } else {
            EncounterResult::Unknown
        }
    }
}

/// Failure when the species left combat without ever dying: the squad
/// wiped or walked away and tracking shut down.
#[derive(Debug)]
pub struct ExitCombatResultDeterminer {
    pub species: u32,
}

impl ResultDeterminer for ExitCombatResultDeterminer {
    fn determine(&self, log: &Log) -> EncounterResult {
        if species_died(log, self.species) {
            return EncounterResult::Unknown;
        }
        let exited = log.events.iter().any(|e| match e.kind {
            EventKind::ExitCombat { agent } => {
                log.agents
                    .get(agent)
                    .and_then(|a| a.species_id())
                    == Some(self.species)
            }
            _ => false,
        });
        if exited {
            EncounterResult::Failure
        } else {
            EncounterResult::Unknown
        }
    }
}

fn species_died(log: &Log, species: u32) -> bool {
    log.events.iter().any(|e| match e.kind {
        EventKind::ChangeDead { agent } => {
            log.agents.get(agent).and_then(|a| a.species_id()) == Some(species)
        }
        _ => false,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Mode
// ─────────────────────────────────────────────────────────────────────────────

pub trait ModeDeterminer: std::fmt::Debug {
    fn determine(&self, log: &Log) -> EncounterMode;
}

/// Challenge when the marker buff was ever applied.
#[derive(Debug)]
pub struct BuffPresenceModeDeterminer {
    pub buff: u32,
}

impl ModeDeterminer for BuffPresenceModeDeterminer {
    fn determine(&self, log: &Log) -> EncounterMode {
        let Some(skill) = log.skills.lookup(self.buff) else {
            return EncounterMode::Normal;
        };
        let present = log.events.iter().any(|e| match e.kind {
            EventKind::BuffApply { skill: s, .. } => s == skill,
            _ => false,
        });
        if present {
            EncounterMode::Challenge
        } else {
            EncounterMode::Normal
        }
    }
}

/// Challenge when the species reports a max health at or above the
/// threshold; challenge variants of a boss get a larger health pool.
#[derive(Debug)]
pub struct MaxHealthModeDeterminer {
    pub species: u32,
    pub threshold: u64,
}

impl ModeDeterminer for MaxHealthModeDeterminer {
    fn determine(&self, log: &Log) -> EncounterMode {
        let raised = log.events.iter().any(|e| match e.kind {
            EventKind::MaxHealthUpdate { agent, max } => {
                max >= self.threshold
                    && log.agents.get(agent).and_then(|a| a.species_id()) == Some(self.species)
            }
            _ => false,
        });
        if raised {
            EncounterMode::Challenge
        } else {
            EncounterMode::Normal
        }
    }
}

/// Challenge when a marker skill was ever cast or dealt damage.
#[derive(Debug)]
pub struct SkillCastModeDeterminer {
    pub skill: u32,
}

impl ModeDeterminer for SkillCastModeDeterminer {
    fn determine(&self, log: &Log) -> EncounterMode {
        let Some(skill) = log.skills.lookup(self.skill) else {
            return EncounterMode::Normal;
        };
        let seen = log.events.iter().any(|e| match e.kind {
            EventKind::CastStart { skill: s, .. }
            | EventKind::Damage { skill: s, .. }
            | EventKind::BuffDamage { skill: s, .. } => s == skill,
            _ => false,
        });
        if seen {
            EncounterMode::Challenge
        } else {
            EncounterMode::Normal
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

pub trait HealthDeterminer: std::fmt::Debug {
    /// Final health percentage of the tracked target, when the log carries
    /// any health updates for it.
    fn final_health(&self, log: &Log) -> Option<f32>;
}

/// Takes the last health update the species reported.
#[derive(Debug)]
pub struct LastHealthUpdateDeterminer {
    pub species: u32,
}

impl HealthDeterminer for LastHealthUpdateDeterminer {
    fn final_health(&self, log: &Log) -> Option<f32> {
        log.events.iter().rev().find_map(|e| match e.kind {
            EventKind::HealthUpdate { agent, percent } => {
                (log.agents.get(agent).and_then(|a| a.species_id()) == Some(self.species))
                    .then_some(percent)
            }
            _ => None,
        })
    }
}
