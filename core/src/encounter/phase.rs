//! Phase splitting.
//!
//! A small state machine over an ordered trigger list. Triggers are
//! stateful and own their partial progress; the splitter only ever consults
//! the trigger at the cursor, closing out the accumulated buffer as a phase
//! whenever it fires.

use hashbrown::HashSet;

use crate::game_data::{PhaseDef, PhaseTriggerDef};
use crate::model::{AgentId, AgentTable, Event, EventKind, SkillTable};

/// A named time sub-interval of an encounter.
#[derive(Debug, Clone)]
pub struct Phase {
    pub ordinal: usize,
    pub name: String,
    pub start: i64,
    pub end: i64,
    /// Encounter targets whose aware window overlaps this phase.
    pub important_enemies: Vec<AgentId>,
    /// Copy of the event slice falling inside the phase.
    pub events: Vec<Event>,
}

/// One phase boundary condition. `fires` is consulted only while this
/// trigger is the current one, and the trigger keeps whatever partial
/// progress it needs across those calls.
pub trait PhaseTrigger: std::fmt::Debug {
    fn fires(&mut self, event: &Event, agents: &AgentTable, skills: &SkillTable) -> bool;

    /// Name given to the phase this trigger opens.
    fn phase_name(&self) -> &str;
}

/// Splits an event stream into ordered phases.
#[derive(Debug)]
pub struct PhaseSplitter {
    triggers: Vec<Box<dyn PhaseTrigger>>,
}

impl PhaseSplitter {
    /// Panics when `triggers` is empty; a splitter without triggers is a
    /// programming error, not a data condition.
    pub fn new(triggers: Vec<Box<dyn PhaseTrigger>>) -> Self {
        assert!(
            !triggers.is_empty(),
            "phase splitter requires at least one trigger"
        );
        Self { triggers }
    }

    /// Build the stateful trigger list from declarative phase definitions.
    pub fn from_defs(defs: &[PhaseDef]) -> Self {
        let triggers = defs
            .iter()
            .map(|def| build_trigger(def))
            .collect::<Vec<_>>();
        Self::new(triggers)
    }

    /// Partition `events` into phases.
    ///
    /// Events strictly before the first trigger fires belong to no phase.
    /// Once every trigger has fired, the final phase stays open and is
    /// closed with the last seen event.
    pub fn split(
        mut self,
        events: &[Event],
        agents: &AgentTable,
        skills: &SkillTable,
        targets: &[AgentId],
    ) -> Vec<Phase> {
        let mut phases: Vec<Phase> = Vec::new();
        let mut cursor = 0usize;
        let mut open: Option<(String, i64, Vec<Event>)> = None;

        for event in events {
            if cursor < self.triggers.len()
                && self.triggers[cursor].fires(event, agents, skills)
            {
                let name = self.triggers[cursor].phase_name().to_string();
                if let Some((prev_name, start, buffer)) = open.take() {
                    phases.push(close_phase(
                        phases.len(),
                        prev_name,
                        start,
                        event.time,
                        buffer,
                        targets,
                        agents,
                    ));
                }
                open = Some((name, event.time, Vec::new()));
                cursor += 1;
            }

            if let Some((_, _, buffer)) = &mut open {
                buffer.push(event.clone());
            }
        }

        if let Some((name, start, buffer)) = open {
            let end = events.last().map(|e| e.time).unwrap_or(start);
            phases.push(close_phase(
                phases.len(),
                name,
                start,
                end,
                buffer,
                targets,
                agents,
            ));
        }

        phases
    }
}

fn close_phase(
    ordinal: usize,
    name: String,
    start: i64,
    end: i64,
    events: Vec<Event>,
    targets: &[AgentId],
    agents: &AgentTable,
) -> Phase {
    let important_enemies = targets
        .iter()
        .copied()
        .filter(|&id| {
            agents
                .get(id)
                .map(|a| a.first_aware <= end && start <= a.last_aware)
                .unwrap_or(false)
        })
        .collect();
    Phase {
        ordinal,
        name,
        start,
        end,
        important_enemies,
        events,
    }
}

fn build_trigger(def: &PhaseDef) -> Box<dyn PhaseTrigger> {
    match def.trigger {
        PhaseTriggerDef::EnterCombat { species } => Box::new(EnterCombatTrigger {
            species,
            name: def.name,
        }),
        PhaseTriggerDef::SpeciesDeath { species } => Box::new(SpeciesDeathTrigger {
            species,
            seen_dead: HashSet::new(),
            name: def.name,
        }),
        PhaseTriggerDef::BuffApply { skill } => Box::new(BuffApplyTrigger {
            skill,
            name: def.name,
        }),
        PhaseTriggerDef::HealthBelow { species, percent } => Box::new(HealthBelowTrigger {
            species,
            percent,
            name: def.name,
        }),
        PhaseTriggerDef::TimeOffset { ms } => Box::new(TimeOffsetTrigger {
            offset_ms: ms,
            first_seen: None,
            name: def.name,
        }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Trigger implementations
// ─────────────────────────────────────────────────────────────────────────────

/// Fires when any agent of the species enters combat.
#[derive(Debug)]
pub struct EnterCombatTrigger {
    pub species: u32,
    pub name: &'static str,
}

impl PhaseTrigger for EnterCombatTrigger {
    fn fires(&mut self, event: &Event, agents: &AgentTable, _skills: &SkillTable) -> bool {
        match event.kind {
            EventKind::EnterCombat { agent, .. } => agents
                .get(agent)
                .and_then(|a| a.species_id())
                .is_some_and(|s| s == self.species),
            _ => false,
        }
    }

    fn phase_name(&self) -> &str {
        self.name
    }
}

/// Fires once every listed species has at least one dead agent.
#[derive(Debug)]
pub struct SpeciesDeathTrigger {
    pub species: &'static [u32],
    seen_dead: HashSet<u32>,
    pub name: &'static str,
}

impl SpeciesDeathTrigger {
    pub fn new(species: &'static [u32], name: &'static str) -> Self {
        Self {
            species,
            seen_dead: HashSet::new(),
            name,
        }
    }
}

impl PhaseTrigger for SpeciesDeathTrigger {
    fn fires(&mut self, event: &Event, agents: &AgentTable, _skills: &SkillTable) -> bool {
        if let EventKind::ChangeDead { agent } = event.kind
            && let Some(species) = agents.get(agent).and_then(|a| a.species_id())
            && self.species.contains(&species)
        {
            self.seen_dead.insert(species);
        }
        self.seen_dead.len() == self.species.len()
    }

    fn phase_name(&self) -> &str {
        self.name
    }
}

/// Fires on the first application of the buff to anyone.
#[derive(Debug)]
pub struct BuffApplyTrigger {
    pub skill: u32,
    pub name: &'static str,
}

impl PhaseTrigger for BuffApplyTrigger {
    fn fires(&mut self, event: &Event, _agents: &AgentTable, skills: &SkillTable) -> bool {
        match event.kind {
            EventKind::BuffApply { skill, .. } => {
                skills.get(skill).is_some_and(|s| s.id == self.skill)
            }
            _ => false,
        }
    }

    fn phase_name(&self) -> &str {
        self.name
    }
}

/// Fires when the species' reported health first drops below the threshold.
#[derive(Debug)]
pub struct HealthBelowTrigger {
    pub species: u32,
    pub percent: f32,
    pub name: &'static str,
}

impl PhaseTrigger for HealthBelowTrigger {
    fn fires(&mut self, event: &Event, agents: &AgentTable, _skills: &SkillTable) -> bool {
        match event.kind {
            EventKind::HealthUpdate { agent, percent } => {
                percent < self.percent
                    && agents
                        .get(agent)
                        .and_then(|a| a.species_id())
                        .is_some_and(|s| s == self.species)
            }
            _ => false,
        }
    }

    fn phase_name(&self) -> &str {
        self.name
    }
}

/// Fires once the stream reaches `offset_ms` past its first event.
#[derive(Debug)]
pub struct TimeOffsetTrigger {
    pub offset_ms: i64,
    first_seen: Option<i64>,
    pub name: &'static str,
}

impl TimeOffsetTrigger {
    pub fn new(offset_ms: i64, name: &'static str) -> Self {
        Self {
            offset_ms,
            first_seen: None,
            name,
        }
    }
}

impl PhaseTrigger for TimeOffsetTrigger {
    fn fires(&mut self, event: &Event, _agents: &AgentTable, _skills: &SkillTable) -> bool {
        let first = *self.first_seen.get_or_insert(event.time);
        event.time - first >= self.offset_ms
    }

    fn phase_name(&self) -> &str {
        self.name
    }
}
