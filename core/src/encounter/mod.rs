//! Encounter identity and per-encounter strategies.

pub mod determiners;
pub mod phase;

#[cfg(test)]
mod tests;

use mistlock_types::{EncounterKind, EncounterMode, EncounterResult};

use crate::game_data::{
    EncounterInfo, PhaseDef, PhaseTriggerDef, identify_potential_encounters,
    lookup_species_name,
};
use crate::model::{AgentId, AgentTable, Log};
use determiners::{
    AgentDeathResultDeterminer, AllSpeciesDeadResultDeterminer, BuffPresenceModeDeterminer,
    ExitCombatResultDeterminer, HealthDeterminer, LastHealthUpdateDeterminer,
    MaxHealthModeDeterminer, ModeDeterminer, ResultDeterminer, RewardResultDeterminer,
    SkillCastModeDeterminer,
};
use phase::PhaseSplitter;

const FALLBACK_PHASES: &[PhaseDef] = &[PhaseDef {
    name: "Full Fight",
    trigger: PhaseTriggerDef::TimeOffset { ms: 0 },
}];

/// Resolved encounter identity plus the strategies that read it.
///
/// Immutable once the log is built, except for `targets`: the agent-merge
/// step substitutes entries when a target instance is merged away.
#[derive(Debug)]
pub struct EncounterData {
    pub info: Option<&'static EncounterInfo>,
    pub trigger_id: u16,
    /// Target agents present in this log.
    pub targets: Vec<AgentId>,
    result_determiners: Vec<Box<dyn ResultDeterminer>>,
    mode_determiners: Vec<Box<dyn ModeDeterminer>>,
    health_determiner: Box<dyn HealthDeterminer>,
}

impl EncounterData {
    /// Identify the encounter for a trigger id, disambiguating shared ids by
    /// the species actually present in the agent table.
    pub fn resolve(trigger_id: u16, agents: &AgentTable) -> Self {
        let candidates = identify_potential_encounters(trigger_id);
        let info = candidates
            .iter()
            .find(|c| {
                !c.required_species.is_empty()
                    && c.required_species.iter().all(|&s| agents.has_species(s))
            })
            .or_else(|| candidates.iter().find(|c| c.required_species.is_empty()))
            .or_else(|| candidates.first())
            .copied();

        let target_species: Vec<u32> = match info {
            Some(info) => info.targets.to_vec(),
            None => vec![trigger_id as u32],
        };
        let targets: Vec<AgentId> = target_species
            .iter()
            .flat_map(|&s| agents.of_species(s).map(|a| a.id))
            .collect();

        let primary = target_species.first().copied().unwrap_or(trigger_id as u32);

        let mut result_determiners: Vec<Box<dyn ResultDeterminer>> = Vec::new();
        if target_species.len() > 1 {
            result_determiners.push(Box::new(AllSpeciesDeadResultDeterminer {
                species: target_species.clone(),
            }));
        } else {
            result_determiners.push(Box::new(AgentDeathResultDeterminer::new(primary)));
        }
        result_determiners.push(Box::new(RewardResultDeterminer));
        result_determiners.push(Box::new(ExitCombatResultDeterminer { species: primary }));

        let mut mode_determiners: Vec<Box<dyn ModeDeterminer>> = Vec::new();
        if let Some(info) = info {
            for &buff in info.challenge_buffs {
                mode_determiners.push(Box::new(BuffPresenceModeDeterminer { buff }));
            }
            for &(species, threshold) in info.challenge_health {
                mode_determiners.push(Box::new(MaxHealthModeDeterminer { species, threshold }));
            }
            for &skill in info.challenge_skills {
                mode_determiners.push(Box::new(SkillCastModeDeterminer { skill }));
            }
        }

        Self {
            info,
            trigger_id,
            targets,
            result_determiners,
            mode_determiners,
            health_determiner: Box::new(LastHealthUpdateDeterminer { species: primary }),
        }
    }

    /// Encounter display name: registry name, else the trigger species
    /// name, else the name the agent table carries for it.
    pub fn name(&self, agents: &AgentTable) -> String {
        if let Some(info) = self.info {
            return info.name.to_string();
        }
        if let Some(name) = lookup_species_name(self.trigger_id as u32) {
            return name.to_string();
        }
        self.targets
            .first()
            .and_then(|&id| agents.get(id))
            .map(|a| a.name().to_string())
            .unwrap_or_else(|| format!("Unknown Encounter ({})", self.trigger_id))
    }

    pub fn kind(&self) -> Option<EncounterKind> {
        self.info.map(|i| i.kind)
    }

    /// Build a fresh phase splitter. Triggers are stateful, so every split
    /// gets its own set.
    pub fn phase_splitter(&self) -> PhaseSplitter {
        let defs = match self.info {
            Some(info) if !info.phases.is_empty() => info.phases,
            _ => FALLBACK_PHASES,
        };
        PhaseSplitter::from_defs(defs)
    }

    /// First non-Unknown verdict from the determiner chain.
    pub fn determine_result(&self, log: &Log) -> EncounterResult {
        for determiner in &self.result_determiners {
            let verdict = determiner.determine(log);
            if verdict != EncounterResult::Unknown {
                return verdict;
            }
        }
        EncounterResult::Unknown
    }

    /// Challenge as soon as any determiner finds its evidence.
    pub fn determine_mode(&self, log: &Log) -> EncounterMode {
        for determiner in &self.mode_determiners {
            if determiner.determine(log) == EncounterMode::Challenge {
                return EncounterMode::Challenge;
            }
        }
        EncounterMode::Normal
    }

    pub fn final_target_health(&self, log: &Log) -> Option<f32> {
        self.health_determiner.final_health(log)
    }
}
