//! Encounter identification data.
//!
//! Maps the trigger species id recorded in the log header to candidate
//! encounter descriptors. A single trigger id can be shared by unrelated
//! content across the game's history, so the lookup returns every candidate
//! and resolution inspects which species are actually present.

use hashbrown::HashMap;
use std::sync::LazyLock;

use mistlock_types::EncounterKind;

use super::buffs::buff_id;

/// Declarative phase boundary used to build the stateful splitter triggers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseTriggerDef {
    /// Fires when any agent of the species enters combat.
    EnterCombat { species: u32 },
    /// Fires once every listed species has a dead agent.
    SpeciesDeath { species: &'static [u32] },
    /// Fires on the first application of the buff to anyone.
    BuffApply { skill: u32 },
    /// Fires when the species' health first drops below the percentage.
    HealthBelow { species: u32, percent: f32 },
    /// Fires once the stream reaches `ms` past its first event.
    TimeOffset { ms: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseDef {
    pub name: &'static str,
    pub trigger: PhaseTriggerDef,
}

/// One recognizable encounter.
#[derive(Debug, PartialEq)]
pub struct EncounterInfo {
    pub name: &'static str,
    pub kind: EncounterKind,
    /// Header trigger ids that can indicate this encounter.
    pub trigger_ids: &'static [u16],
    /// Species that count as encounter targets.
    pub targets: &'static [u32],
    /// Species that must be present for this candidate to win
    /// disambiguation. Empty means no extra requirement.
    pub required_species: &'static [u32],
    /// Species whose split raw agents are merged during post-processing.
    pub merged_species: &'static [u32],
    /// Buffs whose presence marks challenge mode.
    pub challenge_buffs: &'static [u32],
    /// (species, max-health at or above) pairs marking challenge mode.
    pub challenge_health: &'static [(u32, u64)],
    /// Skill casts marking challenge mode.
    pub challenge_skills: &'static [u32],
    /// Phase boundaries; empty means a single full-fight phase.
    pub phases: &'static [PhaseDef],
}

pub static ENCOUNTER_DATA: &[EncounterInfo] = &[
    EncounterInfo {
        name: "Vale Guardian",
        kind: EncounterKind::Raid,
        trigger_ids: &[15438],
        targets: &[15438],
        required_species: &[],
        merged_species: &[],
        challenge_buffs: &[],
        challenge_health: &[],
        challenge_skills: &[],
        phases: &[
            PhaseDef {
                name: "Phase 1",
                trigger: PhaseTriggerDef::EnterCombat { species: 15438 },
            },
            PhaseDef {
                name: "Split 1",
                trigger: PhaseTriggerDef::HealthBelow {
                    species: 15438,
                    percent: 66.0,
                },
            },
            PhaseDef {
                name: "Split 2",
                trigger: PhaseTriggerDef::HealthBelow {
                    species: 15438,
                    percent: 33.0,
                },
            },
        ],
    },
    EncounterInfo {
        name: "Gorseval the Multifarious",
        kind: EncounterKind::Raid,
        trigger_ids: &[15429],
        targets: &[15429],
        required_species: &[],
        merged_species: &[],
        challenge_buffs: &[],
        challenge_health: &[],
        challenge_skills: &[],
        phases: &[
            PhaseDef {
                name: "Phase 1",
                trigger: PhaseTriggerDef::EnterCombat { species: 15429 },
            },
            PhaseDef {
                name: "Phase 2",
                trigger: PhaseTriggerDef::HealthBelow {
                    species: 15429,
                    percent: 66.0,
                },
            },
            PhaseDef {
                name: "Phase 3",
                trigger: PhaseTriggerDef::HealthBelow {
                    species: 15429,
                    percent: 33.0,
                },
            },
        ],
    },
    EncounterInfo {
        name: "Sabetha the Saboteur",
        kind: EncounterKind::Raid,
        trigger_ids: &[15375],
        targets: &[15375],
        required_species: &[],
        merged_species: &[],
        challenge_buffs: &[],
        challenge_health: &[],
        challenge_skills: &[],
        phases: &[
            PhaseDef {
                name: "Phase 1",
                trigger: PhaseTriggerDef::EnterCombat { species: 15375 },
            },
            PhaseDef {
                name: "Kernan",
                trigger: PhaseTriggerDef::HealthBelow {
                    species: 15375,
                    percent: 75.0,
                },
            },
            PhaseDef {
                name: "Knuckles",
                trigger: PhaseTriggerDef::HealthBelow {
                    species: 15375,
                    percent: 50.0,
                },
            },
            PhaseDef {
                name: "Karde",
                trigger: PhaseTriggerDef::HealthBelow {
                    species: 15375,
                    percent: 25.0,
                },
            },
        ],
    },
    EncounterInfo {
        name: "Xera",
        kind: EncounterKind::Raid,
        trigger_ids: &[16246],
        // The second half of the fight is a distinct species; both count.
        targets: &[16246, 16286],
        required_species: &[],
        merged_species: &[16246, 16286],
        challenge_buffs: &[buff_id::XERAS_EMBRACE],
        challenge_health: &[],
        challenge_skills: &[],
        phases: &[],
    },
    EncounterInfo {
        name: "Cairn the Indomitable",
        kind: EncounterKind::Raid,
        trigger_ids: &[17194],
        targets: &[17194],
        required_species: &[],
        merged_species: &[],
        challenge_buffs: &[],
        challenge_health: &[(17194, 25_000_000)],
        challenge_skills: &[],
        phases: &[],
    },
    EncounterInfo {
        name: "Mursaat Overseer",
        kind: EncounterKind::Raid,
        trigger_ids: &[17172],
        targets: &[17172],
        required_species: &[],
        merged_species: &[],
        challenge_buffs: &[],
        challenge_health: &[(17172, 25_000_000)],
        challenge_skills: &[],
        phases: &[],
    },
    EncounterInfo {
        name: "Samarog",
        kind: EncounterKind::Raid,
        trigger_ids: &[17188],
        targets: &[17188],
        required_species: &[],
        merged_species: &[],
        challenge_buffs: &[],
        challenge_health: &[(17188, 36_000_000)],
        challenge_skills: &[],
        phases: &[
            PhaseDef {
                name: "Phase 1",
                trigger: PhaseTriggerDef::EnterCombat { species: 17188 },
            },
            PhaseDef {
                name: "Split 1",
                trigger: PhaseTriggerDef::HealthBelow {
                    species: 17188,
                    percent: 66.0,
                },
            },
            PhaseDef {
                name: "Split 2",
                trigger: PhaseTriggerDef::HealthBelow {
                    species: 17188,
                    percent: 33.0,
                },
            },
        ],
    },
    EncounterInfo {
        name: "Deimos",
        kind: EncounterKind::Raid,
        trigger_ids: &[17154],
        targets: &[17154],
        required_species: &[],
        // Deimos drops out of tracking during teleports and comes back as a
        // fresh raw agent.
        merged_species: &[17154],
        challenge_buffs: &[],
        challenge_health: &[(17154, 42_000_000)],
        challenge_skills: &[],
        phases: &[],
    },
    EncounterInfo {
        name: "Soulless Horror",
        kind: EncounterKind::Raid,
        trigger_ids: &[19767],
        targets: &[19767],
        required_species: &[],
        merged_species: &[],
        challenge_buffs: &[],
        challenge_health: &[(19767, 35_000_000)],
        challenge_skills: &[],
        phases: &[],
    },
    EncounterInfo {
        name: "Dhuum",
        kind: EncounterKind::Raid,
        trigger_ids: &[19450],
        targets: &[19450],
        required_species: &[],
        merged_species: &[19450],
        challenge_buffs: &[],
        challenge_health: &[(19450, 39_000_000)],
        challenge_skills: &[],
        phases: &[
            PhaseDef {
                name: "Pre-event",
                trigger: PhaseTriggerDef::EnterCombat { species: 19450 },
            },
            PhaseDef {
                name: "Main",
                trigger: PhaseTriggerDef::TimeOffset { ms: 30_000 },
            },
        ],
    },
    EncounterInfo {
        name: "Twin Largos",
        kind: EncounterKind::Raid,
        // Either twin can trip the recorder.
        trigger_ids: &[21105, 21089],
        targets: &[21105, 21089],
        required_species: &[],
        merged_species: &[],
        challenge_buffs: &[],
        challenge_health: &[(21105, 19_000_000), (21089, 19_000_000)],
        challenge_skills: &[],
        phases: &[
            PhaseDef {
                name: "Nikare",
                trigger: PhaseTriggerDef::EnterCombat { species: 21105 },
            },
            PhaseDef {
                name: "Kenut",
                trigger: PhaseTriggerDef::SpeciesDeath { species: &[21105] },
            },
        ],
    },
    EncounterInfo {
        name: "Qadim",
        kind: EncounterKind::Raid,
        trigger_ids: &[20934],
        targets: &[20934],
        required_species: &[],
        merged_species: &[],
        challenge_buffs: &[buff_id::QADIM_CHALLENGE_SIGIL],
        challenge_health: &[],
        challenge_skills: &[],
        phases: &[],
    },
    EncounterInfo {
        name: "Skorvald the Shattered",
        kind: EncounterKind::Fractal,
        trigger_ids: &[17632],
        targets: &[17632],
        required_species: &[],
        merged_species: &[17632],
        challenge_buffs: &[buff_id::CHALLENGE_MOTE],
        challenge_health: &[],
        challenge_skills: &[],
        phases: &[
            PhaseDef {
                name: "Phase 1",
                trigger: PhaseTriggerDef::EnterCombat { species: 17632 },
            },
            PhaseDef {
                name: "Islands",
                trigger: PhaseTriggerDef::HealthBelow {
                    species: 17632,
                    percent: 66.0,
                },
            },
        ],
    },
    // Sunqua Peak shares one trigger id between two encounters; presence of
    // the respective manifestation adds tells them apart.
    EncounterInfo {
        name: "Ai, Keeper of the Peak",
        kind: EncounterKind::Fractal,
        trigger_ids: &[23254],
        targets: &[23254],
        required_species: &[23278],
        merged_species: &[],
        challenge_buffs: &[buff_id::CHALLENGE_MOTE],
        challenge_health: &[],
        challenge_skills: &[],
        phases: &[],
    },
    EncounterInfo {
        name: "Dark Ai, Keeper of the Peak",
        kind: EncounterKind::Fractal,
        trigger_ids: &[23254],
        targets: &[23254],
        required_species: &[23230],
        merged_species: &[],
        challenge_buffs: &[buff_id::CHALLENGE_MOTE],
        challenge_health: &[],
        challenge_skills: &[],
        phases: &[],
    },
    EncounterInfo {
        name: "Standard Kitty Golem",
        kind: EncounterKind::Golem,
        trigger_ids: &[16199],
        targets: &[16199],
        required_species: &[],
        merged_species: &[],
        challenge_buffs: &[],
        challenge_health: &[],
        challenge_skills: &[],
        phases: &[],
    },
];

/// Lazy-initialized lookup from trigger id to all candidate encounters.
static TRIGGER_LOOKUP: LazyLock<HashMap<u16, Vec<&'static EncounterInfo>>> =
    LazyLock::new(|| {
        let mut map: HashMap<u16, Vec<&'static EncounterInfo>> = HashMap::new();
        for info in ENCOUNTER_DATA {
            for &trigger_id in info.trigger_ids {
                map.entry(trigger_id).or_default().push(info);
            }
        }
        map
    });

/// All encounters a trigger id could indicate. Zero, one, or several.
pub fn identify_potential_encounters(trigger_id: u16) -> &'static [&'static EncounterInfo] {
    TRIGGER_LOOKUP
        .get(&trigger_id)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_trigger_yields_one_candidate() {
        let candidates = identify_potential_encounters(15438);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Vale Guardian");
    }

    #[test]
    fn shared_trigger_yields_all_candidates() {
        let candidates = identify_potential_encounters(23254);
        assert_eq!(candidates.len(), 2);
        let names: Vec<_> = candidates.iter().map(|c| c.name).collect();
        assert!(names.contains(&"Ai, Keeper of the Peak"));
        assert!(names.contains(&"Dark Ai, Keeper of the Peak"));
    }

    #[test]
    fn either_twin_maps_to_the_largos_encounter() {
        let from_nikare = identify_potential_encounters(21105);
        let from_kenut = identify_potential_encounters(21089);
        assert_eq!(from_nikare.len(), 1);
        assert_eq!(from_nikare[0].name, "Twin Largos");
        assert_eq!(from_kenut[0].name, "Twin Largos");
    }

    #[test]
    fn unknown_trigger_yields_nothing() {
        assert!(identify_potential_encounters(2).is_empty());
    }
}
