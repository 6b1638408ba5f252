//! Encounter resolution, determiner, and phase splitter tests.

use super::*;
use crate::context::intern;
use crate::evtc::{RawSkill, StrikeResult};
use crate::game_data::buff_id;
use crate::model::{
    Agent, AgentId, AgentKind, AgentTable, Event, EventKind, SkillId, SkillTable,
};

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

fn npc(index: usize, species_id: u32, first: i64, last: i64) -> Agent {
    Agent {
        id: AgentId::new(index),
        address: 1000 + index as u64,
        name: intern("Boss"),
        first_aware: first,
        last_aware: last,
        master: None,
        minions: Vec::new(),
        hitbox_width: 96,
        hitbox_height: 192,
        kind: AgentKind::Npc {
            species_id,
            toughness: 0,
            concentration: 0,
            healing: 0,
            condition: 0,
        },
    }
}

fn player(index: usize) -> Agent {
    Agent {
        id: AgentId::new(index),
        address: 1000 + index as u64,
        name: intern("Player One"),
        first_aware: 0,
        last_aware: 600_000,
        master: None,
        minions: Vec::new(),
        hitbox_width: 48,
        hitbox_height: 96,
        kind: AgentKind::Player {
            account: intern("One.1234"),
            subgroup: 1,
            profession: 6,
            elite_spec: 0,
        },
    }
}

fn make_log(trigger_id: u16, agents: Vec<Agent>, events: Vec<Event>) -> Log {
    let agents = AgentTable::new(agents);
    let encounter = EncounterData::resolve(trigger_id, &agents);
    let skills = SkillTable::from_raw(&[
        RawSkill {
            id: 9000,
            name: intern("Greatsword Swing"),
        },
        RawSkill {
            id: buff_id::CHALLENGE_MOTE as i32,
            name: intern("Challenge Mote"),
        },
    ]);
    Log {
        build: "EVTC20230716".to_string(),
        revision: 1,
        trigger_id,
        agents,
        skills,
        events,
        encounter,
    }
}

fn damage(time: i64, src: usize, dst: usize) -> Event {
    Event {
        time,
        kind: EventKind::Damage {
            src: AgentId::new(src),
            dst: AgentId::new(dst),
            skill: SkillId::new(0),
            value: 100,
            result: StrikeResult::Normal,
            is_ninety: false,
            is_fifty: false,
            is_moving: false,
            is_flanking: false,
            via_shields: false,
        },
    }
}

fn enter_combat(time: i64, agent: usize) -> Event {
    Event {
        time,
        kind: EventKind::EnterCombat {
            agent: AgentId::new(agent),
            subgroup: 1,
        },
    }
}

fn health(time: i64, agent: usize, percent: f32) -> Event {
    Event {
        time,
        kind: EventKind::HealthUpdate {
            agent: AgentId::new(agent),
            percent,
        },
    }
}

fn dead(time: i64, agent: usize) -> Event {
    Event {
        time,
        kind: EventKind::ChangeDead {
            agent: AgentId::new(agent),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Encounter resolution
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn resolves_unique_trigger_and_collects_targets() {
    let agents = AgentTable::new(vec![player(0), npc(1, 15438, 0, 5000)]);
    let data = EncounterData::resolve(15438, &agents);

    assert_eq!(data.info.map(|i| i.name), Some("Vale Guardian"));
    assert_eq!(data.targets, vec![AgentId::new(1)]);
    assert_eq!(data.name(&agents), "Vale Guardian");
}

#[test]
fn disambiguates_shared_trigger_by_present_species() {
    // Dark variant: the fear manifestation add is around.
    let agents = AgentTable::new(vec![npc(0, 23254, 0, 1000), npc(1, 23230, 0, 1000)]);
    let data = EncounterData::resolve(23254, &agents);
    assert_eq!(data.info.map(|i| i.name), Some("Dark Ai, Keeper of the Peak"));

    // Elemental variant.
    let agents = AgentTable::new(vec![npc(0, 23254, 0, 1000), npc(1, 23278, 0, 1000)]);
    let data = EncounterData::resolve(23254, &agents);
    assert_eq!(data.info.map(|i| i.name), Some("Ai, Keeper of the Peak"));

    // Neither marker present: fall back to the first candidate.
    let agents = AgentTable::new(vec![npc(0, 23254, 0, 1000)]);
    let data = EncounterData::resolve(23254, &agents);
    assert_eq!(data.info.map(|i| i.name), Some("Ai, Keeper of the Peak"));
}

#[test]
fn unknown_trigger_keeps_species_targets() {
    let agents = AgentTable::new(vec![player(0), npc(1, 4444, 100, 900)]);
    let data = EncounterData::resolve(4444, &agents);

    assert!(data.info.is_none());
    assert_eq!(data.targets, vec![AgentId::new(1)]);
    // Falls back to the agent-table name.
    assert_eq!(data.name(&agents), "Boss");
}

// ─────────────────────────────────────────────────────────────────────────────
// Determiners
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn death_determiner_success_iff_death_present() {
    use determiners::{AgentDeathResultDeterminer, ResultDeterminer};

    let agents = vec![player(0), npc(1, 15438, 0, 5000)];
    let determiner = AgentDeathResultDeterminer::new(15438);

    // Unrelated events only: no verdict.
    let log = make_log(15438, agents.clone(), vec![damage(1000, 0, 1)]);
    assert_eq!(determiner.determine(&log), EncounterResult::Unknown);

    // A death among unrelated events: success, regardless of ordering.
    let log = make_log(
        15438,
        agents,
        vec![dead(500, 1), damage(1000, 0, 1), enter_combat(2000, 1)],
    );
    assert_eq!(determiner.determine(&log), EncounterResult::Success);
}

#[test]
fn exit_without_death_is_a_failure() {
    let agents = vec![player(0), npc(1, 15438, 0, 5000)];
    let log = make_log(
        15438,
        agents,
        vec![
            damage(1000, 0, 1),
            Event {
                time: 4000,
                kind: EventKind::ExitCombat {
                    agent: AgentId::new(1),
                },
            },
        ],
    );
    assert_eq!(log.encounter.determine_result(&log), EncounterResult::Failure);
}

#[test]
fn no_evidence_resolves_to_unknown_not_a_panic() {
    let agents = vec![player(0), npc(1, 15438, 0, 5000)];
    let log = make_log(15438, agents, vec![damage(1000, 0, 1)]);
    assert_eq!(log.encounter.determine_result(&log), EncounterResult::Unknown);
    assert_eq!(log.encounter.determine_mode(&log), EncounterMode::Normal);
    assert_eq!(log.encounter.final_target_health(&log), None);
}

#[test]
fn challenge_mode_from_marker_buff() {
    let agents = vec![player(0), npc(1, 17632, 0, 5000)];
    // Skorvald lists the challenge mote buff.
    let mut log = make_log(17632, agents, Vec::new());
    let mote = log.skills.lookup(buff_id::CHALLENGE_MOTE).unwrap();
    log.events.push(Event {
        time: 100,
        kind: EventKind::BuffApply {
            src: AgentId::new(0),
            dst: AgentId::new(0),
            skill: mote,
            duration_ms: 0,
            initial: false,
        },
    });
    assert_eq!(log.encounter.determine_mode(&log), EncounterMode::Challenge);
}

#[test]
fn challenge_mode_from_raised_max_health() {
    let agents = vec![player(0), npc(1, 17194, 0, 5000)];
    let log = make_log(
        17194,
        agents,
        vec![Event {
            time: 100,
            kind: EventKind::MaxHealthUpdate {
                agent: AgentId::new(1),
                max: 29_000_000,
            },
        }],
    );
    assert_eq!(log.encounter.determine_mode(&log), EncounterMode::Challenge);
}

#[test]
fn final_health_is_last_update() {
    let agents = vec![player(0), npc(1, 15438, 0, 5000)];
    let log = make_log(
        15438,
        agents,
        vec![health(1000, 1, 80.0), health(3000, 1, 42.5)],
    );
    assert_eq!(log.encounter.final_target_health(&log), Some(42.5));
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase splitter
// ─────────────────────────────────────────────────────────────────────────────

#[test]
#[should_panic(expected = "at least one trigger")]
fn splitter_requires_a_trigger() {
    let _ = phase::PhaseSplitter::new(Vec::new());
}

#[test]
fn phase_partition_preserves_the_post_trigger_subsequence() {
    let agents = vec![player(0), npc(1, 15438, 0, 10_000)];
    let events = vec![
        damage(100, 0, 1), // before the first trigger: no phase
        enter_combat(1000, 1),
        damage(1500, 0, 1),
        damage(2500, 0, 1),
        health(3000, 1, 60.0), // below 66: opens Split 1
        damage(3500, 0, 1),
        health(5000, 1, 30.0), // below 33: opens Split 2
        damage(6000, 0, 1),
        dead(7000, 1),
    ];
    let log = make_log(15438, agents, events.clone());

    let phases = log.encounter.phase_splitter().split(
        &log.events,
        &log.agents,
        &log.skills,
        &log.encounter.targets,
    );

    assert_eq!(phases.len(), 3);
    assert_eq!(phases[0].name, "Phase 1");
    assert_eq!(phases[1].name, "Split 1");
    assert_eq!(phases[2].name, "Split 2");

    // Concatenation equals the original subsequence from the first trigger
    // fire onward, with nothing duplicated or reordered.
    let concatenated: Vec<Event> = phases
        .iter()
        .flat_map(|p| p.events.iter().cloned())
        .collect();
    assert_eq!(concatenated, events[1..].to_vec());

    // Ordinals and boundaries line up.
    assert_eq!(phases[0].start, 1000);
    assert_eq!(phases[1].start, 3000);
    assert_eq!(phases[2].start, 5000);
    assert_eq!(phases[2].end, 7000);
    for (ordinal, phase) in phases.iter().enumerate() {
        assert_eq!(phase.ordinal, ordinal);
    }

    // The boss is the important enemy of every phase.
    for phase in &phases {
        assert_eq!(phase.important_enemies, vec![AgentId::new(1)]);
    }
}

#[test]
fn events_before_first_trigger_are_dropped_from_phases() {
    let agents = vec![player(0), npc(1, 15438, 0, 10_000)];
    let events = vec![damage(100, 0, 1), damage(200, 0, 1)];
    let log = make_log(15438, agents, events);

    let phases = log.encounter.phase_splitter().split(
        &log.events,
        &log.agents,
        &log.skills,
        &log.encounter.targets,
    );
    // The enter-combat trigger never fired.
    assert!(phases.is_empty());
}

#[test]
fn final_phase_closes_with_the_last_event() {
    let agents = vec![player(0), npc(1, 15438, 0, 10_000)];
    let events = vec![
        enter_combat(1000, 1),
        damage(2000, 0, 1),
        damage(9000, 0, 1),
    ];
    let log = make_log(15438, agents, events);

    let phases = log.encounter.phase_splitter().split(
        &log.events,
        &log.agents,
        &log.skills,
        &log.encounter.targets,
    );
    assert_eq!(phases.len(), 1);
    assert_eq!(phases[0].start, 1000);
    assert_eq!(phases[0].end, 9000);
    assert_eq!(phases[0].events.len(), 3);
}

#[test]
fn species_death_trigger_waits_for_all_listed_species() {
    use phase::{PhaseTrigger, SpeciesDeathTrigger};

    let agents = AgentTable::new(vec![npc(0, 21105, 0, 10_000), npc(1, 21089, 0, 10_000)]);
    let skills = SkillTable::default();
    let mut trigger = SpeciesDeathTrigger::new(&[21105, 21089], "Both Down");

    assert!(!trigger.fires(&dead(1000, 0), &agents, &skills));
    assert!(!trigger.fires(&damage(1500, 0, 1), &agents, &skills));
    assert!(trigger.fires(&dead(2000, 1), &agents, &skills));
}
