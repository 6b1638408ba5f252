//! End-to-end analyzer tests over hand-assembled logs.

use mistlock_types::{EncounterKind, EncounterMode, EncounterResult};

use crate::context::intern;
use crate::encounter::EncounterData;
use crate::evtc::{RawSkill, StrikeResult};
use crate::model::{
    Agent, AgentId, AgentKind, AgentTable, Event, EventKind, Log, SkillId, SkillTable,
};

fn player(index: usize, character: &str, account: &str, subgroup: u8) -> Agent {
    Agent {
        id: AgentId::new(index),
        address: 100 + index as u64,
        name: intern(character),
        first_aware: 0,
        last_aware: 5000,
        master: None,
        minions: Vec::new(),
        hitbox_width: 48,
        hitbox_height: 96,
        kind: AgentKind::Player {
            account: intern(account),
            subgroup,
            profession: 6,
            elite_spec: 55,
        },
    }
}

fn boss(index: usize, species_id: u32, first: i64, last: i64) -> Agent {
    Agent {
        id: AgentId::new(index),
        address: 100 + index as u64,
        name: intern("Vale Guardian"),
        first_aware: first,
        last_aware: last,
        master: None,
        minions: Vec::new(),
        hitbox_width: 96,
        hitbox_height: 192,
        kind: AgentKind::Npc {
            species_id,
            toughness: 10,
            concentration: 0,
            healing: 0,
            condition: 0,
        },
    }
}

fn make_log(trigger_id: u16, agents: Vec<Agent>, events: Vec<Event>) -> Log {
    let agents = AgentTable::new(agents);
    let encounter = EncounterData::resolve(trigger_id, &agents);
    Log {
        build: "EVTC20230716".to_string(),
        revision: 1,
        trigger_id,
        agents,
        skills: SkillTable::from_raw(&[RawSkill {
            id: 9000,
            name: intern("Greatsword Swing"),
        }]),
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

/// The canonical scenario: one boss aware over [0, 5000], a death event at
/// t=5000, no challenge markers.
#[test]
fn boss_kill_yields_success_normal_and_duration() {
    let agents = vec![player(0, "Zyn Firstlight", "Zyn.1234", 2), boss(1, 15438, 0, 5000)];
    let events = vec![
        damage(0, 0, 1),
        damage(2500, 0, 1),
        Event {
            time: 5000,
            kind: EventKind::ChangeDead {
                agent: AgentId::new(1),
            },
        },
    ];
    let log = make_log(15438, agents, events);
    let analyzer = log.analyzer();

    assert_eq!(analyzer.encounter_name(), "Vale Guardian");
    assert_eq!(analyzer.result(), EncounterResult::Success);
    assert_eq!(analyzer.mode(), EncounterMode::Normal);
    assert_eq!(analyzer.duration_ms(), 5000);
}

#[test]
fn repeated_access_returns_the_memoized_value() {
    let agents = vec![player(0, "Zyn", "Zyn.1234", 1), boss(1, 15438, 0, 5000)];
    let log = make_log(15438, agents, vec![damage(1000, 0, 1)]);
    let analyzer = log.analyzer();

    let first = analyzer.result();
    let second = analyzer.result();
    assert_eq!(first, second);
    assert_eq!(analyzer.duration_ms(), analyzer.duration_ms());
    assert_eq!(analyzer.players().len(), analyzer.players().len());
}

#[test]
fn players_are_listed_by_subgroup_then_name() {
    let agents = vec![
        player(0, "Second Player", "Second.2222", 2),
        player(1, "First Player", "First.1111", 1),
        player(2, "Also Group One", "Also.3333", 1),
        boss(3, 15438, 0, 5000),
    ];
    let log = make_log(15438, agents, vec![damage(1000, 0, 3)]);
    let analyzer = log.analyzer();

    let players = analyzer.players();
    assert_eq!(players.len(), 3);
    assert_eq!(players[0].character, "Also Group One");
    assert_eq!(players[1].character, "First Player");
    assert_eq!(players[2].character, "Second Player");
    assert_eq!(players[0].subgroup, 1);
    assert_eq!(players[2].subgroup, 2);
}

#[test]
fn summary_carries_all_derived_values() {
    let agents = vec![player(0, "Zyn Firstlight", "Zyn.1234", 2), boss(1, 15438, 1000, 6000)];
    let events = vec![
        damage(1000, 0, 1),
        Event {
            time: 6000,
            kind: EventKind::ChangeDead {
                agent: AgentId::new(1),
            },
        },
    ];
    let log = make_log(15438, agents, events);
    let summary = log.analyzer().summary();

    assert_eq!(summary.encounter, "Vale Guardian");
    assert_eq!(summary.kind, Some(EncounterKind::Raid));
    assert_eq!(summary.result, EncounterResult::Success);
    assert_eq!(summary.mode, EncounterMode::Normal);
    assert_eq!(summary.duration_ms, 5000);
    assert_eq!(summary.players.len(), 1);
    assert_eq!(summary.players[0].account, "Zyn.1234");
}

#[test]
fn empty_log_degrades_to_unknown() {
    let log = make_log(15438, Vec::new(), Vec::new());
    let analyzer = log.analyzer();

    assert_eq!(analyzer.result(), EncounterResult::Unknown);
    assert_eq!(analyzer.mode(), EncounterMode::Normal);
    assert_eq!(analyzer.duration_ms(), 0);
    assert!(analyzer.players().is_empty());
    assert!(analyzer.phases().is_empty());
}
