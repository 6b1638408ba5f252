//! Simulator tests over a hand-assembled log.

use super::*;
use crate::context::intern;
use crate::encounter::EncounterData;
use crate::evtc::RawSkill;
use crate::game_data::buff_id;
use crate::model::{
    Agent, AgentId, AgentKind, AgentTable, BuffRemoveKind, Event, EventKind, Log, SkillTable,
};

fn player(index: usize, name: &str) -> Agent {
    Agent {
        id: AgentId::new(index),
        address: 100 + index as u64,
        name: intern(name),
        first_aware: 0,
        last_aware: 60_000,
        master: None,
        minions: Vec::new(),
        hitbox_width: 48,
        hitbox_height: 96,
        kind: AgentKind::Player {
            account: intern("Test.1234"),
            subgroup: 1,
            profession: 6,
            elite_spec: 0,
        },
    }
}

fn buff_log(events: Vec<Event>) -> Log {
    let agents = AgentTable::new(vec![player(0, "Source"), player(1, "Receiver")]);
    let skills = SkillTable::from_raw(&[RawSkill {
        id: buff_id::MIGHT as i32,
        name: intern("Might"),
    }]);
    let encounter = EncounterData::resolve(0, &agents);
    Log {
        build: "EVTC20230716".to_string(),
        revision: 1,
        trigger_id: 0,
        agents,
        skills,
        events,
        encounter,
    }
}

fn apply(time: i64, skills: &SkillTable, duration_ms: i32) -> Event {
    Event {
        time,
        kind: EventKind::BuffApply {
            src: AgentId::new(0),
            dst: AgentId::new(1),
            skill: skills.lookup(buff_id::MIGHT).unwrap(),
            duration_ms,
            initial: false,
        },
    }
}

fn remove_all(time: i64, skills: &SkillTable) -> Event {
    Event {
        time,
        kind: EventKind::BuffRemove {
            agent: AgentId::new(1),
            by: None,
            skill: skills.lookup(buff_id::MIGHT).unwrap(),
            kind: BuffRemoveKind::All,
            removed_ms: 0,
        },
    }
}

#[test]
fn builds_timeline_with_uptime_and_average() {
    let skills = SkillTable::from_raw(&[RawSkill {
        id: buff_id::MIGHT as i32,
        name: intern("Might"),
    }]);
    let events = vec![
        apply(0, &skills, 10_000),
        apply(2000, &skills, 10_000),
        remove_all(6000, &skills),
        Event {
            time: 10_000,
            kind: EventKind::ExitCombat {
                agent: AgentId::new(1),
            },
        },
    ];
    let log = buff_log(events);

    let timelines = BuffSimulator::boons().simulate(&log);
    assert_eq!(timelines.len(), 1);
    let timeline = &timelines[0];
    assert_eq!(timeline.agent, AgentId::new(1));
    assert_eq!(timeline.buff, buff_id::MIGHT);

    // Covered 0..10000, with stacks 0 after the strip at 6000.
    assert_eq!(timeline.uptime_ms(), 6000);
    assert!((timeline.uptime_fraction() - 0.6).abs() < 1e-9);

    // 1 stack for 2s, 2 stacks for 4s, 0 for 4s -> (2 + 8) / 10.
    assert!((timeline.average_stacks() - 1.0).abs() < 1e-9);
}

#[test]
fn untracked_buffs_are_ignored() {
    let mut skills = SkillTable::from_raw(&[RawSkill {
        id: buff_id::MIGHT as i32,
        name: intern("Might"),
    }]);
    let untracked = skills.resolve_or_insert(999);

    let log = buff_log(vec![Event {
        time: 0,
        kind: EventKind::BuffApply {
            src: AgentId::new(0),
            dst: AgentId::new(1),
            skill: untracked,
            duration_ms: 5000,
            initial: false,
        },
    }]);

    let timelines = BuffSimulator::boons().simulate(&log);
    assert!(timelines.is_empty());
}

#[test]
fn removal_before_any_application_is_tolerated() {
    let skills = SkillTable::from_raw(&[RawSkill {
        id: buff_id::MIGHT as i32,
        name: intern("Might"),
    }]);
    let log = buff_log(vec![remove_all(1000, &skills)]);

    let timelines = BuffSimulator::boons().simulate(&log);
    assert!(timelines.is_empty());
}
