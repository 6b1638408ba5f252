//! Buff simulation over the processed event stream.
//!
//! Replays apply/remove events in time order into per-agent, per-buff
//! stack collections and exposes uptime/average-stack queries over the
//! resulting segments.

use hashbrown::HashMap;

use super::stacks::{BuffStackCollection, BuffStatusSegment};
use crate::game_data::{buff_id, stack_limit};
use crate::model::{AgentId, BuffRemoveKind, EventKind, Log};

/// Finished occupancy timeline for one agent and one buff.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuffTimeline {
    pub agent: AgentId,
    /// Wire skill id of the buff.
    pub buff: u32,
    pub segments: Vec<BuffStatusSegment>,
}

impl BuffTimeline {
    /// Total time with at least one stack.
    pub fn uptime_ms(&self) -> i64 {
        self.segments
            .iter()
            .filter(|s| s.stacks > 0)
            .map(|s| s.duration_ms())
            .sum()
    }

    /// Uptime as a fraction of the covered interval.
    pub fn uptime_fraction(&self) -> f64 {
        let total: i64 = self.segments.iter().map(|s| s.duration_ms()).sum();
        if total == 0 {
            return 0.0;
        }
        self.uptime_ms() as f64 / total as f64
    }

    /// Time-weighted mean stack count.
    pub fn average_stacks(&self) -> f64 {
        let total: i64 = self.segments.iter().map(|s| s.duration_ms()).sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: i64 = self
            .segments
            .iter()
            .map(|s| s.duration_ms() * s.stacks as i64)
            .sum();
        weighted as f64 / total as f64
    }
}

/// Replays buff events for a configured set of buff ids.
#[derive(Debug, Clone)]
pub struct BuffSimulator {
    tracked: Vec<u32>,
}

impl BuffSimulator {
    pub fn new(tracked: Vec<u32>) -> Self {
        Self { tracked }
    }

    /// The standard boons everyone cares about.
    pub fn boons() -> Self {
        Self::new(vec![
            buff_id::MIGHT,
            buff_id::FURY,
            buff_id::QUICKNESS,
            buff_id::ALACRITY,
            buff_id::PROTECTION,
            buff_id::REGENERATION,
            buff_id::STABILITY,
            buff_id::AEGIS,
            buff_id::VULNERABILITY,
        ])
    }

    /// Build the occupancy timelines. The event stream is already in
    /// non-decreasing time order, which is exactly what the collections
    /// require.
    pub fn simulate(&self, log: &Log) -> Vec<BuffTimeline> {
        let mut collections: HashMap<(AgentId, u32), BuffStackCollection> = HashMap::new();

        for event in &log.events {
            match event.kind {
                EventKind::BuffApply {
                    src,
                    dst,
                    skill,
                    duration_ms,
                    ..
                } => {
                    let Some(buff) = self.tracked_wire_id(log, skill) else {
                        continue;
                    };
                    collections
                        .entry((dst, buff))
                        .or_insert_with(|| BuffStackCollection::new(stack_limit(buff)))
                        .add_stack(event.time, event.time + duration_ms as i64, src);
                }
                EventKind::BuffRemove {
                    agent,
                    skill,
                    kind,
                    removed_ms,
                    ..
                } => {
                    let Some(buff) = self.tracked_wire_id(log, skill) else {
                        continue;
                    };
                    let Some(collection) = collections.get_mut(&(agent, buff)) else {
                        // Removal for a buff we never saw applied; nothing
                        // to do, older logs open mid-application.
                        continue;
                    };
                    match kind {
                        BuffRemoveKind::All => collection.remove_all_stacks(event.time),
                        BuffRemoveKind::Single | BuffRemoveKind::Manual => {
                            collection.remove_stack(event.time, removed_ms as i64)
                        }
                    }
                }
                EventKind::StackReset {
                    agent,
                    skill,
                    duration_ms,
                } => {
                    let Some(buff) = self.tracked_wire_id(log, skill) else {
                        continue;
                    };
                    if let Some(collection) = collections.get_mut(&(agent, buff)) {
                        // A reset restarts the remaining occupancy as one
                        // stack with the reported duration.
                        collection.remove_all_stacks(event.time);
                        collection.add_stack(
                            event.time,
                            event.time + duration_ms as i64,
                            agent,
                        );
                    }
                }
                _ => {}
            }
        }

        let end = log.last_event_time().unwrap_or(0);
        let mut timelines: Vec<BuffTimeline> = collections
            .into_iter()
            .map(|((agent, buff), collection)| BuffTimeline {
                agent,
                buff,
                segments: collection.finalize(end),
            })
            .collect();
        timelines.sort_by_key(|t| (t.agent, t.buff));
        timelines
    }

    fn tracked_wire_id(&self, log: &Log, skill: crate::model::SkillId) -> Option<u32> {
        let wire = log.skills.get(skill)?.id;
        self.tracked.contains(&wire).then_some(wire)
    }
}
