//! The typed event stream.
//!
//! One closed sum over every event kind the classifier produces. Each
//! variant carries only what its kind needs, and agent/skill references are
//! table indices. `remap_agents` is the single place the merge rewrite has
//! to visit; adding a variant without handling it there is a compile error.

use super::agent::AgentId;
use super::skill::SkillId;
use crate::evtc::{CastEndKind, StrikeResult};

/// Why a buff stack was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuffRemoveKind {
    /// All stacks cleared at once.
    All,
    /// One stack expired or was stripped.
    Single,
    /// Removed by the owning effect's own logic.
    Manual,
}

/// One event, ordered by `time` within the log's event sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub time: i64,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    // Agent lifecycle
    Spawn {
        agent: AgentId,
    },
    Despawn {
        agent: AgentId,
    },
    EnterCombat {
        agent: AgentId,
        subgroup: u64,
    },
    ExitCombat {
        agent: AgentId,
    },
    ChangeUp {
        agent: AgentId,
    },
    ChangeDown {
        agent: AgentId,
    },
    ChangeDead {
        agent: AgentId,
    },
    HealthUpdate {
        agent: AgentId,
        percent: f32,
    },
    MaxHealthUpdate {
        agent: AgentId,
        max: u64,
    },
    WeaponSwap {
        agent: AgentId,
        set: u64,
    },
    TeamChange {
        agent: AgentId,
        team: u64,
    },
    Position {
        agent: AgentId,
        pos: [f32; 3],
    },
    Velocity {
        agent: AgentId,
        vel: [f32; 3],
    },
    Facing {
        agent: AgentId,
        dir: [f32; 2],
    },

    // File-wide metadata
    LogStart {
        server_unix: u32,
        local_unix: u32,
    },
    LogEnd {
        server_unix: u32,
        local_unix: u32,
    },
    PointOfView {
        agent: AgentId,
    },
    GameBuild {
        build: u64,
    },
    ShardId {
        shard: u64,
    },
    MapId {
        map: u64,
    },
    Language {
        language: u64,
    },
    Reward {
        reward_id: u64,
        reward_kind: i32,
    },

    // Combat
    Damage {
        src: AgentId,
        dst: AgentId,
        skill: SkillId,
        value: i32,
        result: StrikeResult,
        is_ninety: bool,
        is_fifty: bool,
        is_moving: bool,
        is_flanking: bool,
        via_shields: bool,
    },
    BuffDamage {
        src: AgentId,
        dst: AgentId,
        skill: SkillId,
        value: i32,
        off_cycle: bool,
    },
    BuffApply {
        src: AgentId,
        dst: AgentId,
        skill: SkillId,
        duration_ms: i32,
        /// Pre-log state replayed at log start rather than a fresh cast.
        initial: bool,
    },
    BuffRemove {
        /// Agent losing the stack(s).
        agent: AgentId,
        /// Remover, when the wire identifies one.
        by: Option<AgentId>,
        skill: SkillId,
        kind: BuffRemoveKind,
        /// Remaining duration of the removed stack in ms.
        removed_ms: i32,
    },
    StackActive {
        agent: AgentId,
        stack_id: u32,
    },
    StackReset {
        agent: AgentId,
        skill: SkillId,
        duration_ms: i32,
    },
    CastStart {
        agent: AgentId,
        skill: SkillId,
        expected_ms: i32,
        quickness: bool,
    },
    CastEnd {
        agent: AgentId,
        skill: SkillId,
        actual_ms: i32,
        kind: CastEndKind,
    },
}

impl EventKind {
    /// Rewrite every agent reference through `f`. The merge pass is the only
    /// caller; keeping the match exhaustive is what guarantees no reference
    /// site is forgotten when variants are added.
    pub fn remap_agents(&mut self, mut f: impl FnMut(AgentId) -> AgentId) {
        match self {
            EventKind::Spawn { agent }
            | EventKind::Despawn { agent }
            | EventKind::EnterCombat { agent, .. }
            | EventKind::ExitCombat { agent }
            | EventKind::ChangeUp { agent }
            | EventKind::ChangeDown { agent }
            | EventKind::ChangeDead { agent }
            | EventKind::HealthUpdate { agent, .. }
            | EventKind::MaxHealthUpdate { agent, .. }
            | EventKind::WeaponSwap { agent, .. }
            | EventKind::TeamChange { agent, .. }
            | EventKind::Position { agent, .. }
            | EventKind::Velocity { agent, .. }
            | EventKind::Facing { agent, .. }
            | EventKind::PointOfView { agent }
            | EventKind::StackActive { agent, .. }
            | EventKind::StackReset { agent, .. }
            | EventKind::CastStart { agent, .. }
            | EventKind::CastEnd { agent, .. } => *agent = f(*agent),

            EventKind::Damage { src, dst, .. }
            | EventKind::BuffDamage { src, dst, .. }
            | EventKind::BuffApply { src, dst, .. } => {
                *src = f(*src);
                *dst = f(*dst);
            }

            EventKind::BuffRemove { agent, by, .. } => {
                *agent = f(*agent);
                if let Some(by) = by {
                    *by = f(*by);
                }
            }

            EventKind::LogStart { .. }
            | EventKind::LogEnd { .. }
            | EventKind::GameBuild { .. }
            | EventKind::ShardId { .. }
            | EventKind::MapId { .. }
            | EventKind::Language { .. }
            | EventKind::Reward { .. } => {}
        }
    }

    /// Visit every agent reference. Used by the processor's final
    /// cross-reference validation.
    pub fn for_each_agent(&self, mut f: impl FnMut(AgentId)) {
        let mut clone = self.clone();
        clone.remap_agents(|id| {
            f(id);
            id
        });
    }

    /// The skill this event names, if any.
    pub fn skill(&self) -> Option<SkillId> {
        match self {
            EventKind::Damage { skill, .. }
            | EventKind::BuffDamage { skill, .. }
            | EventKind::BuffApply { skill, .. }
            | EventKind::BuffRemove { skill, .. }
            | EventKind::StackReset { skill, .. }
            | EventKind::CastStart { skill, .. }
            | EventKind::CastEnd { skill, .. } => Some(*skill),
            _ => None,
        }
    }
}
