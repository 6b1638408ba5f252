//! The central builder.
//!
//! Turns a [`RawLog`] into the typed model: one Agent per raw agent entry,
//! the ordered Event sequence via the classifier, master/minion edges from
//! spawn-time short-id references, and a configurable list of
//! post-processing steps, the important one being the agent merge.

mod error;
mod merge;

pub use error::ProcessError;
pub use merge::{MergeSpeciesStep, PlayerDedupStep};

use hashbrown::HashMap;

use crate::context::{intern, resolve};
use crate::encounter::EncounterData;
use crate::evtc::{
    BuffRemoval, RawLog, RawRecord, RecordClass, StrikeResult, classify, dst_holds_agent,
    src_holds_payload,
};
use crate::model::{
    Agent, AgentId, AgentKind, AgentTable, BuffRemoveKind, Event, EventKind, Log, SkillTable,
};

/// One post-processing pass over the model under construction. Steps run in
/// configuration order and may rewrite agents, events, and the encounter
/// target list, as long as event time order is preserved.
pub trait ProcessingStep: std::fmt::Debug {
    fn name(&self) -> &'static str;
    fn run(&self, build: &mut LogBuild) -> Result<(), ProcessError>;
}

/// Mutable model handed to post-processing steps.
#[derive(Debug)]
pub struct LogBuild {
    pub agents: Vec<Agent>,
    pub events: Vec<Event>,
    /// Encounter target list; merging substitutes entries in place.
    pub targets: Vec<AgentId>,
}

/// Stateless per-log builder. Reusable sequentially; use one instance per
/// log for parallel throughput.
#[derive(Debug, Default)]
pub struct LogProcessor {
    extra_steps: Vec<Box<dyn ProcessingStep + Send + Sync>>,
}

impl LogProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a custom post-processing step after the built-in ones.
    pub fn with_step(mut self, step: Box<dyn ProcessingStep + Send + Sync>) -> Self {
        self.extra_steps.push(step);
        self
    }

    /// Build the fully cross-referenced model.
    pub fn process(&self, raw: &RawLog) -> Result<Log, ProcessError> {
        let mut agents = build_agents(raw);
        let resolver = Resolver::scan(raw, &mut agents);
        finalize_windows(&mut agents);

        let mut skills = SkillTable::from_raw(&raw.skills);
        let events = build_events(raw, &mut agents, &resolver, &mut skills)?;

        let table = AgentTable::new(agents);
        let mut encounter = EncounterData::resolve(raw.trigger_id, &table);

        let mut build = LogBuild {
            agents: table.into_inner(),
            events,
            targets: std::mem::take(&mut encounter.targets),
        };

        let mut steps: Vec<Box<dyn ProcessingStep>> = vec![Box::new(PlayerDedupStep)];
        if let Some(info) = encounter.info {
            for &species in info.merged_species {
                steps.push(Box::new(MergeSpeciesStep { species }));
            }
        }
        for step in steps.iter().map(|s| s.as_ref()).chain(
            self.extra_steps
                .iter()
                .map(|s| s.as_ref() as &dyn ProcessingStep),
        ) {
            tracing::debug!(step = step.name(), "running post-processing step");
            step.run(&mut build)?;
        }

        // Writers flush out-of-order across buffer boundaries now and then;
        // the stable sort keeps equal timestamps in file order.
        build.events.sort_by_key(|e| e.time);

        validate(&build)?;

        encounter.targets = std::mem::take(&mut build.targets);
        Ok(Log {
            build: raw.build.clone(),
            revision: raw.revision.as_byte(),
            trigger_id: raw.trigger_id,
            agents: AgentTable::new(build.agents),
            skills,
            events: build.events,
            encounter,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Agent construction
// ─────────────────────────────────────────────────────────────────────────────

fn build_agents(raw: &RawLog) -> Vec<Agent> {
    use crate::evtc::RawAgentKind;

    raw.agents
        .iter()
        .enumerate()
        .map(|(index, ra)| {
            let kind = match ra.kind {
                RawAgentKind::Player {
                    profession,
                    elite_spec,
                } => AgentKind::Player {
                    account: intern(resolve(ra.name.account).trim_start_matches(':')),
                    subgroup: resolve(ra.name.subgroup).trim().parse().unwrap_or(0),
                    profession,
                    elite_spec,
                },
                RawAgentKind::Npc { species_id } => AgentKind::Npc {
                    species_id,
                    toughness: ra.toughness,
                    concentration: ra.concentration,
                    healing: ra.healing,
                    condition: ra.condition,
                },
                RawAgentKind::Gadget { gadget_id } => AgentKind::Gadget { gadget_id },
            };
            Agent {
                id: AgentId::new(index),
                address: ra.address,
                name: ra.name.character,
                first_aware: i64::MAX,
                last_aware: i64::MIN,
                master: None,
                minions: Vec::new(),
                hitbox_width: ra.hitbox_width,
                hitbox_height: ra.hitbox_height,
                kind,
            }
        })
        .collect()
}

fn finalize_windows(agents: &mut [Agent]) {
    let mut unsighted = 0usize;
    for agent in agents.iter_mut() {
        if agent.first_aware == i64::MAX {
            // Listed in the table but never observed in a record.
            agent.first_aware = 0;
            agent.last_aware = 0;
            unsighted += 1;
        }
    }
    if unsighted > 0 {
        tracing::debug!(unsighted, "agents never sighted in records");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference resolution
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct InstidWindow {
    agent: usize,
    first: i64,
    last: i64,
}

/// Address and short-id lookup tables.
///
/// Both namespaces can be recycled across non-overlapping lifetimes within
/// one file, so every resolution is scoped by the aware-time window.
#[derive(Debug)]
struct Resolver {
    by_address: HashMap<u64, Vec<usize>>,
    by_instid: HashMap<u16, Vec<InstidWindow>>,
}

impl Resolver {
    /// First pass: establish aware windows and short-id bindings.
    fn scan(raw: &RawLog, agents: &mut [Agent]) -> Self {
        let mut by_address: HashMap<u64, Vec<usize>> = HashMap::new();
        for (index, agent) in agents.iter().enumerate() {
            by_address.entry(agent.address).or_default().push(index);
        }
        let mut resolver = Resolver {
            by_address,
            by_instid: HashMap::new(),
        };

        for record in &raw.records {
            let class = classify(record, raw.revision);
            // Guild blobs and unknown kinds still sight their source agent.
            let src_is_agent = class.map(|c| !src_holds_payload(c)).unwrap_or(true);
            if src_is_agent
                && record.src_agent != 0
                && let Some(idx) = resolver.locate(agents, record.src_agent, record.time)
            {
                touch(agents, idx, record.time);
                if record.src_instid != 0 {
                    resolver.bind(record.src_instid, idx, record.time);
                }
            }
            if class.map(dst_holds_agent).unwrap_or(false)
                && record.dst_agent != 0
                && let Some(idx) = resolver.locate(agents, record.dst_agent, record.time)
            {
                touch(agents, idx, record.time);
                if record.dst_instid != 0 {
                    resolver.bind(record.dst_instid, idx, record.time);
                }
            }
        }
        resolver
    }

    /// Pick the agent entry an address refers to at `time`.
    fn locate(&self, agents: &[Agent], address: u64, time: i64) -> Option<usize> {
        let candidates = self.by_address.get(&address)?;
        if candidates.len() == 1 {
            return Some(candidates[0]);
        }
        if let Some(&idx) = candidates
            .iter()
            .find(|&&i| agents[i].is_aware_at(time))
        {
            return Some(idx);
        }
        if let Some(&idx) = candidates
            .iter()
            .find(|&&i| agents[i].first_aware == i64::MAX)
        {
            return Some(idx);
        }
        candidates
            .iter()
            .copied()
            .filter(|&i| agents[i].first_aware <= time)
            .max_by_key(|&i| agents[i].last_aware)
            .or_else(|| candidates.first().copied())
    }

    fn bind(&mut self, instid: u16, agent: usize, time: i64) {
        let windows = self.by_instid.entry(instid).or_default();
        match windows.last_mut() {
            Some(window) if window.agent == agent => window.last = time,
            _ => windows.push(InstidWindow {
                agent,
                first: time,
                last: time,
            }),
        }
    }

    /// Resolve a short id at `time`; short ids are reused across
    /// non-overlapping lifetimes, so only the window containing (or most
    /// recently preceding) the timestamp counts.
    fn resolve_instid(&self, instid: u16, time: i64) -> Option<usize> {
        let windows = self.by_instid.get(&instid)?;
        windows
            .iter()
            .find(|w| w.first <= time && time <= w.last)
            .or_else(|| windows.iter().rev().find(|w| w.first <= time))
            .map(|w| w.agent)
    }
}

fn touch(agents: &mut [Agent], index: usize, time: i64) {
    let agent = &mut agents[index];
    agent.first_aware = agent.first_aware.min(time);
    agent.last_aware = agent.last_aware.max(time);
}

// ─────────────────────────────────────────────────────────────────────────────
// Event construction
// ─────────────────────────────────────────────────────────────────────────────

fn build_events(
    raw: &RawLog,
    agents: &mut [Agent],
    resolver: &Resolver,
    skills: &mut SkillTable,
) -> Result<Vec<Event>, ProcessError> {
    let mut events = Vec::with_capacity(raw.records.len());

    for record in &raw.records {
        let Some(class) = classify(record, raw.revision) else {
            continue;
        };

        let src = if src_holds_payload(class) {
            None
        } else {
            agent_ref(
                resolver,
                agents,
                record.src_agent,
                record.src_instid,
                record.time,
            )?
        };

        if let Some(src_id) = src {
            link_master(agents, resolver, src_id, record.src_master_instid, record.time);
        }

        let kind = if dst_holds_agent(class) {
            let dst = agent_ref(
                resolver,
                agents,
                record.dst_agent,
                record.dst_instid,
                record.time,
            )?;
            if let Some(dst_id) = dst {
                link_master(agents, resolver, dst_id, record.dst_master_instid, record.time);
            }
            match build_combat_kind(class, record, src, dst, skills) {
                Some(kind) => kind,
                None => continue,
            }
        } else {
            match build_state_kind(class, record, src, skills) {
                Some(kind) => kind,
                None => continue,
            }
        };

        events.push(Event {
            time: record.time,
            kind,
        });
    }

    Ok(events)
}

fn build_combat_kind(
    class: RecordClass,
    record: &RawRecord,
    src: Option<AgentId>,
    dst: Option<AgentId>,
    skills: &mut SkillTable,
) -> Option<EventKind> {
    let skill = skills.resolve_or_insert(record.skill_id);
    match class {
        RecordClass::DirectDamage => Some(EventKind::Damage {
            src: src?,
            dst: dst?,
            skill,
            value: record.value,
            result: StrikeResult::from_byte(record.result),
            is_ninety: record.is_ninety,
            is_fifty: record.is_fifty,
            is_moving: record.is_moving,
            is_flanking: record.is_flanking,
            via_shields: record.is_shields,
        }),
        RecordClass::BuffDamage { off_cycle } => Some(EventKind::BuffDamage {
            src: src?,
            dst: dst?,
            skill,
            value: record.buff_dmg,
            off_cycle,
        }),
        RecordClass::BuffApply { initial } => Some(EventKind::BuffApply {
            src: src?,
            dst: dst?,
            skill,
            duration_ms: record.value,
            initial,
        }),
        RecordClass::BuffRemove => {
            let kind = match record.buffremove {
                BuffRemoval::All => BuffRemoveKind::All,
                BuffRemoval::Single => BuffRemoveKind::Single,
                BuffRemoval::Manual => BuffRemoveKind::Manual,
                BuffRemoval::None | BuffRemoval::Unknown(_) => return None,
            };
            Some(EventKind::BuffRemove {
                agent: src?,
                by: dst,
                skill,
                kind,
                removed_ms: record.value,
            })
        }
        _ => None,
    }
}

fn build_state_kind(
    class: RecordClass,
    record: &RawRecord,
    src: Option<AgentId>,
    skills: &mut SkillTable,
) -> Option<EventKind> {
    Some(match class {
        RecordClass::Spawn => EventKind::Spawn { agent: src? },
        RecordClass::Despawn => EventKind::Despawn { agent: src? },
        RecordClass::EnterCombat => EventKind::EnterCombat {
            agent: src?,
            subgroup: record.dst_agent,
        },
        RecordClass::ExitCombat => EventKind::ExitCombat { agent: src? },
        RecordClass::ChangeUp => EventKind::ChangeUp { agent: src? },
        RecordClass::ChangeDown => EventKind::ChangeDown { agent: src? },
        RecordClass::ChangeDead => EventKind::ChangeDead { agent: src? },
        RecordClass::HealthUpdate => EventKind::HealthUpdate {
            agent: src?,
            percent: record.dst_agent as f32 / 100.0,
        },
        RecordClass::MaxHealthUpdate => EventKind::MaxHealthUpdate {
            agent: src?,
            max: record.dst_agent,
        },
        RecordClass::WeaponSwap => EventKind::WeaponSwap {
            agent: src?,
            set: record.dst_agent,
        },
        RecordClass::TeamChange => EventKind::TeamChange {
            agent: src?,
            team: record.dst_agent,
        },
        RecordClass::Position => EventKind::Position {
            agent: src?,
            pos: vec3(record),
        },
        RecordClass::Velocity => EventKind::Velocity {
            agent: src?,
            vel: vec3(record),
        },
        RecordClass::Facing => EventKind::Facing {
            agent: src?,
            dir: vec2(record),
        },
        RecordClass::LogStart => EventKind::LogStart {
            server_unix: record.value as u32,
            local_unix: record.buff_dmg as u32,
        },
        RecordClass::LogEnd => EventKind::LogEnd {
            server_unix: record.value as u32,
            local_unix: record.buff_dmg as u32,
        },
        RecordClass::PointOfView => EventKind::PointOfView { agent: src? },
        RecordClass::GameBuild => EventKind::GameBuild {
            build: record.src_agent,
        },
        RecordClass::ShardId => EventKind::ShardId {
            shard: record.src_agent,
        },
        RecordClass::MapId => EventKind::MapId {
            map: record.src_agent,
        },
        RecordClass::Language => EventKind::Language {
            language: record.src_agent,
        },
        RecordClass::Reward => EventKind::Reward {
            reward_id: record.dst_agent,
            reward_kind: record.value,
        },
        RecordClass::StackActive => EventKind::StackActive {
            agent: src?,
            stack_id: record.dst_agent as u32,
        },
        RecordClass::StackReset => EventKind::StackReset {
            agent: src?,
            skill: skills.resolve_or_insert(record.skill_id),
            duration_ms: record.value,
        },
        RecordClass::CastStart { quickness } => EventKind::CastStart {
            agent: src?,
            skill: skills.resolve_or_insert(record.skill_id),
            expected_ms: record.value,
            quickness,
        },
        RecordClass::CastEnd { kind } => EventKind::CastEnd {
            agent: src?,
            skill: skills.resolve_or_insert(record.skill_id),
            actual_ms: record.value,
            kind,
        },
        RecordClass::DirectDamage
        | RecordClass::BuffDamage { .. }
        | RecordClass::BuffApply { .. }
        | RecordClass::BuffRemove => return None,
    })
}

/// Resolve an agent slot: address first (strong reference; a miss is a
/// model invariant violation), then the short id scoped by time (weak hint;
/// a miss means no agent was involved).
fn agent_ref(
    resolver: &Resolver,
    agents: &[Agent],
    address: u64,
    instid: u16,
    time: i64,
) -> Result<Option<AgentId>, ProcessError> {
    if address != 0 {
        return match resolver.locate(agents, address, time) {
            Some(idx) => Ok(Some(AgentId::new(idx))),
            None => Err(ProcessError::UnknownAgent { time, address }),
        };
    }
    if instid != 0 {
        return Ok(resolver.resolve_instid(instid, time).map(AgentId::new));
    }
    Ok(None)
}

fn link_master(
    agents: &mut [Agent],
    resolver: &Resolver,
    minion: AgentId,
    master_instid: u16,
    time: i64,
) {
    if master_instid == 0 {
        return;
    }
    let Some(master_idx) = resolver.resolve_instid(master_instid, time) else {
        return;
    };
    if master_idx == minion.index() {
        return;
    }
    let master_id = AgentId::new(master_idx);
    if agents[minion.index()].master != Some(master_id) {
        agents[minion.index()].master = Some(master_id);
    }
    if !agents[master_idx].minions.contains(&minion) {
        agents[master_idx].minions.push(minion);
    }
}

fn vec3(record: &RawRecord) -> [f32; 3] {
    [
        f32::from_bits(record.dst_agent as u32),
        f32::from_bits((record.dst_agent >> 32) as u32),
        f32::from_bits(record.value as u32),
    ]
}

fn vec2(record: &RawRecord) -> [f32; 2] {
    [
        f32::from_bits(record.dst_agent as u32),
        f32::from_bits((record.dst_agent >> 32) as u32),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Final validation
// ─────────────────────────────────────────────────────────────────────────────

/// Model invariants checked before the log is handed out: windows are
/// ordered, no event or edge references a removed agent.
fn validate(build: &LogBuild) -> Result<(), ProcessError> {
    let len = build.agents.len();

    for (index, agent) in build.agents.iter().enumerate() {
        if agent.first_aware > agent.last_aware {
            return Err(ProcessError::InvertedAwareWindow {
                index,
                name: agent.name().to_string(),
                first: agent.first_aware,
                last: agent.last_aware,
            });
        }
        if let Some(master) = agent.master
            && master.index() >= len
        {
            return Err(ProcessError::DanglingAgentEdge {
                agent: index,
                edge: "master",
                referenced: master.index(),
            });
        }
        for &minion in &agent.minions {
            if minion.index() >= len {
                return Err(ProcessError::DanglingAgentEdge {
                    agent: index,
                    edge: "minion",
                    referenced: minion.index(),
                });
            }
        }
    }

    for event in &build.events {
        let mut dangling = None;
        event.kind.for_each_agent(|id| {
            if id.index() >= len && dangling.is_none() {
                dangling = Some(id.index());
            }
        });
        if let Some(index) = dangling {
            return Err(ProcessError::DanglingAgentReference {
                time: event.time,
                index,
            });
        }
    }

    Ok(())
}
