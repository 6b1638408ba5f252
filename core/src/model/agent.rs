//! Typed agents and the index-addressed agent table.
//!
//! Agents are addressed by stable table index everywhere downstream: events,
//! master/minion edges, and encounter target lists all hold `AgentId`s. That
//! makes the merge step a table rewrite pass instead of chasing object
//! references.

use crate::context::{IStr, resolve};

/// Stable index into the [`AgentTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct AgentId(u32);

impl AgentId {
    pub fn new(index: usize) -> Self {
        AgentId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Variant payload of an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentKind {
    Player {
        account: IStr,
        subgroup: u8,
        profession: u32,
        elite_spec: u32,
    },
    Npc {
        species_id: u32,
        toughness: i16,
        concentration: i16,
        healing: i16,
        condition: i16,
    },
    Gadget {
        gadget_id: u32,
    },
}

/// One tracked entity for the remainder of processing.
///
/// `first_aware`/`last_aware` bound the window in which this logical
/// identity was observed; raw addresses and short ids can be recycled
/// outside it.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub address: u64,
    pub name: IStr,
    pub first_aware: i64,
    pub last_aware: i64,
    /// Weak edge: lookup only, the table owns the agent.
    pub master: Option<AgentId>,
    pub minions: Vec<AgentId>,
    pub hitbox_width: i16,
    pub hitbox_height: i16,
    pub kind: AgentKind,
}

impl Agent {
    pub fn name(&self) -> &'static str {
        resolve(self.name)
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, AgentKind::Player { .. })
    }

    /// Species id for NPCs, `None` for players and gadgets.
    pub fn species_id(&self) -> Option<u32> {
        match self.kind {
            AgentKind::Npc { species_id, .. } => Some(species_id),
            _ => None,
        }
    }

    /// Whether this agent was observed at `time`.
    pub fn is_aware_at(&self, time: i64) -> bool {
        self.first_aware <= time && time <= self.last_aware
    }

    /// Whether the aware windows of two agents overlap.
    pub fn overlaps(&self, other: &Agent) -> bool {
        self.first_aware <= other.last_aware && other.first_aware <= self.last_aware
    }
}

/// The final agent set, addressed by [`AgentId`].
#[derive(Debug, Clone, Default)]
pub struct AgentTable {
    agents: Vec<Agent>,
}

impl AgentTable {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    /// Decompose back into the raw vector; used by the processor while the
    /// model is still under construction.
    pub fn into_inner(self) -> Vec<Agent> {
        self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn players(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.is_player())
    }

    pub fn of_species(&self, species_id: u32) -> impl Iterator<Item = &Agent> {
        self.agents
            .iter()
            .filter(move |a| a.species_id() == Some(species_id))
    }

    /// Whether any NPC of the given species occurs in the table.
    pub fn has_species(&self, species_id: u32) -> bool {
        self.of_species(species_id).next().is_some()
    }
}

impl std::ops::Index<AgentId> for AgentTable {
    type Output = Agent;

    fn index(&self, id: AgentId) -> &Agent {
        &self.agents[id.index()]
    }
}
