//! Agent-merge machinery.
//!
//! Certain NPCs are split into separate raw agent entries when the game
//! despawns and respawns tracking for them mid-fight. Merging collapses all
//! instances of a species into the first one: aware windows are unioned,
//! the merged entries are removed from the table, and every reference site
//! (events, master/minion edges, encounter targets) is rewritten in one
//! table pass.

use hashbrown::HashSet;

use super::{LogBuild, ProcessError, ProcessingStep};
use crate::model::AgentId;

/// Merge every agent of one species into its first instance.
#[derive(Debug)]
pub struct MergeSpeciesStep {
    pub species: u32,
}

impl ProcessingStep for MergeSpeciesStep {
    fn name(&self) -> &'static str {
        "merge-species"
    }

    fn run(&self, build: &mut LogBuild) -> Result<(), ProcessError> {
        let instances: Vec<usize> = build
            .agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.species_id() == Some(self.species))
            .map(|(i, _)| i)
            .collect();

        if instances.len() < 2 {
            return Ok(());
        }

        tracing::debug!(
            species = self.species,
            count = instances.len(),
            "merging split agent instances"
        );
        merge_agents(build, instances[0], &instances[1..]);
        Ok(())
    }
}

/// Collapse duplicated player entries: the same account appearing as
/// several raw agents with non-overlapping aware windows is one person
/// whose tracking was recreated.
#[derive(Debug)]
pub struct PlayerDedupStep;

impl ProcessingStep for PlayerDedupStep {
    fn name(&self) -> &'static str {
        "player-dedup"
    }

    fn run(&self, build: &mut LogBuild) -> Result<(), ProcessError> {
        loop {
            let Some((survivor, duplicate)) = find_duplicate_player(build) else {
                return Ok(());
            };
            merge_agents(build, survivor, &[duplicate]);
        }
    }
}

fn find_duplicate_player(build: &LogBuild) -> Option<(usize, usize)> {
    use crate::model::AgentKind;

    for (i, a) in build.agents.iter().enumerate() {
        let AgentKind::Player { account, .. } = a.kind else {
            continue;
        };
        if crate::context::resolve(account).is_empty() {
            continue;
        }
        for (j, b) in build.agents.iter().enumerate().skip(i + 1) {
            let AgentKind::Player {
                account: other_account,
                ..
            } = b.kind
            else {
                continue;
            };
            if account != other_account {
                continue;
            }
            if a.overlaps(b) {
                // Two live agents on one account at the same time; leave
                // them alone rather than guess.
                tracing::warn!(
                    account = crate::context::resolve(account),
                    "overlapping duplicate player entries left unmerged"
                );
                continue;
            }
            return Some((i, j));
        }
    }
    None
}

/// Merge `merged` agent table entries into `survivor`, then compact the
/// table and rewrite every reference site through the combined index map.
pub(crate) fn merge_agents(build: &mut LogBuild, survivor: usize, merged: &[usize]) {
    let merged_set: HashSet<usize> = merged.iter().copied().collect();

    // Union aware windows and collect minion edges into the survivor.
    let mut first = build.agents[survivor].first_aware;
    let mut last = build.agents[survivor].last_aware;
    let mut minions = std::mem::take(&mut build.agents[survivor].minions);
    let mut inherited_master = build.agents[survivor].master;
    for &idx in merged {
        let agent = &mut build.agents[idx];
        first = first.min(agent.first_aware);
        last = last.max(agent.last_aware);
        minions.append(&mut agent.minions);
        if inherited_master.is_none() {
            inherited_master = agent.master;
        }
    }
    build.agents[survivor].first_aware = first;
    build.agents[survivor].last_aware = last;
    build.agents[survivor].minions = minions;
    build.agents[survivor].master = inherited_master;

    // Combined old-index -> new-id map: aliasing first, then compaction.
    let mut compact = vec![0usize; build.agents.len()];
    let mut next = 0usize;
    for old in 0..build.agents.len() {
        if !merged_set.contains(&old) {
            compact[old] = next;
            next += 1;
        }
    }
    let remap = |id: AgentId| -> AgentId {
        let old = if merged_set.contains(&id.index()) {
            survivor
        } else {
            id.index()
        };
        AgentId::new(compact[old])
    };

    // Drop merged rows and refresh stored ids.
    let mut kept = Vec::with_capacity(build.agents.len() - merged.len());
    for (old, agent) in std::mem::take(&mut build.agents).into_iter().enumerate() {
        if !merged_set.contains(&old) {
            kept.push(agent);
        }
    }
    build.agents = kept;
    for (index, agent) in build.agents.iter_mut().enumerate() {
        agent.id = AgentId::new(index);
    }

    // One rewrite pass over every reference site.
    for event in &mut build.events {
        event.kind.remap_agents(remap);
    }
    for agent in &mut build.agents {
        let own_id = agent.id;
        agent.master = agent.master.map(remap).filter(|&m| m != own_id);
        let mut seen = HashSet::new();
        let minions = std::mem::take(&mut agent.minions);
        agent.minions = minions
            .into_iter()
            .map(remap)
            .filter(|&m| m != own_id && seen.insert(m))
            .collect();
    }
    let mut seen = HashSet::new();
    let targets = std::mem::take(&mut build.targets);
    build.targets = targets
        .into_iter()
        .map(remap)
        .filter(|&t| seen.insert(t))
        .collect();
}
