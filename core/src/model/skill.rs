//! Skills and the shared skill table.

use hashbrown::HashMap;

use crate::context::{IStr, resolve};
use crate::evtc::RawSkill;

/// Stable index into the [`SkillTable`]. Every event naming a skill holds
/// one of these; the skill objects themselves are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct SkillId(u32);

impl SkillId {
    pub fn new(index: usize) -> Self {
        SkillId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Skill {
    /// Wire id as the writer emitted it.
    pub id: u32,
    /// `None` for synthetic entries referenced by records but missing from
    /// the skill table.
    pub name: Option<IStr>,
}

impl Skill {
    pub fn name(&self) -> Option<&'static str> {
        self.name.map(resolve)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SkillTable {
    skills: Vec<Skill>,
    by_wire_id: HashMap<u32, SkillId>,
}

impl SkillTable {
    pub fn from_raw(raw: &[RawSkill]) -> Self {
        let mut table = SkillTable::default();
        for skill in raw {
            let wire_id = skill.id as u32;
            // Writers occasionally duplicate table entries; first one wins.
            if table.by_wire_id.contains_key(&wire_id) {
                continue;
            }
            let id = SkillId::new(table.skills.len());
            table.skills.push(Skill {
                id: wire_id,
                name: Some(skill.name),
            });
            table.by_wire_id.insert(wire_id, id);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn get(&self, id: SkillId) -> Option<&Skill> {
        self.skills.get(id.index())
    }

    pub fn lookup(&self, wire_id: u32) -> Option<SkillId> {
        self.by_wire_id.get(&wire_id).copied()
    }

    /// Resolve a wire id, synthesizing an id-only entry when the table has
    /// no matching row. Records referencing unknown skills are data, not an
    /// error.
    pub fn resolve_or_insert(&mut self, wire_id: u32) -> SkillId {
        if let Some(id) = self.lookup(wire_id) {
            return id;
        }
        let id = SkillId::new(self.skills.len());
        self.skills.push(Skill {
            id: wire_id,
            name: None,
        });
        self.by_wire_id.insert(wire_id, id);
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter()
    }
}

impl std::ops::Index<SkillId> for SkillTable {
    type Output = Skill;

    fn index(&self, id: SkillId) -> &Skill {
        &self.skills[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::intern;

    #[test]
    fn resolves_known_and_synthesizes_unknown() {
        let raw = vec![RawSkill {
            id: 740,
            name: intern("Might"),
        }];
        let mut table = SkillTable::from_raw(&raw);

        let known = table.resolve_or_insert(740);
        assert_eq!(table[known].name(), Some("Might"));

        let synthetic = table.resolve_or_insert(999_999);
        assert_eq!(table[synthetic].id, 999_999);
        assert_eq!(table[synthetic].name(), None);

        // Second resolution reuses the synthetic entry.
        assert_eq!(table.resolve_or_insert(999_999), synthetic);
        assert_eq!(table.len(), 2);
    }
}
