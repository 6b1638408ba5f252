//! Combat record classification.
//!
//! Pure, revision-aware mapping from a raw record to its semantic meaning.
//! Nothing here resolves references or touches state; the processor feeds
//! every record through [`classify`] and builds typed events from the result.

use super::raw::{BuffRemoval, Activation, RawRecord, Revision, StateChange};

/// How a cast sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastEndKind {
    /// Completed and fired.
    Fire,
    /// Cancelled after the cast bar filled.
    Cancel,
    /// Interrupted into a reset.
    Reset,
}

/// Semantic class of one raw combat record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordClass {
    EnterCombat,
    ExitCombat,
    ChangeUp,
    ChangeDown,
    ChangeDead,
    Spawn,
    Despawn,
    HealthUpdate,
    LogStart,
    LogEnd,
    WeaponSwap,
    MaxHealthUpdate,
    PointOfView,
    Language,
    GameBuild,
    ShardId,
    Reward,
    Position,
    Velocity,
    Facing,
    TeamChange,
    MapId,
    StackActive,
    StackReset,
    BuffApply { initial: bool },
    BuffRemove,
    BuffDamage { off_cycle: bool },
    DirectDamage,
    CastStart { quickness: bool },
    CastEnd { kind: CastEndKind },
}

/// What the overloaded `value` slot on a record means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Direct strike damage in `value`.
    PhysicalDamage,
    /// Buff tick damage in `buff_dmg`, `value` is zero.
    BuffTick,
    /// Duration, identifier, or other non-damage payload.
    NonDamage,
}

/// Map one raw record to its semantic class, or `None` for record kinds that
/// produce no event (guild blobs, attack-target plumbing, unknown values
/// from newer writers).
pub fn classify(record: &RawRecord, revision: Revision) -> Option<RecordClass> {
    match record.statechange {
        StateChange::EnterCombat => Some(RecordClass::EnterCombat),
        StateChange::ExitCombat => Some(RecordClass::ExitCombat),
        StateChange::ChangeUp => Some(RecordClass::ChangeUp),
        StateChange::ChangeDown => Some(RecordClass::ChangeDown),
        StateChange::ChangeDead => Some(RecordClass::ChangeDead),
        StateChange::Spawn => Some(RecordClass::Spawn),
        StateChange::Despawn => Some(RecordClass::Despawn),
        StateChange::HealthUpdate => Some(RecordClass::HealthUpdate),
        StateChange::LogStart => Some(RecordClass::LogStart),
        StateChange::LogEnd => Some(RecordClass::LogEnd),
        StateChange::WeaponSwap => Some(RecordClass::WeaponSwap),
        StateChange::MaxHealthUpdate => Some(RecordClass::MaxHealthUpdate),
        StateChange::PointOfView => Some(RecordClass::PointOfView),
        StateChange::Language => Some(RecordClass::Language),
        StateChange::GameBuild => Some(RecordClass::GameBuild),
        StateChange::ShardId => Some(RecordClass::ShardId),
        StateChange::Reward => Some(RecordClass::Reward),
        StateChange::Position => Some(RecordClass::Position),
        StateChange::Velocity => Some(RecordClass::Velocity),
        StateChange::Facing => Some(RecordClass::Facing),
        StateChange::TeamChange => Some(RecordClass::TeamChange),
        StateChange::MapId => Some(RecordClass::MapId),
        StateChange::StackActive => Some(RecordClass::StackActive),
        StateChange::StackReset => Some(RecordClass::StackReset),
        // Guild blobs exist only for the editing surface; targeting plumbing
        // and unknown kinds carry no event.
        StateChange::Guild | StateChange::AttackTarget | StateChange::Targetable => None,
        StateChange::Unknown(_) => None,
        StateChange::None | StateChange::BuffInitial => {
            classify_combat_row(record, revision)
        }
    }
}

fn classify_combat_row(record: &RawRecord, revision: Revision) -> Option<RecordClass> {
    match record.activation {
        Activation::Normal => return Some(RecordClass::CastStart { quickness: false }),
        Activation::Quickness => return Some(RecordClass::CastStart { quickness: true }),
        Activation::CancelFire => {
            return Some(RecordClass::CastEnd {
                kind: CastEndKind::Fire,
            });
        }
        Activation::CancelCancel => {
            return Some(RecordClass::CastEnd {
                kind: CastEndKind::Cancel,
            });
        }
        Activation::Reset => {
            return Some(RecordClass::CastEnd {
                kind: CastEndKind::Reset,
            });
        }
        Activation::Unknown(_) => return None,
        Activation::None => {}
    }

    if !matches!(record.buffremove, BuffRemoval::None) {
        return Some(RecordClass::BuffRemove);
    }

    if record.buff != 0 {
        if record.value == 0 {
            return Some(RecordClass::BuffDamage {
                off_cycle: is_off_cycle_tick(record, revision),
            });
        }
        return Some(RecordClass::BuffApply {
            initial: record.statechange == StateChange::BuffInitial,
        });
    }

    Some(RecordClass::DirectDamage)
}

/// Whether a buff-damage row is an off-cycle tick.
///
/// Revision 1 carries a dedicated flag; revision 0 folded the marker into
/// the strike-result slot, which is otherwise unused on buff rows.
pub fn is_off_cycle_tick(record: &RawRecord, revision: Revision) -> bool {
    match revision {
        Revision::Current => record.is_offcycle,
        Revision::Legacy => record.result != 0,
    }
}

/// What the `value` slot on this record carries.
pub fn value_kind(record: &RawRecord, revision: Revision) -> ValueKind {
    match classify(record, revision) {
        Some(RecordClass::DirectDamage) => ValueKind::PhysicalDamage,
        Some(RecordClass::BuffDamage { .. }) => ValueKind::BuffTick,
        _ => ValueKind::NonDamage,
    }
}

/// Whether the source slot of this record class carries a payload (build
/// number, shard, map, log framing magic) instead of an agent address.
/// Resolving these as addresses would reject perfectly valid logs.
pub fn src_holds_payload(class: RecordClass) -> bool {
    matches!(
        class,
        RecordClass::LogStart
            | RecordClass::LogEnd
            | RecordClass::GameBuild
            | RecordClass::ShardId
            | RecordClass::MapId
            | RecordClass::Language
            | RecordClass::Reward
    )
}

/// Whether the destination slot of this record class holds an agent rather
/// than a payload.
pub fn dst_holds_agent(class: RecordClass) -> bool {
    matches!(
        class,
        RecordClass::DirectDamage
            | RecordClass::BuffDamage { .. }
            | RecordClass::BuffApply { .. }
            | RecordClass::BuffRemove
    )
}

/// Record kinds that survive any pruning pass.
///
/// Log framing and the position/team markers feed agent-merge bookkeeping;
/// dropping them silently corrupts later processing, so callers that thin a
/// record stream must keep these.
pub fn always_retained(statechange: StateChange) -> bool {
    matches!(
        statechange,
        StateChange::LogStart
            | StateChange::LogEnd
            | StateChange::Spawn
            | StateChange::Despawn
            | StateChange::Position
            | StateChange::TeamChange
            | StateChange::PointOfView
            | StateChange::MapId
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evtc::raw::Affinity;

    fn combat_record() -> RawRecord {
        RawRecord {
            time: 1000,
            src_agent: 1,
            dst_agent: 2,
            value: 100,
            buff_dmg: 0,
            overstack_value: 0,
            skill_id: 9000,
            src_instid: 1,
            dst_instid: 2,
            src_master_instid: 0,
            dst_master_instid: 0,
            affinity: Affinity::Foe,
            buff: 0,
            result: 0,
            activation: Activation::None,
            buffremove: BuffRemoval::None,
            is_ninety: false,
            is_fifty: false,
            is_moving: false,
            statechange: StateChange::None,
            is_flanking: false,
            is_shields: false,
            is_offcycle: false,
        }
    }

    #[test]
    fn plain_row_is_direct_damage() {
        let record = combat_record();
        assert_eq!(
            classify(&record, Revision::Current),
            Some(RecordClass::DirectDamage)
        );
        assert_eq!(
            value_kind(&record, Revision::Current),
            ValueKind::PhysicalDamage
        );
    }

    #[test]
    fn buff_row_with_value_is_apply() {
        let mut record = combat_record();
        record.buff = 1;
        record.value = 15000; // duration ms
        assert_eq!(
            classify(&record, Revision::Current),
            Some(RecordClass::BuffApply { initial: false })
        );
        assert_eq!(value_kind(&record, Revision::Current), ValueKind::NonDamage);
    }

    #[test]
    fn buff_row_without_value_is_tick() {
        let mut record = combat_record();
        record.buff = 1;
        record.value = 0;
        record.buff_dmg = 250;
        assert_eq!(
            classify(&record, Revision::Current),
            Some(RecordClass::BuffDamage { off_cycle: false })
        );
        assert_eq!(value_kind(&record, Revision::Current), ValueKind::BuffTick);
    }

    #[test]
    fn off_cycle_flag_moved_between_revisions() {
        let mut record = combat_record();
        record.buff = 1;
        record.value = 0;
        record.buff_dmg = 50;

        // Revision 1: dedicated flag.
        record.is_offcycle = true;
        assert_eq!(
            classify(&record, Revision::Current),
            Some(RecordClass::BuffDamage { off_cycle: true })
        );

        // Revision 0: result slot doubles as the marker.
        record.is_offcycle = false;
        record.result = 1;
        assert_eq!(
            classify(&record, Revision::Legacy),
            Some(RecordClass::BuffDamage { off_cycle: true })
        );
        assert_eq!(
            classify(&record, Revision::Current),
            Some(RecordClass::BuffDamage { off_cycle: false })
        );
    }

    #[test]
    fn buff_remove_beats_buff_apply() {
        let mut record = combat_record();
        record.buff = 1;
        record.value = 5000;
        record.buffremove = BuffRemoval::All;
        assert_eq!(
            classify(&record, Revision::Current),
            Some(RecordClass::BuffRemove)
        );
    }

    #[test]
    fn activation_beats_everything() {
        let mut record = combat_record();
        record.buff = 1;
        record.activation = Activation::Quickness;
        assert_eq!(
            classify(&record, Revision::Current),
            Some(RecordClass::CastStart { quickness: true })
        );
    }

    #[test]
    fn state_changes_map_to_their_class() {
        let mut record = combat_record();
        record.statechange = StateChange::ChangeDead;
        assert_eq!(
            classify(&record, Revision::Current),
            Some(RecordClass::ChangeDead)
        );

        record.statechange = StateChange::Guild;
        assert_eq!(classify(&record, Revision::Current), None);

        record.statechange = StateChange::Unknown(200);
        assert_eq!(classify(&record, Revision::Current), None);
    }

    #[test]
    fn payload_slots_are_not_agent_references() {
        assert!(src_holds_payload(RecordClass::GameBuild));
        assert!(src_holds_payload(RecordClass::LogStart));
        assert!(src_holds_payload(RecordClass::MapId));
        assert!(!src_holds_payload(RecordClass::DirectDamage));
        assert!(!src_holds_payload(RecordClass::ChangeDead));

        assert!(dst_holds_agent(RecordClass::DirectDamage));
        assert!(dst_holds_agent(RecordClass::BuffApply { initial: false }));
        assert!(!dst_holds_agent(RecordClass::HealthUpdate));
        assert!(!dst_holds_agent(RecordClass::Reward));
    }

    #[test]
    fn retained_set_covers_framing_and_merge_bookkeeping() {
        assert!(always_retained(StateChange::LogStart));
        assert!(always_retained(StateChange::LogEnd));
        assert!(always_retained(StateChange::Spawn));
        assert!(always_retained(StateChange::Despawn));
        assert!(always_retained(StateChange::Position));
        assert!(always_retained(StateChange::TeamChange));
        assert!(!always_retained(StateChange::HealthUpdate));
        assert!(!always_retained(StateChange::Guild));
    }
}
