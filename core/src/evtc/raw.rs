//! Raw EVTC data model.
//!
//! Flat, wire-faithful records as decoded from the byte buffer. Nothing here
//! is cross-referenced; the processor builds the typed model on top. The
//! buffer layout constants live here so the parser and the raw-record editor
//! agree on offsets.

use chrono::NaiveDate;

use crate::context::IStr;

/// Bytes of the magic prefix.
pub const EVTC_MAGIC: &[u8; 4] = b"EVTC";
/// Header: magic(4) + build date(8) + revision(1) + trigger id(2) + reserved(1).
pub const HEADER_SIZE: usize = 16;
/// One agent table entry.
pub const AGENT_SIZE: usize = 96;
/// Offset of the packed name blob inside an agent entry.
pub const AGENT_NAME_OFFSET: usize = 28;
/// Length of the packed name blob.
pub const AGENT_NAME_SIZE: usize = 68;
/// One skill table entry: i32 id + 64-byte name.
pub const SKILL_SIZE: usize = 68;
/// One combat record, identical total size on both supported revisions.
pub const RECORD_SIZE: usize = 64;

/// Binary layout revision of the combat-record table.
///
/// The record size never changed, but field widths and positions did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revision {
    /// Revision 0: 2-byte skill and overstack fields, no destination master,
    /// off-cycle buff ticks folded into the result slot.
    Legacy,
    /// Revision 1: widened skill/overstack ids, destination master short id,
    /// dedicated shields and off-cycle flags.
    Current,
}

impl Revision {
    pub fn from_byte(revision: u8) -> Option<Self> {
        match revision {
            0 => Some(Revision::Legacy),
            1 => Some(Revision::Current),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            Revision::Legacy => 0,
            Revision::Current => 1,
        }
    }

    /// Offset of the state-change byte inside a record, used by the editor
    /// to filter records without a full decode.
    pub(crate) fn statechange_offset(&self) -> usize {
        match self {
            Revision::Legacy => 59,
            Revision::Current => 56,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire flag enums
// ─────────────────────────────────────────────────────────────────────────────

/// Friend/foe marker on a combat record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affinity {
    Friend,
    Foe,
    #[default]
    Unknown,
}

impl Affinity {
    pub fn from_byte(v: u8) -> Self {
        match v {
            0 => Affinity::Friend,
            1 => Affinity::Foe,
            _ => Affinity::Unknown,
        }
    }
}

/// Skill activation marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    #[default]
    None,
    Normal,
    Quickness,
    CancelFire,
    CancelCancel,
    Reset,
    Unknown(u8),
}

impl Activation {
    pub fn from_byte(v: u8) -> Self {
        match v {
            0 => Activation::None,
            1 => Activation::Normal,
            2 => Activation::Quickness,
            3 => Activation::CancelFire,
            4 => Activation::CancelCancel,
            5 => Activation::Reset,
            other => Activation::Unknown(other),
        }
    }
}

/// Buff removal marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuffRemoval {
    #[default]
    None,
    All,
    Single,
    Manual,
    Unknown(u8),
}

impl BuffRemoval {
    pub fn from_byte(v: u8) -> Self {
        match v {
            0 => BuffRemoval::None,
            1 => BuffRemoval::All,
            2 => BuffRemoval::Single,
            3 => BuffRemoval::Manual,
            other => BuffRemoval::Unknown(other),
        }
    }
}

/// Outcome of a direct strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrikeResult {
    #[default]
    Normal,
    Crit,
    Glance,
    Block,
    Evade,
    Interrupt,
    Absorb,
    Blind,
    KillingBlow,
    Downed,
    Unknown(u8),
}

impl StrikeResult {
    pub fn from_byte(v: u8) -> Self {
        match v {
            0 => StrikeResult::Normal,
            1 => StrikeResult::Crit,
            2 => StrikeResult::Glance,
            3 => StrikeResult::Block,
            4 => StrikeResult::Evade,
            5 => StrikeResult::Interrupt,
            6 => StrikeResult::Absorb,
            7 => StrikeResult::Blind,
            8 => StrikeResult::KillingBlow,
            9 => StrikeResult::Downed,
            other => StrikeResult::Unknown(other),
        }
    }
}

/// State-change discriminant on a combat record.
///
/// The wire keeps gaining values; unknown ones are carried through rather
/// than rejected, and the classifier maps them to no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StateChange {
    #[default]
    None,
    EnterCombat,
    ExitCombat,
    ChangeUp,
    ChangeDead,
    ChangeDown,
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
    BuffInitial,
    Position,
    Velocity,
    Facing,
    TeamChange,
    AttackTarget,
    Targetable,
    MapId,
    StackActive,
    StackReset,
    Guild,
    Unknown(u8),
}

impl StateChange {
    pub fn from_byte(v: u8) -> Self {
        match v {
            0 => StateChange::None,
            1 => StateChange::EnterCombat,
            2 => StateChange::ExitCombat,
            3 => StateChange::ChangeUp,
            4 => StateChange::ChangeDead,
            5 => StateChange::ChangeDown,
            6 => StateChange::Spawn,
            7 => StateChange::Despawn,
            8 => StateChange::HealthUpdate,
            9 => StateChange::LogStart,
            10 => StateChange::LogEnd,
            11 => StateChange::WeaponSwap,
            12 => StateChange::MaxHealthUpdate,
            13 => StateChange::PointOfView,
            14 => StateChange::Language,
            15 => StateChange::GameBuild,
            16 => StateChange::ShardId,
            17 => StateChange::Reward,
            18 => StateChange::BuffInitial,
            19 => StateChange::Position,
            20 => StateChange::Velocity,
            21 => StateChange::Facing,
            22 => StateChange::TeamChange,
            23 => StateChange::AttackTarget,
            24 => StateChange::Targetable,
            25 => StateChange::MapId,
            27 => StateChange::StackActive,
            28 => StateChange::StackReset,
            29 => StateChange::Guild,
            other => StateChange::Unknown(other),
        }
    }

    /// Byte value for the kinds the editor filters on.
    pub fn as_byte(&self) -> u8 {
        match self {
            StateChange::None => 0,
            StateChange::EnterCombat => 1,
            StateChange::ExitCombat => 2,
            StateChange::ChangeUp => 3,
            StateChange::ChangeDead => 4,
            StateChange::ChangeDown => 5,
            StateChange::Spawn => 6,
            StateChange::Despawn => 7,
            StateChange::HealthUpdate => 8,
            StateChange::LogStart => 9,
            StateChange::LogEnd => 10,
            StateChange::WeaponSwap => 11,
            StateChange::MaxHealthUpdate => 12,
            StateChange::PointOfView => 13,
            StateChange::Language => 14,
            StateChange::GameBuild => 15,
            StateChange::ShardId => 16,
            StateChange::Reward => 17,
            StateChange::BuffInitial => 18,
            StateChange::Position => 19,
            StateChange::Velocity => 20,
            StateChange::Facing => 21,
            StateChange::TeamChange => 22,
            StateChange::AttackTarget => 23,
            StateChange::Targetable => 24,
            StateChange::MapId => 25,
            StateChange::StackActive => 27,
            StateChange::StackReset => 28,
            StateChange::Guild => 29,
            StateChange::Unknown(v) => *v,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw tables
// ─────────────────────────────────────────────────────────────────────────────

/// Variant of a raw agent entry, decoded from the profession/elite sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawAgentKind {
    Player { profession: u32, elite_spec: u32 },
    Npc { species_id: u32 },
    Gadget { gadget_id: u32 },
}

/// The packed name blob, split on its NUL sentinels.
///
/// Players carry character name / account / subgroup string; NPCs and
/// gadgets carry only the first part, and anonymized logs may blank any of
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAgentName {
    pub character: IStr,
    pub account: IStr,
    pub subgroup: IStr,
}

#[derive(Debug, Clone)]
pub struct RawAgent {
    pub address: u64,
    pub kind: RawAgentKind,
    pub toughness: i16,
    pub concentration: i16,
    pub healing: i16,
    pub condition: i16,
    pub hitbox_width: i16,
    pub hitbox_height: i16,
    pub name: RawAgentName,
}

#[derive(Debug, Clone, Copy)]
pub struct RawSkill {
    pub id: i32,
    pub name: IStr,
}

/// One fixed-size combat record, revision-normalized.
///
/// Fields absent on revision 0 decode to their zero value; the classifier is
/// the only place allowed to interpret overloaded slots.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord {
    pub time: i64,
    pub src_agent: u64,
    pub dst_agent: u64,
    pub value: i32,
    pub buff_dmg: i32,
    pub overstack_value: u32,
    pub skill_id: u32,
    pub src_instid: u16,
    pub dst_instid: u16,
    pub src_master_instid: u16,
    pub dst_master_instid: u16,
    pub affinity: Affinity,
    pub buff: u8,
    pub result: u8,
    pub activation: Activation,
    pub buffremove: BuffRemoval,
    pub is_ninety: bool,
    pub is_fifty: bool,
    pub is_moving: bool,
    pub statechange: StateChange,
    pub is_flanking: bool,
    pub is_shields: bool,
    pub is_offcycle: bool,
}

/// The immutable flat log: header plus the three tables, in file order.
#[derive(Debug, Clone)]
pub struct RawLog {
    /// Full 12-character build identifier, e.g. `EVTC20230716`.
    pub build: String,
    pub build_date: NaiveDate,
    pub revision: Revision,
    /// Species id of the agent that triggered log recording.
    pub trigger_id: u16,
    pub agents: Vec<RawAgent>,
    pub skills: Vec<RawSkill>,
    pub records: Vec<RawRecord>,
}
