//! Shared result types for mistlock
//!
//! This crate contains the serializable vocabulary shared between
//! mistlock-core and its consumers (CLI, report renderers): encounter
//! outcome enums, ID-or-name selectors, and the analyzer summary value.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Encounter Outcome Types
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of an encounter as derived from the event stream.
///
/// `Unknown` is a legitimate terminal value: older logs may simply not carry
/// the evidence a determiner looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncounterResult {
    Success,
    Failure,
    #[default]
    Unknown,
}

impl EncounterResult {
    pub fn is_success(&self) -> bool {
        matches!(self, EncounterResult::Success)
    }

    /// Display label for summaries.
    pub fn label(&self) -> &'static str {
        match self {
            EncounterResult::Success => "Success",
            EncounterResult::Failure => "Failure",
            EncounterResult::Unknown => "Unknown",
        }
    }
}

/// Difficulty variant of an encounter.
///
/// `Normal` doubles as the missing-evidence sentinel: a log without any
/// challenge-mode markers is a normal-mode log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncounterMode {
    #[default]
    Normal,
    Challenge,
}

impl EncounterMode {
    pub fn label(&self) -> &'static str {
        match self {
            EncounterMode::Normal => "Normal",
            EncounterMode::Challenge => "Challenge",
        }
    }
}

/// Content category an encounter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterKind {
    Raid,
    Fractal,
    Strike,
    Golem,
    OpenWorld,
}

impl EncounterKind {
    pub fn label(&self) -> &'static str {
        match self {
            EncounterKind::Raid => "Raid",
            EncounterKind::Fractal => "Fractal",
            EncounterKind::Strike => "Strike",
            EncounterKind::Golem => "Golem",
            EncounterKind::OpenWorld => "Open World",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Selectors (unified ID-or-Name matching)
// ─────────────────────────────────────────────────────────────────────────────

/// Selector for agents - can match by species ID or name.
/// Uses untagged serde for clean serialization: numbers as IDs, strings as names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentSelector {
    Id(u32),
    Name(String),
}

impl AgentSelector {
    /// Parse from user input - tries species ID first, falls back to name.
    pub fn from_input(input: &str) -> Self {
        match input.trim().parse::<u32>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(input.trim().to_string()),
        }
    }

    /// Returns the display string for this selector.
    pub fn display(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Name(name) => name.clone(),
        }
    }

    /// Check if this selector matches the given species ID or name.
    pub fn matches(&self, species_id: u32, name: Option<&str>) -> bool {
        match self {
            Self::Id(expected) => *expected == species_id,
            Self::Name(expected) => name
                .map(|n| n.eq_ignore_ascii_case(expected))
                .unwrap_or(false),
        }
    }
}

/// Selector for skills/buffs - can match by ID or name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillSelector {
    Id(u32),
    Name(String),
}

impl SkillSelector {
    /// Parse from user input - tries ID first, falls back to name.
    pub fn from_input(input: &str) -> Self {
        match input.trim().parse::<u32>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(input.trim().to_string()),
        }
    }

    /// Returns the display string for this selector.
    pub fn display(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Name(name) => name.clone(),
        }
    }

    /// Check if this selector matches the given skill ID or name.
    pub fn matches(&self, skill_id: u32, name: Option<&str>) -> bool {
        match self {
            Self::Id(expected) => *expected == skill_id,
            Self::Name(expected) => name
                .map(|n| n.eq_ignore_ascii_case(expected))
                .unwrap_or(false),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Analyzer Summary (shared between core and consumers)
// ─────────────────────────────────────────────────────────────────────────────

/// One player row in an encounter summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub character: String,
    pub account: String,
    pub subgroup: u8,
    pub profession: u32,
    pub elite_spec: u32,
}

/// The analyzer's terminal value for one log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterSummary {
    /// Encounter name, or the trigger species name for unrecognized content.
    pub encounter: String,
    pub kind: Option<EncounterKind>,
    pub result: EncounterResult,
    pub mode: EncounterMode,
    /// Fight duration in milliseconds.
    pub duration_ms: i64,
    pub players: Vec<PlayerSummary>,
}
