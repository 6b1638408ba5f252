//! Buff id constants and per-skill stack limits.

use phf::phf_map;

/// Well-known buff skill ids.
pub mod buff_id {
    pub const MIGHT: u32 = 740;
    pub const FURY: u32 = 725;
    pub const QUICKNESS: u32 = 1187;
    pub const ALACRITY: u32 = 30328;
    pub const PROTECTION: u32 = 717;
    pub const REGENERATION: u32 = 718;
    pub const SWIFTNESS: u32 = 719;
    pub const RESISTANCE: u32 = 26980;
    pub const VIGOR: u32 = 726;
    pub const STABILITY: u32 = 1122;
    pub const AEGIS: u32 = 743;
    pub const VULNERABILITY: u32 = 738;

    // Encounter-specific markers used for mode detection.
    pub const XERAS_EMBRACE: u32 = 34979;
    pub const QADIM_CHALLENGE_SIGIL: u32 = 52861;
    pub const CHALLENGE_MOTE: u32 = 54084;
}

/// Stack caps for intensity-stacked buffs. Everything else resolves to one
/// visible stack regardless of how many are queued.
static STACK_LIMITS: phf::Map<u32, u32> = phf_map! {
    740u32 => 25,   // Might
    738u32 => 25,   // Vulnerability
    1122u32 => 25,  // Stability
};

pub const DEFAULT_STACK_LIMIT: u32 = 1;

/// Per-skill cap applied when resolving stack counts into segments.
pub fn stack_limit(skill_id: u32) -> u32 {
    STACK_LIMITS
        .get(&skill_id)
        .copied()
        .unwrap_or(DEFAULT_STACK_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_buffs_have_raised_caps() {
        assert_eq!(stack_limit(buff_id::MIGHT), 25);
        assert_eq!(stack_limit(buff_id::STABILITY), 25);
    }

    #[test]
    fn everything_else_caps_at_one() {
        assert_eq!(stack_limit(buff_id::QUICKNESS), 1);
        assert_eq!(stack_limit(123_456), 1);
    }
}
