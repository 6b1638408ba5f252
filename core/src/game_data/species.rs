//! Species id → display name lookup.
//!
//! Covers the bosses the registry knows plus the adds that matter for
//! disambiguation and phase naming. Unknown species fall back to the name
//! carried in the agent table.

use phf::phf_map;

static SPECIES_NAMES: phf::Map<u32, &'static str> = phf_map! {
    // Spirit Vale
    15438u32 => "Vale Guardian",
    15420u32 => "Red Guardian",
    15433u32 => "Green Guardian",
    15431u32 => "Blue Guardian",
    15429u32 => "Gorseval the Multifarious",
    15434u32 => "Charged Soul",
    15375u32 => "Sabetha the Saboteur",
    15372u32 => "Kernan",
    15404u32 => "Knuckles",
    15430u32 => "Karde",
    // Salvation Pass
    16123u32 => "Slothasor",
    16115u32 => "Matthias Gabrel",
    // Stronghold of the Faithful
    16235u32 => "Keep Construct",
    16246u32 => "Xera",
    16286u32 => "Xera",
    // Bastion of the Penitent
    17194u32 => "Cairn the Indomitable",
    17172u32 => "Mursaat Overseer",
    17188u32 => "Samarog",
    17208u32 => "Guldhem",
    17124u32 => "Rigom",
    17154u32 => "Deimos",
    // Hall of Chains
    19767u32 => "Soulless Horror",
    19450u32 => "Dhuum",
    // Mythwright Gambit
    43974u32 => "Conjured Amalgamate",
    21105u32 => "Nikare",
    21089u32 => "Kenut",
    20934u32 => "Qadim",
    // The Key of Ahdashim
    22006u32 => "Cardinal Adina",
    21964u32 => "Cardinal Sabir",
    22000u32 => "Qadim the Peerless",
    // Shattered Observatory
    17632u32 => "Skorvald the Shattered",
    17599u32 => "Flux Anomaly",
    17949u32 => "Artsariiv",
    17759u32 => "Arkk",
    // Sunqua Peak
    23254u32 => "Ai, Keeper of the Peak",
    23230u32 => "Fear Manifestation",
    23278u32 => "Elemental Manifestation",
    // Training area
    16199u32 => "Standard Kitty Golem",
    16177u32 => "Average Kitty Golem",
    16169u32 => "Massive Kitty Golem",
};

/// Display name for a species id, if it is one we know.
pub fn lookup_species_name(species_id: u32) -> Option<&'static str> {
    SPECIES_NAMES.get(&species_id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_species_resolve() {
        assert_eq!(lookup_species_name(15438), Some("Vale Guardian"));
        assert_eq!(lookup_species_name(19450), Some("Dhuum"));
    }

    #[test]
    fn unknown_species_is_none() {
        assert_eq!(lookup_species_name(1), None);
    }
}
