mod buffs;
mod encounters;
mod species;

pub use buffs::{DEFAULT_STACK_LIMIT, buff_id, stack_limit};
pub use encounters::{
    ENCOUNTER_DATA, EncounterInfo, PhaseDef, PhaseTriggerDef, identify_potential_encounters,
};
pub use species::lookup_species_name;
