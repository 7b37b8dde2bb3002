//! d20 rules tables used by the combat, rest and improvisation engines.

mod d20;
mod wild_surge;

pub use d20::{
    hit_die_for_class, is_enemy_name, proficiency_bonus, skill_ability, SKILL_ABILITIES,
};
pub use wild_surge::{wild_surge_entry, WILD_SURGE_TABLE};
