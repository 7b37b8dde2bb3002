//! Wild-surge table rolled on catastrophic arcane synthesis.

/// d20 wild-surge outcomes, index 0 = roll of 1.
pub const WILD_SURGE_TABLE: [&str; 20] = [
    "The caster and every creature within 30 feet swap positions at random.",
    "A thunderclap deals 1d6 damage to the caster and deafens them for a minute.",
    "All unattended small objects nearby rise three feet off the ground.",
    "The caster's hair turns a vivid, unnatural colour for a week.",
    "Harmless illusory butterflies fill a 10-foot radius for one minute.",
    "The caster glows faintly; stealth is impossible until the next dawn.",
    "The nearest door or container slams shut and locks itself.",
    "A patch of ground turns to slick ice in a 10-foot radius.",
    "The caster speaks only in questions for the next ten minutes.",
    "Every light source within 60 feet is extinguished.",
    "A loaf of warm bread appears in the caster's hand.",
    "The caster ages one year in a heartbeat, then back again.",
    "A spectral hound appears and follows the caster for an hour.",
    "Rain falls indoors over the caster for one minute.",
    "The caster's voice booms at triple volume until dismissed.",
    "Nearby plants grow wildly, entangling the area around the caster.",
    "The caster becomes weightless until the end of their next turn.",
    "A burst of wild magic heals the caster for 1d8 hit points.",
    "Arcane sigils scorch themselves into the ground around the caster.",
    "A minor elemental spirit manifests briefly and bows to the caster.",
];

/// Entry for a d20 roll, clamped into table bounds.
pub fn wild_surge_entry(roll: i32) -> &'static str {
    let index = roll.clamp(1, 20) as usize - 1;
    WILD_SURGE_TABLE[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_d20_sized() {
        assert_eq!(WILD_SURGE_TABLE.len(), 20);
    }

    #[test]
    fn test_lookup_clamps() {
        assert_eq!(wild_surge_entry(0), WILD_SURGE_TABLE[0]);
        assert_eq!(wild_surge_entry(21), WILD_SURGE_TABLE[19]);
        assert_eq!(wild_surge_entry(7), WILD_SURGE_TABLE[6]);
    }
}
