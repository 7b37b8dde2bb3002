//! Core d20 lookup tables.

/// Skill name to governing ability, lowercase on both sides.
pub const SKILL_ABILITIES: [(&str, &str); 18] = [
    ("acrobatics", "dex"),
    ("animal handling", "wis"),
    ("arcana", "int"),
    ("athletics", "str"),
    ("deception", "cha"),
    ("history", "int"),
    ("insight", "wis"),
    ("intimidation", "cha"),
    ("investigation", "int"),
    ("medicine", "wis"),
    ("nature", "int"),
    ("perception", "wis"),
    ("performance", "cha"),
    ("persuasion", "cha"),
    ("religion", "int"),
    ("sleight of hand", "dex"),
    ("stealth", "dex"),
    ("survival", "wis"),
];

/// Ability governing a skill. Unknown skills fall back to `str`, matching the
/// table's treatment of raw athletics-style checks.
pub fn skill_ability(skill: &str) -> &'static str {
    let needle = skill.trim().to_lowercase();
    SKILL_ABILITIES
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, ability)| *ability)
        .unwrap_or("str")
}

/// Proficiency bonus by level: +2 at 1-4, +3 at 5-8, ...
pub fn proficiency_bonus(level: u8) -> i32 {
    ((level.max(1) as i32 - 1) / 4) + 2
}

/// Hit die size by class name; defaults to d8.
pub fn hit_die_for_class(class_name: &str) -> u8 {
    match class_name.to_lowercase().as_str() {
        "barbarian" => 12,
        "fighter" | "paladin" | "ranger" => 10,
        "bard" | "cleric" | "druid" | "monk" | "rogue" | "warlock" => 8,
        "sorcerer" | "wizard" => 6,
        _ => 8,
    }
}

const ENEMY_NAME_TOKENS: [&str; 16] = [
    "goblin", "orc", "bandit", "skeleton", "zombie", "wolf", "kobold", "cultist", "troll", "ogre",
    "bugbear", "gnoll", "wraith", "ghoul", "spider", "raider",
];

/// Heuristic enemy classification from an id or display name. The caller's
/// explicit flag always wins over this guess.
pub fn is_enemy_name(name: &str) -> bool {
    let lowered = name.to_lowercase();
    ENEMY_NAME_TOKENS.iter().any(|token| lowered.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_ability_lookup() {
        assert_eq!(skill_ability("Stealth"), "dex");
        assert_eq!(skill_ability("ARCANA"), "int");
        assert_eq!(skill_ability("basket weaving"), "str");
    }

    #[test]
    fn test_proficiency_bonus_brackets() {
        assert_eq!(proficiency_bonus(1), 2);
        assert_eq!(proficiency_bonus(4), 2);
        assert_eq!(proficiency_bonus(5), 3);
        assert_eq!(proficiency_bonus(17), 6);
    }

    #[test]
    fn test_hit_dice() {
        assert_eq!(hit_die_for_class("Barbarian"), 12);
        assert_eq!(hit_die_for_class("wizard"), 6);
        assert_eq!(hit_die_for_class("artificer"), 8);
    }

    #[test]
    fn test_enemy_heuristic() {
        assert!(is_enemy_name("goblin-3"));
        assert!(is_enemy_name("Orc Warchief"));
        assert!(!is_enemy_name("Brianna"));
    }
}
