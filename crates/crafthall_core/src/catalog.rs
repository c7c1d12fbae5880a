//! Static skill and stat catalog.
//!
//! Skills are grouped into four categories; stats are a fixed, ordered list of
//! nine names. Every lookup lowercases its input first.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Skills
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Gathering,
    Crafting,
    Processing,
    Life,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 4] = [
        SkillCategory::Gathering,
        SkillCategory::Crafting,
        SkillCategory::Processing,
        SkillCategory::Life,
    ];

    /// Lowercase name, as stored in the `skills.skill_category` column.
    pub fn as_str(self) -> &'static str {
        match self {
            SkillCategory::Gathering => "gathering",
            SkillCategory::Crafting => "crafting",
            SkillCategory::Processing => "processing",
            SkillCategory::Life => "life",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SkillCategory::Gathering => "Gathering",
            SkillCategory::Crafting => "Crafting",
            SkillCategory::Processing => "Processing",
            SkillCategory::Life => "Life",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Skill names in this category, in catalog order.
    pub fn skills(self) -> &'static [&'static str] {
        match self {
            SkillCategory::Gathering => &["mining", "skinning", "logging", "harvesting", "fishing"],
            SkillCategory::Crafting => &[
                "weaponsmithing",
                "armoring",
                "cooking",
                "engineering",
                "alchemy",
                "jewelry crafting",
                "furnishing",
            ],
            SkillCategory::Processing => &["smelting", "leatherworking", "woodworking"],
            SkillCategory::Life => &["music", "riding"],
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Find the category that contains `skill_name`.
pub fn classify(skill_name: &str) -> Option<SkillCategory> {
    let name = skill_name.trim().to_lowercase();
    SkillCategory::ALL
        .into_iter()
        .find(|c| c.skills().contains(&name.as_str()))
}

/// Every valid skill name grouped by category, one line per category:
/// `**Gathering**: mining, skinning, ...`
pub fn skill_listing() -> String {
    SkillCategory::ALL
        .iter()
        .map(|c| format!("**{}**: {}", c.label(), c.skills().join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Stats
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Health,
    Mana,
    Stamina,
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Mentality,
}

impl Stat {
    /// Fixed display and storage order.
    pub const ALL: [Stat; 9] = [
        Stat::Health,
        Stat::Mana,
        Stat::Stamina,
        Stat::Strength,
        Stat::Dexterity,
        Stat::Constitution,
        Stat::Intelligence,
        Stat::Wisdom,
        Stat::Mentality,
    ];

    /// Lowercase name. Doubles as the `stats` column name.
    pub fn name(self) -> &'static str {
        match self {
            Stat::Health => "health",
            Stat::Mana => "mana",
            Stat::Stamina => "stamina",
            Stat::Strength => "strength",
            Stat::Dexterity => "dexterity",
            Stat::Constitution => "constitution",
            Stat::Intelligence => "intelligence",
            Stat::Wisdom => "wisdom",
            Stat::Mentality => "mentality",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stat::Health => "Health",
            Stat::Mana => "Mana",
            Stat::Stamina => "Stamina",
            Stat::Strength => "Strength",
            Stat::Dexterity => "Dexterity",
            Stat::Constitution => "Constitution",
            Stat::Intelligence => "Intelligence",
            Stat::Wisdom => "Wisdom",
            Stat::Mentality => "Mentality",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn is_valid_stat(name: &str) -> bool {
    Stat::parse(name).is_some()
}

/// `health, mana, stamina, ...`
pub fn stat_listing() -> String {
    Stat::ALL.map(Stat::name).join(", ")
}

/// One member's nine stats. `None` means the stat was never set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSheet {
    pub health: Option<i64>,
    pub mana: Option<i64>,
    pub stamina: Option<i64>,
    pub strength: Option<i64>,
    pub dexterity: Option<i64>,
    pub constitution: Option<i64>,
    pub intelligence: Option<i64>,
    pub wisdom: Option<i64>,
    pub mentality: Option<i64>,
}

impl StatSheet {
    pub fn get(&self, stat: Stat) -> Option<i64> {
        match stat {
            Stat::Health => self.health,
            Stat::Mana => self.mana,
            Stat::Stamina => self.stamina,
            Stat::Strength => self.strength,
            Stat::Dexterity => self.dexterity,
            Stat::Constitution => self.constitution,
            Stat::Intelligence => self.intelligence,
            Stat::Wisdom => self.wisdom,
            Stat::Mentality => self.mentality,
        }
    }

    pub fn set(&mut self, stat: Stat, value: i64) {
        let slot = match stat {
            Stat::Health => &mut self.health,
            Stat::Mana => &mut self.mana,
            Stat::Stamina => &mut self.stamina,
            Stat::Strength => &mut self.strength,
            Stat::Dexterity => &mut self.dexterity,
            Stat::Constitution => &mut self.constitution,
            Stat::Intelligence => &mut self.intelligence,
            Stat::Wisdom => &mut self.wisdom,
            Stat::Mentality => &mut self.mentality,
        };
        *slot = Some(value);
    }

    /// All nine stats in fixed order.
    pub fn entries(&self) -> impl Iterator<Item = (Stat, Option<i64>)> + '_ {
        Stat::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    pub fn unset_count(&self) -> usize {
        self.entries().filter(|(_, v)| v.is_none()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("Mining"), Some(SkillCategory::Gathering));
        assert_eq!(classify("JEWELRY CRAFTING"), Some(SkillCategory::Crafting));
        assert_eq!(classify("woodworking"), Some(SkillCategory::Processing));
        assert_eq!(classify("Riding"), Some(SkillCategory::Life));
        assert_eq!(classify("strength"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_skill_listing_covers_every_category() {
        let listing = skill_listing();
        assert_eq!(listing.lines().count(), 4);
        assert!(listing.starts_with("**Gathering**: mining, skinning"));
        assert!(listing.contains("**Life**: music, riding"));
        for category in SkillCategory::ALL {
            for skill in category.skills() {
                assert!(listing.contains(skill), "missing {skill}");
            }
        }
    }

    #[test]
    fn test_stat_parse_and_order() {
        assert_eq!(Stat::parse("STRENGTH"), Some(Stat::Strength));
        assert!(is_valid_stat("Wisdom"));
        assert!(!is_valid_stat("luck"));
        assert_eq!(
            stat_listing(),
            "health, mana, stamina, strength, dexterity, constitution, intelligence, wisdom, mentality"
        );
    }

    #[test]
    fn test_category_round_trips_through_column_name() {
        for c in SkillCategory::ALL {
            assert_eq!(SkillCategory::parse(c.as_str()), Some(c));
        }
        assert_eq!(SkillCategory::parse("combat"), None);
    }

    #[test]
    fn test_stat_sheet_set_touches_one_field() {
        let mut sheet = StatSheet::default();
        assert_eq!(sheet.unset_count(), 9);
        sheet.set(Stat::Strength, 12);
        assert_eq!(sheet.get(Stat::Strength), Some(12));
        assert_eq!(sheet.unset_count(), 8);
        let order: Vec<Stat> = sheet.entries().map(|(s, _)| s).collect();
        assert_eq!(order, Stat::ALL.to_vec());
    }
}
