//! Property-based tests for crafthall_core.
//!
//! Uses proptest to check catalog lookups and command parsing across
//! arbitrary casing, levels and names.

use crafthall_core::catalog::{classify, is_valid_stat, SkillCategory, Stat, StatSheet};
use crafthall_core::command::{parse, Command};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_stat() -> impl Strategy<Value = Stat> {
    prop::sample::select(Stat::ALL.to_vec())
}

fn arb_skill() -> impl Strategy<Value = (SkillCategory, &'static str)> {
    let all: Vec<(SkillCategory, &'static str)> = SkillCategory::ALL
        .iter()
        .flat_map(|c| c.skills().iter().map(move |s| (*c, *s)))
        .collect();
    prop::sample::select(all)
}

/// Randomly flip the case of each character.
fn scramble_case(s: &str, mask: u64) -> String {
    s.chars()
        .enumerate()
        .map(|(i, c)| {
            if mask >> (i % 64) & 1 == 1 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn classify_ignores_case((category, skill) in arb_skill(), mask in any::<u64>()) {
        prop_assert_eq!(classify(&scramble_case(skill, mask)), Some(category));
    }

    #[test]
    fn stat_parse_ignores_case(stat in arb_stat(), mask in any::<u64>()) {
        let name = scramble_case(stat.name(), mask);
        prop_assert!(is_valid_stat(&name));
        prop_assert_eq!(Stat::parse(&name), Some(stat));
    }

    #[test]
    fn set_stat_leaves_other_fields_unset(stat in arb_stat(), value in any::<i64>()) {
        let mut sheet = StatSheet::default();
        sheet.set(stat, value);
        prop_assert_eq!(sheet.get(stat), Some(value));
        prop_assert_eq!(sheet.unset_count(), 8);
    }

    #[test]
    fn add_stat_arguments_survive_parsing(stat in arb_stat(), value in any::<i64>()) {
        let text = format!("!add_stat {} {}", stat.name(), value);
        let cmd = parse("!", &text).unwrap().unwrap();
        prop_assert_eq!(cmd, Command::AddStat { stat_name: stat.name().to_string(), value });
    }

    #[test]
    fn quoted_skill_names_stay_whole((_, skill) in arb_skill(), level in 0i64..1000) {
        let text = format!("!add_skill \"{}\" {}", skill, level);
        let cmd = parse("!", &text).unwrap().unwrap();
        prop_assert_eq!(cmd, Command::AddSkill { skill_name: skill.to_string(), level });
    }

    #[test]
    fn unknown_words_are_never_skills(word in "[a-z]{1,12}") {
        let known = SkillCategory::ALL.iter().any(|c| c.skills().contains(&word.as_str()));
        prop_assert_eq!(classify(&word).is_some(), known);
    }

    #[test]
    fn text_without_prefix_is_not_a_command(text in "[^!].{0,40}") {
        prop_assert!(parse("!", &text).is_none() || text.trim_start().starts_with('!'));
    }
}
