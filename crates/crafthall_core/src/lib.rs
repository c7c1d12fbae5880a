pub mod catalog;
pub mod command;
pub mod config;

pub use catalog::{classify, is_valid_stat, SkillCategory, Stat, StatSheet};
pub use command::{Command, UsageError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Platform-assigned member identifier.
pub type MemberId = i64;

/// A registered character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub member_id: MemberId,
    pub character_name: String,
    pub skill_level: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub member_id: MemberId,
    pub skill_name: String,
    pub skill_category: SkillCategory,
    pub level: i64,
}

/// The member who sent a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoker {
    pub id: MemberId,
    pub display_name: String,
}

/// A message delivered by the chat adapter.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub author: Invoker,
    pub text: String,
}

/// Persistence for profiles, stats, skills and recipes.
///
/// Every write commits before returning. Operations touching several tables
/// run inside one transaction.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert or replace the member's profile. Also creates their stats row
    /// with every stat unset when they have none; existing stats are kept.
    async fn upsert_profile(
        &self,
        member_id: MemberId,
        character_name: &str,
        skill_level: i64,
    ) -> anyhow::Result<()>;
    async fn find_profile(&self, member_id: MemberId) -> anyhow::Result<Option<Profile>>;
    /// True when the member has a profile row or a stats row.
    async fn has_profile_data(&self, member_id: MemberId) -> anyhow::Result<bool>;

    async fn upsert_recipe(&self, name: &str, required_skill: i64) -> anyhow::Result<()>;
    async fn find_recipe(&self, name: &str) -> anyhow::Result<Option<i64>>;
    /// Character names of every profile with `skill_level >= min_skill_level`,
    /// highest level first, then by name.
    async fn find_eligible_crafters(&self, min_skill_level: i64) -> anyhow::Result<Vec<String>>;

    async fn upsert_skill(
        &self,
        member_id: MemberId,
        category: SkillCategory,
        skill_name: &str,
        level: i64,
    ) -> anyhow::Result<()>;
    async fn skills_for(&self, member_id: MemberId) -> anyhow::Result<Vec<SkillEntry>>;

    /// Set one stat, creating the member's row with every other stat unset if needed.
    async fn set_stat(&self, member_id: MemberId, stat: Stat, value: i64) -> anyhow::Result<()>;
    async fn get_stats(&self, member_id: MemberId) -> anyhow::Result<Option<StatSheet>>;

    /// Remove the member's profile, stats and skills. Recipes are kept.
    async fn delete_profile(&self, member_id: MemberId) -> anyhow::Result<()>;
    /// Remove every profile, stats and skill row. Recipes are kept.
    async fn delete_all(&self) -> anyhow::Result<()>;
}

/// Sends text back to wherever the triggering message came from.
#[async_trait]
pub trait Reply: Send + Sync {
    async fn reply(&self, text: &str) -> anyhow::Result<()>;
}
