use anyhow::{Context, Result};
use async_trait::async_trait;
use crafthall_core::{MemberId, Profile, ProfileStore, SkillCategory, SkillEntry, Stat, StatSheet};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::path::Path;

/// SQLite-backed profile store.
///
/// The pool holds a single connection, so every statement issued by any
/// handler runs one at a time against the same database.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display());
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create missing tables. Existing rows are never dropped, so stats
    /// survive restarts.
    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                member_id INTEGER PRIMARY KEY,
                character_name TEXT NOT NULL,
                skill_level INTEGER NOT NULL
            );
            "#
        )
        .execute(&self.pool)
        .await
        .context("Failed to create profiles table")?;

        // Crafter lookups filter on skill_level
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_profiles_skill_level ON profiles(skill_level)"
        )
        .execute(&self.pool)
        .await
        .context("Failed to create profiles skill_level index")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stats (
                member_id INTEGER PRIMARY KEY,
                health INTEGER,
                mana INTEGER,
                stamina INTEGER,
                strength INTEGER,
                dexterity INTEGER,
                constitution INTEGER,
                intelligence INTEGER,
                wisdom INTEGER,
                mentality INTEGER
            );
            "#
        )
        .execute(&self.pool)
        .await
        .context("Failed to create stats table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS skills (
                member_id INTEGER NOT NULL,
                skill_name TEXT NOT NULL,
                skill_category TEXT NOT NULL,
                level INTEGER NOT NULL,
                PRIMARY KEY (member_id, skill_name)
            );
            "#
        )
        .execute(&self.pool)
        .await
        .context("Failed to create skills table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recipes (
                name TEXT PRIMARY KEY,
                required_skill INTEGER NOT NULL
            );
            "#
        )
        .execute(&self.pool)
        .await
        .context("Failed to create recipes table")?;

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Row count of one of the four tables. Used by tests and startup logging.
    pub async fn count_rows(&self, table: Table) -> Result<i64> {
        let sql = match table {
            Table::Profiles => "SELECT COUNT(*) FROM profiles",
            Table::Stats => "SELECT COUNT(*) FROM stats",
            Table::Skills => "SELECT COUNT(*) FROM skills",
            Table::Recipes => "SELECT COUNT(*) FROM recipes",
        };
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count rows in {:?}", table))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Profiles,
    Stats,
    Skills,
    Recipes,
}

macro_rules! stat_upsert {
    ($col:literal) => {
        concat!(
            "INSERT INTO stats (member_id, ", $col, ") VALUES (?, ?) ",
            "ON CONFLICT(member_id) DO UPDATE SET ", $col, " = excluded.", $col
        )
    };
}

/// Upsert statement for one stat column. Inserting leaves the other eight NULL.
fn set_stat_sql(stat: Stat) -> &'static str {
    match stat {
        Stat::Health => stat_upsert!("health"),
        Stat::Mana => stat_upsert!("mana"),
        Stat::Stamina => stat_upsert!("stamina"),
        Stat::Strength => stat_upsert!("strength"),
        Stat::Dexterity => stat_upsert!("dexterity"),
        Stat::Constitution => stat_upsert!("constitution"),
        Stat::Intelligence => stat_upsert!("intelligence"),
        Stat::Wisdom => stat_upsert!("wisdom"),
        Stat::Mentality => stat_upsert!("mentality"),
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn upsert_profile(
        &self,
        member_id: MemberId,
        character_name: &str,
        skill_level: i64,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO profiles (member_id, character_name, skill_level) VALUES (?, ?, ?)
             ON CONFLICT(member_id) DO UPDATE SET
              character_name = excluded.character_name, skill_level = excluded.skill_level"
        )
        .bind(member_id)
        .bind(character_name)
        .bind(skill_level)
        .execute(&mut *tx)
        .await
        .context("Failed to upsert profile")?;

        // Every stat starts unset; a re-register keeps stats already recorded
        sqlx::query("INSERT INTO stats (member_id) VALUES (?) ON CONFLICT(member_id) DO NOTHING")
            .bind(member_id)
            .execute(&mut *tx)
            .await
            .context("Failed to create default stats row")?;

        tx.commit().await?;
        tracing::debug!("Profile saved for member {}", member_id);
        Ok(())
    }

    async fn find_profile(&self, member_id: MemberId) -> Result<Option<Profile>> {
        let row = sqlx::query(
            "SELECT member_id, character_name, skill_level FROM profiles WHERE member_id = ?"
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query profile")?;

        Ok(row.map(|row| Profile {
            member_id: row.get("member_id"),
            character_name: row.get("character_name"),
            skill_level: row.get("skill_level"),
        }))
    }

    async fn has_profile_data(&self, member_id: MemberId) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM profiles WHERE member_id = ?)
                 OR EXISTS(SELECT 1 FROM stats WHERE member_id = ?)"
        )
        .bind(member_id)
        .bind(member_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check for existing profile")?;
        Ok(found != 0)
    }

    async fn upsert_recipe(&self, name: &str, required_skill: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO recipes (name, required_skill) VALUES (?, ?)
             ON CONFLICT(name) DO UPDATE SET required_skill = excluded.required_skill"
        )
        .bind(name)
        .bind(required_skill)
        .execute(&self.pool)
        .await
        .context("Failed to upsert recipe")?;
        Ok(())
    }

    async fn find_recipe(&self, name: &str) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT required_skill FROM recipes WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query recipe")
    }

    async fn find_eligible_crafters(&self, min_skill_level: i64) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT character_name FROM profiles WHERE skill_level >= ?
             ORDER BY skill_level DESC, character_name ASC, member_id ASC"
        )
        .bind(min_skill_level)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query eligible crafters")
    }

    async fn upsert_skill(
        &self,
        member_id: MemberId,
        category: SkillCategory,
        skill_name: &str,
        level: i64,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO skills (member_id, skill_name, skill_category, level) VALUES (?, ?, ?, ?)
             ON CONFLICT(member_id, skill_name) DO UPDATE SET
              skill_category = excluded.skill_category, level = excluded.level"
        )
        .bind(member_id)
        .bind(skill_name)
        .bind(category.as_str())
        .bind(level)
        .execute(&self.pool)
        .await
        .context("Failed to upsert skill")?;
        Ok(())
    }

    async fn skills_for(&self, member_id: MemberId) -> Result<Vec<SkillEntry>> {
        let rows = sqlx::query(
            "SELECT member_id, skill_name, skill_category, level FROM skills
             WHERE member_id = ? ORDER BY skill_name"
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query skills")?;

        let mut skills = Vec::with_capacity(rows.len());
        for row in rows {
            let category: String = row.get("skill_category");
            let skill_category = SkillCategory::parse(&category)
                .with_context(|| format!("Unknown skill category in store: {}", category))?;
            skills.push(SkillEntry {
                member_id: row.get("member_id"),
                skill_name: row.get("skill_name"),
                skill_category,
                level: row.get("level"),
            });
        }
        Ok(skills)
    }

    async fn set_stat(&self, member_id: MemberId, stat: Stat, value: i64) -> Result<()> {
        sqlx::query(set_stat_sql(stat))
            .bind(member_id)
            .bind(value)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to set stat {}", stat))?;

        tracing::debug!("Stat {} = {} for member {}", stat, value, member_id);
        Ok(())
    }

    async fn get_stats(&self, member_id: MemberId) -> Result<Option<StatSheet>> {
        let row = sqlx::query(
            "SELECT health, mana, stamina, strength, dexterity, constitution,
                    intelligence, wisdom, mentality
             FROM stats WHERE member_id = ?"
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query stats")?;

        Ok(row.map(|row| StatSheet {
            health: row.get("health"),
            mana: row.get("mana"),
            stamina: row.get("stamina"),
            strength: row.get("strength"),
            dexterity: row.get("dexterity"),
            constitution: row.get("constitution"),
            intelligence: row.get("intelligence"),
            wisdom: row.get("wisdom"),
            mentality: row.get("mentality"),
        }))
    }

    async fn delete_profile(&self, member_id: MemberId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for sql in [
            "DELETE FROM stats WHERE member_id = ?",
            "DELETE FROM profiles WHERE member_id = ?",
            "DELETE FROM skills WHERE member_id = ?",
        ] {
            sqlx::query(sql)
                .bind(member_id)
                .execute(&mut *tx)
                .await
                .context("Failed to delete profile rows")?;
        }

        tx.commit().await?;
        tracing::info!("Deleted profile data for member {}", member_id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for sql in ["DELETE FROM stats", "DELETE FROM profiles", "DELETE FROM skills"] {
            sqlx::query(sql)
                .execute(&mut *tx)
                .await
                .context("Failed to delete all profiles")?;
        }

        tx.commit().await?;
        tracing::info!("Deleted all profile data");
        Ok(())
    }
}
