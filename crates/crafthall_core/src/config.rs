use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CrafthallConfig {
    pub bot: BotConfig,
    pub store: StoreConfig,
    pub onebot: Option<OneBotConfig>,
}

impl CrafthallConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: CrafthallConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CRAFTHALL_PREFIX") {
            if !v.is_empty() {
                self.bot.prefix = v;
            }
        }
        if let Ok(v) = std::env::var("CRAFTHALL_OWNER_ID") {
            match v.parse() {
                Ok(id) => self.bot.owner_id = Some(id),
                Err(_) => tracing::warn!("Ignoring CRAFTHALL_OWNER_ID: '{}' is not an integer", v),
            }
        }
        if let Ok(v) = std::env::var("CRAFTHALL_DB") {
            self.store.db_path = v;
        }
        // OneBot env overrides
        if let Ok(url) = std::env::var("ONEBOT_WS_URL") {
            let token = std::env::var("ONEBOT_ACCESS_TOKEN").ok();
            self.onebot = Some(OneBotConfig {
                ws_url: url,
                access_token: token,
            });
        } else if let Ok(token) = std::env::var("ONEBOT_ACCESS_TOKEN") {
            if let Some(onebot) = self.onebot.as_mut() {
                onebot.access_token = Some(token);
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Text a message must start with to be treated as a command.
    pub prefix: String,
    /// The only member allowed to run `delete_all_profiles`. Unset denies everyone.
    pub owner_id: Option<i64>,
    pub confirm_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            owner_id: None,
            confirm_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: "crafthall.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OneBotConfig {
    pub ws_url: String,
    pub access_token: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = CrafthallConfig::default();
        assert_eq!(cfg.bot.prefix, "!");
        assert_eq!(cfg.bot.confirm_timeout_secs, 30);
        assert!(cfg.bot.owner_id.is_none());
        assert_eq!(cfg.store.db_path, "crafthall.db");
        assert!(cfg.onebot.is_none());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[bot]
owner_id = 420002871829069834
"#;
        let cfg: CrafthallConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.bot.owner_id, Some(420002871829069834));
        // Defaults for unspecified fields
        assert_eq!(cfg.bot.prefix, "!");
        assert_eq!(cfg.store.db_path, "crafthall.db");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[bot]
prefix = "?"
owner_id = 7
confirm_timeout_secs = 10

[store]
db_path = "data/guild.db"

[onebot]
ws_url = "ws://localhost:3001"
access_token = "secret"
"#;
        let cfg: CrafthallConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.bot.prefix, "?");
        assert_eq!(cfg.bot.owner_id, Some(7));
        assert_eq!(cfg.bot.confirm_timeout_secs, 10);
        assert_eq!(cfg.store.db_path, "data/guild.db");
        let onebot = cfg.onebot.unwrap();
        assert_eq!(onebot.ws_url, "ws://localhost:3001");
        assert_eq!(onebot.access_token, Some("secret".to_string()));
    }

    #[test]
    fn test_env_overrides_and_defaults() {
        // Part 1: env overrides
        std::env::set_var("CRAFTHALL_OWNER_ID", "99");
        std::env::set_var("CRAFTHALL_DB", "/tmp/override.db");

        let mut cfg = CrafthallConfig::default();
        cfg.apply_env_overrides();

        assert_eq!(cfg.bot.owner_id, Some(99));
        assert_eq!(cfg.store.db_path, "/tmp/override.db");

        // Clean up env vars before testing defaults
        std::env::remove_var("CRAFTHALL_OWNER_ID");
        std::env::remove_var("CRAFTHALL_DB");

        // Part 2: nonexistent path returns defaults (no env interference)
        let cfg = CrafthallConfig::load_or_default("/nonexistent/path.toml");
        assert!(cfg.bot.owner_id.is_none());
        assert_eq!(cfg.store.db_path, "crafthall.db");
    }
}
