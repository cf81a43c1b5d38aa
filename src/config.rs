use std::env;
use std::time::Duration;

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use imkitchen_mealplan::EngineSettings;
use imkitchen_shared::user::UserDietaryProfile;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub recipes: RecipesConfig,
    #[serde(default)]
    pub profile: UserDietaryProfile,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Owner of the stored meal plan.
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_user_id() -> String {
    "local".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    #[serde(default = "default_pool_cache_ttl_secs")]
    pub pool_cache_ttl_secs: u64,
    #[serde(default = "default_pool_limit")]
    pub pool_limit: usize,
    #[serde(default = "default_alternatives_limit")]
    pub alternatives_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout_ms(),
            pool_cache_ttl_secs: default_pool_cache_ttl_secs(),
            pool_limit: default_pool_limit(),
            alternatives_limit: default_alternatives_limit(),
        }
    }
}

impl EngineConfig {
    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            cache_ttl: Duration::from_secs(self.pool_cache_ttl_secs),
            pool_limit: self.pool_limit,
            alternatives_limit: self.alternatives_limit,
            ..Default::default()
        }
    }
}

fn default_fetch_timeout_ms() -> u64 {
    2500
}

fn default_pool_cache_ttl_secs() -> u64 {
    300
}

fn default_pool_limit() -> usize {
    50
}

fn default_alternatives_limit() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RecipesConfig {
    /// JSON array of recipes used as the local repository
    #[serde(default)]
    pub local_path: Option<String>,
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. DATABASE_URL
    /// 2. Environment variables (IMKITCHEN__ENGINE__POOL_LIMIT, etc.)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("database.url", "sqlite:imkitchen.db")?
            .set_default("database.max_connections", 5)?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Optional, ignored if not found
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("IMKITCHEN")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(database_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections < 1 {
            return Err("Database max_connections must be at least 1".to_string());
        }
        if !(100..=10_000).contains(&self.engine.fetch_timeout_ms) {
            return Err("Engine fetch_timeout_ms must be between 100 and 10000".to_string());
        }
        if self.engine.pool_cache_ttl_secs == 0 {
            return Err("Engine pool_cache_ttl_secs must be greater than 0".to_string());
        }
        if self.engine.pool_limit == 0 {
            return Err("Engine pool_limit must be greater than 0".to_string());
        }
        if self.profile.calorie_goal == 0 {
            return Err("Profile calorie_goal must be greater than 0".to_string());
        }
        if !(1..=3).contains(&self.profile.preferences.max_leftover_gap_days) {
            return Err("Profile max_leftover_gap_days must be between 1 and 3".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            database: DatabaseConfig {
                url: "sqlite:test.db".to_string(),
                max_connections: 5,
                user_id: default_user_id(),
            },
            observability: ObservabilityConfig::default(),
            engine: EngineConfig::default(),
            recipes: RecipesConfig::default(),
            profile: UserDietaryProfile::default(),
        }
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_connections() {
        let mut config = config();
        config.database.max_connections = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_fetch_timeout_bounds() {
        let mut config = config();
        config.engine.fetch_timeout_ms = 50;
        assert!(config.validate().is_err());

        config.engine.fetch_timeout_ms = 20_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_calorie_goal() {
        let mut config = config();
        config.profile.calorie_goal = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_leftover_gap() {
        let mut config = config();
        config.profile.preferences.max_leftover_gap_days = 4;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_settings_from_config() {
        let settings = EngineConfig::default().settings();

        assert_eq!(settings.fetch_timeout, Duration::from_millis(2500));
        assert_eq!(settings.cache_ttl, Duration::from_secs(300));
        assert_eq!(settings.pool_limit, 50);
        assert_eq!(settings.alternatives_limit, 5);
    }

    #[test]
    fn test_load_from_file() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.child("planner.toml");
        std::fs::write(
            &path,
            r#"
[database]
url = "sqlite:planner.db"
max_connections = 2

[engine]
pool_limit = 20

[profile]
diet_type = "vegetarian"
calorie_goal = 1800

[profile.preferences]
plan_leftovers = true
"#,
        )
        .unwrap();

        let config = Config::load(Some(path.to_str().unwrap().to_string())).unwrap();

        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.engine.pool_limit, 20);
        assert_eq!(config.engine.fetch_timeout_ms, 2500);
        assert_eq!(config.profile.calorie_goal, 1800);
        assert!(config.profile.preferences.plan_leftovers);
        assert_eq!(config.profile.preferences.max_leftover_gap_days, 2);
        assert!(config.validate().is_ok());
    }
}
