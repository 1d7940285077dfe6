//! Startup configuration read from the environment.

use std::{
    collections::HashSet, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr,
    time::Duration,
};

use crate::server::{
    client::{ClientConfig, RetryPolicy},
    error::config::ConfigError,
    logging::LogFormat,
    model::entity::EntityProfile,
    service::sync::SyncSettings,
};

pub struct Config {
    pub database_url: String,
    pub entities_config_path: PathBuf,
    pub listen_addr: SocketAddr,
    pub mercury_api_url: String,
    pub provider_request_timeout: Duration,
    pub rate_limit_capacity: u32,
    pub rate_limit_refill_per_minute: u32,
    pub retry_max_attempts: u32,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    pub cache_ttl: Duration,
    pub cache_max_staleness: Duration,
    pub sync_concurrency: usize,
    pub account_concurrency: usize,
    pub entity_sync_timeout: Duration,
    pub sync_cycle: Duration,
    pub sync_cron: String,
    pub alert_failure_ratio: f64,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Unset and empty variables fall back to their defaults; `DATABASE_URL` and
    /// `ENTITIES_CONFIG_PATH` have none.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let config = Self {
            database_url: vars.required("DATABASE_URL")?,
            entities_config_path: PathBuf::from(vars.required("ENTITIES_CONFIG_PATH")?),
            listen_addr: vars.parse_or("LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            mercury_api_url: vars
                .get("MERCURY_API_URL")
                .unwrap_or_else(|| "https://api.mercury.com/api/v1".to_string()),
            provider_request_timeout: vars.secs_or("PROVIDER_REQUEST_TIMEOUT_SECS", 30)?,
            rate_limit_capacity: vars.positive_or("RATE_LIMIT_CAPACITY", 100)?,
            rate_limit_refill_per_minute: vars.positive_or("RATE_LIMIT_REFILL_PER_MINUTE", 100)?,
            retry_max_attempts: vars.positive_or("RETRY_MAX_ATTEMPTS", 3)?,
            retry_base_delay: Duration::from_millis(vars.parse_or("RETRY_BASE_DELAY_MS", 500)?),
            retry_max_delay: Duration::from_millis(vars.parse_or("RETRY_MAX_DELAY_MS", 8000)?),
            cache_ttl: vars.secs_or("CACHE_TTL_SECS", 300)?,
            cache_max_staleness: vars.secs_or("CACHE_MAX_STALENESS_SECS", 86400)?,
            sync_concurrency: vars.positive_or("SYNC_CONCURRENCY", 3)?,
            account_concurrency: vars.positive_or("ACCOUNT_CONCURRENCY", 4)?,
            entity_sync_timeout: vars.secs_or("ENTITY_SYNC_TIMEOUT_SECS", 90)?,
            sync_cycle: vars.secs_or("SYNC_CYCLE_SECS", 300)?,
            sync_cron: vars
                .get("SYNC_CRON")
                .unwrap_or_else(|| "0 */5 * * * *".to_string()),
            alert_failure_ratio: vars.parse_or("ALERT_FAILURE_RATIO", 0.5)?,
            log_format: vars.parse_or("LOG_FORMAT", LogFormat::Text)?,
        };

        if !(0.0..=1.0).contains(&config.alert_failure_ratio) {
            return Err(ConfigError::InvalidEnvValue {
                var: "ALERT_FAILURE_RATIO".to_string(),
                reason: "must be between 0 and 1".to_string(),
            });
        }
        if config.retry_max_delay < config.retry_base_delay {
            return Err(ConfigError::InvalidEnvValue {
                var: "RETRY_MAX_DELAY_MS".to_string(),
                reason: "must not be lower than RETRY_BASE_DELAY_MS".to_string(),
            });
        }

        Ok(config)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.mercury_api_url.clone(),
            request_timeout: self.provider_request_timeout,
            bucket_capacity: self.rate_limit_capacity,
            refill_per_sec: self.rate_limit_refill_per_minute as f64 / 60.0,
            retry: RetryPolicy {
                max_attempts: self.retry_max_attempts,
                base_delay: self.retry_base_delay,
                max_delay: self.retry_max_delay,
                ..RetryPolicy::default()
            },
        }
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            entity_concurrency: self.sync_concurrency,
            account_concurrency: self.account_concurrency,
            entity_timeout: self.entity_sync_timeout,
            cycle: self.sync_cycle,
            alert_failure_ratio: self.alert_failure_ratio,
        }
    }

    /// Reads and validates the entities file.
    pub fn load_entities(&self) -> Result<Vec<EntityProfile>, ConfigError> {
        let path = self.entities_config_path.display().to_string();
        let contents = std::fs::read_to_string(&self.entities_config_path).map_err(|e| {
            ConfigError::InvalidEntitiesFile {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;

        parse_entities(&contents, &path)
    }
}

/// Parses the JSON entities list, rejecting invalid or duplicate slugs.
pub fn parse_entities(contents: &str, path: &str) -> Result<Vec<EntityProfile>, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEntitiesFile {
        path: path.to_string(),
        reason,
    };

    let profiles: Vec<EntityProfile> =
        serde_json::from_str(contents).map_err(|e| invalid(e.to_string()))?;

    let mut seen = HashSet::new();
    for profile in &profiles {
        if !EntityProfile::is_valid_slug(&profile.slug) {
            return Err(invalid(format!("invalid entity slug {:?}", profile.slug)));
        }
        if !seen.insert(profile.slug.as_str()) {
            return Err(invalid(format!("duplicate entity slug {:?}", profile.slug)));
        }
        if profile.credential_env.trim().is_empty() {
            return Err(invalid(format!(
                "entity {:?} has an empty credentialEnv",
                profile.slug
            )));
        }
    }

    Ok(profiles)
}

struct Vars<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn get(&self, var: &str) -> Option<String> {
        (self.0)(var).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, var: &str) -> Result<String, ConfigError> {
        self.get(var)
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    }

    fn parse_or<T>(&self, var: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(var) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvValue {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(default),
        }
    }

    fn positive_or<T>(&self, var: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + PartialOrd + Default,
        T::Err: Display,
    {
        let value = self.parse_or(var, default)?;
        if value <= T::default() {
            return Err(ConfigError::InvalidEnvValue {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    }

    fn secs_or(&self, var: &str, default: u64) -> Result<Duration, ConfigError> {
        self.positive_or(var, default).map(Duration::from_secs)
    }
}
