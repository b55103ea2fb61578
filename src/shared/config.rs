use crate::domain::entities::modification::CreateDeletePolicy;
use serde::{Deserialize, Serialize};

/// Upper bound enforced by the `modification_records.last_sync_error` column.
pub const MAX_SYNC_ERROR_LEN: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub tracker: TrackerConfig,
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub create_delete_policy: CreateDeletePolicy,
    pub max_error_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    pub enabled: bool,
    pub retention_days: u32,
    pub interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/menucost.db".to_string(),
                max_connections: 5,
                busy_timeout_secs: 5,
            },
            tracker: TrackerConfig::default(),
            retention: RetentionConfig {
                enabled: true,
                retention_days: 30,
                interval_secs: 6 * 60 * 60, // 6 hours
            },
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            create_delete_policy: CreateDeletePolicy::Suppress,
            max_error_len: MAX_SYNC_ERROR_LEN,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from defaults overridden by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("MENUCOST_DATABASE_URL") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.database.url = trimmed.to_string();
            }
        }
        if let Some(value) = lookup("MENUCOST_DB_MAX_CONNECTIONS").and_then(|v| parse_u64(&v)) {
            cfg.database.max_connections = value.min(u32::MAX as u64) as u32;
        }
        if let Some(value) = lookup("MENUCOST_DB_BUSY_TIMEOUT_SECS").and_then(|v| parse_u64(&v)) {
            cfg.database.busy_timeout_secs = value;
        }

        if let Some(v) = lookup("MENUCOST_CREATE_DELETE_POLICY") {
            match v.trim().parse::<CreateDeletePolicy>() {
                Ok(policy) => cfg.tracker.create_delete_policy = policy,
                Err(err) => tracing::warn!("Ignoring MENUCOST_CREATE_DELETE_POLICY: {}", err),
            }
        }
        if let Some(value) = lookup("MENUCOST_MAX_ERROR_LEN").and_then(|v| parse_u64(&v)) {
            cfg.tracker.max_error_len = value as usize;
        }

        if let Some(v) = lookup("MENUCOST_RETENTION_ENABLED") {
            cfg.retention.enabled = parse_bool(&v, cfg.retention.enabled);
        }
        if let Some(value) = lookup("MENUCOST_RETENTION_DAYS").and_then(|v| parse_u64(&v)) {
            cfg.retention.retention_days = value.min(u32::MAX as u64) as u32;
        }
        if let Some(value) = lookup("MENUCOST_RETENTION_INTERVAL_SECS").and_then(|v| parse_u64(&v))
        {
            cfg.retention.interval_secs = value;
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.tracker.max_error_len == 0 || self.tracker.max_error_len > MAX_SYNC_ERROR_LEN {
            return Err(format!(
                "Tracker max_error_len must be between 1 and {}",
                MAX_SYNC_ERROR_LEN
            ));
        }
        if self.retention.enabled {
            if self.retention.retention_days == 0 {
                return Err("Retention retention_days must be greater than 0".to_string());
            }
            if self.retention.interval_secs == 0 {
                return Err("Retention interval_secs must be greater than 0".to_string());
            }
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
