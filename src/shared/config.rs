//! Application configuration. Store location/credentials, sender, region, zone.
//!
//! Read once at process start; adapters receive plain values, never this struct.

use crate::domain::DomainError;
use chrono_tz::Tz;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_AWS_REGION: &str = "ap-northeast-2";
pub const DEFAULT_TIMEZONE: &str = "Asia/Seoul";
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;
/// From address used by dry runs when SENDER_EMAIL is unset.
const DRY_RUN_SENDER: &str = "digest@localhost";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub db_host: Option<String>,
    pub db_port: Option<u16>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_name: Option<String>,

    /// Dispatch From address. Read from SENDER_EMAIL.
    #[serde(default)]
    pub sender_email: Option<String>,

    /// SES endpoint region. Read from AWS_REGION.
    #[serde(default)]
    pub aws_region: Option<String>,

    /// IANA zone used for week boundaries and display dates. Read from DIGEST_TIMEZONE.
    #[serde(default)]
    pub digest_timezone: Option<String>,

    /// Upper bound for a single store query, in seconds. Read from DB_QUERY_TIMEOUT_SECS.
    #[serde(default)]
    pub db_query_timeout_secs: Option<u64>,

    /// Use a local SQLite file instead of MySQL. Read from DIGEST_SQLITE_PATH.
    #[serde(default)]
    pub digest_sqlite_path: Option<String>,

    /// Log the rendered message instead of sending it. Read from DIGEST_DRY_RUN.
    #[serde(default)]
    pub digest_dry_run: Option<bool>,
}

/// Connection settings for the MySQL store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        // DB_HOST, SENDER_EMAIL, ... are read unprefixed (lowercased into field names)
        c = c.add_source(config::Environment::default());
        if let Ok(path) = std::env::var("DIGEST_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Resolve the configured zone. Defaults to Asia/Seoul.
    pub fn timezone(&self) -> Result<Tz, DomainError> {
        let name = self
            .digest_timezone
            .as_deref()
            .unwrap_or(DEFAULT_TIMEZONE);
        name.parse::<Tz>()
            .map_err(|e| DomainError::Configuration(format!("unknown time zone {}: {}", name, e)))
    }

    /// Returns MySQL settings; host, user, password and database name are required.
    pub fn mysql_settings(&self) -> Result<MySqlSettings, DomainError> {
        let require = |value: &Option<String>, key: &str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| DomainError::Configuration(format!("{} is not set", key)))
        };
        Ok(MySqlSettings {
            host: require(&self.db_host, "DB_HOST")?,
            port: self.db_port.unwrap_or(DEFAULT_DB_PORT),
            user: require(&self.db_user, "DB_USER")?,
            password: require(&self.db_password, "DB_PASSWORD")?,
            database: require(&self.db_name, "DB_NAME")?,
        })
    }

    /// Returns the sender address. Required unless this is a dry run.
    pub fn sender_email(&self) -> Result<String, DomainError> {
        match self.sender_email.clone().filter(|s| !s.is_empty()) {
            Some(sender) => Ok(sender),
            None if self.is_dry_run() => Ok(DRY_RUN_SENDER.to_string()),
            None => Err(DomainError::Configuration(
                "SENDER_EMAIL is not set".to_string(),
            )),
        }
    }

    /// Returns the SES region. Defaults to ap-northeast-2 (Seoul).
    pub fn aws_region_or_default(&self) -> String {
        self.aws_region
            .clone()
            .unwrap_or_else(|| DEFAULT_AWS_REGION.to_string())
    }

    /// Returns the per-query timeout. Defaults to 30s.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(
            self.db_query_timeout_secs
                .unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS),
        )
    }

    pub fn sqlite_path(&self) -> Option<&str> {
        self.digest_sqlite_path.as_deref().filter(|p| !p.is_empty())
    }

    pub fn is_dry_run(&self) -> bool {
        self.digest_dry_run.unwrap_or(false)
    }
}
