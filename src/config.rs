use std::{env, time::Duration};

use chrono::FixedOffset;

use crate::domain::Period;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub business_utc_offset_minutes: i32,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let jwt_ttl_hours = parse_or("JWT_TTL_HOURS", 12);
        let business_utc_offset_minutes = parse_or("BUSINESS_UTC_OFFSET_MINUTES", 60);
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", 10);

        let config = Self {
            database_url,
            host,
            port,
            jwt_secret,
            jwt_ttl_hours,
            business_utc_offset_minutes,
            db_max_connections,
        };
        config.business_offset()?;
        Ok(config)
    }

    /// Settings for tests and tools that do not read the environment.
    pub fn for_database(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            jwt_ttl_hours: 1,
            business_utc_offset_minutes: 60,
            db_max_connections: 5,
        }
    }

    pub fn business_offset(&self) -> anyhow::Result<FixedOffset> {
        FixedOffset::east_opt(self.business_utc_offset_minutes * 60).ok_or_else(|| {
            anyhow::anyhow!(
                "BUSINESS_UTC_OFFSET_MINUTES out of range: {}",
                self.business_utc_offset_minutes
            )
        })
    }
}

/// Settings of the `pos-cash-monitor` binary.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub api_url: String,
    pub email: String,
    pub password: String,
    pub period: Period,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
}

impl MonitorConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url =
            env::var("POS_API_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
        let email = env::var("POS_EMAIL").map_err(|_| anyhow::anyhow!("POS_EMAIL is not set"))?;
        let password =
            env::var("POS_PASSWORD").map_err(|_| anyhow::anyhow!("POS_PASSWORD is not set"))?;
        let period = match env::var("POS_PERIOD") {
            Ok(raw) => raw.parse::<Period>().map_err(|e| anyhow::anyhow!(e))?,
            Err(_) => Period::Day,
        };
        let poll_secs: u64 = parse_or("POS_POLL_SECS", 30);
        let timeout_secs: u64 = parse_or("POS_HTTP_TIMEOUT_SECS", 10);

        Ok(Self {
            api_url,
            email,
            password,
            period,
            poll_interval: Duration::from_secs(poll_secs.max(1)),
            http_timeout: Duration::from_secs(timeout_secs.max(1)),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
