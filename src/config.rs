use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::{FixedOffset, NaiveTime, Weekday};
use serde::Deserialize;
use snafu::{ensure, ResultExt};
use url::Url;

use crate::error::{ApplicationError, ConfigLoadSnafu, InvalidTimezoneSnafu};
use crate::service::reset::ResetSchedule;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(rename = "host_address")]
    pub host: SocketAddr,
    #[serde(rename = "log_dir", default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Fixed offset from UTC, in whole hours, for all day and week
    /// boundary decisions. The offset never changes at runtime, so windows
    /// do not shift with daylight saving.
    #[serde(rename = "tz_offset_hours", default)]
    pub tz_offset_hours: i32,

    #[serde(rename = "daily_reset_at", default = "default_reset_at")]
    pub daily_reset_at: NaiveTime,
    #[serde(rename = "weekly_reset_on", default = "default_reset_on")]
    pub weekly_reset_on: Weekday,
    #[serde(rename = "weekly_reset_at", default = "default_reset_at")]
    pub weekly_reset_at: NaiveTime,

    #[serde(flatten)]
    pub surreal: SurrealConfig,
}

impl Config {
    pub fn from_env() -> Result<Config, ApplicationError> {
        let config = envy::from_env::<Config>().context(ConfigLoadSnafu)?;

        ensure!(
            config.tz_offset_hours.abs() < 24,
            InvalidTimezoneSnafu {
                hours: config.tz_offset_hours
            }
        );

        Ok(config)
    }

    pub fn timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.tz_offset_hours * 3600)
            .expect("offset is validated when the config is loaded")
    }

    pub fn schedule(&self) -> ResetSchedule {
        ResetSchedule {
            daily_at: self.daily_reset_at,
            weekly_on: self.weekly_reset_on,
            weekly_at: self.weekly_reset_at,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SurrealConfig {
    #[serde(rename = "surreal_url")]
    pub url: Url,
    #[serde(rename = "surreal_ns", default = "default_namespace")]
    pub namespace: String,
    #[serde(rename = "surreal_db", default = "default_database")]
    pub database: String,
    #[serde(flatten)]
    pub credentials: Option<SurrealCredentials>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SurrealCredentials {
    #[serde(rename = "surreal_user")]
    pub username: String,
    #[serde(rename = "surreal_pass")]
    pub password: String,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_namespace() -> String {
    String::from("hotlist")
}

fn default_database() -> String {
    String::from("hotlist")
}

fn default_reset_at() -> NaiveTime {
    NaiveTime::MIN
}

fn default_reset_on() -> Weekday {
    Weekday::Mon
}
