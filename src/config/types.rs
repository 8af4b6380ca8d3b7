use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::report::render::DISTANCE_FLAG_THRESHOLD_KM;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub vendor: VendorConfig,
    pub report: ReportConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    /// API root, e.g. `https://tracking.example.com/api`
    pub base_url: String,
    pub email: String,
    pub password: String,
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    /// Per-request limit enforced by the HTTP client. Unset by default.
    #[serde(with = "humantime_serde", default)]
    pub request_timeout: Option<Duration>,
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

impl VendorConfig {
    pub fn session_url(&self) -> String {
        format!("{}/session", self.base_url.trim_end_matches('/'))
    }

    pub fn summary_url(&self) -> String {
        format!("{}/reports/summary", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub groups: Vec<i64>,
    /// IANA timezone name used to compute yesterday's window
    pub timezone: String,
    #[serde(default = "default_start_time")]
    pub start_time: NaiveTime,
    #[serde(default = "default_end_time")]
    pub end_time: NaiveTime,
    #[serde(with = "humantime_serde", default = "default_fetch_timeout")]
    pub fetch_timeout: Duration,
    #[serde(default = "default_distance_flag_km")]
    pub distance_flag_km: f64,
    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default()
}

fn default_end_time() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default()
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_distance_flag_km() -> f64 {
    DISTANCE_FLAG_THRESHOLD_KM
}

fn default_subject() -> String {
    "After-Hours Summary Report".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub security: SmtpSecurity,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    #[default]
    Starttls,
    Tls,
    None,
}
