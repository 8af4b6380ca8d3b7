use super::types::*;
use crate::config::{env_var_pattern, expand_env_vars};
use chrono_tz::Tz;
use lettre::message::Mailbox;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    use std::io::Read;

    let mut file = File::open(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open config file '{}': {}", path.display(), e),
        ))
    })?;

    let mut yaml_string = String::new();
    file.read_to_string(&mut yaml_string).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    let config = parse_config_str(&yaml_string).map_err(|e| match e {
        ConfigError::YamlParse(inner) => ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("in file '{}': {}", path.display(), inner),
        )),
        other => other,
    })?;

    Ok(config)
}

/// Parses and validates config YAML, expanding `$env{VAR}` references first.
pub fn parse_config_str(yaml: &str) -> Result<Config, ConfigError> {
    let yaml_string = expand_env_vars(yaml);

    check_unexpanded_vars(&yaml_string)?;

    let config: Config = serde_yaml::from_str(&yaml_string)?;
    validate_config(&config)?;

    Ok(config)
}

/// Checks for unexpanded environment variables and returns a helpful error.
/// Comment lines are skipped so documentation can mention the syntax.
fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    let mut unexpanded_vars: Vec<String> = yaml_string
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(|line| env_var_pattern().captures_iter(line))
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect();

    if unexpanded_vars.is_empty() {
        return Ok(());
    }

    unexpanded_vars.sort();
    unexpanded_vars.dedup();

    let error_msg = if unexpanded_vars.len() == 1 {
        format!(
            "Environment variable $env{{{0}}} is not set.\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variable: export {0}=...\n\
             2. Replace $env{{{0}}} in the config file with the actual value",
            unexpanded_vars[0]
        )
    } else {
        format!(
            "Environment variables are not set: {}\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variables (e.g., export FLEET_PASSWORD=...)\n\
             2. Replace the variables in the config file with actual values",
            unexpanded_vars.join(", ")
        )
    };

    Err(ConfigError::Validation(error_msg))
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    validate_vendor(&config.vendor, &mut errors);
    validate_report(&config.report, &mut errors);
    validate_mail(&config.mail, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

fn validate_vendor(vendor: &VendorConfig, errors: &mut Vec<String>) {
    if vendor.base_url.trim().is_empty() {
        errors.push("vendor.base_url cannot be empty".to_string());
    } else if !vendor.base_url.starts_with("http://") && !vendor.base_url.starts_with("https://") {
        errors.push(format!(
            "vendor.base_url must start with http:// or https://: {}",
            vendor.base_url
        ));
    }

    if vendor.email.trim().is_empty() {
        errors.push("vendor.email cannot be empty".to_string());
    }

    if vendor.request_timeout.is_some_and(|t| t.is_zero()) {
        errors.push("vendor.request_timeout must be greater than zero".to_string());
    }
}

fn validate_report(report: &ReportConfig, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for (i, group) in report.groups.iter().enumerate() {
        if !seen.insert(group) {
            errors.push(format!("report.groups[{}]: duplicate group ID {}", i, group));
        }
    }

    if report.timezone.parse::<Tz>().is_err() {
        errors.push(format!("report.timezone: unknown timezone '{}'", report.timezone));
    }

    if report.start_time >= report.end_time {
        errors.push(format!(
            "report.start_time ({}) must be earlier than report.end_time ({})",
            report.start_time, report.end_time
        ));
    }

    if report.fetch_timeout.is_zero() {
        errors.push("report.fetch_timeout must be greater than zero".to_string());
    }

    if !(report.distance_flag_km > 0.0) {
        errors.push(format!(
            "report.distance_flag_km must be positive, got {}",
            report.distance_flag_km
        ));
    }
}

fn validate_mail(mail: &MailConfig, errors: &mut Vec<String>) {
    if mail.host.trim().is_empty() {
        errors.push("mail.host cannot be empty".to_string());
    }

    validate_mailbox("mail.from", &mail.from, errors);

    if mail.to.is_empty() {
        errors.push("mail.to must contain at least one recipient".to_string());
    }
    for (i, addr) in mail.to.iter().enumerate() {
        validate_mailbox(&format!("mail.to[{}]", i), addr, errors);
    }
    for (i, addr) in mail.cc.iter().enumerate() {
        validate_mailbox(&format!("mail.cc[{}]", i), addr, errors);
    }
}

fn validate_mailbox(context: &str, addr: &str, errors: &mut Vec<String>) {
    if let Err(e) = addr.parse::<Mailbox>() {
        errors.push(format!("{}: invalid address '{}': {}", context, addr, e));
    }
}
