pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# AFTERHOURS CONFIGURATION
# =============================================================================
# Emails a summary of vehicles that were driven after hours the previous
# evening. Secrets can be pulled from the environment with the $env{...}
# syntax used for the passwords below; the run refuses to start if a
# referenced variable is not set.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/afterhours/config.yml
#   3. /etc/afterhours/config.yml

# =============================================================================
# VENDOR
# =============================================================================
# Fleet tracking API. The client logs in once via POST {base_url}/session and
# reuses the session cookie for every report request.

vendor:
  base_url: https://tracking.example.com/api
  email: reports@example.com
  password: $env{AFTERHOURS_VENDOR_PASSWORD}
  # TCP connect timeout for every vendor request
  connect_timeout: 10s
  # Optional per-request timeout; the report deadline below still applies
  # request_timeout: 30s

# =============================================================================
# REPORT
# =============================================================================

report:
  # Fleet subgroups to include; one concurrent request per group
  groups: [1, 2, 3]
  # IANA timezone used to work out "yesterday"
  timezone: Australia/Melbourne
  # Local time range on the previous day
  start_time: "18:00:00"
  end_time: "23:59:59"
  # Shared deadline for all group requests; any group still in flight fails the run
  fetch_timeout: 10s
  # Rows travelling further than this (km) are highlighted
  distance_flag_km: 20.0
  subject: After-Hours Summary Report

# =============================================================================
# MAIL
# =============================================================================

mail:
  host: smtp.example.com
  port: 587
  # 'starttls', 'tls' (implicit TLS), or 'none'
  security: starttls
  username: reports@example.com
  password: $env{AFTERHOURS_SMTP_PASSWORD}
  from: reports@example.com
  to:
    - fleet-manager@example.com
  cc: []
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_config_is_valid_once_secrets_are_set() {
        let yaml = generate_starter_config()
            .replace("$env{AFTERHOURS_VENDOR_PASSWORD}", "vendor-secret")
            .replace("$env{AFTERHOURS_SMTP_PASSWORD}", "smtp-secret");

        let config = crate::config::parse_config_str(&yaml).expect("starter config should be valid");
        assert_eq!(config.report.groups, vec![1, 2, 3]);
        assert_eq!(config.report.timezone, "Australia/Melbourne");
        assert_eq!(config.mail.port, 587);
    }

    #[test]
    fn test_starter_config_loads_with_secrets_from_env() {
        std::env::set_var("AFTERHOURS_VENDOR_PASSWORD", "vendor-secret");
        std::env::set_var("AFTERHOURS_SMTP_PASSWORD", "smtp-secret");

        let config = crate::config::parse_config_str(&generate_starter_config())
            .expect("starter config should load once its variables are set");
        assert_eq!(config.vendor.password, "vendor-secret");
        assert_eq!(config.mail.password, "smtp-secret");
        assert_eq!(config.vendor.request_timeout, None);
    }
}
