//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.casemail/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::autosave::{DEFAULT_AUTOSAVE_DELAY, DEFAULT_SAVED_INDICATOR};
use crate::core::effects::{DEFAULT_ACTION_CATEGORY, DEFAULT_AUDIT_RETRIES};
use crate::core::schedule::ScheduleRules;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CasemailConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AutosaveConfig {
    pub delay_secs: Option<u64>,
    pub saved_indicator_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ScheduleConfig {
    pub min_lead_minutes: Option<i64>,
    pub max_days: Option<i64>,
    pub step_minutes: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AuditConfig {
    pub action_category: Option<String>,
    pub retries: Option<u8>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MIN_LEAD_MINUTES: i64 = 60;
const DEFAULT_MAX_DAYS: i64 = 30;
const DEFAULT_STEP_MINUTES: i64 = 15;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub autosave_delay: Duration,
    pub saved_indicator: Duration,
    pub min_lead_minutes: i64,
    pub max_days: i64,
    pub step_minutes: i64,
    pub audit_action_category: String,
    pub audit_retries: u8,
}

impl ResolvedConfig {
    pub fn schedule_rules(&self) -> ScheduleRules {
        ScheduleRules {
            min_lead: chrono::Duration::minutes(self.min_lead_minutes),
            max_ahead: chrono::Duration::days(self.max_days),
            step: chrono::Duration::minutes(self.step_minutes),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.casemail/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".casemail").join("config.toml"))
}

/// Load config from `~/.casemail/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `CasemailConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<CasemailConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(CasemailConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(CasemailConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: CasemailConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", redacted(&config));
    Ok(config)
}

/// Debug view without the API key.
fn redacted(config: &CasemailConfig) -> String {
    format!(
        "backend.base_url={:?} backend.api_key={} autosave={:?} schedule={:?} audit={:?}",
        config.backend.base_url,
        if config.backend.api_key.is_some() { "<set>" } else { "<unset>" },
        config.autosave,
        config.schedule,
        config.audit,
    )
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# casemail configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [backend]
# base_url = "http://localhost:8080/api"   # Or set CASEMAIL_BASE_URL env var
# api_key = "..."                           # Or set CASEMAIL_API_KEY env var
# timeout_secs = 60

# [autosave]
# delay_secs = 30               # Quiet period before a dirty draft is saved
# saved_indicator_secs = 2      # How long "Saved" stays visible

# [schedule]
# min_lead_minutes = 60         # Earliest send time, relative to now
# max_days = 30                 # Latest send time, relative to now
# step_minutes = 15             # Picker granularity

# [audit]
# action_category = "email"
# retries = 1                   # Extra attempts when an audit append fails
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` is from the CLI flag (None = not specified).
pub fn resolve(config: &CasemailConfig, cli_base_url: Option<&str>) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("CASEMAIL_BASE_URL").ok())
        .or_else(|| config.backend.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // API key: env → config
    let api_key = std::env::var("CASEMAIL_API_KEY")
        .ok()
        .or_else(|| config.backend.api_key.clone());

    ResolvedConfig {
        base_url,
        api_key,
        timeout: Duration::from_secs(
            config.backend.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ),
        autosave_delay: config
            .autosave
            .delay_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_AUTOSAVE_DELAY),
        saved_indicator: config
            .autosave
            .saved_indicator_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SAVED_INDICATOR),
        min_lead_minutes: positive_or(config.schedule.min_lead_minutes, DEFAULT_MIN_LEAD_MINUTES),
        max_days: positive_or(config.schedule.max_days, DEFAULT_MAX_DAYS),
        step_minutes: positive_or(config.schedule.step_minutes, DEFAULT_STEP_MINUTES),
        audit_action_category: config
            .audit
            .action_category
            .clone()
            .unwrap_or_else(|| DEFAULT_ACTION_CATEGORY.to_string()),
        audit_retries: config.audit.retries.unwrap_or(DEFAULT_AUDIT_RETRIES),
    }
}

/// Zero or negative window values would make every send time invalid.
fn positive_or(value: Option<i64>, default: i64) -> i64 {
    match value {
        Some(v) if v > 0 => v,
        Some(v) => {
            warn!("Ignoring non-positive schedule setting {}, using {}", v, default);
            default
        }
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = CasemailConfig::default();
        assert!(config.backend.base_url.is_none());
        assert!(config.audit.retries.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let config = CasemailConfig::default();
        let resolved = resolve(&config, Some("http://cli"));
        assert_eq!(resolved.autosave_delay, Duration::from_secs(30));
        assert_eq!(resolved.saved_indicator, Duration::from_secs(2));
        assert_eq!(resolved.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(resolved.audit_action_category, "email");
        assert_eq!(resolved.audit_retries, 1);
        assert_eq!(resolved.schedule_rules(), ScheduleRules::default());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = CasemailConfig {
            autosave: AutosaveConfig {
                delay_secs: Some(10),
                saved_indicator_secs: Some(5),
            },
            schedule: ScheduleConfig {
                min_lead_minutes: Some(120),
                max_days: Some(7),
                step_minutes: Some(30),
            },
            audit: AuditConfig {
                action_category: Some("customer_comms".to_string()),
                retries: Some(0),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some("http://cli"));
        assert_eq!(resolved.autosave_delay, Duration::from_secs(10));
        assert_eq!(resolved.saved_indicator, Duration::from_secs(5));
        let rules = resolved.schedule_rules();
        assert_eq!(rules.min_lead, chrono::Duration::hours(2));
        assert_eq!(rules.max_ahead, chrono::Duration::days(7));
        assert_eq!(rules.step, chrono::Duration::minutes(30));
        assert_eq!(resolved.audit_action_category, "customer_comms");
        assert_eq!(resolved.audit_retries, 0);
    }

    #[test]
    fn test_resolve_cli_base_url_wins() {
        let config = CasemailConfig {
            backend: BackendConfig {
                base_url: Some("http://from-config".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some("http://from-cli"));
        assert_eq!(resolved.base_url, "http://from-cli");
    }

    #[test]
    fn test_non_positive_schedule_values_fall_back() {
        let config = CasemailConfig {
            schedule: ScheduleConfig {
                min_lead_minutes: Some(0),
                max_days: Some(-3),
                step_minutes: None,
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some("http://cli"));
        assert_eq!(resolved.min_lead_minutes, 60);
        assert_eq!(resolved.max_days, 30);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[backend]
base_url = "https://crm.example.com/api"
api_key = "secret-123"
timeout_secs = 15

[autosave]
delay_secs = 45

[schedule]
step_minutes = 5

[audit]
action_category = "email"
"#;
        let config: CasemailConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.backend.base_url.as_deref(),
            Some("https://crm.example.com/api")
        );
        assert_eq!(config.backend.timeout_secs, Some(15));
        assert_eq!(config.autosave.delay_secs, Some(45));
        assert!(config.autosave.saved_indicator_secs.is_none());
        assert_eq!(config.schedule.step_minutes, Some(5));
        assert_eq!(config.audit.action_category.as_deref(), Some("email"));
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing, everything else stays default
        let toml_str = r#"
[autosave]
delay_secs = 5
"#;
        let config: CasemailConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.autosave.delay_secs, Some(5));
        assert!(config.backend.base_url.is_none());
        assert!(config.schedule.max_days.is_none());
    }

    #[test]
    fn test_redacted_hides_api_key() {
        let config = CasemailConfig {
            backend: BackendConfig {
                api_key: Some("super-secret".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let text = redacted(&config);
        assert!(!text.contains("super-secret"));
        assert!(text.contains("<set>"));
    }
}
