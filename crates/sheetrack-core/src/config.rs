use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::Path;

use crate::db::STORE_DIR;
use crate::progress::streak::Calendar;

/// Project-level settings from `.sheetrack/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Accounts granted the admin role on sign-in.
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

impl AccessConfig {
    /// Case-insensitive membership check on the admin allow-list.
    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim();
        !email.is_empty()
            && self
                .admin_emails
                .iter()
                .any(|candidate| candidate.trim().eq_ignore_ascii_case(email))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Offset from UTC used to derive the calendar date of a solve.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Problems per day for the daily goal.
    #[serde(default = "default_daily_target")]
    pub daily_target: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            daily_target: default_daily_target(),
        }
    }
}

impl ProgressConfig {
    /// Calendar used for streak and activity dates.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is a day or more away from UTC.
    pub fn calendar(&self) -> Result<Calendar> {
        Calendar::from_offset_minutes(self.utc_offset_minutes).ok_or_else(|| {
            anyhow!(
                "progress.utc_offset_minutes = {} is out of range (-1439..=1439)",
                self.utc_offset_minutes
            )
        })
    }
}

/// Per-user settings from the platform config directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    /// Default user key when neither `--user` nor `SHEETRACK_USER` is set.
    #[serde(default)]
    pub user: Option<String>,
}

/// Default contents written by `sk init`.
pub const DEFAULT_PROJECT_CONFIG: &str = r#"[access]
# Emails that receive the admin role on sign-in.
admin_emails = []

[progress]
# Calendar dates for streaks are taken at this offset from UTC.
utc_offset_minutes = 0
daily_target = 3
"#;

/// Load `.sheetrack/config.toml`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(STORE_DIR).join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// # Errors
///
/// Returns an error if the user config exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("sheetrack/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// `--json` wins, then `FORMAT`, then the user config, then TTY detection.
#[must_use]
pub fn resolve_output(cli_json: bool, user_output: Option<&str>, env_format: Option<&str>) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

const fn default_daily_target() -> u32 {
    3
}
