pub mod completions;
pub mod create;
pub mod delete;
pub mod import;
pub mod init;
pub mod list;
pub mod login;
pub mod move_cmd;
pub mod note;
pub mod profile;
pub mod rename;
pub mod restore;
pub mod show;
pub mod solve;
pub mod stats;
pub mod users;

use crate::identity;
use crate::output::{CliError, OutputMode};
use crate::validate;
use anyhow::Result;
use rusqlite::Connection;
use sheetrack_core::config::{self, ProjectConfig, UserConfig};
use sheetrack_core::db;
use sheetrack_core::error::ErrorCode;
use sheetrack_core::progress::{self, profile::UserProfile, streak::Calendar};
use std::path::{Path, PathBuf};

/// Per-invocation state shared by every command handler.
pub struct Context<'a> {
    pub cwd: &'a Path,
    pub output: OutputMode,
    pub user_flag: Option<&'a str>,
    pub email_flag: Option<&'a str>,
    pub user_config: &'a UserConfig,
}

/// An opened project: root directory, migrated store and project config.
pub struct Project {
    pub root: PathBuf,
    pub conn: Connection,
    pub config: ProjectConfig,
}

impl Project {
    pub fn calendar(&self) -> Result<Calendar> {
        self.config.progress.calendar().map_err(|err| {
            CliError::with_details(
                format!("{err:#}"),
                ErrorCode::ConfigParseError.hint().unwrap_or_default(),
                ErrorCode::ConfigParseError.code(),
            )
            .into()
        })
    }
}

impl Context<'_> {
    /// Locate `.sheetrack/` from the working directory upward and open it.
    pub fn open_project(&self) -> Result<Project> {
        let Some(root) = db::find_project_root(self.cwd) else {
            return Err(CliError::with_details(
                format!("no {} directory found in {} or its parents", db::STORE_DIR, self.cwd.display()),
                ErrorCode::NotInitialized.hint().unwrap_or_default(),
                ErrorCode::NotInitialized.code(),
            )
            .into());
        };

        let config = config::load_project_config(&root).map_err(|err| {
            CliError::with_details(
                format!("{err:#}"),
                ErrorCode::ConfigParseError.hint().unwrap_or_default(),
                ErrorCode::ConfigParseError.code(),
            )
        })?;
        let conn = db::open_store(&db::db_path(&root))?;
        tracing::debug!(root = %root.display(), "project opened");

        Ok(Project { root, conn, config })
    }

    /// The acting user's key, validated.
    pub fn require_uid(&self) -> Result<String> {
        let uid = identity::require_user(self.user_flag, self.user_config.user.as_deref())
            .map_err(|err| {
                CliError::with_details(&err.message, "Set --user or SHEETRACK_USER", err.code)
            })?;
        validate::validate_user(&uid).map_err(CliError::from)?;
        Ok(uid)
    }

    /// The acting user's key if one can be resolved.
    pub fn optional_uid(&self) -> Option<String> {
        identity::resolve_user(self.user_flag, self.user_config.user.as_deref())
    }

    /// Load the acting user's profile, stamping session activity.
    pub fn active_profile(&self, project: &mut Project) -> Result<UserProfile> {
        let uid = self.require_uid()?;
        let profile = progress::heartbeat(&mut project.conn, &uid, chrono::Utc::now())
            .map_err(|err| with_login_hint(&err))?;
        Ok(profile)
    }

    /// Load the acting user's profile and require the admin role.
    pub fn require_admin(&self, project: &mut Project) -> Result<UserProfile> {
        let profile = self.active_profile(project)?;
        profile.require_admin()?;
        Ok(profile)
    }
}

/// Point unknown users at `sk login` instead of the generic not-found hint.
fn with_login_hint(err: &sheetrack_core::error::CatalogError) -> anyhow::Error {
    use sheetrack_core::error::CatalogError;
    match err {
        CatalogError::NotFound { kind: "user", id } => CliError::with_details(
            format!("user '{id}' has not signed in to this project"),
            "Run `sk login --email <address>` first.",
            ErrorCode::NotFound.code(),
        )
        .into(),
        other => CliError::from(other).into(),
    }
}
