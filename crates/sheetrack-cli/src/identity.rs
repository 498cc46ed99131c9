//! User identity resolution for CLI commands.
//!
//! The resolution chain: `--user` flag > `SHEETRACK_USER` env > user config
//! `user` > `USER` env (TTY only). The email asserted at sign-in comes from
//! `--email` or `SHEETRACK_EMAIL`.
//! Catalog reads work without a user; progress and authoring commands require one.

use std::env;

/// Errors from identity resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityError {
    /// Human-readable description.
    pub message: String,
    /// Machine error code.
    pub code: &'static str,
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdentityError {}

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
    fn is_tty(&self) -> bool;
}

/// Real environment reader.
struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    fn is_tty(&self) -> bool {
        use std::io::IsTerminal;
        std::io::stdin().is_terminal()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Core resolution logic, parameterized by environment reader.
fn resolve_user_with(
    cli_flag: Option<&str>,
    config_user: Option<&str>,
    env: &dyn EnvReader,
) -> Option<String> {
    // Step 1: explicit --user flag
    if let Some(user) = non_empty(cli_flag) {
        return Some(user);
    }

    // Step 2: SHEETRACK_USER env
    if let Some(val) = env.get("SHEETRACK_USER") {
        return Some(val);
    }

    // Step 3: user config default
    if let Some(user) = non_empty(config_user) {
        return Some(user);
    }

    // Step 4: USER env, but only if stdin is a TTY
    if env.is_tty() {
        if let Some(val) = env.get("USER") {
            return Some(val);
        }
    }

    None
}

fn resolve_email_with(cli_flag: Option<&str>, env: &dyn EnvReader) -> Option<String> {
    non_empty(cli_flag).or_else(|| env.get("SHEETRACK_EMAIL"))
}

/// Resolve the user key, `None` if no source provides one.
pub fn resolve_user(cli_flag: Option<&str>, config_user: Option<&str>) -> Option<String> {
    resolve_user_with(cli_flag, config_user, &RealEnv)
}

/// Resolve the user key, returning an error if not found.
pub fn require_user(
    cli_flag: Option<&str>,
    config_user: Option<&str>,
) -> Result<String, IdentityError> {
    resolve_user(cli_flag, config_user).ok_or_else(|| IdentityError {
        message: "User identity required for this command. \
                  Set --user or the SHEETRACK_USER environment variable."
            .to_string(),
        code: "missing_user",
    })
}

/// Resolve the sign-in email from `--email` or `SHEETRACK_EMAIL`.
pub fn resolve_email(cli_flag: Option<&str>) -> Option<String> {
    resolve_email_with(cli_flag, &RealEnv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Test environment reader with configurable values.
    struct MockEnv {
        vars: HashMap<String, String>,
        tty: bool,
    }

    impl MockEnv {
        fn new() -> Self {
            Self {
                vars: HashMap::new(),
                tty: false,
            }
        }

        fn var(mut self, key: &str, val: &str) -> Self {
            self.vars.insert(key.to_string(), val.to_string());
            self
        }

        fn tty(mut self) -> Self {
            self.tty = true;
            self
        }
    }

    impl EnvReader for MockEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.vars.get(key).filter(|v| !v.trim().is_empty()).cloned()
        }

        fn is_tty(&self) -> bool {
            self.tty
        }
    }

    #[test]
    fn cli_flag_takes_priority() {
        let env = MockEnv::new().var("SHEETRACK_USER", "env-user");
        let result = resolve_user_with(Some("flag-user"), Some("config-user"), &env);
        assert_eq!(result.as_deref(), Some("flag-user"));
    }

    #[test]
    fn env_beats_config() {
        let env = MockEnv::new().var("SHEETRACK_USER", "env-user");
        let result = resolve_user_with(None, Some("config-user"), &env);
        assert_eq!(result.as_deref(), Some("env-user"));
    }

    #[test]
    fn config_user_used_when_env_missing() {
        let env = MockEnv::new().var("USER", "shell-user").tty();
        let result = resolve_user_with(None, Some("config-user"), &env);
        assert_eq!(result.as_deref(), Some("config-user"));
    }

    #[test]
    fn blank_flag_falls_through() {
        let env = MockEnv::new().var("SHEETRACK_USER", "env-user");
        let result = resolve_user_with(Some("   "), None, &env);
        assert_eq!(result.as_deref(), Some("env-user"));
    }

    #[test]
    fn shell_user_only_on_tty() {
        let piped = MockEnv::new().var("USER", "shell-user");
        assert_eq!(resolve_user_with(None, None, &piped), None);

        let tty = MockEnv::new().var("USER", "shell-user").tty();
        assert_eq!(
            resolve_user_with(None, None, &tty).as_deref(),
            Some("shell-user")
        );
    }

    #[test]
    fn email_flag_beats_env() {
        let env = MockEnv::new().var("SHEETRACK_EMAIL", "env@example.com");
        assert_eq!(
            resolve_email_with(Some("flag@example.com"), &env).as_deref(),
            Some("flag@example.com")
        );
        assert_eq!(
            resolve_email_with(None, &env).as_deref(),
            Some("env@example.com")
        );
        assert_eq!(resolve_email_with(None, &MockEnv::new()), None);
    }
}
