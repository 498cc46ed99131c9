use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

use super::streak::{Calendar, Streak, StreakChange};
use crate::error::{CatalogError, Result};

/// Authorization role. Only admins author catalog content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(format!("unknown role '{other}': expected admin or user")),
        }
    }
}

/// Identity asserted by the external provider at sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Result of [`UserProfile::solve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveOutcome {
    /// The problem was already in the completion map. Only `last_active` moved.
    AlreadySolved,
    SameDay,
    Extended,
    Started,
}

impl From<StreakChange> for SolveOutcome {
    fn from(change: StreakChange) -> Self {
        match change {
            StreakChange::SameDay => Self::SameDay,
            StreakChange::Extended => Self::Extended,
            StreakChange::Started => Self::Started,
        }
    }
}

impl SolveOutcome {
    /// Whether a new completion entry was written.
    #[must_use]
    pub const fn is_recorded(self) -> bool {
        !matches!(self, Self::AlreadySolved)
    }
}

/// Persisted fields of a profile, as read back from the store.
#[derive(Debug, Clone)]
pub struct ProfileParts {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub completed: BTreeMap<String, DateTime<Utc>>,
    pub last_solved_date: Option<NaiveDate>,
    pub current_streak: u32,
    pub max_streak: u32,
}

/// Per-user progress aggregate.
///
/// The completion map and streak counters change only through
/// [`solve`](Self::solve), [`unsolve`](Self::unsolve) and [`touch`](Self::touch),
/// so `current_streak <= max_streak` holds for every reachable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    uid: String,
    email: Option<String>,
    display_name: Option<String>,
    role: Role,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
    completed: BTreeMap<String, DateTime<Utc>>,
    streak: Streak,
}

impl UserProfile {
    /// Fresh profile with an empty completion map and zero streaks.
    #[must_use]
    pub fn new(identity: Identity, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            uid: identity.uid,
            email: identity.email,
            display_name: identity.display_name,
            role,
            created_at: now,
            last_active: now,
            completed: BTreeMap::new(),
            streak: Streak::default(),
        }
    }

    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] if the stored streak has
    /// `current_streak > max_streak`.
    pub fn from_parts(parts: ProfileParts) -> Result<Self> {
        let streak = Streak::from_parts(
            parts.last_solved_date,
            parts.current_streak,
            parts.max_streak,
        )
        .ok_or_else(|| {
            CatalogError::invalid(
                "streak",
                format!(
                    "current {} exceeds max {} for user '{}'",
                    parts.current_streak, parts.max_streak, parts.uid
                ),
            )
        })?;

        Ok(Self {
            uid: parts.uid,
            email: parts.email,
            display_name: parts.display_name,
            role: parts.role,
            created_at: parts.created_at,
            last_active: parts.last_active,
            completed: parts.completed,
            streak,
        })
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    /// Problem key → instant of first solve.
    #[must_use]
    pub const fn completed(&self) -> &BTreeMap<String, DateTime<Utc>> {
        &self.completed
    }

    #[must_use]
    pub fn is_solved(&self, problem_id: &str) -> bool {
        self.completed.contains_key(problem_id)
    }

    #[must_use]
    pub const fn streak(&self) -> Streak {
        self.streak
    }

    /// Mark `problem_id` solved at `now` and advance the streak.
    pub fn solve(
        &mut self,
        problem_id: &str,
        now: DateTime<Utc>,
        calendar: &Calendar,
    ) -> SolveOutcome {
        self.last_active = now;
        if self.completed.contains_key(problem_id) {
            return SolveOutcome::AlreadySolved;
        }

        self.completed.insert(problem_id.to_string(), now);
        self.streak.record_solve(calendar.date_of(now)).into()
    }

    /// Remove `problem_id` from the completion map. Streak counters are kept.
    ///
    /// Returns whether an entry was removed.
    pub fn unsolve(&mut self, problem_id: &str, now: DateTime<Utc>) -> bool {
        self.last_active = now;
        self.completed.remove(problem_id).is_some()
    }

    /// Record session activity.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
    }

    /// # Errors
    ///
    /// Returns [`CatalogError::PermissionDenied`] unless the role is admin.
    pub fn require_admin(&self) -> Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(CatalogError::PermissionDenied {
                uid: self.uid.clone(),
            })
        }
    }

    /// Grant the admin role. Returns `false` if already an admin.
    pub(crate) fn promote(&mut self) -> bool {
        let changed = self.role != Role::Admin;
        self.role = Role::Admin;
        changed
    }

    /// Refresh provider-owned identity fields on sign-in. `None` keeps the stored value.
    pub(crate) fn refresh_identity(&mut self, identity: &Identity) {
        if identity.email.is_some() {
            self.email.clone_from(&identity.email);
        }
        if identity.display_name.is_some() {
            self.display_name.clone_from(&identity.display_name);
        }
    }
}
