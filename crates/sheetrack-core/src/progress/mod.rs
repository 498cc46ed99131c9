//! Progress tracker: profile provisioning and the solve/unsolve transitions.
//!
//! Every mutation goes through one read-modify-write cycle inside an
//! `IMMEDIATE` transaction: load the whole [`UserProfile`], apply a method on
//! the aggregate, write the `users` row and the single changed `completions`
//! row, commit.

pub mod activity;
pub mod profile;
pub mod streak;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params, types::Type};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::AccessConfig;
use crate::db::query::{self, instant_from_us};
use crate::error::{CatalogError, Result};
use profile::{Identity, ProfileParts, Role, SolveOutcome, UserProfile};
use streak::Calendar;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

const USER_COLUMNS: &str = "uid, email, display_name, role, created_at_us, last_active_us, \
                            last_solved_date, current_streak, max_streak";

fn row_to_parts(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProfileParts> {
    let role: String = row.get(3)?;
    let role = role.parse::<Role>().map_err(|reason| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, reason.into())
    })?;

    let last_solved_date = row
        .get::<_, Option<String>>(6)?
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|err| {
                rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(err))
            })
        })
        .transpose()?;

    Ok(ProfileParts {
        uid: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        role,
        created_at: instant_from_us(4, row.get(4)?)?,
        last_active: instant_from_us(5, row.get(5)?)?,
        completed: BTreeMap::new(),
        last_solved_date,
        current_streak: row.get(7)?,
        max_streak: row.get(8)?,
    })
}

fn load_completions(conn: &Connection, uid: &str) -> Result<BTreeMap<String, DateTime<Utc>>> {
    let mut stmt = conn.prepare(
        "SELECT problem_id, solved_at_us FROM completions WHERE uid = ?1 ORDER BY problem_id",
    )?;
    let rows = stmt.query_map(params![uid], |row| {
        Ok((row.get::<_, String>(0)?, instant_from_us(1, row.get(1)?)?))
    })?;
    Ok(rows.collect::<rusqlite::Result<BTreeMap<_, _>>>()?)
}

/// Load a full profile aggregate, `None` if the user has never signed in.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is inconsistent.
pub fn get_profile(conn: &Connection, uid: &str) -> Result<Option<UserProfile>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE uid = ?1");
    let Some(mut parts) = conn.query_row(&sql, params![uid], row_to_parts).optional()? else {
        return Ok(None);
    };
    parts.completed = load_completions(conn, uid)?;
    UserProfile::from_parts(parts).map(Some)
}

/// # Errors
///
/// Returns [`CatalogError::NotFound`] for an unknown user.
pub fn require_profile(conn: &Connection, uid: &str) -> Result<UserProfile> {
    get_profile(conn, uid)?.ok_or_else(|| CatalogError::not_found("user", uid))
}

/// All profiles, most recently active first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is inconsistent.
pub fn list_profiles(conn: &Connection) -> Result<Vec<UserProfile>> {
    let mut completions: BTreeMap<String, BTreeMap<String, DateTime<Utc>>> = BTreeMap::new();
    {
        let mut stmt = conn.prepare("SELECT uid, problem_id, solved_at_us FROM completions")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let uid: String = row.get(0)?;
            let problem_id: String = row.get(1)?;
            let solved_at = instant_from_us(2, row.get(2)?)?;
            completions.entry(uid).or_default().insert(problem_id, solved_at);
        }
    }

    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY last_active_us DESC, uid ASC");
    let mut stmt = conn.prepare(&sql)?;
    let parts = stmt
        .query_map([], row_to_parts)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    parts
        .into_iter()
        .map(|mut parts| {
            parts.completed = completions.remove(&parts.uid).unwrap_or_default();
            UserProfile::from_parts(parts)
        })
        .collect()
}

fn write_profile_row(tx: &Transaction<'_>, profile: &UserProfile) -> Result<()> {
    let streak = profile.streak();
    let last_solved = streak
        .last_solved_date()
        .map(|date| date.format(DATE_FORMAT).to_string());
    tx.execute(
        "INSERT INTO users (uid, email, display_name, role, created_at_us, last_active_us,
                            last_solved_date, current_streak, max_streak)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(uid) DO UPDATE SET
            email = excluded.email,
            display_name = excluded.display_name,
            role = excluded.role,
            last_active_us = excluded.last_active_us,
            last_solved_date = excluded.last_solved_date,
            current_streak = excluded.current_streak,
            max_streak = excluded.max_streak",
        params![
            profile.uid(),
            profile.email(),
            profile.display_name(),
            profile.role().as_str(),
            profile.created_at().timestamp_micros(),
            profile.last_active().timestamp_micros(),
            last_solved,
            streak.current(),
            streak.max(),
        ],
    )?;
    Ok(())
}

/// Run one read-modify-write cycle on a stored profile.
fn update_profile<T>(
    conn: &mut Connection,
    uid: &str,
    apply: impl FnOnce(&Transaction<'_>, &mut UserProfile) -> Result<T>,
) -> Result<(T, UserProfile)> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut profile = require_profile(&tx, uid)?;
    let value = apply(&tx, &mut profile)?;
    write_profile_row(&tx, &profile)?;
    tx.commit()?;
    Ok((value, profile))
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SignIn {
    pub profile: UserProfile,
    pub created: bool,
    pub promoted: bool,
}

/// Provision or refresh a profile for an externally authenticated identity.
///
/// A first sign-in creates the profile with defaults. Emails on the admin
/// list get (or are promoted to) the admin role. Every sign-in stamps
/// `last_active`.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidInput`] for an empty user key, or a storage error.
pub fn sign_in(
    conn: &mut Connection,
    identity: &Identity,
    access: &AccessConfig,
    now: DateTime<Utc>,
) -> Result<SignIn> {
    if identity.uid.trim().is_empty() {
        return Err(CatalogError::invalid("uid", "user key must not be empty"));
    }
    let listed_admin = identity
        .email
        .as_deref()
        .is_some_and(|email| access.is_admin_email(email));

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let (profile, created, promoted) = match get_profile(&tx, &identity.uid)? {
        Some(mut profile) => {
            profile.refresh_identity(identity);
            let promoted = listed_admin && profile.promote();
            profile.touch(now);
            (profile, false, promoted)
        }
        None => {
            let role = if listed_admin { Role::Admin } else { Role::User };
            (UserProfile::new(identity.clone(), role, now), true, false)
        }
    };
    write_profile_row(&tx, &profile)?;
    tx.commit()?;

    if created {
        tracing::info!(uid = %profile.uid(), role = %profile.role(), "profile created");
    } else if promoted {
        tracing::info!(uid = %profile.uid(), "profile promoted to admin");
    } else {
        tracing::debug!(uid = %profile.uid(), "sign-in");
    }

    Ok(SignIn {
        profile,
        created,
        promoted,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub problem_id: String,
    pub outcome: SolveOutcome,
    pub profile: UserProfile,
}

/// Mark a problem solved for `uid` and advance the streak.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] if the user is unknown or the problem is
/// missing or soft-deleted, or a storage error.
pub fn solve(
    conn: &mut Connection,
    uid: &str,
    problem_id: &str,
    now: DateTime<Utc>,
    calendar: &Calendar,
) -> Result<SolveReport> {
    let (outcome, profile) = update_profile(conn, uid, |tx, profile| {
        if query::get_problem(tx, problem_id, false)?.is_none() {
            return Err(CatalogError::not_found("problem", problem_id));
        }
        let outcome = profile.solve(problem_id, now, calendar);
        if outcome.is_recorded() {
            tx.execute(
                "INSERT INTO completions (uid, problem_id, solved_at_us) VALUES (?1, ?2, ?3)",
                params![uid, problem_id, now.timestamp_micros()],
            )?;
        }
        Ok(outcome)
    })?;

    tracing::debug!(
        uid,
        problem_id,
        ?outcome,
        current_streak = profile.streak().current(),
        "solve"
    );
    Ok(SolveReport {
        problem_id: problem_id.to_string(),
        outcome,
        profile,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct UnsolveReport {
    pub problem_id: String,
    pub removed: bool,
    pub profile: UserProfile,
}

/// Remove a problem from the user's completion map. The streak is not rewound.
///
/// The problem does not need to exist; stale completion keys can be cleared.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] for an unknown user, or a storage error.
pub fn unsolve(
    conn: &mut Connection,
    uid: &str,
    problem_id: &str,
    now: DateTime<Utc>,
) -> Result<UnsolveReport> {
    let (removed, profile) = update_profile(conn, uid, |tx, profile| {
        let removed = profile.unsolve(problem_id, now);
        if removed {
            tx.execute(
                "DELETE FROM completions WHERE uid = ?1 AND problem_id = ?2",
                params![uid, problem_id],
            )?;
        }
        Ok(removed)
    })?;

    tracing::debug!(uid, problem_id, removed, "unsolve");
    Ok(UnsolveReport {
        problem_id: problem_id.to_string(),
        removed,
        profile,
    })
}

/// Stamp session activity without touching progress.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] for an unknown user, or a storage error.
pub fn heartbeat(conn: &mut Connection, uid: &str, now: DateTime<Utc>) -> Result<UserProfile> {
    let ((), profile) = update_profile(conn, uid, |_, profile| {
        profile.touch(now);
        Ok(())
    })?;
    tracing::trace!(uid, "heartbeat");
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::streak::StreakChange;
    use super::*;
    use crate::db;
    use chrono::{Duration, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, day, hour, 0, 0)
            .single()
            .expect("valid instant")
    }

    fn identity(uid: &str, email: &str) -> Identity {
        Identity {
            uid: uid.into(),
            email: Some(email.into()),
            display_name: None,
        }
    }

    fn admins(emails: &[&str]) -> AccessConfig {
        AccessConfig {
            admin_emails: emails.iter().map(|e| (*e).to_string()).collect(),
        }
    }

    fn seeded() -> Connection {
        let conn = db::open_in_memory().expect("open store");
        conn.execute_batch(
            "INSERT INTO sheets (sheet_id, title, created_at_us) VALUES ('sh-1', 'S', 0);
             INSERT INTO topics (topic_id, sheet_id, title, sort_order) VALUES ('tp-1', 'sh-1', 'T', 1);
             INSERT INTO sub_patterns (sub_pattern_id, topic_id, title, sort_order) VALUES ('sp-1', 'tp-1', 'P', 1);
             INSERT INTO problems (problem_id, sub_pattern_id, title, url, platform, sort_order, is_deleted)
                 VALUES ('pb-a', 'sp-1', 'A', 'u', 'LeetCode', 1, 0),
                        ('pb-b', 'sp-1', 'B', 'u', 'LeetCode', 2, 0),
                        ('pb-gone', 'sp-1', 'C', 'u', 'Other', 3, 1);",
        )
        .expect("seed");
        conn
    }

    #[test]
    fn first_sign_in_creates_default_profile() {
        let mut conn = seeded();
        let result = sign_in(&mut conn, &identity("u-1", "a@x.io"), &admins(&[]), at(1, 8))
            .expect("sign in");
        assert!(result.created);
        assert_eq!(result.profile.role(), Role::User);
        assert_eq!(result.profile.streak().max(), 0);

        let stored = require_profile(&conn, "u-1").expect("stored");
        assert_eq!(stored, result.profile);
    }

    #[test]
    fn listed_email_is_admin_and_existing_user_is_promoted() {
        let mut conn = seeded();
        let first = sign_in(&mut conn, &identity("u-1", "boss@x.io"), &admins(&[]), at(1, 8))
            .expect("sign in");
        assert_eq!(first.profile.role(), Role::User);

        let again = sign_in(
            &mut conn,
            &identity("u-1", "boss@x.io"),
            &admins(&["BOSS@x.io"]),
            at(2, 8),
        )
        .expect("sign in");
        assert!(!again.created);
        assert!(again.promoted);
        assert_eq!(again.profile.role(), Role::Admin);
        assert_eq!(again.profile.last_active(), at(2, 8));
        assert_eq!(again.profile.created_at(), at(1, 8));
    }

    #[test]
    fn empty_uid_is_rejected() {
        let mut conn = seeded();
        assert!(matches!(
            sign_in(&mut conn, &identity("  ", "a@x.io"), &admins(&[]), at(1, 8)),
            Err(CatalogError::InvalidInput { field: "uid", .. })
        ));
    }

    #[test]
    fn solve_persists_completion_and_streak() {
        let mut conn = seeded();
        let cal = Calendar::utc();
        sign_in(&mut conn, &identity("u-1", "a@x.io"), &admins(&[]), at(1, 8)).expect("sign in");

        let report = solve(&mut conn, "u-1", "pb-a", at(1, 9), &cal).expect("solve");
        assert_eq!(report.outcome, SolveOutcome::from(StreakChange::Started));

        let report = solve(&mut conn, "u-1", "pb-b", at(2, 9), &cal).expect("solve");
        assert_eq!(report.outcome, SolveOutcome::Extended);

        let stored = require_profile(&conn, "u-1").expect("stored");
        assert_eq!(stored.completed().len(), 2);
        assert_eq!(stored.completed()["pb-a"], at(1, 9));
        assert_eq!((stored.streak().current(), stored.streak().max()), (2, 2));
    }

    #[test]
    fn solving_twice_only_moves_last_active() {
        let mut conn = seeded();
        let cal = Calendar::utc();
        sign_in(&mut conn, &identity("u-1", "a@x.io"), &admins(&[]), at(1, 8)).expect("sign in");
        solve(&mut conn, "u-1", "pb-a", at(1, 9), &cal).expect("solve");

        let report = solve(&mut conn, "u-1", "pb-a", at(3, 9), &cal).expect("re-solve");
        assert_eq!(report.outcome, SolveOutcome::AlreadySolved);
        assert_eq!(report.profile.completed()["pb-a"], at(1, 9));
        assert_eq!(report.profile.streak().last_solved_date(), Some(cal.date_of(at(1, 9))));
        assert_eq!(report.profile.last_active(), at(3, 9));
    }

    #[test]
    fn solving_deleted_or_unknown_problem_is_not_found() {
        let mut conn = seeded();
        let cal = Calendar::utc();
        sign_in(&mut conn, &identity("u-1", "a@x.io"), &admins(&[]), at(1, 8)).expect("sign in");

        for id in ["pb-gone", "pb-nope"] {
            assert!(matches!(
                solve(&mut conn, "u-1", id, at(1, 9), &cal),
                Err(CatalogError::NotFound { kind: "problem", .. })
            ));
        }
        assert_eq!(require_profile(&conn, "u-1").expect("stored").last_active(), at(1, 8));
    }

    #[test]
    fn unknown_user_is_not_found() {
        let mut conn = seeded();
        assert!(matches!(
            solve(&mut conn, "ghost", "pb-a", at(1, 9), &Calendar::utc()),
            Err(CatalogError::NotFound { kind: "user", .. })
        ));
        assert!(matches!(
            heartbeat(&mut conn, "ghost", at(1, 9)),
            Err(CatalogError::NotFound { kind: "user", .. })
        ));
    }

    #[test]
    fn unsolve_removes_row_and_keeps_streak() {
        let mut conn = seeded();
        let cal = Calendar::utc();
        sign_in(&mut conn, &identity("u-1", "a@x.io"), &admins(&[]), at(1, 8)).expect("sign in");
        solve(&mut conn, "u-1", "pb-a", at(1, 9), &cal).expect("solve");

        let report = unsolve(&mut conn, "u-1", "pb-a", at(1, 10)).expect("unsolve");
        assert!(report.removed);
        let stored = require_profile(&conn, "u-1").expect("stored");
        assert!(stored.completed().is_empty());
        assert_eq!(stored.streak().current(), 1);

        let again = unsolve(&mut conn, "u-1", "pb-missing", at(1, 11)).expect("unsolve");
        assert!(!again.removed);
    }

    #[test]
    fn list_profiles_orders_by_last_active() {
        let mut conn = seeded();
        let cal = Calendar::utc();
        sign_in(&mut conn, &identity("u-old", "o@x.io"), &admins(&[]), at(1, 8)).expect("sign in");
        sign_in(&mut conn, &identity("u-new", "n@x.io"), &admins(&[]), at(2, 8)).expect("sign in");
        solve(&mut conn, "u-old", "pb-a", at(3, 8), &cal).expect("solve");
        heartbeat(&mut conn, "u-new", at(3, 8) + Duration::minutes(5)).expect("heartbeat");

        let listed = list_profiles(&conn).expect("list");
        let uids: Vec<_> = listed.iter().map(UserProfile::uid).collect();
        assert_eq!(uids, vec!["u-new", "u-old"]);
        assert_eq!(listed[1].completed().len(), 1);
        assert!(listed[0].completed().is_empty());
    }
}
