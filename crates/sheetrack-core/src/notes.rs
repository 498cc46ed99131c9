//! Per-(user, problem) free-text notes.
//!
//! Notes live beside progress; they never affect streaks or stats.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::db::query::instant_from_us;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub user_id: String,
    pub problem_id: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

/// Insert or replace the note for `(uid, problem_id)`.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn save_note(
    conn: &Connection,
    uid: &str,
    problem_id: &str,
    content: &str,
    now: DateTime<Utc>,
) -> Result<Note> {
    conn.execute(
        "INSERT INTO notes (uid, problem_id, content, updated_at_us) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(uid, problem_id) DO UPDATE SET
            content = excluded.content,
            updated_at_us = excluded.updated_at_us",
        params![uid, problem_id, content, now.timestamp_micros()],
    )?;
    tracing::debug!(uid, problem_id, len = content.len(), "saved note");
    Ok(Note {
        user_id: uid.to_string(),
        problem_id: problem_id.to_string(),
        content: content.to_string(),
        updated_at: now,
    })
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn get_note(conn: &Connection, uid: &str, problem_id: &str) -> Result<Option<Note>> {
    Ok(conn
        .query_row(
            "SELECT content, updated_at_us FROM notes WHERE uid = ?1 AND problem_id = ?2",
            params![uid, problem_id],
            |row| {
                Ok(Note {
                    user_id: uid.to_string(),
                    problem_id: problem_id.to_string(),
                    content: row.get(0)?,
                    updated_at: instant_from_us(1, row.get(1)?)?,
                })
            },
        )
        .optional()?)
}

/// Note contents for the given problems. An empty filter returns every note of the user.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn notes_for_problems(
    conn: &Connection,
    uid: &str,
    problem_ids: &[&str],
) -> Result<BTreeMap<String, String>> {
    let mut stmt = conn.prepare("SELECT problem_id, content FROM notes WHERE uid = ?1")?;
    let rows = stmt.query_map(params![uid], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut notes = BTreeMap::new();
    for row in rows {
        let (problem_id, content) = row?;
        if problem_ids.is_empty() || problem_ids.contains(&problem_id.as_str()) {
            notes.insert(problem_id, content);
        }
    }
    Ok(notes)
}
