//! `SQLite` query helpers for the catalog tables.
//!
//! All functions take a shared `&Connection` and return typed structs
//! (never raw rows). Listings exclude soft-deleted rows unless stated
//! otherwise and break `sort_order` ties by `rowid`, i.e. insertion order.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};

use crate::aggregate::HierarchySnapshot;
use crate::catalog::reorder::SiblingOrder;
use crate::error::{CatalogError, Result};
use crate::model::{EntityKind, Platform, Problem, Sheet, SubPattern, Topic};

// ---------------------------------------------------------------------------
// Column conversions
// ---------------------------------------------------------------------------

pub(crate) fn instant_from_us(col: usize, us: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(us).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            col,
            Type::Integer,
            format!("timestamp {us}us out of range").into(),
        )
    })
}

fn platform_from_sql(col: usize, raw: &str) -> rusqlite::Result<Platform> {
    raw.parse::<Platform>().map_err(|reason| {
        rusqlite::Error::FromSqlConversionFailure(col, Type::Text, reason.into())
    })
}

fn count_to_usize(count: i64) -> usize {
    usize::try_from(count).unwrap_or_default()
}

const SHEET_COLUMNS: &str = "sheet_id, title, description, is_deleted, created_at_us";
const TOPIC_COLUMNS: &str = "topic_id, sheet_id, title, sort_order, is_deleted";
const SUB_PATTERN_COLUMNS: &str = "sub_pattern_id, topic_id, title, sort_order, is_deleted";
const PROBLEM_COLUMNS: &str =
    "problem_id, sub_pattern_id, title, url, platform, platform_id, sort_order, is_deleted";

fn row_to_sheet(row: &Row<'_>) -> rusqlite::Result<Sheet> {
    Ok(Sheet {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        is_deleted: row.get(3)?,
        created_at: instant_from_us(4, row.get(4)?)?,
    })
}

fn row_to_topic(row: &Row<'_>) -> rusqlite::Result<Topic> {
    Ok(Topic {
        id: row.get(0)?,
        sheet_id: row.get(1)?,
        title: row.get(2)?,
        order: row.get(3)?,
        is_deleted: row.get(4)?,
    })
}

fn row_to_sub_pattern(row: &Row<'_>) -> rusqlite::Result<SubPattern> {
    Ok(SubPattern {
        id: row.get(0)?,
        topic_id: row.get(1)?,
        title: row.get(2)?,
        order: row.get(3)?,
        is_deleted: row.get(4)?,
    })
}

fn row_to_problem(row: &Row<'_>) -> rusqlite::Result<Problem> {
    let platform: String = row.get(4)?;
    Ok(Problem {
        id: row.get(0)?,
        sub_pattern_id: row.get(1)?,
        title: row.get(2)?,
        url: row.get(3)?,
        platform: platform_from_sql(4, &platform)?,
        platform_id: row.get(5)?,
        order: row.get(6)?,
        is_deleted: row.get(7)?,
    })
}

fn deleted_clause(include_deleted: bool) -> &'static str {
    if include_deleted {
        ""
    } else {
        " AND is_deleted = 0"
    }
}

// ---------------------------------------------------------------------------
// Single-entity lookups
// ---------------------------------------------------------------------------

/// Fetch a sheet by key. Soft-deleted rows are returned only with `include_deleted`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_sheet(conn: &Connection, id: &str, include_deleted: bool) -> Result<Option<Sheet>> {
    let sql = format!(
        "SELECT {SHEET_COLUMNS} FROM sheets WHERE sheet_id = ?1{}",
        deleted_clause(include_deleted)
    );
    Ok(conn.query_row(&sql, params![id], row_to_sheet).optional()?)
}

/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_problem(conn: &Connection, id: &str, include_deleted: bool) -> Result<Option<Problem>> {
    let sql = format!(
        "SELECT {PROBLEM_COLUMNS} FROM problems WHERE problem_id = ?1{}",
        deleted_clause(include_deleted)
    );
    Ok(conn.query_row(&sql, params![id], row_to_problem).optional()?)
}

/// Parent reference and soft-delete flag of any catalog entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityState {
    pub parent_id: Option<String>,
    pub is_deleted: bool,
}

/// Look up the parent and deletion flag of an entity, `None` if the key is unknown.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn entity_state(conn: &Connection, kind: EntityKind, id: &str) -> Result<Option<EntityState>> {
    let parent_expr = kind.parent_column().unwrap_or("NULL");
    let sql = format!(
        "SELECT {parent_expr}, is_deleted FROM {} WHERE {} = ?1",
        kind.table(),
        kind.id_column()
    );
    Ok(conn
        .query_row(&sql, params![id], |row| {
            Ok(EntityState {
                parent_id: row.get(0)?,
                is_deleted: row.get(1)?,
            })
        })
        .optional()?)
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// List sheets, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_sheets(conn: &Connection, include_deleted: bool) -> Result<Vec<Sheet>> {
    let filter = if include_deleted {
        ""
    } else {
        "WHERE is_deleted = 0 "
    };
    let sql =
        format!("SELECT {SHEET_COLUMNS} FROM sheets {filter}ORDER BY created_at_us DESC, rowid ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_sheet)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Non-deleted topics of a sheet, ascending by order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_topics(conn: &Connection, sheet_id: &str) -> Result<Vec<Topic>> {
    let sql = format!(
        "SELECT {TOPIC_COLUMNS} FROM topics \
         WHERE sheet_id = ?1 AND is_deleted = 0 \
         ORDER BY sort_order ASC, rowid ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![sheet_id], row_to_topic)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Non-deleted sub-patterns of a topic, ascending by order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_sub_patterns(conn: &Connection, topic_id: &str) -> Result<Vec<SubPattern>> {
    let sql = format!(
        "SELECT {SUB_PATTERN_COLUMNS} FROM sub_patterns \
         WHERE topic_id = ?1 AND is_deleted = 0 \
         ORDER BY sort_order ASC, rowid ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![topic_id], row_to_sub_pattern)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Non-deleted problems of a sub-pattern, ascending by order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_problems(conn: &Connection, sub_pattern_id: &str) -> Result<Vec<Problem>> {
    let sql = format!(
        "SELECT {PROBLEM_COLUMNS} FROM problems \
         WHERE sub_pattern_id = ?1 AND is_deleted = 0 \
         ORDER BY sort_order ASC, rowid ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![sub_pattern_id], row_to_problem)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Count the non-deleted direct children of an entity. Problems have none.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_active_children(conn: &Connection, kind: EntityKind, id: &str) -> Result<usize> {
    let Some(child) = kind.child() else {
        return Ok(0);
    };
    let Some(parent_column) = child.parent_column() else {
        return Ok(0);
    };
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {parent_column} = ?1 AND is_deleted = 0",
        child.table()
    );
    let count: i64 = conn.query_row(&sql, params![id], |row| row.get(0))?;
    Ok(count_to_usize(count))
}

/// Snapshot of `(id, order)` for the non-deleted siblings under `parent_id`,
/// in listing order.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidInput`] for sheets (they carry no order),
/// or an error if the database query fails.
pub fn sibling_orders(
    conn: &Connection,
    kind: EntityKind,
    parent_id: &str,
) -> Result<Vec<SiblingOrder>> {
    let Some(parent_column) = kind.parent_column() else {
        return Err(CatalogError::invalid(
            "kind",
            format!("{kind} entities are not ordered"),
        ));
    };
    let sql = format!(
        "SELECT {}, sort_order FROM {} \
         WHERE {parent_column} = ?1 AND is_deleted = 0 \
         ORDER BY sort_order ASC, rowid ASC",
        kind.id_column(),
        kind.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![parent_id], |row| {
        Ok(SiblingOrder {
            id: row.get(0)?,
            order: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Scan every catalog table once, soft-deleted rows included.
///
/// Sheets come back newest first; ordered kinds by `(sort_order, rowid)`.
///
/// # Errors
///
/// Returns an error if any of the scans fail.
pub fn load_snapshot(conn: &Connection) -> Result<HierarchySnapshot> {
    let sheets = list_sheets(conn, true)?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {TOPIC_COLUMNS} FROM topics ORDER BY sort_order ASC, rowid ASC"
    ))?;
    let topics = stmt
        .query_map([], row_to_topic)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {SUB_PATTERN_COLUMNS} FROM sub_patterns ORDER BY sort_order ASC, rowid ASC"
    ))?;
    let sub_patterns = stmt
        .query_map([], row_to_sub_pattern)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {PROBLEM_COLUMNS} FROM problems ORDER BY sort_order ASC, rowid ASC"
    ))?;
    let problems = stmt
        .query_map([], row_to_problem)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    tracing::trace!(
        sheets = sheets.len(),
        topics = topics.len(),
        sub_patterns = sub_patterns.len(),
        problems = problems.len(),
        "loaded hierarchy snapshot"
    );

    Ok(HierarchySnapshot {
        sheets,
        topics,
        sub_patterns,
        problems,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
