//! Hierarchy store: authoring and listing of the four catalog levels.
//!
//! # Ordering
//!
//! A new child is appended after its live siblings:
//! `order = max(active sibling count, highest active order) + 1`. With dense
//! orders this is `count + 1`; after mid-list deletes it still lands last
//! instead of colliding with an existing order. Ties (possible after a restore)
//! are broken by insertion order.
//!
//! # Deletion
//!
//! Rows are never removed. Topics and sub-patterns refuse soft-delete while
//! they still hold live children; sheets are unguarded. The check and the
//! write are separate statements, so a concurrent insert can slip between them.

pub mod import;
pub mod reorder;
pub mod tree;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use serde::Serialize;

use crate::db::query;
use crate::error::{CatalogError, Result};
use crate::model::{EntityKind, NewProblem, Problem, Sheet, SubPattern, Topic};

pub(crate) fn validate_title(field: &'static str, raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(CatalogError::invalid(field, "must not be empty"));
    }
    Ok(title.to_string())
}

/// Kind of an entity, inferred from its key prefix.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidInput`] if the key has no known prefix.
pub fn kind_of(id: &str) -> Result<EntityKind> {
    EntityKind::from_id(id).ok_or_else(|| {
        CatalogError::invalid(
            "id",
            format!("'{id}' is not a sheet (sh-), topic (tp-), sub-pattern (sp-) or problem (pb-) key"),
        )
    })
}

fn require_live(conn: &Connection, kind: EntityKind, id: &str) -> Result<()> {
    match query::entity_state(conn, kind, id)? {
        Some(state) if !state.is_deleted => Ok(()),
        _ => Err(CatalogError::not_found(kind.as_str(), id)),
    }
}

/// Subquery yielding the order of a new last child of the parent bound to `parent_param`.
///
/// Deleted siblings count towards the maximum, so restoring one never ties
/// with a row created while it was hidden.
fn next_order_sql(kind: EntityKind, parent_param: &str) -> String {
    let parent_column = kind.parent_column().unwrap_or("NULL");
    format!(
        "(SELECT MAX(COUNT(CASE WHEN is_deleted = 0 THEN 1 END), COALESCE(MAX(sort_order), 0)) + 1 \
         FROM {} WHERE {parent_column} = {parent_param})",
        kind.table()
    )
}

pub(crate) fn next_order(conn: &Connection, kind: EntityKind, parent_id: &str) -> Result<i64> {
    let sql = format!("SELECT {}", next_order_sql(kind, "?1"));
    Ok(conn.query_row(&sql, params![parent_id], |row| row.get(0))?)
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`CatalogError::InvalidInput`] for an empty title, or a storage error.
pub fn create_sheet(
    conn: &Connection,
    title: &str,
    description: &str,
    now: DateTime<Utc>,
) -> Result<Sheet> {
    let sheet = Sheet {
        id: EntityKind::Sheet.new_id(),
        title: validate_title("title", title)?,
        description: description.trim().to_string(),
        created_at: now,
        is_deleted: false,
    };
    conn.execute(
        "INSERT INTO sheets (sheet_id, title, description, is_deleted, created_at_us)
         VALUES (?1, ?2, ?3, 0, ?4)",
        params![
            sheet.id,
            sheet.title,
            sheet.description,
            now.timestamp_micros()
        ],
    )?;
    tracing::debug!(id = %sheet.id, title = %sheet.title, "created sheet");
    Ok(sheet)
}

/// # Errors
///
/// Returns [`CatalogError::NotFound`] if the sheet is missing or soft-deleted,
/// [`CatalogError::InvalidInput`] for an empty title, or a storage error.
pub fn create_topic(conn: &Connection, sheet_id: &str, title: &str) -> Result<Topic> {
    let title = validate_title("title", title)?;
    require_live(conn, EntityKind::Sheet, sheet_id)?;

    let id = EntityKind::Topic.new_id();
    let sql = format!(
        "INSERT INTO topics (topic_id, sheet_id, title, sort_order) VALUES (?1, ?2, ?3, {}) \
         RETURNING sort_order",
        next_order_sql(EntityKind::Topic, "?2")
    );
    let order: i64 = conn.query_row(&sql, params![id, sheet_id, title], |row| row.get(0))?;
    tracing::debug!(%id, sheet_id, order, "created topic");

    Ok(Topic {
        id,
        sheet_id: sheet_id.to_string(),
        title,
        order,
        is_deleted: false,
    })
}

/// # Errors
///
/// Returns [`CatalogError::NotFound`] if the topic is missing or soft-deleted,
/// [`CatalogError::InvalidInput`] for an empty title, or a storage error.
pub fn create_sub_pattern(conn: &Connection, topic_id: &str, title: &str) -> Result<SubPattern> {
    let title = validate_title("title", title)?;
    require_live(conn, EntityKind::Topic, topic_id)?;

    let id = EntityKind::SubPattern.new_id();
    let sql = format!(
        "INSERT INTO sub_patterns (sub_pattern_id, topic_id, title, sort_order) \
         VALUES (?1, ?2, ?3, {}) RETURNING sort_order",
        next_order_sql(EntityKind::SubPattern, "?2")
    );
    let order: i64 = conn.query_row(&sql, params![id, topic_id, title], |row| row.get(0))?;
    tracing::debug!(%id, topic_id, order, "created sub-pattern");

    Ok(SubPattern {
        id,
        topic_id: topic_id.to_string(),
        title,
        order,
        is_deleted: false,
    })
}

pub(crate) fn validate_new_problem(new: NewProblem) -> Result<NewProblem> {
    let url = new.url.trim();
    if url.is_empty() {
        return Err(CatalogError::invalid("url", "must not be empty"));
    }
    Ok(NewProblem {
        title: validate_title("title", &new.title)?,
        url: url.to_string(),
        platform: new.platform,
        platform_id: new
            .platform_id
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty()),
    })
}

pub(crate) fn insert_problem(
    conn: &Connection,
    sub_pattern_id: &str,
    new: NewProblem,
    order: i64,
) -> Result<Problem> {
    let id = EntityKind::Problem.new_id();
    conn.execute(
        "INSERT INTO problems (problem_id, sub_pattern_id, title, url, platform, platform_id, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id,
            sub_pattern_id,
            new.title,
            new.url,
            new.platform.as_str(),
            new.platform_id,
            order
        ],
    )?;
    Ok(Problem {
        id,
        sub_pattern_id: sub_pattern_id.to_string(),
        title: new.title,
        url: new.url,
        platform: new.platform,
        platform_id: new.platform_id,
        order,
        is_deleted: false,
    })
}

/// # Errors
///
/// Returns [`CatalogError::NotFound`] if the sub-pattern is missing or
/// soft-deleted, [`CatalogError::InvalidInput`] for an empty title or url,
/// or a storage error.
pub fn create_problem(conn: &Connection, sub_pattern_id: &str, new: NewProblem) -> Result<Problem> {
    let new = validate_new_problem(new)?;
    require_live(conn, EntityKind::SubPattern, sub_pattern_id)?;

    let order = next_order(conn, EntityKind::Problem, sub_pattern_id)?;
    let problem = insert_problem(conn, sub_pattern_id, new, order)?;
    tracing::debug!(id = %problem.id, sub_pattern_id, order, "created problem");
    Ok(problem)
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Ordered live children of one parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "kebab-case")]
pub enum Children {
    Topics(Vec<Topic>),
    SubPatterns(Vec<SubPattern>),
    Problems(Vec<Problem>),
}

impl Children {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Topics(items) => items.len(),
            Self::SubPatterns(items) => items.len(),
            Self::Problems(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Live children of `parent_id`, ascending by order.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] if the parent is missing or soft-deleted,
/// [`CatalogError::InvalidInput`] for a problem key or an unrecognised key.
pub fn list_children(conn: &Connection, parent_id: &str) -> Result<Children> {
    let kind = kind_of(parent_id)?;
    if kind == EntityKind::Problem {
        return Err(CatalogError::invalid("parent", "problems have no children"));
    }
    require_live(conn, kind, parent_id)?;

    Ok(match kind {
        EntityKind::Sheet => Children::Topics(query::list_topics(conn, parent_id)?),
        EntityKind::Topic => Children::SubPatterns(query::list_sub_patterns(conn, parent_id)?),
        EntityKind::SubPattern | EntityKind::Problem => {
            Children::Problems(query::list_problems(conn, parent_id)?)
        }
    })
}

// ---------------------------------------------------------------------------
// Edit / delete / restore
// ---------------------------------------------------------------------------

/// Change an entity's title. Soft-deleted entities can be renamed too.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] for an unknown key,
/// [`CatalogError::InvalidInput`] for an empty title, or a storage error.
pub fn rename(conn: &Connection, kind: EntityKind, id: &str, title: &str) -> Result<()> {
    let title = validate_title("title", title)?;
    let sql = format!(
        "UPDATE {} SET title = ?1 WHERE {} = ?2",
        kind.table(),
        kind.id_column()
    );
    if conn.execute(&sql, params![title, id])? == 0 {
        return Err(CatalogError::not_found(kind.as_str(), id));
    }
    tracing::debug!(%kind, id, %title, "renamed");
    Ok(())
}

/// Live direct children of an entity.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn active_child_count(conn: &Connection, kind: EntityKind, id: &str) -> Result<usize> {
    query::count_active_children(conn, kind, id)
}

/// Set the soft-delete flag. Already-deleted entities succeed unchanged.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] for an unknown key,
/// [`CatalogError::HasActiveChildren`] when a guarded kind still has live
/// children, or a storage error.
pub fn soft_delete(conn: &Connection, kind: EntityKind, id: &str) -> Result<()> {
    let state = query::entity_state(conn, kind, id)?
        .ok_or_else(|| CatalogError::not_found(kind.as_str(), id))?;
    if state.is_deleted {
        tracing::debug!(%kind, id, "already deleted");
        return Ok(());
    }

    if kind.is_delete_guarded() {
        let count = active_child_count(conn, kind, id)?;
        if count > 0 {
            return Err(CatalogError::HasActiveChildren {
                kind: kind.as_str(),
                id: id.to_string(),
                count,
            });
        }
    }

    let sql = format!(
        "UPDATE {} SET is_deleted = 1 WHERE {} = ?1",
        kind.table(),
        kind.id_column()
    );
    conn.execute(&sql, params![id])?;
    tracing::debug!(%kind, id, "soft-deleted");
    Ok(())
}

/// Clear the soft-delete flag. The parent is not re-checked.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] for an unknown key, or a storage error.
pub fn restore(conn: &Connection, kind: EntityKind, id: &str) -> Result<()> {
    let sql = format!(
        "UPDATE {} SET is_deleted = 0 WHERE {} = ?1",
        kind.table(),
        kind.id_column()
    );
    if conn.execute(&sql, params![id])? == 0 {
        return Err(CatalogError::not_found(kind.as_str(), id));
    }
    tracing::debug!(%kind, id, "restored");
    Ok(())
}
