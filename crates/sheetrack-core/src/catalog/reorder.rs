//! Pairwise sibling reordering.
//!
//! A move swaps the `order` values of an entity and its neighbour in the
//! ascending-order listing of its non-deleted siblings. The plan is computed
//! from a caller-supplied snapshot; applying it writes both rows in one
//! transaction.

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::db::query;
use crate::error::{CatalogError, Result};
use crate::model::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("unknown direction '{other}': expected up or down")),
        }
    }
}

/// One entry of a sibling snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiblingOrder {
    pub id: String,
    pub order: i64,
}

/// Writes needed to carry out a move. Orders are the values after the swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovePlan {
    NoOp,
    Swap {
        moved: SiblingOrder,
        neighbor: SiblingOrder,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved {
        id: String,
        order: i64,
        neighbor_id: String,
        neighbor_order: i64,
    },
    /// Already first (moving up) or last (moving down).
    NoOp,
}

/// Plan a move of `id` within `siblings`.
///
/// Siblings are sorted stably by `order`, so equal orders keep snapshot order.
/// A neighbour holding the same order yields [`MovePlan::NoOp`].
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] if `id` is not in the snapshot.
pub fn plan_move(
    kind: EntityKind,
    id: &str,
    direction: Direction,
    siblings: &[SiblingOrder],
) -> Result<MovePlan> {
    let mut sorted: Vec<&SiblingOrder> = siblings.iter().collect();
    sorted.sort_by_key(|s| s.order);

    let index = sorted
        .iter()
        .position(|s| s.id == id)
        .ok_or_else(|| CatalogError::not_found(kind.as_str(), id))?;

    let target = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1).filter(|&i| i < sorted.len()),
    };
    let Some(target) = target else {
        return Ok(MovePlan::NoOp);
    };

    let current = sorted[index];
    let other = sorted[target];
    if current.order == other.order {
        return Ok(MovePlan::NoOp);
    }
    Ok(MovePlan::Swap {
        moved: SiblingOrder {
            id: current.id.clone(),
            order: other.order,
        },
        neighbor: SiblingOrder {
            id: other.id.clone(),
            order: current.order,
        },
    })
}

/// Plan and apply a move against a sibling snapshot.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidInput`] for sheets, [`CatalogError::NotFound`]
/// if the id is missing from the snapshot, or if either row is gone or no longer
/// holds its snapshot order at write time (nothing is written in that case),
/// or a storage error.
pub fn move_entity(
    conn: &mut Connection,
    kind: EntityKind,
    id: &str,
    direction: Direction,
    siblings: &[SiblingOrder],
) -> Result<MoveOutcome> {
    if !kind.is_ordered() {
        return Err(CatalogError::invalid(
            "kind",
            format!("{kind} entities are not ordered"),
        ));
    }

    let MovePlan::Swap { moved, neighbor } = plan_move(kind, id, direction, siblings)? else {
        tracing::debug!(%kind, id, %direction, "move is a no-op");
        return Ok(MoveOutcome::NoOp);
    };

    let sql = format!(
        "UPDATE {} SET sort_order = ?1 WHERE {} = ?2 AND is_deleted = 0 AND sort_order = ?3",
        kind.table(),
        kind.id_column()
    );
    // Each row must still hold the order the other one takes over.
    let tx = conn.transaction()?;
    for (entry, expected) in [(&moved, neighbor.order), (&neighbor, moved.order)] {
        if tx.execute(&sql, params![entry.order, entry.id, expected])? != 1 {
            tracing::debug!(%kind, id = %entry.id, expected, "sibling changed since snapshot");
            return Err(CatalogError::not_found(kind.as_str(), entry.id.clone()));
        }
    }
    tx.commit()?;

    tracing::debug!(
        %kind,
        id = %moved.id,
        order = moved.order,
        neighbor = %neighbor.id,
        neighbor_order = neighbor.order,
        "swapped sibling orders"
    );
    Ok(MoveOutcome::Moved {
        id: moved.id,
        order: moved.order,
        neighbor_id: neighbor.id,
        neighbor_order: neighbor.order,
    })
}

/// Move using the current stored sibling group of `id`.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] if the entity is missing or soft-deleted,
/// plus everything [`move_entity`] returns.
pub fn move_within_parent(
    conn: &mut Connection,
    kind: EntityKind,
    id: &str,
    direction: Direction,
) -> Result<MoveOutcome> {
    let state = query::entity_state(conn, kind, id)?
        .filter(|state| !state.is_deleted)
        .ok_or_else(|| CatalogError::not_found(kind.as_str(), id))?;
    let Some(parent_id) = state.parent_id else {
        return Err(CatalogError::invalid(
            "kind",
            format!("{kind} entities are not ordered"),
        ));
    };
    let siblings = query::sibling_orders(conn, kind, &parent_id)?;
    move_entity(conn, kind, id, direction, &siblings)
}
