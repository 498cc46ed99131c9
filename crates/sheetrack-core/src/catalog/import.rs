//! Batch problem import.
//!
//! The payload is a JSON array of
//! `{"title": …, "url": …, "platform": "LeetCode" | "GFG" | "Other", "platformId"?: …}`.
//! The whole array is validated before anything is written; a single bad entry
//! rejects the batch.

use rusqlite::Connection;
use serde::Deserialize;

use super::{insert_problem, next_order, require_live, validate_new_problem};
use crate::error::{CatalogError, Result};
use crate::model::{EntityKind, NewProblem, Platform, Problem};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportEntry {
    title: String,
    url: String,
    platform: String,
    #[serde(default)]
    platform_id: Option<String>,
}

fn malformed(reason: impl Into<String>) -> CatalogError {
    CatalogError::MalformedBatchInput {
        reason: reason.into(),
    }
}

/// Validate a payload into insertable rows without touching the store.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedBatchInput`] naming the first offending entry.
pub fn parse_payload(payload: &str) -> Result<Vec<NewProblem>> {
    let value: serde_json::Value =
        serde_json::from_str(payload).map_err(|err| malformed(format!("invalid JSON: {err}")))?;
    let serde_json::Value::Array(entries) = value else {
        return Err(malformed("expected a JSON array of problems"));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let entry: ImportEntry = serde_json::from_value(raw)
                .map_err(|err| malformed(format!("entry {index}: {err}")))?;
            let platform = entry
                .platform
                .parse::<Platform>()
                .map_err(|reason| malformed(format!("entry {index}: {reason}")))?;
            validate_new_problem(NewProblem {
                title: entry.title,
                url: entry.url,
                platform,
                platform_id: entry.platform_id,
            })
            .map_err(|err| malformed(format!("entry {index}: {err}")))
        })
        .collect()
}

/// Append every problem in `payload` under `sub_pattern_id`, in payload order.
///
/// Orders continue after the current live siblings. All rows are written in
/// one transaction.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedBatchInput`] for a bad payload,
/// [`CatalogError::NotFound`] if the sub-pattern is missing or soft-deleted,
/// or a storage error. Nothing is written on error.
pub fn import_problems(
    conn: &mut Connection,
    sub_pattern_id: &str,
    payload: &str,
) -> Result<Vec<Problem>> {
    let rows = parse_payload(payload)?;

    let tx = conn.transaction()?;
    require_live(&tx, EntityKind::SubPattern, sub_pattern_id)?;
    let start = next_order(&tx, EntityKind::Problem, sub_pattern_id)?;

    let mut created = Vec::with_capacity(rows.len());
    for (order, new) in (start..).zip(rows) {
        created.push(insert_problem(&tx, sub_pattern_id, new, order)?);
    }
    tx.commit()?;

    tracing::info!(sub_pattern_id, count = created.len(), "imported problems");
    Ok(created)
}
