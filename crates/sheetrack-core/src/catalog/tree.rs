//! Full-structure view of one sheet.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::query;
use crate::error::{CatalogError, Result};
use crate::model::{Problem, SubPattern, Topic};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubPatternNode {
    #[serde(flatten)]
    pub sub_pattern: SubPattern,
    pub problems: Vec<Problem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicNode {
    #[serde(flatten)]
    pub topic: Topic,
    pub sub_patterns: Vec<SubPatternNode>,
}

/// Topic → sub-pattern → problem tree. Every level is non-deleted and ordered.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] if the sheet is missing or soft-deleted.
pub fn full_structure(conn: &Connection, sheet_id: &str) -> Result<Vec<TopicNode>> {
    if query::get_sheet(conn, sheet_id, false)?.is_none() {
        return Err(CatalogError::not_found("sheet", sheet_id));
    }

    query::list_topics(conn, sheet_id)?
        .into_iter()
        .map(|topic| {
            let sub_patterns = query::list_sub_patterns(conn, &topic.id)?
                .into_iter()
                .map(|sub_pattern| {
                    let problems = query::list_problems(conn, &sub_pattern.id)?;
                    Ok(SubPatternNode {
                        sub_pattern,
                        problems,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(TopicNode {
                topic,
                sub_patterns,
            })
        })
        .collect()
}

/// Keys of every problem in the tree, in display order.
#[must_use]
pub fn problem_ids(tree: &[TopicNode]) -> Vec<&str> {
    tree.iter()
        .flat_map(|t| &t.sub_patterns)
        .flat_map(|sp| &sp.problems)
        .map(|p| p.id.as_str())
        .collect()
}
