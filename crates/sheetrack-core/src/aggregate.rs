//! Solved/total roll-up of a user's completion set over the catalog.
//!
//! Everything here is pure: callers load a [`HierarchySnapshot`] (or a sheet
//! tree) and a completion set, and get counts back. Lookup maps are rebuilt
//! on every call; nothing is cached between calls.
//!
//! Only non-deleted structure counts. A problem is attributed to a sheet only
//! when its whole chain (sub-pattern → topic → sheet) resolves to live rows;
//! anything else is skipped. Completion keys that name no catalog problem
//! are ignored.

use rusqlite::Connection;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::ops::{Add, AddAssign};

use crate::catalog::tree::TopicNode;
use crate::db::query;
use crate::error::Result;
use crate::model::{Problem, Sheet, SubPattern, Topic};
use crate::progress::{self, profile::UserProfile};

/// Membership test over the problems a user has solved.
pub trait CompletionSet {
    fn is_completed(&self, problem_id: &str) -> bool;
}

impl CompletionSet for BTreeSet<String> {
    fn is_completed(&self, problem_id: &str) -> bool {
        self.contains(problem_id)
    }
}

impl CompletionSet for HashSet<String> {
    fn is_completed(&self, problem_id: &str) -> bool {
        self.contains(problem_id)
    }
}

impl CompletionSet for UserProfile {
    fn is_completed(&self, problem_id: &str) -> bool {
        self.is_solved(problem_id)
    }
}

/// Solved and total problem counts for one scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScopeStats {
    pub solved: usize,
    pub total: usize,
}

impl ScopeStats {
    /// `round(100 * solved / total)`, half rounding up; `0` for an empty scope.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let rounded = (self.solved.saturating_mul(200).saturating_add(self.total))
            / self.total.saturating_mul(2);
        u8::try_from(rounded.min(100)).unwrap_or(100)
    }

    fn count(problems: &[Problem], completed: &impl CompletionSet) -> Self {
        Self {
            solved: problems.iter().filter(|p| completed.is_completed(&p.id)).count(),
            total: problems.len(),
        }
    }
}

impl Add for ScopeStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            solved: self.solved + rhs.solved,
            total: self.total + rhs.total,
        }
    }
}

impl AddAssign for ScopeStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Every row of every catalog table, soft-deleted ones included.
#[derive(Debug, Clone, Default)]
pub struct HierarchySnapshot {
    pub sheets: Vec<Sheet>,
    pub topics: Vec<Topic>,
    pub sub_patterns: Vec<SubPattern>,
    pub problems: Vec<Problem>,
}

// ---------------------------------------------------------------------------
// Single-sheet breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubPatternBreakdown {
    pub sub_pattern_id: String,
    pub title: String,
    #[serde(flatten)]
    pub stats: ScopeStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicBreakdown {
    pub topic_id: String,
    pub title: String,
    #[serde(flatten)]
    pub stats: ScopeStats,
    pub sub_patterns: Vec<SubPatternBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetBreakdown {
    #[serde(flatten)]
    pub stats: ScopeStats,
    pub topics: Vec<TopicBreakdown>,
}

/// Per sub-pattern counts over a sheet tree, summed up to topics and the sheet.
#[must_use]
pub fn sheet_breakdown(tree: &[TopicNode], completed: &impl CompletionSet) -> SheetBreakdown {
    let mut sheet_stats = ScopeStats::default();
    let topics = tree
        .iter()
        .map(|node| {
            let sub_patterns: Vec<_> = node
                .sub_patterns
                .iter()
                .map(|sp| SubPatternBreakdown {
                    sub_pattern_id: sp.sub_pattern.id.clone(),
                    title: sp.sub_pattern.title.clone(),
                    stats: ScopeStats::count(&sp.problems, completed),
                })
                .collect();
            let stats = sub_patterns
                .iter()
                .fold(ScopeStats::default(), |acc, sp| acc + sp.stats);
            sheet_stats += stats;
            TopicBreakdown {
                topic_id: node.topic.id.clone(),
                title: node.topic.title.clone(),
                stats,
                sub_patterns,
            }
        })
        .collect();

    SheetBreakdown {
        stats: sheet_stats,
        topics,
    }
}

// ---------------------------------------------------------------------------
// Cross-sheet stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub sheet_id: String,
    pub title: String,
    pub solved: usize,
    pub total: usize,
    pub percent: u8,
}

/// Solved/total per non-deleted sheet, in sheet listing order.
#[must_use]
pub fn sheet_stats(snapshot: &HierarchySnapshot, completed: &impl CompletionSet) -> Vec<SheetSummary> {
    let live_sheets: HashSet<&str> = snapshot
        .sheets
        .iter()
        .filter(|s| !s.is_deleted)
        .map(|s| s.id.as_str())
        .collect();

    let topic_to_sheet: HashMap<&str, &str> = snapshot
        .topics
        .iter()
        .filter(|t| !t.is_deleted && live_sheets.contains(t.sheet_id.as_str()))
        .map(|t| (t.id.as_str(), t.sheet_id.as_str()))
        .collect();

    let sub_to_topic: HashMap<&str, &str> = snapshot
        .sub_patterns
        .iter()
        .filter(|sp| !sp.is_deleted)
        .map(|sp| (sp.id.as_str(), sp.topic_id.as_str()))
        .collect();

    let known_sub_patterns: HashSet<&str> =
        snapshot.sub_patterns.iter().map(|sp| sp.id.as_str()).collect();

    let mut buckets: HashMap<&str, ScopeStats> = HashMap::new();
    for problem in snapshot.problems.iter().filter(|p| !p.is_deleted) {
        let sheet_id = sub_to_topic
            .get(problem.sub_pattern_id.as_str())
            .and_then(|topic_id| topic_to_sheet.get(topic_id));
        let Some(sheet_id) = sheet_id else {
            if !known_sub_patterns.contains(problem.sub_pattern_id.as_str()) {
                tracing::warn!(
                    problem_id = %problem.id,
                    sub_pattern_id = %problem.sub_pattern_id,
                    "skipping problem with dangling sub-pattern reference"
                );
            }
            continue;
        };

        let bucket = buckets.entry(*sheet_id).or_default();
        bucket.total += 1;
        if completed.is_completed(&problem.id) {
            bucket.solved += 1;
        }
    }

    snapshot
        .sheets
        .iter()
        .filter(|s| !s.is_deleted)
        .map(|sheet| {
            let stats = buckets.get(sheet.id.as_str()).copied().unwrap_or_default();
            SheetSummary {
                sheet_id: sheet.id.clone(),
                title: sheet.title.clone(),
                solved: stats.solved,
                total: stats.total,
                percent: stats.percent(),
            }
        })
        .collect()
}

/// Combined counts across all summaries.
#[must_use]
pub fn overall(summaries: &[SheetSummary]) -> ScopeStats {
    summaries.iter().fold(ScopeStats::default(), |acc, s| {
        acc + ScopeStats {
            solved: s.solved,
            total: s.total,
        }
    })
}

/// Cross-sheet stats for a stored user.
///
/// # Errors
///
/// Returns [`crate::error::CatalogError::NotFound`] for an unknown user, or a storage error.
pub fn stats_for_user(conn: &Connection, uid: &str) -> Result<Vec<SheetSummary>> {
    let profile = progress::require_profile(conn, uid)?;
    let snapshot = query::load_snapshot(conn)?;
    Ok(sheet_stats(&snapshot, &profile))
}
