//! `sk show`: one sheet's full structure, with the acting user's progress.

use super::Context;
use crate::output::{CliError, pretty_kv, pretty_rule, pretty_section, render};
use crate::validate;
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sheetrack_core::aggregate::{self, ScopeStats, SheetBreakdown};
use sheetrack_core::catalog::tree::{self, TopicNode};
use sheetrack_core::db::query;
use sheetrack_core::error::CatalogError;
use sheetrack_core::model::{EntityKind, Sheet};
use sheetrack_core::notes;
use sheetrack_core::progress::{self, profile::UserProfile};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Sheet key.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct UserView {
    uid: String,
    breakdown: SheetBreakdown,
    solved: BTreeSet<String>,
    notes: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct ShowView {
    sheet: Sheet,
    topics: Vec<TopicNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<UserView>,
}

/// The profile behind `uid`, or `None` for a user who never signed in.
fn known_profile(conn: &mut rusqlite::Connection, uid: &str) -> Result<Option<UserProfile>> {
    match progress::heartbeat(conn, uid, chrono::Utc::now()) {
        Ok(profile) => Ok(Some(profile)),
        Err(CatalogError::NotFound { kind: "user", .. }) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn percent_label(stats: ScopeStats) -> String {
    format!("{}/{} ({}%)", stats.solved, stats.total, stats.percent())
}

fn render_pretty(view: &ShowView, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &view.sheet.title)?;
    pretty_kv(w, "Key", &view.sheet.id)?;
    if !view.sheet.description.is_empty() {
        pretty_kv(w, "Description", &view.sheet.description)?;
    }
    if let Some(progress) = &view.progress {
        pretty_kv(w, "Progress", percent_label(progress.breakdown.stats))?;
    }
    writeln!(w)?;

    let solved = view.progress.as_ref().map(|p| &p.solved);
    let notes = view.progress.as_ref().map(|p| &p.notes);
    for (ti, topic) in view.topics.iter().enumerate() {
        let topic_stats = view
            .progress
            .as_ref()
            .and_then(|p| p.breakdown.topics.get(ti))
            .map(|t| format!("  {}", percent_label(t.stats)))
            .unwrap_or_default();
        writeln!(w, "{}. {}  ({}){topic_stats}", topic.topic.order, topic.topic.title, topic.topic.id)?;

        for (si, sp) in topic.sub_patterns.iter().enumerate() {
            let sp_stats = view
                .progress
                .as_ref()
                .and_then(|p| p.breakdown.topics.get(ti))
                .and_then(|t| t.sub_patterns.get(si))
                .map(|s| format!("  {}", percent_label(s.stats)))
                .unwrap_or_default();
            writeln!(w, "  {}. {}  ({}){sp_stats}", sp.sub_pattern.order, sp.sub_pattern.title, sp.sub_pattern.id)?;

            for p in &sp.problems {
                let mark = match solved {
                    Some(set) if set.contains(&p.id) => "[x] ",
                    Some(_) => "[ ] ",
                    None => "",
                };
                writeln!(w, "    {mark}{}  [{}]  {}  ({})", p.title, p.platform, p.url, p.id)?;
                if let Some(note) = notes.and_then(|n| n.get(&p.id)) {
                    writeln!(w, "        note: {note}")?;
                }
            }
        }
    }
    pretty_rule(w)
}

pub fn run_show(args: &ShowArgs, ctx: &Context<'_>) -> Result<()> {
    validate::validate_id_kind(&args.id, EntityKind::Sheet).map_err(CliError::from)?;
    let mut project = ctx.open_project()?;

    let sheet = query::get_sheet(&project.conn, &args.id, false)?
        .ok_or_else(|| CatalogError::NotFound {
            kind: "sheet",
            id: args.id.clone(),
        })?;
    let topics = tree::full_structure(&project.conn, &args.id)?;

    let profile = match ctx.optional_uid() {
        Some(uid) => known_profile(&mut project.conn, &uid)?,
        None => None,
    };
    let progress = match profile {
        Some(profile) => {
            let ids = tree::problem_ids(&topics);
            let solved = ids
                .iter()
                .filter(|id| profile.is_solved(id))
                .map(|id| (*id).to_string())
                .collect();
            let notes = if ids.is_empty() {
                BTreeMap::new()
            } else {
                notes::notes_for_problems(&project.conn, profile.uid(), &ids)?
            };
            Some(UserView {
                uid: profile.uid().to_string(),
                breakdown: aggregate::sheet_breakdown(&topics, &profile),
                solved,
                notes,
            })
        }
        None => None,
    };

    let view = ShowView {
        sheet,
        topics,
        progress,
    };
    render(ctx.output, &view, render_pretty)
}
