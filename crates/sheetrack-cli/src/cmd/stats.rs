//! `sk stats`: solved/total per sheet for the acting user.

use super::Context;
use crate::output::{pretty_rule, pretty_section, render_mode};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sheetrack_core::aggregate::{self, ScopeStats, SheetSummary};
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct StatsArgs {}

#[derive(Debug, Serialize)]
struct StatsView {
    uid: String,
    sheets: Vec<SheetSummary>,
    overall: ScopeStats,
    overall_percent: u8,
}

fn render_text(view: &StatsView, w: &mut dyn Write) -> io::Result<()> {
    for s in &view.sheets {
        writeln!(w, "{}\t{}\t{}\t{}", s.sheet_id, s.solved, s.total, s.percent)?;
    }
    writeln!(
        w,
        "total\t{}\t{}\t{}",
        view.overall.solved, view.overall.total, view.overall_percent
    )
}

fn render_pretty(view: &StatsView, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Progress for {}", view.uid))?;
    if view.sheets.is_empty() {
        writeln!(w, "  (no sheets)")?;
    }
    for s in &view.sheets {
        writeln!(
            w,
            "  {:<40} {:>4}/{:<4} {:>3}%",
            s.title, s.solved, s.total, s.percent
        )?;
    }
    pretty_rule(w)?;
    writeln!(
        w,
        "  {:<40} {:>4}/{:<4} {:>3}%",
        "Overall", view.overall.solved, view.overall.total, view.overall_percent
    )
}

pub fn run_stats(_args: &StatsArgs, ctx: &Context<'_>) -> Result<()> {
    let mut project = ctx.open_project()?;
    let profile = ctx.active_profile(&mut project)?;
    let sheets = aggregate::stats_for_user(&project.conn, profile.uid())?;
    let overall = aggregate::overall(&sheets);

    let view = StatsView {
        uid: profile.uid().to_string(),
        sheets,
        overall,
        overall_percent: overall.percent(),
    };
    render_mode(ctx.output, &view, render_text, render_pretty)
}
