//! `sk solve` / `sk unsolve`: toggle a problem in the acting user's progress.

use super::{Context, with_login_hint};
use crate::output::{CliError, pretty_kv, render};
use crate::validate;
use anyhow::Result;
use clap::Args;
use sheetrack_core::model::EntityKind;
use sheetrack_core::progress::{self, profile::SolveOutcome};
use std::io::Write;

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Problem key.
    pub problem_id: String,
}

fn outcome_line(outcome: SolveOutcome) -> &'static str {
    match outcome {
        SolveOutcome::AlreadySolved => "already solved; progress unchanged",
        SolveOutcome::SameDay => "solved (streak already counted today)",
        SolveOutcome::Extended => "solved; streak extended",
        SolveOutcome::Started => "solved; new streak started",
    }
}

pub fn run_solve(args: &SolveArgs, ctx: &Context<'_>) -> Result<()> {
    validate::validate_id_kind(&args.problem_id, EntityKind::Problem).map_err(CliError::from)?;
    let uid = ctx.require_uid()?;
    let mut project = ctx.open_project()?;
    let calendar = project.calendar()?;

    let report = progress::solve(
        &mut project.conn,
        &uid,
        &args.problem_id,
        chrono::Utc::now(),
        &calendar,
    )
    .map_err(|err| with_login_hint(&err))?;

    render(ctx.output, &report, |r, w| {
        writeln!(w, "✓ {}: {}", r.problem_id, outcome_line(r.outcome))?;
        let streak = r.profile.streak();
        pretty_kv(
            w,
            "Streak",
            format!("{} current, {} best", streak.current(), streak.max()),
        )?;
        pretty_kv(w, "Solved", r.profile.completed().len().to_string())
    })
}

/// Removing a completion never rewinds the streak.
pub fn run_unsolve(args: &SolveArgs, ctx: &Context<'_>) -> Result<()> {
    let uid = ctx.require_uid()?;
    let mut project = ctx.open_project()?;

    let report = progress::unsolve(&mut project.conn, &uid, &args.problem_id, chrono::Utc::now())
        .map_err(|err| with_login_hint(&err))?;

    render(ctx.output, &report, |r, w| {
        if r.removed {
            writeln!(w, "✓ {} marked unsolved", r.problem_id)?;
        } else {
            writeln!(w, "{} was not solved; nothing changed", r.problem_id)?;
        }
        pretty_kv(w, "Solved", r.profile.completed().len().to_string())
    })
}
