//! `sk profile`: streaks, daily goal and solve history for the acting user.

use super::Context;
use crate::output::{pretty_kv, pretty_rule, pretty_section, render};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sheetrack_core::aggregate::{self, ScopeStats};
use sheetrack_core::db::query;
use sheetrack_core::progress::activity::{self, DailyActivity, DailyGoal};
use sheetrack_core::progress::profile::UserProfile;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Most recent active days to list.
    #[arg(long, default_value = "14")]
    pub days: usize,
}

#[derive(Debug, Serialize)]
struct ProfileView {
    profile: UserProfile,
    today: DailyGoal,
    overall: ScopeStats,
    overall_percent: u8,
    activity: Vec<DailyActivity>,
}

fn render_pretty(view: &ProfileView, w: &mut dyn Write) -> io::Result<()> {
    let p = &view.profile;
    pretty_section(w, p.display_name().unwrap_or_else(|| p.uid()))?;
    pretty_kv(w, "User", p.uid())?;
    if let Some(email) = p.email() {
        pretty_kv(w, "Email", email)?;
    }
    pretty_kv(w, "Role", p.role().to_string())?;
    pretty_kv(
        w,
        "Solved",
        format!(
            "{}/{} ({}%)",
            view.overall.solved, view.overall.total, view.overall_percent
        ),
    )?;
    let streak = p.streak();
    pretty_kv(w, "Streak", format!("{} current, {} best", streak.current(), streak.max()))?;
    let met = if view.today.is_met() { "  ✓" } else { "" };
    pretty_kv(
        w,
        "Today",
        format!(
            "{}/{} ({}%){met}",
            view.today.solved, view.today.target, view.today.percent
        ),
    )?;
    pretty_kv(w, "Last active", p.last_active().to_rfc3339())?;

    if !view.activity.is_empty() {
        writeln!(w)?;
        writeln!(w, "Recent activity:")?;
        for day in &view.activity {
            writeln!(w, "  {}  {}", day.date, day.count)?;
        }
    }
    pretty_rule(w)
}

pub fn run_profile(args: &ProfileArgs, ctx: &Context<'_>) -> Result<()> {
    let mut project = ctx.open_project()?;
    let profile = ctx.active_profile(&mut project)?;
    let calendar = project.calendar()?;

    let today = calendar.date_of(chrono::Utc::now());
    let goal = DailyGoal::for_day(&profile, today, project.config.progress.daily_target, &calendar);

    let mut history = activity::daily_activity(&profile, &calendar);
    let keep_from = history.len().saturating_sub(args.days);
    let recent = history.split_off(keep_from);

    let snapshot = query::load_snapshot(&project.conn)?;
    let overall = aggregate::overall(&aggregate::sheet_stats(&snapshot, &profile));

    let view = ProfileView {
        profile,
        today: goal,
        overall,
        overall_percent: overall.percent(),
        activity: recent,
    };
    render(ctx.output, &view, render_pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ProfileArgs,
    }

    #[test]
    fn days_default() {
        let w = Wrapper::parse_from(["test"]);
        assert_eq!(w.args.days, 14);
        let w = Wrapper::parse_from(["test", "--days", "3"]);
        assert_eq!(w.args.days, 3);
    }
}
