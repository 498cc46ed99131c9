//! `sk users`: admin listing of every profile.

use super::Context;
use crate::output::{pretty_rule, pretty_section, render_mode};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sheetrack_core::progress;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct UsersArgs {}

#[derive(Debug, Serialize)]
struct UserRow {
    uid: String,
    email: Option<String>,
    role: String,
    solved: usize,
    current_streak: u32,
    max_streak: u32,
    last_active: String,
}

fn render_text(rows: &Vec<UserRow>, w: &mut dyn Write) -> io::Result<()> {
    for r in rows {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            r.uid, r.role, r.solved, r.current_streak, r.max_streak, r.last_active
        )?;
    }
    Ok(())
}

fn render_pretty(rows: &Vec<UserRow>, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Users")?;
    writeln!(w, "  {:<24} {:<6} {:>6} {:>7} {:>5}  LAST ACTIVE", "USER", "ROLE", "SOLVED", "STREAK", "BEST")?;
    for r in rows {
        writeln!(
            w,
            "  {:<24} {:<6} {:>6} {:>7} {:>5}  {}",
            r.uid, r.role, r.solved, r.current_streak, r.max_streak, r.last_active
        )?;
    }
    pretty_rule(w)
}

pub fn run_users(_args: &UsersArgs, ctx: &Context<'_>) -> Result<()> {
    let mut project = ctx.open_project()?;
    ctx.require_admin(&mut project)?;

    let rows: Vec<UserRow> = progress::list_profiles(&project.conn)?
        .into_iter()
        .map(|p| UserRow {
            uid: p.uid().to_string(),
            email: p.email().map(str::to_string),
            role: p.role().to_string(),
            solved: p.completed().len(),
            current_streak: p.streak().current(),
            max_streak: p.streak().max(),
            last_active: p.last_active().to_rfc3339(),
        })
        .collect();
    render_mode(ctx.output, &rows, render_text, render_pretty)
}
