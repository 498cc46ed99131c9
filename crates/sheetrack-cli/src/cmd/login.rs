//! `sk login`: create or refresh the acting user's profile.

use super::Context;
use crate::identity;
use crate::output::{pretty_kv, render};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sheetrack_core::progress::{self, profile::Identity};
use std::io::Write;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Display name stored on the profile.
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginReport<'a> {
    uid: &'a str,
    role: String,
    created: bool,
    promoted: bool,
    current_streak: u32,
    max_streak: u32,
    solved: usize,
}

pub fn run_login(args: &LoginArgs, ctx: &Context<'_>) -> Result<()> {
    let uid = ctx.require_uid()?;
    let mut project = ctx.open_project()?;

    let identity = Identity {
        uid: uid.clone(),
        email: identity::resolve_email(ctx.email_flag),
        display_name: args
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
    };
    let signed = progress::sign_in(
        &mut project.conn,
        &identity,
        &project.config.access,
        chrono::Utc::now(),
    )?;

    let profile = &signed.profile;
    let report = LoginReport {
        uid: profile.uid(),
        role: profile.role().to_string(),
        created: signed.created,
        promoted: signed.promoted,
        current_streak: profile.streak().current(),
        max_streak: profile.streak().max(),
        solved: profile.completed().len(),
    };
    render(ctx.output, &report, |r, w| {
        if r.created {
            writeln!(w, "✓ Welcome, {}. Profile created.", r.uid)?;
        } else if r.promoted {
            writeln!(w, "✓ Signed in as {}. Promoted to admin.", r.uid)?;
        } else {
            writeln!(w, "✓ Signed in as {}.", r.uid)?;
        }
        pretty_kv(w, "Role", &r.role)?;
        pretty_kv(w, "Solved", r.solved.to_string())?;
        pretty_kv(
            w,
            "Streak",
            format!("{} current, {} best", r.current_streak, r.max_streak),
        )
    })
}
