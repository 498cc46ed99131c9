//! `sk note`: private free-text notes on problems.

use super::Context;
use crate::output::{CliError, pretty_kv, render};
use crate::validate;
use anyhow::Result;
use clap::{Args, Subcommand};
use sheetrack_core::db::query;
use sheetrack_core::error::CatalogError;
use sheetrack_core::model::EntityKind;
use sheetrack_core::notes::{self, Note};
use std::io::Write;

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    #[command(about = "Write or replace the note on a problem")]
    Set(NoteSetArgs),

    #[command(about = "Print the note on a problem")]
    Show(NoteShowArgs),

    #[command(about = "List every note of the acting user")]
    List,
}

#[derive(Args, Debug)]
pub struct NoteSetArgs {
    /// Problem key.
    pub problem_id: String,

    /// Note text.
    pub text: String,
}

#[derive(Args, Debug)]
pub struct NoteShowArgs {
    /// Problem key.
    pub problem_id: String,
}

pub fn run_note(command: &NoteCommand, ctx: &Context<'_>) -> Result<()> {
    let mut project = ctx.open_project()?;
    let profile = ctx.active_profile(&mut project)?;
    let conn = &project.conn;
    let uid = profile.uid();

    match command {
        NoteCommand::Set(args) => {
            validate::validate_id_kind(&args.problem_id, EntityKind::Problem)
                .map_err(CliError::from)?;
            validate::validate_note(&args.text).map_err(CliError::from)?;
            if query::get_problem(conn, &args.problem_id, true)?.is_none() {
                return Err(CatalogError::NotFound {
                    kind: "problem",
                    id: args.problem_id.clone(),
                }
                .into());
            }
            let note = notes::save_note(conn, uid, &args.problem_id, &args.text, chrono::Utc::now())?;
            render(ctx.output, &note, |n, w| {
                writeln!(w, "✓ Saved note on {}", n.problem_id)
            })
        }
        NoteCommand::Show(args) => {
            let note = notes::get_note(conn, uid, &args.problem_id)?.ok_or_else(|| {
                CliError::with_details(
                    format!("no note on {}", args.problem_id),
                    format!("write one with `sk note set {} <text>`", args.problem_id),
                    "no_note",
                )
            })?;
            render(ctx.output, &note, |n: &Note, w| {
                pretty_kv(w, "Problem", &n.problem_id)?;
                pretty_kv(w, "Updated", n.updated_at.to_rfc3339())?;
                writeln!(w)?;
                writeln!(w, "{}", n.content)
            })
        }
        NoteCommand::List => {
            let all = notes::notes_for_problems(conn, uid, &[])?;
            render(ctx.output, &all, |all, w| {
                if all.is_empty() {
                    return writeln!(w, "No notes.");
                }
                for (problem_id, content) in all {
                    let first_line = content.lines().next().unwrap_or_default();
                    writeln!(w, "{problem_id}\t{first_line}")?;
                }
                Ok(())
            })
        }
    }
}
