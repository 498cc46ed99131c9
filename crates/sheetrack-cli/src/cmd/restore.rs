//! `sk restore`: clear the soft-delete flag.

use super::Context;
use crate::output::render_success;
use anyhow::Result;
use clap::Args;
use sheetrack_core::catalog;

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Key of the deleted entity.
    pub id: String,
}

pub fn run_restore(args: &RestoreArgs, ctx: &Context<'_>) -> Result<()> {
    let kind = catalog::kind_of(&args.id)?;

    let mut project = ctx.open_project()?;
    ctx.require_admin(&mut project)?;
    catalog::restore(&project.conn, kind, &args.id)?;
    tracing::info!(%kind, id = %args.id, "restored");

    render_success(ctx.output, &format!("Restored {kind} {}", args.id))
}
