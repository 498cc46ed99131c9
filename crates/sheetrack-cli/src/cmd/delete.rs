//! `sk delete`: soft-delete an entity.

use super::Context;
use crate::output::render_success;
use anyhow::Result;
use clap::Args;
use sheetrack_core::catalog;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Key of the entity to hide.
    pub id: String,
}

/// Topics and sub-patterns with live children are refused; sheets and
/// problems are hidden without a check. Deleting twice succeeds.
pub fn run_delete(args: &DeleteArgs, ctx: &Context<'_>) -> Result<()> {
    let kind = catalog::kind_of(&args.id)?;

    let mut project = ctx.open_project()?;
    ctx.require_admin(&mut project)?;
    catalog::soft_delete(&project.conn, kind, &args.id)?;
    tracing::info!(%kind, id = %args.id, "soft-deleted");

    render_success(ctx.output, &format!("Deleted {kind} {}", args.id))
}
