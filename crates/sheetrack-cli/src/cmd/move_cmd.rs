//! `sk move`: swap an entity with its neighbour among siblings.

use super::Context;
use crate::output::render;
use anyhow::Result;
use clap::Args;
use sheetrack_core::catalog::{
    self,
    reorder::{self, Direction, MoveOutcome},
};
use std::io::Write;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Key of the topic, sub-pattern or problem to move.
    pub id: String,

    /// `up` (earlier) or `down` (later).
    pub direction: Direction,
}

pub fn run_move(args: &MoveArgs, ctx: &Context<'_>) -> Result<()> {
    let kind = catalog::kind_of(&args.id)?;

    let mut project = ctx.open_project()?;
    ctx.require_admin(&mut project)?;
    let outcome = reorder::move_within_parent(&mut project.conn, kind, &args.id, args.direction)?;

    let direction = args.direction;
    render(ctx.output, &outcome, |o, w| match o {
        MoveOutcome::Moved {
            id,
            order,
            neighbor_id,
            neighbor_order,
        } => writeln!(
            w,
            "✓ Moved {id} {direction} to position {order} (swapped with {neighbor_id}, now {neighbor_order})"
        ),
        MoveOutcome::NoOp => writeln!(w, "Nothing to do: {} is already at the edge.", args.id),
    })
}
