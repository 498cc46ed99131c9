//! `sk rename`: change an entity's title.

use super::Context;
use crate::output::{CliError, render_success};
use crate::validate;
use anyhow::Result;
use clap::Args;
use sheetrack_core::catalog;

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Key of the sheet, topic, sub-pattern or problem.
    pub id: String,

    /// New title.
    #[arg(short, long)]
    pub title: String,
}

pub fn run_rename(args: &RenameArgs, ctx: &Context<'_>) -> Result<()> {
    validate::validate_title(&args.title).map_err(CliError::from)?;
    let kind = catalog::kind_of(&args.id)?;

    let mut project = ctx.open_project()?;
    ctx.require_admin(&mut project)?;
    catalog::rename(&project.conn, kind, &args.id, &args.title)?;

    render_success(
        ctx.output,
        &format!("Renamed {kind} {} to \"{}\"", args.id, args.title.trim()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: RenameArgs,
    }

    #[test]
    fn takes_id_and_title() {
        let w = Wrapper::parse_from(["test", "tp-1", "--title", "Graphs"]);
        assert_eq!(w.args.id, "tp-1");
        assert_eq!(w.args.title, "Graphs");
    }
}
