//! `sk list`: list sheets, or the ordered children of one parent.

use super::Context;
use crate::output::{pretty_rule, pretty_section, render_mode};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sheetrack_core::catalog::{self, Children};
use sheetrack_core::db::query;
use sheetrack_core::model::Sheet;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Parent key (sheet, topic or sub-pattern). Lists sheets when omitted.
    #[arg(long)]
    pub parent: Option<String>,

    /// Include soft-deleted sheets.
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Listing {
    Sheets { kind: &'static str, items: Vec<Sheet> },
    Children(Children),
}

/// `(order, key, title, deleted)` rows for text rendering.
fn rows(listing: &Listing) -> Vec<(Option<i64>, &str, &str, bool)> {
    match listing {
        Listing::Sheets { items, .. } => items
            .iter()
            .map(|s| (None, s.id.as_str(), s.title.as_str(), s.is_deleted))
            .collect(),
        Listing::Children(Children::Topics(items)) => items
            .iter()
            .map(|t| (Some(t.order), t.id.as_str(), t.title.as_str(), false))
            .collect(),
        Listing::Children(Children::SubPatterns(items)) => items
            .iter()
            .map(|sp| (Some(sp.order), sp.id.as_str(), sp.title.as_str(), false))
            .collect(),
        Listing::Children(Children::Problems(items)) => items
            .iter()
            .map(|p| (Some(p.order), p.id.as_str(), p.title.as_str(), false))
            .collect(),
    }
}

const fn heading(listing: &Listing) -> &'static str {
    match listing {
        Listing::Sheets { .. } => "Sheets",
        Listing::Children(Children::Topics(_)) => "Topics",
        Listing::Children(Children::SubPatterns(_)) => "Sub-patterns",
        Listing::Children(Children::Problems(_)) => "Problems",
    }
}

fn render_text(listing: &Listing, w: &mut dyn Write) -> io::Result<()> {
    for (order, id, title, deleted) in rows(listing) {
        let order = order.map(|o| o.to_string()).unwrap_or_default();
        let marker = if deleted { "\tdeleted" } else { "" };
        writeln!(w, "{order}\t{id}\t{title}{marker}")?;
    }
    Ok(())
}

fn render_pretty(listing: &Listing, w: &mut dyn Write) -> io::Result<()> {
    let rows = rows(listing);
    pretty_section(w, heading(listing))?;
    if rows.is_empty() {
        return writeln!(w, "  (none)");
    }
    for (order, id, title, deleted) in rows {
        let order = order.map(|o| format!("{o:>3}.")).unwrap_or_default();
        let marker = if deleted { "  [deleted]" } else { "" };
        writeln!(w, "  {order} {title}  ({id}){marker}")?;
    }
    pretty_rule(w)
}

pub fn run_list(args: &ListArgs, ctx: &Context<'_>) -> Result<()> {
    let project = ctx.open_project()?;
    let listing = match args.parent.as_deref() {
        None => Listing::Sheets {
            kind: "sheets",
            items: query::list_sheets(&project.conn, args.all)?,
        },
        Some(parent) => Listing::Children(catalog::list_children(&project.conn, parent)?),
    };
    render_mode(ctx.output, &listing, render_text, render_pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ListArgs,
    }

    #[test]
    fn list_args_defaults() {
        let w = Wrapper::parse_from(["test"]);
        assert!(w.args.parent.is_none());
        assert!(!w.args.all);
    }

    #[test]
    fn text_rows_carry_order_and_key() {
        let listing = Listing::Sheets {
            kind: "sheets",
            items: vec![],
        };
        let mut buf = Vec::new();
        render_text(&listing, &mut buf).expect("render");
        assert!(buf.is_empty());

        let mut buf = Vec::new();
        render_pretty(&listing, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("Sheets"));
        assert!(text.contains("(none)"));
    }
}
