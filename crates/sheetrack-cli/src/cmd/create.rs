//! `sk create`: add a sheet, topic, sub-pattern or problem.

use super::Context;
use crate::output::{CliError, pretty_kv, render};
use crate::validate;
use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use sheetrack_core::catalog;
use sheetrack_core::model::{EntityKind, NewProblem, Platform, Problem, Sheet, SubPattern, Topic};
use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CreateKind {
    Sheet,
    Topic,
    SubPattern,
    Problem,
}

impl From<CreateKind> for EntityKind {
    fn from(kind: CreateKind) -> Self {
        match kind {
            CreateKind::Sheet => Self::Sheet,
            CreateKind::Topic => Self::Topic,
            CreateKind::SubPattern => Self::SubPattern,
            CreateKind::Problem => Self::Problem,
        }
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// What to create.
    #[arg(value_enum)]
    pub kind: CreateKind,

    /// Title of the new entity.
    #[arg(short, long)]
    pub title: String,

    /// Parent key: a sheet for topics, a topic for sub-patterns, a sub-pattern for problems.
    #[arg(short, long)]
    pub parent: Option<String>,

    /// Sheet description.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Problem URL.
    #[arg(long)]
    pub url: Option<String>,

    /// Problem platform: LeetCode, GFG or Other.
    #[arg(long, default_value = "LeetCode")]
    pub platform: Platform,

    /// Identifier on the platform, e.g. the LeetCode problem number.
    #[arg(long)]
    pub platform_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", content = "entity", rename_all = "kebab-case")]
enum Created {
    Sheet(Sheet),
    Topic(Topic),
    SubPattern(SubPattern),
    Problem(Problem),
}

impl Created {
    fn id(&self) -> &str {
        match self {
            Self::Sheet(s) => &s.id,
            Self::Topic(t) => &t.id,
            Self::SubPattern(sp) => &sp.id,
            Self::Problem(p) => &p.id,
        }
    }

    const fn kind(&self) -> EntityKind {
        match self {
            Self::Sheet(_) => EntityKind::Sheet,
            Self::Topic(_) => EntityKind::Topic,
            Self::SubPattern(_) => EntityKind::SubPattern,
            Self::Problem(_) => EntityKind::Problem,
        }
    }

    const fn order(&self) -> Option<i64> {
        match self {
            Self::Sheet(_) => None,
            Self::Topic(t) => Some(t.order),
            Self::SubPattern(sp) => Some(sp.order),
            Self::Problem(p) => Some(p.order),
        }
    }
}

/// The parent key for `kind`, checked against the expected parent kind.
fn required_parent(kind: EntityKind, parent: Option<&str>) -> Result<Option<String>> {
    match (kind.parent(), parent) {
        (None, None) => Ok(None),
        (None, Some(_)) => Err(CliError::with_details(
            "sheets have no parent",
            "drop --parent when creating a sheet",
            "invalid_parent",
        )
        .into()),
        (Some(expected), None) => Err(CliError::with_details(
            format!("creating a {kind} requires --parent"),
            format!("pass the {expected} key with --parent"),
            "missing_parent",
        )
        .into()),
        (Some(expected), Some(id)) => {
            validate::validate_id_kind(id, expected).map_err(CliError::from)?;
            Ok(Some(id.to_string()))
        }
    }
}

pub fn run_create(args: &CreateArgs, ctx: &Context<'_>) -> Result<()> {
    let kind = EntityKind::from(args.kind);
    validate::validate_title(&args.title).map_err(CliError::from)?;
    let parent = required_parent(kind, args.parent.as_deref())?;
    if kind == EntityKind::Problem {
        let url = args.url.as_deref().unwrap_or_default();
        validate::validate_url(url).map_err(CliError::from)?;
    }

    let mut project = ctx.open_project()?;
    ctx.require_admin(&mut project)?;
    let conn = &project.conn;
    let parent = parent.unwrap_or_default();

    let created = match kind {
        EntityKind::Sheet => Created::Sheet(catalog::create_sheet(
            conn,
            &args.title,
            args.description.as_deref().unwrap_or_default(),
            chrono::Utc::now(),
        )?),
        EntityKind::Topic => Created::Topic(catalog::create_topic(conn, &parent, &args.title)?),
        EntityKind::SubPattern => {
            Created::SubPattern(catalog::create_sub_pattern(conn, &parent, &args.title)?)
        }
        EntityKind::Problem => Created::Problem(catalog::create_problem(
            conn,
            &parent,
            NewProblem {
                title: args.title.clone(),
                url: args.url.clone().unwrap_or_default(),
                platform: args.platform,
                platform_id: args.platform_id.clone(),
            },
        )?),
    };

    render(ctx.output, &created, |c, w| {
        writeln!(w, "✓ Created {} {}", c.kind(), c.id())?;
        if let Some(order) = c.order() {
            pretty_kv(w, "Order", order.to_string())?;
        }
        Ok(())
    })
}
