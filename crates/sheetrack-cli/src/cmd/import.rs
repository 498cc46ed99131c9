//! `sk import`: append a JSON array of problems to one sub-pattern.

use super::Context;
use crate::output::{CliError, render};
use crate::validate;
use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use sheetrack_core::catalog::import;
use sheetrack_core::model::{EntityKind, Problem};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Sub-pattern receiving the problems.
    #[arg(long, value_name = "ID")]
    pub sub_pattern: String,

    /// JSON file to read; omit to read from stdin.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ImportReport<'a> {
    sub_pattern_id: &'a str,
    imported: usize,
    problems: Vec<Problem>,
}

fn read_payload(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read import file {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read import payload from stdin")?;
            Ok(buf)
        }
    }
}

pub fn run_import(args: &ImportArgs, ctx: &Context<'_>) -> Result<()> {
    validate::validate_id_kind(&args.sub_pattern, EntityKind::SubPattern).map_err(CliError::from)?;

    let mut project = ctx.open_project()?;
    ctx.require_admin(&mut project)?;
    let payload = read_payload(args.file.as_deref())?;
    let problems = import::import_problems(&mut project.conn, &args.sub_pattern, &payload)?;

    let report = ImportReport {
        sub_pattern_id: &args.sub_pattern,
        imported: problems.len(),
        problems,
    };
    render(ctx.output, &report, |r, w| {
        writeln!(w, "✓ Imported {} problem(s) into {}", r.imported, r.sub_pattern_id)?;
        for p in &r.problems {
            writeln!(w, "  {:>3}. {}  ({})", p.order, p.title, p.id)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ImportArgs,
    }

    #[test]
    fn file_is_optional() {
        let w = Wrapper::parse_from(["test", "--sub-pattern", "sp-1"]);
        assert_eq!(w.args.sub_pattern, "sp-1");
        assert!(w.args.file.is_none());
    }

    #[test]
    fn reads_payload_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("batch.json");
        std::fs::write(&path, "[]").expect("write");
        assert_eq!(read_payload(Some(&path)).expect("read"), "[]");
        assert!(read_payload(Some(&dir.path().join("missing.json"))).is_err());
    }
}
