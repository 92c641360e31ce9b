use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use tern_compare::{equals, has_cycles};
use tern_merge::{merge, MergeOptions};
use tern_types::Value;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Equals(args) => cmd_equals(args, format),
        Command::Cycles(args) => cmd_cycles(args, format),
        Command::Merge(args) => cmd_merge(args, format),
    }
}

fn load(path: &Path) -> anyhow::Result<Value> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&source)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(Value::from_json(&json))
}

fn cmd_equals(args: EqualsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let equal = equals(&load(&args.left)?, &load(&args.right)?);
    match format {
        OutputFormat::Json => println!("{}", json!({ "equal": equal })),
        OutputFormat::Text if equal => println!("{}", "equal".green().bold()),
        OutputFormat::Text => println!("{}", "not equal".red().bold()),
    }
    Ok(())
}

fn cmd_cycles(args: CyclesArgs, format: OutputFormat) -> anyhow::Result<()> {
    let cyclic = has_cycles(&load(&args.path)?);
    match format {
        OutputFormat::Json => println!("{}", json!({ "cycles": cyclic })),
        OutputFormat::Text if cyclic => println!("{}", "cycles found".yellow()),
        OutputFormat::Text => println!("{} no cycles", "✓".green()),
    }
    Ok(())
}

/// Result of a merge run, before printing.
#[derive(Debug)]
pub struct MergeOutcome {
    pub merged: serde_json::Value,
    pub kept_old: bool,
}

fn resolve_options(args: &MergeArgs) -> anyhow::Result<MergeOptions> {
    let mut options = match &args.options {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            MergeOptions::from_toml_str(&source)
                .with_context(|| format!("in options file {}", path.display()))?
        }
        None => MergeOptions::default(),
    };
    if args.deep_merge_arrays {
        options = options.with_deep_merge_arrays(true);
    }
    if args.no_deep_merge_objects {
        options = options.with_deep_merge_objects(false);
    }
    if args.default_for_null {
        options = options.with_default_for_null(true);
    }
    if args.no_default_for_undefined {
        options = options.with_default_for_undefined(false);
    }
    Ok(options)
}

pub fn merge_documents(args: &MergeArgs) -> anyhow::Result<MergeOutcome> {
    let options = resolve_options(args)?;
    debug!(?options, "resolved merge options");
    let defaults = load(&args.defaults)?;
    let value = load(&args.value)?;
    let old = match &args.old {
        Some(path) => load(path)?,
        None => Value::Undefined,
    };

    let merged = merge(&defaults, &value, &old, &options)?;
    Ok(MergeOutcome {
        kept_old: merged.ptr_eq(&old),
        merged: merged.to_json().context("merged value has no JSON form")?,
    })
}

fn cmd_merge(args: MergeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let outcome = merge_documents(&args)?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "merged": outcome.merged, "kept_old": outcome.kept_old })
        ),
        OutputFormat::Text => {
            println!("{}", serde_json::to_string_pretty(&outcome.merged)?);
            if outcome.kept_old {
                println!("{} old value kept", "✓".green());
            } else {
                println!("{} new value produced", "•".cyan());
            }
        }
    }
    Ok(())
}
