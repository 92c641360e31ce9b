use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tern",
    about = "Deep equality and three-way merge for JSON documents",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level, overriding RUST_LOG
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two documents structurally
    Equals(EqualsArgs),
    /// Report whether a document contains circular references
    Cycles(CyclesArgs),
    /// Merge a value over defaults, keeping the old value where unchanged
    Merge(MergeArgs),
}

#[derive(Args)]
pub struct EqualsArgs {
    pub left: PathBuf,
    pub right: PathBuf,
}

#[derive(Args)]
pub struct CyclesArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct MergeArgs {
    #[arg(long)]
    pub defaults: PathBuf,
    #[arg(long)]
    pub value: PathBuf,
    /// Previously accepted value; absent means undefined
    #[arg(long)]
    pub old: Option<PathBuf>,
    /// TOML file of merge options, applied before the flags below
    #[arg(long)]
    pub options: Option<PathBuf>,
    #[arg(long)]
    pub deep_merge_arrays: bool,
    #[arg(long)]
    pub no_deep_merge_objects: bool,
    #[arg(long)]
    pub default_for_null: bool,
    #[arg(long)]
    pub no_default_for_undefined: bool,
}
