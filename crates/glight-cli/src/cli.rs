use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "glight",
    about = "glight: transparent persistence for object graphs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Context configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Stop at a torn trailing record instead of failing
    #[arg(long, global = true)]
    pub ignore_torn_tail: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a sample graph, persist it across sessions and verify the reload
    Demo(DemoArgs),
    /// Print the raw records stored in a log
    Inspect(InspectArgs),
    /// Rebuild the object graph from a log and print it
    Replay(ReplayArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum IdScheme {
    Random,
    Uuid,
}

#[derive(Args)]
pub struct DemoArgs {
    /// Log file to create (truncated if it exists)
    #[arg(long, default_value = "glight-demo.log")]
    pub log: PathBuf,

    /// Identifier scheme for new objects
    #[arg(long, default_value = "random")]
    pub ids: IdScheme,
}

#[derive(Args)]
pub struct InspectArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct ReplayArgs {
    pub path: PathBuf,

    /// Also list every object in the table
    #[arg(long)]
    pub objects: bool,
}
