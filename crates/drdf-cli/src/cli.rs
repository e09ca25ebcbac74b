use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "drdf",
    about = "Detector Response Data Format: create, inspect, verify, and merge files",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with reader settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a file with one run of random detector images
    Create(CreateArgs),
    /// Print the runs, events, and images of a file
    Read(ReadArgs),
    /// Check framing and checksum of a file
    Verify(VerifyArgs),
    /// Flatten the events of several files into one new run
    Merge(MergeArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    pub file: PathBuf,
    #[arg(long, default_value = "geo://dummy")]
    pub georef: String,
    #[arg(long, default_value = "2")]
    pub events: u32,
    #[arg(long, default_value = "3")]
    pub sources: u32,
    /// Image width and height in pixels
    #[arg(long, default_value = "24")]
    pub size: u16,
    #[arg(long, default_value = "3735928559")]
    pub seed: u64,
}

#[derive(Args)]
pub struct ReadArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct VerifyArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct MergeArgs {
    pub output: PathBuf,
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    #[arg(long, default_value = "DUMMY")]
    pub georef: String,
}
