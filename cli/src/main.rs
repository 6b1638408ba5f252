use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(version, about = "EVTC combat log analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse logs and print their encounter summaries
    Info {
        /// Log files to analyze
        files: Vec<PathBuf>,
        /// Emit summaries as JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
    /// Replace player names with numbered placeholders
    Anonymize {
        file: PathBuf,
        /// Output path
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Remove all guild records
    StripGuilds {
        file: PathBuf,
        /// Output path
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Info { files, json } => commands::info(&files, json),
        Commands::Anonymize { file, out } => commands::anonymize(&file, &out),
        Commands::StripGuilds { file, out } => commands::strip_guilds(&file, &out),
    }
}
