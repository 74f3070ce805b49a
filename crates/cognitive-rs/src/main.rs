//! Inspect and compact conversation histories, and browse skill folders.
//!
//! Histories are JSON arrays of messages (`kind`, `timestamp`, `parts`).
//!
//! # Examples
//!
//! ```sh
//! # Drop superseded plan tool calls
//! cognitive compact history.json > compacted.json
//!
//! # Also compact a custom tool, and report counts on stderr
//! cat history.json | cognitive compact - --watch search_status --stats
//!
//! # Human-readable dump
//! cognitive view history.json
//!
//! # Skills
//! cognitive skills list ./skills
//! cognitive skills load ./skills python-best-practices examples.py
//! ```

use clap::{Parser, Subcommand};
use cognitive_rs::Message;
use cognitive_rs::agent::hooks::render_history;
use cognitive_rs::history::{HistoryCompactor, WatchedTools};
use cognitive_rs::skills::Skills;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Inspect and compact conversation histories, and browse skill folders.
#[derive(Parser)]
#[command(name = "cognitive", version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the compacted history as JSON
    Compact {
        /// History file, or `-` for stdin
        input: PathBuf,

        /// Extra tool name to compact (repeatable); the plan tools are always watched
        #[arg(long = "watch", value_name = "NAME")]
        watch: Vec<String>,

        /// Print message counts before and after to stderr
        #[arg(long)]
        stats: bool,
    },
    /// Print a human-readable dump of a history
    View {
        /// History file, or `-` for stdin
        input: PathBuf,
    },
    /// Work with skill folders
    Skills {
        #[command(subcommand)]
        command: SkillsCommand,
    },
}

#[derive(Subcommand)]
enum SkillsCommand {
    /// Register a folder and list its skills
    List {
        /// Folder to search for skill.md files
        dir: PathBuf,
    },
    /// Print a skill's skill.md or one of its artifacts
    Load {
        /// Folder to search for skill.md files
        dir: PathBuf,
        /// Skill name from the frontmatter
        name: String,
        /// Path relative to the skill folder (default: skill.md)
        artifact: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(input: &Path) -> Result<String, String> {
    if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).map_err(|e| format!("failed to read {}: {e}", input.display()))
    }
}

fn read_history(input: &Path) -> Result<Vec<Message>, String> {
    let raw = read_input(input)?;
    let history: Vec<Message> =
        serde_json::from_str(&raw).map_err(|e| format!("invalid history JSON: {e}"))?;
    debug!("Read {} message(s) from {}", history.len(), input.display());
    Ok(history)
}

fn register(dir: &Path) -> Result<Skills, String> {
    let mut skills = Skills::new();
    skills.register_skill(dir).map_err(|e| e.to_string())?;
    Ok(skills)
}

async fn run(cli: Cli) -> Result<String, String> {
    match cli.command {
        Command::Compact {
            input,
            watch,
            stats,
        } => {
            let history = read_history(&input)?;
            let watched = watch
                .into_iter()
                .fold(WatchedTools::planning(), WatchedTools::watch);
            let before = history.len();
            let compacted = HistoryCompactor::new(watched).compact(history);
            if stats {
                eprintln!("messages: {before} -> {}", compacted.len());
            }
            let json = serde_json::to_string_pretty(&compacted)
                .map_err(|e| format!("failed to serialize history: {e}"))?;
            Ok(format!("{json}\n"))
        }
        Command::View { input } => {
            let history = read_history(&input)?;
            Ok(format!("{}\n", render_history(&history)))
        }
        Command::Skills { command } => match command {
            SkillsCommand::List { dir } => {
                let skills = register(&dir)?;
                let mut out = String::new();
                for skill in skills.iter() {
                    out.push_str(&format!("{}: {}", skill.name, skill.description));
                    if let Some(license) = &skill.license {
                        out.push_str(&format!(" [{license}]"));
                    }
                    out.push_str(&format!("\n  {}\n", skill.folder.display()));
                }
                Ok(out)
            }
            SkillsCommand::Load {
                dir,
                name,
                artifact,
            } => {
                let skills = register(&dir)?;
                let path = skills
                    .resolve(&name, artifact.as_deref())
                    .map_err(|e| e.trim_start_matches("Error: ").to_string())?;
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| format!("failed to read {}: {e}", path.display()))
            }
        },
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
