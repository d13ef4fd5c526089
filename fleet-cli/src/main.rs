//! Fleet CLI - bulk operations over a roster's git repositories
//!
//! One working copy per roster member lives under
//! `<clone-dir>/<project>/<member-id>`.

mod commands;
mod progress;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use fleet_core::{Config, GitVcs, Project, Roster};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{Commands, Output};
use progress::ActiveBar;

/// Fleet: clone, update and pin one git repository per roster member
#[derive(Parser, Debug)]
#[command(name = "fleet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show what would be done without touching any repository
    #[arg(long, global = true)]
    dry_run: bool,

    /// Log level (RUST_LOG takes precedence when set)
    #[arg(long, global = true, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Config file (defaults to ~/.config/fleet/config.toml)
    #[arg(long, global = true, env = "FLEET_CONFIG")]
    config: Option<PathBuf>,

    /// Base directory for cloned projects (overrides config and env)
    #[arg(long, global = true)]
    clone_dir: Option<PathBuf>,

    /// Remote user (overrides config and env)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Remote host (overrides config and env)
    #[arg(long, global = true)]
    host: Option<String>,

    /// git executable used for clone and pull
    #[arg(long, global = true, env = "FLEET_GIT", default_value = "git")]
    git: String,

    /// Print results as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Newline-separated file of member identifiers
    roster: PathBuf,

    /// Project name, used in the remote URL and as the clone subdirectory
    project: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    #[value(alias = "warning")]
    Warn,
    #[value(alias = "critical")]
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

fn init_tracing(level: LogLevel, progress: ActiveBar) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(progress).with_target(false))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let progress = ActiveBar::default();
    init_tracing(cli.log_level, progress.clone());

    // Load configuration with overrides
    let config = Config::load_with_overrides(
        cli.config.as_deref(),
        cli.user.clone(),
        cli.host.clone(),
        cli.clone_dir.clone(),
    )?;

    tracing::debug!(
        clone_dir = %config.clone_dir.display(),
        url_template = %config.remote.url_template,
        user = %config.remote.user,
        host = %config.remote.host,
        "Configuration loaded"
    );

    let roster = Roster::load(&cli.roster)
        .with_context(|| format!("Failed to load roster {}", cli.roster.display()))?;

    let mut project = Project::open(roster, &config, &cli.project, GitVcs::new().with_path(&cli.git), cli.dry_run)?;

    // Member failures are reported per member; reaching here means the batch ran
    let out = Output {
        json: cli.json,
        progress,
    };
    cli.command.execute(&mut project, cli.dry_run, &out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_switch_with_global_flags() {
        let cli = Cli::try_parse_from([
            "fleet", "students.txt", "project1", "switch", "main", "--dry-run", "--log-level", "WARNING",
        ])
        .unwrap();

        assert!(cli.dry_run);
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert_eq!(cli.project, "project1");
        assert!(matches!(cli.command, Commands::Switch { ref reference } if reference == "main"));
    }

    #[test]
    fn test_parse_checkout_commits() {
        let cli = Cli::try_parse_from(["fleet", "r.txt", "p", "checkout-commits", "marks.csv"]).unwrap();

        assert!(!cli.dry_run);
        assert_eq!(cli.log_level, LogLevel::Info);
        assert!(matches!(cli.command, Commands::CheckoutCommits { ref file } if file == &PathBuf::from("marks.csv")));
    }

    #[test]
    fn test_git_path_flag() {
        let cli = Cli::try_parse_from(["fleet", "--git", "/opt/git/bin/git", "r.txt", "p", "clone"]).unwrap();
        assert_eq!(cli.git, "/opt/git/bin/git");
        assert!(matches!(cli.command, Commands::Clone));
    }

    #[test]
    fn test_switch_requires_reference() {
        assert!(Cli::try_parse_from(["fleet", "r.txt", "p", "switch"]).is_err());
    }

    #[test]
    fn test_critical_maps_to_error() {
        let cli = Cli::try_parse_from(["fleet", "--log-level", "critical", "r.txt", "p", "pull"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Error);
    }
}
