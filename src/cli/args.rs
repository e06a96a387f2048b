//! Clap argument types and validation.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use transplant::models::{RunMode, RunReport};

/// Replay a commit onto another branch through the GitHub API.
#[derive(Parser, Debug)]
#[command(name = "transplant", version = transplant::constants::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Re-apply a commit's per-file diffs onto a target branch.
    Pick(Box<PickArgs>),

    /// Reuse a commit's tree verbatim as a new commit on a target branch.
    Graft(GraftArgs),

    /// Print version information.
    Version,
}

/// Arguments for the `pick` subcommand.
#[derive(Parser, Debug)]
pub struct PickArgs {
    /// Repository owner (user or organization).
    #[arg(long)]
    pub owner: String,

    /// Repository name.
    #[arg(long)]
    pub repo: String,

    /// SHA of the commit whose changes should be replayed.
    #[arg(long)]
    pub source: String,

    /// Branch to apply the commit to.
    #[arg(long, default_value = "main")]
    pub target: String,

    /// Create the commit and advance the branch ref. Without this flag
    /// the run is a preview and mutates nothing.
    #[arg(long, default_value_t = false)]
    pub commit: bool,

    /// Directory to persist each conflicted file's base and patch text
    /// to (preview mode only).
    #[arg(long)]
    pub conflict_dir: Option<PathBuf>,

    /// Max concurrent API calls (default from config, 4 out of the box).
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Output format.
    #[arg(long, default_value = "terminal")]
    pub format: OutputFormat,
}

impl PickArgs {
    pub fn mode(&self) -> RunMode {
        if self.commit { RunMode::Commit } else { RunMode::Preview }
    }
}

/// Arguments for the `graft` subcommand.
#[derive(Parser, Debug)]
pub struct GraftArgs {
    /// Repository owner (user or organization).
    #[arg(long)]
    pub owner: String,

    /// Repository name.
    #[arg(long)]
    pub repo: String,

    /// SHA of the commit whose tree should be reused.
    #[arg(long)]
    pub source: String,

    /// Branch to graft the tree onto.
    #[arg(long, default_value = "main")]
    pub target: String,

    /// Create the commit and advance the branch ref.
    #[arg(long, default_value_t = false)]
    pub commit: bool,
}

impl GraftArgs {
    pub fn mode(&self) -> RunMode {
        if self.commit { RunMode::Commit } else { RunMode::Preview }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl OutputFormat {
    /// Render a run report using the renderer for this format.
    pub fn render(&self, report: &RunReport) -> String {
        use transplant::output::ReportRenderer;
        match self {
            OutputFormat::Terminal => transplant::output::terminal::TerminalRenderer.render(report),
            OutputFormat::Json => transplant::output::json::JsonRenderer.render(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(argv: &[&str]) -> Cli {
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn pick_defaults_to_preview() {
        let cli = parse(&[
            "transplant", "pick", "--owner", "acme", "--repo", "widgets", "--source", "abc123",
        ]);
        match cli.command {
            Command::Pick(args) => {
                assert_eq!(args.mode(), RunMode::Preview);
                assert_eq!(args.target, "main");
                assert_eq!(args.format, OutputFormat::Terminal);
                assert!(args.max_concurrent.is_none());
            }
            other => panic!("expected pick, got {other:?}"),
        }
    }

    #[test]
    fn pick_commit_flag_switches_mode() {
        let cli = parse(&[
            "transplant", "pick", "--owner", "acme", "--repo", "widgets", "--source", "abc123",
            "--commit",
        ]);
        match cli.command {
            Command::Pick(args) => assert_eq!(args.mode(), RunMode::Commit),
            other => panic!("expected pick, got {other:?}"),
        }
    }

    #[test]
    fn pick_requires_source() {
        let result = Cli::try_parse_from([
            "transplant", "pick", "--owner", "acme", "--repo", "widgets",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn pick_accepts_json_format_and_conflict_dir() {
        let cli = parse(&[
            "transplant", "pick", "--owner", "acme", "--repo", "widgets", "--source", "abc",
            "--format", "json", "--conflict-dir", "/tmp/conflicts",
        ]);
        match cli.command {
            Command::Pick(args) => {
                assert_eq!(args.format, OutputFormat::Json);
                assert_eq!(args.conflict_dir.as_deref(), Some(std::path::Path::new("/tmp/conflicts")));
            }
            other => panic!("expected pick, got {other:?}"),
        }
    }

    #[test]
    fn graft_parses_with_defaults() {
        let cli = parse(&[
            "transplant", "graft", "--owner", "acme", "--repo", "widgets", "--source", "abc",
        ]);
        match cli.command {
            Command::Graft(args) => {
                assert_eq!(args.mode(), RunMode::Preview);
                assert_eq!(args.target, "main");
            }
            other => panic!("expected graft, got {other:?}"),
        }
    }

    #[test]
    fn version_subcommand_parses() {
        let cli = parse(&["transplant", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }
}
