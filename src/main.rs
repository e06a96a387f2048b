//! transplant — replay a commit onto another branch through the GitHub
//! API.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages; everything
//! below this file returns structured results and never prints.

mod cli;

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;

use transplant::artifacts;
use transplant::assemble::{self, CommitAssembler, TargetBranch};
use transplant::config::Config;
use transplant::constants;
use transplant::decision;
use transplant::env::Env;
use transplant::github::{BranchBaseFetcher, GitHubClient};
use transplant::models::{
    AbortReason, FileReport, RunMode, RunReport, RunResult, Summary,
};
use transplant::reconcile::{self, CancelFlag, ReconcileError};

use cli::args::{Cli, Command, GraftArgs, PickArgs};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Pick(args) => run_pick(*args).await,
        Command::Graft(args) => run_graft(args).await,
        Command::Version => run_version(),
    }
}

/// Print version information.
fn run_version() -> Result<()> {
    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold(),
    );
    Ok(())
}

/// Build the repository-bound API client, failing before any network
/// call when required configuration is missing.
fn build_client(owner: &str, repo: &str) -> Result<(Arc<GitHubClient>, Config)> {
    let config = Config::load(&Env::real()).context("failed to load configuration")?;
    let token = config.require_token()?;
    let client = Arc::new(GitHubClient::new(&config.github.api_url, owner, repo, token));
    Ok((client, config))
}

/// Arm a cooperative cancel flag on Ctrl-C. Reconciliation checks it
/// between files; in-flight files still run to completion.
fn arm_cancel_on_ctrl_c() -> CancelFlag {
    let cancel = CancelFlag::new();
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.cancel();
        }
    });
    cancel
}

async fn run_pick(args: PickArgs) -> Result<()> {
    let mode = args.mode();
    let (client, config) = build_client(&args.owner, &args.repo)?;
    let max_concurrent = args.max_concurrent.unwrap_or(config.run.max_concurrent);
    let cancel = arm_cancel_on_ctrl_c();

    let source = client
        .source_commit(&args.source)
        .await
        .context("failed to read the source commit")?;
    let head = client
        .branch_head(&args.target)
        .await
        .with_context(|| format!("failed to read the head of {}", args.target))?;
    let head_commit = client
        .commit_object(&head)
        .await
        .context("failed to read the target head commit")?;
    let target = TargetBranch {
        name: args.target.clone(),
        head: head.clone(),
        tree: head_commit.tree.clone(),
    };

    let fetcher = Arc::new(BranchBaseFetcher::new(Arc::clone(&client), args.target.clone()));
    let mut summary = Summary::default();
    let result = match reconcile::reconcile(&source.files, fetcher, max_concurrent, &cancel).await {
        Ok(outcomes) => {
            summary = Summary::from_outcomes(&outcomes);
            decision::decide(outcomes, mode)
        }
        Err(ReconcileError::Cancelled) => RunResult::Aborted(AbortReason::Cancelled),
        Err(err) => return Err(err).context("reconciliation failed"),
    };

    let mut report = RunReport {
        mode,
        source: source.sha.clone(),
        target: args.target.clone(),
        target_head: head,
        files: source.files.iter().map(FileReport::from_changed_file).collect(),
        summary,
        conflicts: Vec::new(),
        new_commit: None,
    };

    match result {
        RunResult::Preview { summary, conflicts } => {
            report.summary = summary;
            if let Some(dir) = args.conflict_dir.as_deref() {
                if !conflicts.is_empty() {
                    let written = artifacts::write_conflict_artifacts(dir, &conflicts)
                        .with_context(|| {
                            format!("failed to write conflict artifacts to {}", dir.display())
                        })?;
                    eprintln!(
                        "  Wrote {} conflict artifact(s) to {}",
                        written.len(),
                        dir.display(),
                    );
                }
            }
            report.conflicts = conflicts;
            print!("{}", args.format.render(&report));
        }
        RunResult::Aborted(AbortReason::Conflicts(conflicts)) => {
            let count = conflicts.len();
            report.conflicts = conflicts;
            print!("{}", args.format.render(&report));
            bail!("{count} file(s) conflicted — nothing was committed");
        }
        RunResult::Aborted(AbortReason::Cancelled) => {
            bail!("run cancelled — nothing was committed");
        }
        RunResult::NoOp => {
            print!("{}", args.format.render(&report));
            eprintln!("  Nothing to commit on {}.", args.target);
        }
        RunResult::ReadyToCommit { applied } => {
            if cancel.is_cancelled() {
                bail!("run cancelled — nothing was committed");
            }
            let assembler = CommitAssembler::new(Arc::clone(&client), max_concurrent);
            let message = assemble::cherry_pick_message(&source.message);
            let sha = assembler
                .assemble(&applied, &target, &message)
                .await
                .context("failed to assemble the new commit")?;
            report.new_commit = Some(sha);
            print!("{}", args.format.render(&report));
        }
    }

    Ok(())
}

async fn run_graft(args: GraftArgs) -> Result<()> {
    let (client, _config) = build_client(&args.owner, &args.repo)?;

    let source = client
        .commit_object(&args.source)
        .await
        .context("failed to read the source commit")?;
    let head = client
        .branch_head(&args.target)
        .await
        .with_context(|| format!("failed to read the head of {}", args.target))?;

    let message = assemble::cherry_pick_message(&source.message);
    match args.mode() {
        RunMode::Preview => {
            println!(
                " {} {} {} {}",
                "graft preview".bold(),
                &source.sha[..source.sha.len().min(7)],
                "→".dimmed(),
                args.target.bold(),
            );
            println!("   {}  {}", "tree:".cyan(), source.tree);
            println!("   {} {}", "parent:".cyan(), head);
            println!("   {} {}", "message:".cyan(), message.lines().next().unwrap_or(""));
            println!("{}", " Re-run with --commit to apply.".dimmed());
        }
        RunMode::Commit => {
            let assembler = CommitAssembler::new(Arc::clone(&client), 1);
            let sha = assembler
                .graft(&source.tree, &args.target, &head, &message)
                .await
                .context("failed to graft the source tree")?;
            println!(
                " {} New commit on {}: {}",
                "✔".green().bold(),
                args.target.bold(),
                sha,
            );
        }
    }

    Ok(())
}
