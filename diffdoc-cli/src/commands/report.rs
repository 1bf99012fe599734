//! Report command - Change report between two git revisions
//!
//! Lists the files changed between two revisions, fetches both versions of
//! each file with `git show`, runs them through the diff engine and renders
//! the result as one report.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use diffdoc_core::ArtifactPair;

use super::{build_engine, confirm_overwrite, deliver, output_config};
use crate::config::DiffdocConfig;
use crate::output::{OutputFormat, Report};

/// Upper bound on concurrently running `git show` processes.
const MAX_CONCURRENT_GIT: usize = 16;

/// Arguments of `diffdoc report`.
#[derive(Debug, Clone, Default)]
pub struct ReportArgs {
    /// Old revision; defaults to the repository's first commit.
    pub from: Option<String>,
    /// New revision; defaults to `HEAD`.
    pub to: Option<String>,
    pub repo: PathBuf,
    pub output: Option<PathBuf>,
    pub force: bool,
    pub context: Option<usize>,
    pub theme: Option<String>,
    pub threads: Option<usize>,
}

/// Run `git` in `repo` and return its stdout, failing on a non-zero exit.
async fn git(repo: &Path, args: &[&str]) -> anyhow::Result<Vec<u8>> {
    let output = Command::new("git")
        .current_dir(repo)
        .args(args)
        .output()
        .await
        .context("failed to run git (is it installed?)")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }
    Ok(output.stdout)
}

async fn git_line(repo: &Path, args: &[&str]) -> anyhow::Result<String> {
    let stdout = git(repo, args).await?;
    Ok(String::from_utf8_lossy(&stdout).trim().to_string())
}

async fn ensure_repository(repo: &Path) -> anyhow::Result<()> {
    if git(repo, &["rev-parse", "--git-dir"]).await.is_err() {
        anyhow::bail!("{} is not inside a git repository", repo.display());
    }
    Ok(())
}

/// The root commit of `HEAD`'s history. With several roots, the oldest.
async fn first_commit(repo: &Path) -> anyhow::Result<String> {
    let roots = git_line(repo, &["rev-list", "--max-parents=0", "HEAD"]).await?;
    roots
        .lines()
        .last()
        .map(str::to_string)
        .context("repository has no commits")
}

/// Get the list of changed files between two git revisions
async fn changed_files(repo: &Path, from: &str, to: &str) -> anyhow::Result<Vec<String>> {
    let stdout = git(repo, &["diff", "--name-only", from, to]).await?;
    Ok(String::from_utf8_lossy(&stdout)
        .lines()
        .filter(|l| !l.is_empty())
        .map(|s| s.to_string())
        .collect())
}

/// Get file content at a specific revision
///
/// `None` when the file doesn't exist there.
async fn file_at_rev(repo: &Path, path: &str, rev: &str) -> anyhow::Result<Option<Vec<u8>>> {
    let output = Command::new("git")
        .current_dir(repo)
        .args(["show", &format!("{}:{}", rev, path)])
        .output()
        .await
        .context("failed to run git show")?;

    if !output.status.success() {
        tracing::debug!("{} not present at {}", path, rev);
        return Ok(None);
    }
    Ok(Some(output.stdout))
}

/// Fetch both versions of every path concurrently, keeping input order.
async fn fetch_pairs(
    repo: &Path,
    from: &str,
    to: &str,
    paths: Vec<String>,
    progress: &ProgressBar,
) -> anyhow::Result<Vec<ArtifactPair>> {
    let limit = Arc::new(Semaphore::new(MAX_CONCURRENT_GIT));
    let mut tasks = JoinSet::new();

    for (index, path) in paths.into_iter().enumerate() {
        let repo = repo.to_path_buf();
        let (from, to) = (from.to_string(), to.to_string());
        let limit = Arc::clone(&limit);
        tasks.spawn(async move {
            let _permit = limit.acquire_owned().await?;
            let old = file_at_rev(&repo, &path, &from).await?;
            let new = file_at_rev(&repo, &path, &to).await?;
            let pair = ArtifactPair::new(path, old.unwrap_or_default(), new.unwrap_or_default());
            anyhow::Ok((index, pair))
        });
    }

    let mut pairs = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, pair) = joined??;
        progress.set_message(pair.path.clone());
        progress.inc(1);
        pairs.push((index, pair));
    }
    pairs.sort_by_key(|(index, _)| *index);
    Ok(pairs.into_iter().map(|(_, pair)| pair).collect())
}

fn progress_bar(len: usize, quiet: bool) -> anyhow::Result<ProgressBar> {
    if quiet || !std::io::stderr().is_terminal() {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")?
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

/// Run the report command
pub async fn run(
    args: ReportArgs,
    config: &DiffdocConfig,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let start = Instant::now();

    if let Some(path) = &args.output {
        if !confirm_overwrite(path, args.force)? {
            eprintln!("Keeping existing {}", path.display());
            return Ok(());
        }
    }

    let repo = args.repo.as_path();
    ensure_repository(repo).await?;

    let from = match args.from {
        Some(rev) => rev,
        None => {
            let rev = first_commit(repo).await?;
            tracing::info!("Using first commit {}", rev);
            rev
        }
    };
    let to = match args.to {
        Some(rev) => rev,
        None => git_line(repo, &["rev-parse", "HEAD"]).await?,
    };

    let engine = build_engine(config, args.context, args.theme.as_deref())?;
    let theme = engine.theme().name().to_string();

    let paths = changed_files(repo, &from, &to).await?;
    tracing::debug!("{} files changed between {} and {}", paths.len(), from, to);

    let progress = progress_bar(paths.len(), quiet)?;
    let pairs = fetch_pairs(repo, &from, &to, paths, &progress).await?;

    progress.set_message("diffing");
    let threads = args.threads;
    let files = tokio::task::spawn_blocking(move || engine.diff_batch(pairs, threads)).await??;
    progress.finish_and_clear();

    let report = Report::new(
        from,
        to,
        theme,
        files,
        start.elapsed().as_millis() as u64,
    );
    deliver(
        &report,
        output_config(config, format),
        args.output.as_deref(),
    )?;

    if let Some(path) = &args.output {
        if !quiet {
            eprintln!("Report written to {}", path.display());
        }
    }
    Ok(())
}
