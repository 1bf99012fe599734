//! Files command - Diff two files on disk
//!
//! A missing file counts as empty, so the command also reports a file as
//! wholly added or wholly removed.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;

use diffdoc_core::ArtifactPair;

use super::{build_engine, confirm_overwrite, deliver, output_config};
use crate::config::DiffdocConfig;
use crate::output::{OutputFormat, Report};

/// Arguments of `diffdoc files`.
#[derive(Debug, Clone, Default)]
pub struct FilesArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    pub output: Option<PathBuf>,
    pub force: bool,
    pub context: Option<usize>,
    pub theme: Option<String>,
}

/// Read `path`, or `None` when it doesn't exist.
async fn read_optional(path: &Path) -> anyhow::Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("{} does not exist, treating as empty", path.display());
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Run the files command
pub async fn run(
    args: FilesArgs,
    config: &DiffdocConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let start = Instant::now();

    if let Some(path) = &args.output {
        if !confirm_overwrite(path, args.force)? {
            eprintln!("Keeping existing {}", path.display());
            return Ok(());
        }
    }

    let (old, new) = tokio::try_join!(read_optional(&args.old), read_optional(&args.new))?;
    if old.is_none() && new.is_none() {
        anyhow::bail!(
            "neither {} nor {} exists",
            args.old.display(),
            args.new.display()
        );
    }

    // The surviving path names the artifact, which picks its lexer.
    let label = if new.is_some() { &args.new } else { &args.old };
    let pair = ArtifactPair::new(
        label.display().to_string(),
        old.unwrap_or_default(),
        new.unwrap_or_default(),
    );

    let engine = build_engine(config, args.context, args.theme.as_deref())?;
    let theme = engine.theme().name().to_string();
    let diff = tokio::task::spawn_blocking(move || engine.diff(pair)).await?;

    let report = Report::new(
        args.old.display().to_string(),
        args.new.display().to_string(),
        theme,
        vec![diff],
        start.elapsed().as_millis() as u64,
    );
    deliver(
        &report,
        output_config(config, format),
        args.output.as_deref(),
    )
}
