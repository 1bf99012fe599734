//! Command implementations for diffdoc CLI
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod completions;
pub mod files;
pub mod languages;
pub mod report;
pub mod themes;

use std::io::IsTerminal;
use std::path::Path;

use anyhow::Context;
use dialoguer::Confirm;

use diffdoc_core::DiffEngine;

use crate::config::DiffdocConfig;
use crate::output::{OutputConfig, OutputFormat, Outputter};

/// Build the diff engine from config, with command-line overrides applied.
pub fn build_engine(
    config: &DiffdocConfig,
    context: Option<usize>,
    theme: Option<&str>,
) -> anyhow::Result<DiffEngine> {
    let mut engine_config = config.engine_config()?;
    if context.is_some() {
        engine_config = engine_config.with_context(context);
    }
    if let Some(theme) = theme {
        engine_config = engine_config.with_theme(theme);
    }
    tracing::debug!(?engine_config, "engine configured");
    Ok(DiffEngine::with_providers(
        engine_config,
        std::sync::Arc::new(diffdoc_core::style::SyntectLexerProvider),
        &config.theme_catalog(),
    ))
}

/// Rendering settings for `format`, with the `[output]` preferences applied.
pub fn output_config(config: &DiffdocConfig, format: OutputFormat) -> OutputConfig {
    OutputConfig::auto_detect_with_color_override(format, config.use_color())
        .with_line_numbers(config.line_numbers())
        .with_palette(config.palette())
        .with_compact(config.compact())
}

/// Ask before replacing an existing output file.
///
/// Returns `Ok(false)` when the user declines. Without a terminal to ask on,
/// an existing file is an error unless `force` is set.
pub fn confirm_overwrite(path: &Path, force: bool) -> anyhow::Result<bool> {
    if force || !path.exists() {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Ok(Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite?", path.display()))
        .default(false)
        .interact()
        .unwrap_or(false))
}

/// Print `data`, or write it to `destination`.
///
/// Files never receive ANSI colors: a table report is written as plain text.
pub fn deliver<T: Outputter>(
    data: &T,
    config: OutputConfig,
    destination: Option<&Path>,
) -> anyhow::Result<()> {
    let Some(path) = destination else {
        data.output(&config);
        return Ok(());
    };

    let config = match config.format {
        OutputFormat::Table => OutputConfig {
            format: OutputFormat::Plain,
            ..config
        },
        _ => config,
    };
    let mut rendered = data.render(&config);
    rendered.push('\n');
    std::fs::write(path, rendered)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("Report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_engine_overrides() {
        let config: DiffdocConfig =
            toml::from_str("[diff]\ncontext = 5\n[style]\ntheme = \"InspiredGitHub\"\n").unwrap();

        let engine = build_engine(&config, None, None).unwrap();
        assert_eq!(engine.config().context, Some(5));
        assert_eq!(engine.theme().name(), "InspiredGitHub");

        let engine = build_engine(&config, Some(1), Some("default")).unwrap();
        assert_eq!(engine.config().context, Some(1));
        assert_eq!(engine.theme().name(), "default");
    }

    #[test]
    fn test_build_engine_custom_theme() {
        let config: DiffdocConfig =
            toml::from_str("[style]\ntheme = \"mine\"\n[themes.mine]\nkeyword = \"bold\"\n")
                .unwrap();
        let engine = build_engine(&config, None, None).unwrap();
        assert_eq!(engine.theme().len(), 1);
    }

    #[test]
    fn test_output_config_applies_output_section() {
        let config: DiffdocConfig =
            toml::from_str("[output]\ncompact = true\nline_numbers = false\ncolor = false\n")
                .unwrap();
        let output = output_config(&config, OutputFormat::Table);
        assert!(output.compact);
        assert!(!output.line_numbers);
        assert!(!output.use_colors());

        let output = output_config(&DiffdocConfig::default(), OutputFormat::Json);
        assert!(!output.compact);
    }

    #[test]
    fn test_confirm_overwrite_missing_or_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        assert!(confirm_overwrite(&path, false).unwrap());

        std::fs::write(&path, "old").unwrap();
        assert!(confirm_overwrite(&path, true).unwrap());
    }
}
