//! The per-artifact pipeline: classify, align, project, style.
//!
//! [`DiffEngine`] owns the configuration and the injected lexer provider and
//! theme. Artifacts are independent, so [`DiffEngine::diff_batch`] runs them
//! concurrently on a rayon pool; the engine itself is immutable during a run.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::align::{align_with, group_hunks, AlignOptions, Algorithm};
use crate::classify::classify;
use crate::error::Result;
use crate::project::project;
use crate::style::{
    resolve_lexer, resolve_theme, ArtifactStyler, BuiltinThemes, LexerProvider,
    SyntectLexerProvider, Theme, ThemeProvider, DEFAULT_THEME,
};
use crate::text::TextEncoding;
use crate::types::{
    ArtifactDiff, ArtifactPair, ContentKind, DiffBody, Hunk, ImageChange, StyledRow, TextDiff,
};

/// Engine settings.
#[derive(Clone, Debug, Serialize)]
pub struct EngineConfig {
    pub encoding: TextEncoding,
    pub align: AlignOptions,
    /// Unchanged lines kept around each change; `None` keeps every line.
    pub context: Option<usize>,
    pub theme: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::UTF_8,
            align: AlignOptions::default(),
            context: None,
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.align.algorithm = algorithm;
        self
    }

    pub fn with_autojunk(mut self, autojunk: bool) -> Self {
        self.align.autojunk = autojunk;
        self
    }

    pub fn with_context(mut self, context: Option<usize>) -> Self {
        self.context = context;
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }
}

/// Diff engine with its collaborators resolved.
pub struct DiffEngine {
    config: EngineConfig,
    lexers: Arc<dyn LexerProvider>,
    theme: Theme,
}

impl DiffEngine {
    /// Engine using syntect lexers and the built-in themes.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_providers(config, Arc::new(SyntectLexerProvider), &BuiltinThemes)
    }

    /// Engine with explicit lexer and theme providers. The theme is resolved
    /// once here; an unknown name yields an unstyled theme.
    pub fn with_providers(
        config: EngineConfig,
        lexers: Arc<dyn LexerProvider>,
        themes: &dyn ThemeProvider,
    ) -> Self {
        let theme = resolve_theme(themes, &config.theme);
        Self {
            config,
            lexers,
            theme,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Run the full pipeline for one artifact.
    pub fn diff(&self, pair: ArtifactPair) -> ArtifactDiff {
        let start = Instant::now();
        let kind = classify(&pair.old_bytes, &pair.new_bytes, &pair.path);

        let body = match kind {
            ContentKind::Text => DiffBody::Text(self.diff_text(&pair)),
            ContentKind::Binary => DiffBody::Binary {
                changed: pair.is_changed(),
            },
            ContentKind::Image => {
                let changed = pair.is_changed();
                let size_bytes = pair.new_bytes.len();
                DiffBody::Image(ImageChange {
                    changed,
                    new_bytes: pair.new_bytes,
                    size_bytes,
                })
            }
        };

        tracing::debug!(
            path = %pair.path,
            kind = kind.as_str(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "artifact processed"
        );

        ArtifactDiff {
            path: pair.path,
            kind,
            body,
        }
    }

    fn diff_text(&self, pair: &ArtifactPair) -> TextDiff {
        let old = self.config.encoding.decode_lines(&pair.old_bytes);
        let new = self.config.encoding.decode_lines(&pair.new_bytes);
        let ops = align_with(&old, &new, self.config.align);

        let groups = match self.config.context {
            Some(context) => group_hunks(&ops, context),
            None if ops.is_empty() => Vec::new(),
            None => vec![ops.clone()],
        };

        let sample_lines = if new.is_empty() { &old } else { &new };
        let sample = sample_lines.join("\n");
        let lexer = resolve_lexer(self.lexers.as_ref(), &pair.path, &sample);
        let mut styler = ArtifactStyler::new(lexer, &self.theme);

        let hunks: Vec<Hunk> = groups
            .iter()
            .filter_map(|group| {
                let (first, last) = (group.first()?, group.last()?);
                let rows = project(&old, &new, group)
                    .into_iter()
                    .map(|row| StyledRow {
                        spans: styler.style_row(&row.text),
                        row,
                    })
                    .collect();
                Some(Hunk {
                    old_range: first.old_range.start..last.old_range.end,
                    new_range: first.new_range.start..last.new_range.end,
                    rows,
                })
            })
            .collect();

        TextDiff {
            lexer: styler.lexer_name().to_string(),
            ops,
            hunks,
        }
    }

    /// Run the pipeline for many artifacts in parallel, preserving order.
    ///
    /// `num_threads` sizes a dedicated pool; `None` or `0` uses rayon's
    /// global pool.
    pub fn diff_batch(
        &self,
        pairs: Vec<ArtifactPair>,
        num_threads: Option<usize>,
    ) -> Result<Vec<ArtifactDiff>> {
        let start = Instant::now();
        let count = pairs.len();
        let run = || {
            pairs
                .into_par_iter()
                .map(|pair| self.diff(pair))
                .collect::<Vec<_>>()
        };
        let results = match num_threads {
            Some(n) if n > 0 => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
                pool.install(run)
            }
            _ => run(),
        };
        tracing::info!(
            artifacts = count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "batch complete"
        );
        Ok(results)
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
