//! diffdoc configuration loading from `.diffdocrc.toml`.
//!
//! The file is looked up in the working directory first and then in the
//! user configuration directory (`~/.config/diffdoc/config.toml` on Linux).
//! Configuration is optional; every setting has a default and command-line
//! flags override what the file says.
//!
//! # Example Configuration
//!
//! ```toml
//! [diff]
//! encoding = "utf-8"
//! algorithm = "heuristic"
//! autojunk = true
//! context = 3
//!
//! [style]
//! theme = "default"
//!
//! [output]
//! format = "table"
//! color = true
//! line_numbers = true
//! add_color = "D0FFD0"
//! remove_color = "FFD0D0"
//! neutral_color = "F5F5F5"
//!
//! [themes.mine]
//! comment = "italic #808080"
//! keyword = "bold #0000FF"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use diffdoc_core::{Algorithm, EngineConfig, Rgb, TextEncoding, ThemeCatalog, DEFAULT_THEME};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = ".diffdocrc.toml";

/// Root configuration structure.
///
/// All sections are optional and fall back to defaults.
#[derive(Debug, Deserialize, Default)]
pub struct DiffdocConfig {
    /// Alignment and decoding settings.
    #[serde(default)]
    pub diff: DiffSection,

    /// Syntax styling settings.
    #[serde(default)]
    pub style: StyleSection,

    /// Report rendering preferences.
    #[serde(default)]
    pub output: OutputSettings,

    /// User-defined themes: theme name to `category = "attributes"` entries.
    #[serde(default)]
    pub themes: BTreeMap<String, BTreeMap<String, String>>,
}

/// Settings for decoding and aligning file contents.
#[derive(Debug, Deserialize, Default)]
pub struct DiffSection {
    /// Encoding label used to decode both versions (default: `utf-8`).
    #[serde(default)]
    pub encoding: Option<String>,

    /// Alignment algorithm: `heuristic`, `myers` or `patience`.
    #[serde(default)]
    pub algorithm: Option<String>,

    /// Treat very frequent lines as junk in long files (heuristic only).
    #[serde(default)]
    pub autojunk: Option<bool>,

    /// Unchanged lines shown around each change. Unset shows whole files.
    #[serde(default)]
    pub context: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct StyleSection {
    /// Theme name, either built in or defined under `[themes]`.
    #[serde(default)]
    pub theme: Option<String>,
}

/// Report rendering preferences.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default output format: `table`, `json` or `plain`.
    #[serde(default)]
    pub format: Option<String>,

    /// Whether to use colored output. Defaults to auto-detection.
    #[serde(default)]
    pub color: Option<bool>,

    /// Show line numbers next to rows (default: `true`).
    #[serde(default)]
    pub line_numbers: Option<bool>,

    /// Background of added rows, as `RRGGBB`.
    #[serde(default)]
    pub add_color: Option<String>,

    /// Background of removed rows.
    #[serde(default)]
    pub remove_color: Option<String>,

    /// Background of context rows.
    #[serde(default)]
    pub neutral_color: Option<String>,

    /// Single-line JSON and a borderless legend (default: `false`).
    #[serde(default)]
    pub compact: Option<bool>,
}

/// Row background colors, one per row kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub added: Rgb,
    pub removed: Rgb,
    pub neutral: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            added: Rgb::new(0xD0, 0xFF, 0xD0),
            removed: Rgb::new(0xFF, 0xD0, 0xD0),
            neutral: Rgb::new(0xF5, 0xF5, 0xF5),
        }
    }
}

impl DiffdocConfig {
    /// Load configuration for the given working directory.
    ///
    /// Tries `<root>/.diffdocrc.toml`, then the user config file. A file
    /// that can't be read or parsed is logged and skipped.
    pub fn load(root: &Path) -> Self {
        Self::candidates(root)
            .into_iter()
            .filter(|path| path.exists())
            .find_map(|path| Self::load_file(&path))
            .unwrap_or_default()
    }

    fn candidates(root: &Path) -> Vec<PathBuf> {
        let mut paths = vec![root.join(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("diffdoc").join("config.toml"));
        }
        paths
    }

    fn load_file(path: &Path) -> Option<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Build the engine configuration from the `[diff]` and `[style]` sections.
    ///
    /// Fails on an unknown encoding label or algorithm name.
    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = EngineConfig::default()
            .with_context(self.diff.context)
            .with_theme(self.theme());

        if let Some(label) = &self.diff.encoding {
            config = config.with_encoding(
                TextEncoding::from_label(label).context("invalid [diff].encoding")?,
            );
        }
        if let Some(name) = &self.diff.algorithm {
            let algorithm: Algorithm = name.parse().context("invalid [diff].algorithm")?;
            config = config.with_algorithm(algorithm);
        }
        if let Some(autojunk) = self.diff.autojunk {
            config = config.with_autojunk(autojunk);
        }
        Ok(config)
    }

    /// Configured theme name, or the built-in default.
    pub fn theme(&self) -> &str {
        self.style.theme.as_deref().unwrap_or(DEFAULT_THEME)
    }

    /// Built-in themes plus the `[themes.*]` tables.
    pub fn theme_catalog(&self) -> ThemeCatalog {
        self.themes
            .iter()
            .fold(ThemeCatalog::new(), |catalog, (name, entries)| {
                catalog.with_theme(name, entries.iter().map(|(k, v)| (k.clone(), v.as_str())))
            })
    }

    /// Row background colors. Malformed values keep their default.
    pub fn palette(&self) -> Palette {
        let defaults = Palette::default();
        let pick = |value: &Option<String>, fallback: Rgb, key: &str| match value {
            None => fallback,
            Some(hex) => Rgb::from_hex(hex).unwrap_or_else(|| {
                tracing::warn!("Ignoring invalid [output].{} = {:?}", key, hex);
                fallback
            }),
        };
        Palette {
            added: pick(&self.output.add_color, defaults.added, "add_color"),
            removed: pick(&self.output.remove_color, defaults.removed, "remove_color"),
            neutral: pick(&self.output.neutral_color, defaults.neutral, "neutral_color"),
        }
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Returns the configured value, or `None` to use auto-detection.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }

    pub fn line_numbers(&self) -> bool {
        self.output.line_numbers.unwrap_or(true)
    }

    pub fn compact(&self) -> bool {
        self.output.compact.unwrap_or(false)
    }
}
