//! Output formatting module for diffdoc CLI
//!
//! Provides unified output formatting across all commands with support for
//! three formats: table (colored, human-readable), plain (the same layout
//! without ANSI escapes) and json (machine-readable).
//!
//! Automatically detects TTY context to adjust colors.

use clap::ValueEnum;
use colored::ColoredString;
use serde::Serialize;
use std::io::IsTerminal;
use std::str::FromStr;

use crate::config::Palette;

mod json;
mod report;

pub use self::json::JsonOutput;
pub use self::report::Report;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable colored format (default)
    #[default]
    Table,
    /// JSON format for machine consumption
    Json,
    /// Table layout without colors, for files and pipes
    Plain,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "plain" | "text" => Ok(OutputFormat::Plain),
            _ => Err(format!("Unknown output format: '{}'", s)),
        }
    }
}

/// Configuration for output rendering
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// The output format to use
    pub format: OutputFormat,
    /// Disable colored output
    pub no_color: bool,
    /// Show line numbers in diff rows
    pub line_numbers: bool,
    /// Row backgrounds
    pub palette: Palette,
    /// Compact mode (less whitespace)
    pub compact: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with the specified format
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            no_color: false,
            line_numbers: true,
            palette: Palette::default(),
            compact: false,
        }
    }

    /// Create an OutputConfig with automatic TTY detection and optional color override.
    ///
    /// * `color_override` - If `Some(true)`, force colors on. If `Some(false)`, force colors off.
    ///   If `None`, use auto-detection based on TTY.
    pub fn auto_detect_with_color_override(
        format: OutputFormat,
        color_override: Option<bool>,
    ) -> Self {
        let use_color = color_override.unwrap_or_else(is_tty);
        Self {
            no_color: !use_color,
            ..Self::new(format)
        }
    }

    /// Check if colors should be used
    pub fn use_colors(&self) -> bool {
        !self.no_color && self.format == OutputFormat::Table
    }

    /// Builder: disable colors
    pub fn without_colors(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Builder: set line number display
    pub fn with_line_numbers(mut self, line_numbers: bool) -> Self {
        self.line_numbers = line_numbers;
        self
    }

    /// Builder: set row backgrounds
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Builder: set compact mode
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}

/// Trait for types that can be formatted as output
pub trait Outputter: Serialize + Sized {
    /// Render as table format. Colors only when `config.use_colors()`.
    fn to_table(&self, config: &OutputConfig) -> String;

    /// Render as JSON format
    fn to_json(&self, config: &OutputConfig) -> String {
        JsonOutput::format(self, config)
    }

    /// Render the table layout with colors stripped
    fn to_plain(&self, config: &OutputConfig) -> String {
        self.to_table(&config.clone().without_colors())
    }

    /// Render using the format specified in config
    fn render(&self, config: &OutputConfig) -> String {
        match config.format {
            OutputFormat::Table => self.to_table(config),
            OutputFormat::Json => self.to_json(config),
            OutputFormat::Plain => self.to_plain(config),
        }
    }

    /// Render and print to stdout
    fn output(&self, config: &OutputConfig) {
        println!("{}", self.render(config));
    }
}

/// Simple types whose table layout only varies by color.
pub trait TableDisplay: Serialize {
    fn to_table(&self, color: bool) -> String;
}

impl<T: TableDisplay + Serialize> Outputter for T {
    fn to_table(&self, config: &OutputConfig) -> String {
        TableDisplay::to_table(self, config.use_colors())
    }
}

/// Apply `paint` to `text` only when `color` is set.
pub fn paint(text: &str, color: bool, style: impl Fn(&str) -> ColoredString) -> String {
    if color {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

/// Detect if stdout is a TTY
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to 80 if unavailable
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::Colorize;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("plain".parse::<OutputFormat>(), Ok(OutputFormat::Plain));
        assert_eq!("table".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_config_auto_detect() {
        let config = OutputConfig::auto_detect_with_color_override(OutputFormat::Table, Some(true));
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.use_colors());

        let config = OutputConfig::auto_detect_with_color_override(OutputFormat::Plain, Some(true));
        assert!(!config.use_colors());
    }

    #[test]
    fn test_output_config_builder() {
        let config = OutputConfig::new(OutputFormat::Json)
            .without_colors()
            .with_line_numbers(false)
            .with_compact(true);

        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.no_color);
        assert!(!config.line_numbers);
        assert!(config.compact);
    }

    #[derive(Serialize)]
    struct Banner {
        title: String,
    }

    impl TableDisplay for Banner {
        fn to_table(&self, color: bool) -> String {
            paint(&self.title, color, |t| t.cyan().bold())
        }
    }

    #[test]
    fn test_plain_table_display_has_no_escapes() {
        colored::control::set_override(true);
        let banner = Banner {
            title: "THEMES".to_string(),
        };
        let colored = banner.render(&OutputConfig::new(OutputFormat::Table));
        let plain = banner.render(&OutputConfig::new(OutputFormat::Plain));
        colored::control::unset_override();

        assert!(colored.contains('\u{1b}'));
        assert_eq!(plain, "THEMES");
    }
}
