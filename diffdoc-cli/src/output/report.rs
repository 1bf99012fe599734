//! Change report rendering.
//!
//! A [`Report`] holds every [`ArtifactDiff`] between two versions and renders
//! them as a document: a header, a legend of row kinds, then one section per
//! file with its hunks of styled rows.

use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use diffdoc_core::{ArtifactDiff, ChangeKind, DiffBody, Hunk, Rgb, StyledRow, TextDiff};

use super::{terminal_width, OutputConfig, Outputter};
use crate::config::Palette;

/// Text color for spans the theme leaves unstyled. Row fills are light.
const DEFAULT_FOREGROUND: Rgb = Rgb::new(0x00, 0x00, 0x00);

/// Widest heading rule, even on very wide terminals.
const MAX_RULE_WIDTH: usize = 100;

/// Totals shown in the report header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub files: usize,
    pub changed: usize,
    pub rows_added: usize,
    pub rows_removed: usize,
    pub duration_ms: u64,
}

impl ReportSummary {
    pub fn from_files(files: &[ArtifactDiff], duration_ms: u64) -> Self {
        let mut summary = Self {
            files: files.len(),
            duration_ms,
            ..Self::default()
        };
        for file in files {
            if file.has_changes() {
                summary.changed += 1;
            }
            if let DiffBody::Text(text) = &file.body {
                for row in text.rows() {
                    match row.row.change_kind {
                        ChangeKind::Added => summary.rows_added += 1,
                        ChangeKind::Removed => summary.rows_removed += 1,
                        ChangeKind::Context => {}
                    }
                }
            }
        }
        summary
    }
}

/// Every artifact diff between two versions.
#[derive(Debug, Serialize)]
pub struct Report {
    pub from: String,
    pub to: String,
    pub generated_at: DateTime<Local>,
    pub theme: String,
    pub summary: ReportSummary,
    pub files: Vec<ArtifactDiff>,
}

impl Report {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        theme: impl Into<String>,
        files: Vec<ArtifactDiff>,
        duration_ms: u64,
    ) -> Self {
        let summary = ReportSummary::from_files(&files, duration_ms);
        Self {
            from: from.into(),
            to: to.into(),
            generated_at: Local::now(),
            theme: theme.into(),
            summary,
            files,
        }
    }
}

impl Outputter for Report {
    fn to_table(&self, config: &OutputConfig) -> String {
        let painter = Painter {
            color: config.use_colors(),
            palette: config.palette,
        };
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} -> {}\n",
            painter.heading("CHANGE REPORT:"),
            self.from,
            self.to
        ));
        output.push_str(&format!(
            "Generated {} with theme '{}': {} files, {} changed, +{} -{} rows ({}ms)\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S"),
            self.theme,
            self.summary.files,
            self.summary.changed,
            self.summary.rows_added,
            self.summary.rows_removed,
            self.summary.duration_ms
        ));

        if self.files.is_empty() {
            output.push_str(&format!(
                "No changes found between {} and {}.\n",
                self.from, self.to
            ));
            return output;
        }

        output.push_str(&legend(&config.palette, config.compact));
        output.push('\n');

        let rule_width = terminal_width().clamp(20, MAX_RULE_WIDTH);
        for file in &self.files {
            output.push('\n');
            output.push_str(&painter.heading(&format!("File: {}", file.path)));
            output.push('\n');
            output.push_str(&"-".repeat(rule_width));
            output.push('\n');
            render_file(&mut output, file, &painter, config.line_numbers);
        }

        output
    }
}

/// Legend table of row kinds and their fill colors.
fn legend(palette: &Palette, compact: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Mark", "Row", "Fill"]);
    for (kind, fill) in [
        (ChangeKind::Added, palette.added),
        (ChangeKind::Removed, palette.removed),
        (ChangeKind::Context, palette.neutral),
    ] {
        builder.push_record([
            kind.symbol().to_string(),
            kind.as_str().to_string(),
            fill.to_hex(),
        ]);
    }

    let mut table = builder.build();
    if compact {
        table.with(Style::blank());
    } else {
        table.with(Style::rounded());
    }
    table.to_string()
}

fn render_file(output: &mut String, file: &ArtifactDiff, painter: &Painter, line_numbers: bool) {
    match &file.body {
        DiffBody::Text(text) if file.has_changes() => {
            render_text(output, text, painter, line_numbers);
        }
        DiffBody::Binary { changed: true } => {
            output.push_str("Binary file, contents differ.\n");
        }
        DiffBody::Image(image) => {
            let state = if image.changed { "changed" } else { "unchanged" };
            output.push_str(&format!(
                "Image, {} ({}).\n",
                state,
                format_size(image.size_bytes)
            ));
        }
        _ => output.push_str(&format!("{}\n", painter.dimmed("No significant changes."))),
    }
}

fn render_text(output: &mut String, text: &TextDiff, painter: &Painter, line_numbers: bool) {
    let width = text
        .rows()
        .map(|r| r.row.line_number)
        .max()
        .unwrap_or(0)
        .to_string()
        .len();

    for hunk in &text.hunks {
        render_hunk(output, hunk, painter, line_numbers.then_some(width));
    }
}

fn render_hunk(output: &mut String, hunk: &Hunk, painter: &Painter, number_width: Option<usize>) {
    output.push_str(&painter.dimmed(&hunk.header()));
    output.push('\n');
    for row in &hunk.rows {
        output.push_str(&painter.row(row, number_width));
        output.push('\n');
    }
}

/// Human-readable byte count.
fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 3] = ["KiB", "MiB", "GiB"];
    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

/// Applies colors when enabled; passes text through otherwise.
struct Painter {
    color: bool,
    palette: Palette,
}

impl Painter {
    fn heading(&self, text: &str) -> String {
        if self.color {
            text.cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dimmed(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn fill(&self, kind: ChangeKind) -> Rgb {
        match kind {
            ChangeKind::Added => self.palette.added,
            ChangeKind::Removed => self.palette.removed,
            ChangeKind::Context => self.palette.neutral,
        }
    }

    fn row(&self, row: &StyledRow, number_width: Option<usize>) -> String {
        let kind = row.row.change_kind;
        let mut prefix = String::new();
        if let Some(width) = number_width {
            prefix.push_str(&format!("{:>width$} ", row.row.line_number, width = width));
        }
        prefix.push(kind.symbol());
        prefix.push(' ');

        if !self.color {
            let body: String = row.spans.iter().map(|s| s.text.as_str()).collect();
            return format!("{}{}", prefix, body);
        }

        let bg = self.fill(kind);
        let mut line = on_fill(prefix.truecolor(0x60, 0x60, 0x60), bg).to_string();
        for span in &row.spans {
            let fg = span.color.unwrap_or(DEFAULT_FOREGROUND);
            let mut styled = on_fill(span.text.truecolor(fg.r, fg.g, fg.b), bg);
            if span.bold {
                styled = styled.bold();
            }
            if span.italic {
                styled = styled.italic();
            }
            line.push_str(&styled.to_string());
        }
        line
    }
}

fn on_fill(text: ColoredString, bg: Rgb) -> ColoredString {
    text.on_truecolor(bg.r, bg.g, bg.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use diffdoc_core::{ArtifactPair, DiffEngine, EngineConfig, EMPTY_PLACEHOLDER};

    fn sample_report() -> Report {
        let engine = DiffEngine::new(EngineConfig::default());
        let files = vec![
            engine.diff(ArtifactPair::new(
                "src/app.py",
                b"a = 1\nb = 2\n".to_vec(),
                b"a = 1\nb = 3\n\n".to_vec(),
            )),
            engine.diff(ArtifactPair::new("same.txt", b"x\n".to_vec(), b"x\n".to_vec())),
            engine.diff(ArtifactPair::new("data.bin", vec![0, 1], vec![0, 2])),
            engine.diff(ArtifactPair::new("logo.png", vec![], vec![0u8; 2048])),
        ];
        Report::new("abc123", "def456", "default", files, 7)
    }

    #[test]
    fn test_summary_counts() {
        let report = sample_report();
        assert_eq!(
            report.summary,
            ReportSummary {
                files: 4,
                changed: 3,
                rows_added: 2,
                rows_removed: 1,
                duration_ms: 7,
            }
        );
    }

    #[test]
    fn test_plain_render() {
        let report = sample_report();
        let config = OutputConfig::new(OutputFormat::Plain);
        let output = report.render(&config);

        assert!(output.contains("CHANGE REPORT: abc123 -> def456"));
        assert!(output.contains("#D0FFD0"));
        assert!(output.contains("File: src/app.py"));
        assert!(output.contains("@@ -1,2 +1,3 @@"));
        assert!(output.contains("1   a = 1"));
        assert!(output.contains("2 - b = 2"));
        assert!(output.contains("2 + b = 3"));
        assert!(output.contains(&format!("3 + {}", EMPTY_PLACEHOLDER)));
        assert!(output.contains("No significant changes."));
        assert!(output.contains("Binary file, contents differ."));
        assert!(output.contains("Image, changed (2.0 KiB)."));
        assert!(!output.contains('\u{1b}'));
    }

    #[test]
    fn test_plain_without_line_numbers() {
        let report = sample_report();
        let config = OutputConfig::new(OutputFormat::Plain).with_line_numbers(false);
        let output = report.render(&config);
        assert!(output.lines().any(|l| l == "- b = 2"));
        assert!(output.lines().any(|l| l == "+ b = 3"));
    }

    #[test]
    fn test_json_render_omits_image_bytes() {
        let report = sample_report();
        let config = OutputConfig::new(OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&report.render(&config)).unwrap();

        assert_eq!(value["from"], "abc123");
        let files = value["files"].as_array().unwrap();
        assert_eq!(files[0]["kind"], "text");
        assert_eq!(files[0]["hunks"][0]["rows"][1]["change_kind"], "removed");
        assert_eq!(files[2]["kind"], "binary");
        assert_eq!(files[2]["changed"], true);
        assert_eq!(files[3]["kind"], "image");
        assert_eq!(files[3]["size_bytes"], 2048);
        assert!(files[3].get("new_bytes").is_none());
    }

    #[test]
    fn test_compact_legend_has_no_borders() {
        let report = sample_report();
        let framed = report.render(&OutputConfig::new(OutputFormat::Plain));
        let compact = report.render(&OutputConfig::new(OutputFormat::Plain).with_compact(true));
        assert!(framed.contains('╭'));
        assert!(!compact.contains('╭'));
        assert!(compact.contains("#D0FFD0"));
    }

    #[test]
    fn test_empty_report() {
        let report = Report::new("a", "b", "default", vec![], 0);
        let output = report.render(&OutputConfig::new(OutputFormat::Plain));
        assert!(output.contains("No changes found between a and b."));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 bytes");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }
}
