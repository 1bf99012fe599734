//! Themes command - List the themes a report can be styled with

use colored::Colorize;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use diffdoc_core::ThemeProvider;

use crate::config::DiffdocConfig;
use super::{deliver, output_config};
use crate::output::{paint, OutputFormat, TableDisplay};

#[derive(Debug, Serialize)]
pub struct ThemeInfo {
    pub name: String,
    /// `config` for `[themes.*]` tables, `builtin` otherwise.
    pub source: &'static str,
    pub entries: usize,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct ThemeList {
    pub active: String,
    pub themes: Vec<ThemeInfo>,
}

impl TableDisplay for ThemeList {
    fn to_table(&self, color: bool) -> String {
        let mut builder = Builder::default();
        builder.push_record(["", "Theme", "Source", "Entries"]);
        for theme in &self.themes {
            builder.push_record([
                if theme.active { "*" } else { "" }.to_string(),
                theme.name.clone(),
                theme.source.to_string(),
                theme.entries.to_string(),
            ]);
        }
        let mut table = builder.build();
        table.with(Style::rounded());

        let mut output = format!(
            "{} {} available, active: {}\n",
            paint("THEMES:", color, |t| t.cyan().bold()),
            self.themes.len(),
            paint(&self.active, color, |t| t.yellow())
        );
        output.push_str(&table.to_string());
        output
    }
}

fn list_themes(config: &DiffdocConfig) -> ThemeList {
    let catalog = config.theme_catalog();
    let active = config.theme().to_string();
    let themes = catalog
        .names()
        .into_iter()
        .map(|name| {
            let entries = catalog.resolve(&name).map(|t| t.len()).unwrap_or(0);
            ThemeInfo {
                source: if config.themes.contains_key(&name) {
                    "config"
                } else {
                    "builtin"
                },
                active: name == active,
                entries,
                name,
            }
        })
        .collect();
    ThemeList { active, themes }
}

/// Run the themes command
pub fn run(config: &DiffdocConfig, format: OutputFormat) -> anyhow::Result<()> {
    deliver(&list_themes(config), output_config(config, format), None)
}
