//! Languages command - List the grammars rows can be highlighted with

use colored::Colorize;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use diffdoc_core::style::SyntectLexerProvider;

use super::{deliver, output_config};
use crate::config::DiffdocConfig;
use crate::output::{paint, OutputFormat, TableDisplay};

#[derive(Debug, Serialize)]
pub struct LanguageInfo {
    pub name: String,
    /// Extensions and bare file names (such as `Makefile`) the grammar claims.
    pub extensions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LanguageList {
    pub languages: Vec<LanguageInfo>,
}

impl TableDisplay for LanguageList {
    fn to_table(&self, color: bool) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Language", "Extensions"]);
        for language in &self.languages {
            builder.push_record([language.name.clone(), language.extensions.join(", ")]);
        }
        let mut table = builder.build();
        table.with(Style::rounded());

        let mut output = format!(
            "{} {} grammars\n",
            paint("LANGUAGES:", color, |t| t.cyan().bold()),
            self.languages.len()
        );
        output.push_str(&table.to_string());
        output
    }
}

fn list_languages() -> LanguageList {
    let languages = SyntectLexerProvider::languages()
        .into_iter()
        .map(|(name, extensions)| LanguageInfo {
            name: name.to_string(),
            extensions: extensions.to_vec(),
        })
        .collect();
    LanguageList { languages }
}

/// Run the languages command
pub fn run(config: &DiffdocConfig, format: OutputFormat) -> anyhow::Result<()> {
    deliver(&list_languages(), output_config(config, format), None)
}
