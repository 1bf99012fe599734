//! Token styling pipeline.
//!
//! Turns row text into [`StyledSpan`]s: the artifact's [`Lexer`] splits the
//! text into categorised tokens and the active [`Theme`] supplies each
//! token's attributes.

pub mod lexer;
pub mod theme;

pub use lexer::{
    resolve_lexer, Lexer, LexerProvider, PlainTextLexer, SyntectLexer, SyntectLexerProvider,
    Token, PLAIN_CATEGORY,
};
pub use theme::{
    resolve_theme, BuiltinThemes, StyleAttributes, Theme, ThemeCatalog, ThemeProvider,
    DEFAULT_THEME,
};

use crate::error::Result;
use crate::types::{StyledSpan, EMPTY_PLACEHOLDER};

/// Style one row's text (change symbol already stripped).
///
/// Trailing line terminators are dropped from each token and a token left
/// empty is replaced by a non-breaking space, so an empty row still yields
/// one visible span.
pub fn style(row_text: &str, lexer: &dyn Lexer, theme: &Theme) -> Result<Vec<StyledSpan>> {
    let tokens = lexer.tokenize(row_text)?;
    if tokens.is_empty() {
        return Ok(vec![span(EMPTY_PLACEHOLDER, PLAIN_CATEGORY, theme)]);
    }
    Ok(tokens
        .iter()
        .map(|token| {
            let text = token.text.trim_end_matches(['\r', '\n']);
            let text = if text.is_empty() { EMPTY_PLACEHOLDER } else { text };
            span(text, &token.category, theme)
        })
        .collect())
}

fn span(text: &str, category: &str, theme: &Theme) -> StyledSpan {
    let attrs = theme.lookup(category);
    StyledSpan {
        text: text.to_string(),
        token_category: category.to_string(),
        bold: attrs.bold,
        italic: attrs.italic,
        color: attrs.color,
    }
}

/// Styles every row of one artifact with a fixed lexer and theme.
///
/// The first tokenizer error switches the artifact to the plain-text lexer
/// for the rest of its rows.
pub struct ArtifactStyler<'a> {
    lexer: Box<dyn Lexer>,
    theme: &'a Theme,
    fell_back: bool,
}

impl<'a> ArtifactStyler<'a> {
    pub fn new(lexer: Box<dyn Lexer>, theme: &'a Theme) -> Self {
        Self {
            lexer,
            theme,
            fell_back: false,
        }
    }

    pub fn lexer_name(&self) -> &str {
        self.lexer.name()
    }

    /// Whether a tokenizer error forced the plain-text lexer.
    pub fn fell_back(&self) -> bool {
        self.fell_back
    }

    pub fn style_row(&mut self, row_text: &str) -> Vec<StyledSpan> {
        match style(row_text, self.lexer.as_ref(), self.theme) {
            Ok(spans) => spans,
            Err(err) => {
                tracing::warn!(error = %err, "tokenizer failed, falling back to plain text");
                self.lexer = Box::new(PlainTextLexer);
                self.fell_back = true;
                plain_spans(row_text, self.theme)
            }
        }
    }
}

fn plain_spans(row_text: &str, theme: &Theme) -> Vec<StyledSpan> {
    let text = row_text.trim_end_matches(['\r', '\n']);
    let text = if text.is_empty() { EMPTY_PLACEHOLDER } else { text };
    vec![span(text, PLAIN_CATEGORY, theme)]
}
