//! Lexers and lexer resolution.
//!
//! A [`LexerProvider`] turns a file name and/or a content sample into a
//! [`Lexer`]. [`resolve_lexer`] walks the fallback chain: file name, then
//! content alone, then the plain-text lexer.

use std::path::Path;

use once_cell::sync::Lazy;
use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};

use crate::error::{EngineError, Result};

/// Category given to text with no more specific lexical class.
pub const PLAIN_CATEGORY: &str = "text";

/// A lexical token: category and the substring it covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub category: String,
    pub text: String,
}

impl Token {
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
        }
    }
}

/// Tokenizes a single line of text.
///
/// Lines are tokenized independently: no state carries over between calls,
/// since consecutive rows of a diff need not be consecutive in either version.
pub trait Lexer: Send + Sync {
    /// Human-readable grammar name.
    fn name(&self) -> &str;

    /// Split `line` into tokens covering it in order.
    fn tokenize(&self, line: &str) -> Result<Vec<Token>>;
}

/// Yields the whole line as one plain token.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTextLexer;

impl Lexer for PlainTextLexer {
    fn name(&self) -> &str {
        "Plain Text"
    }

    fn tokenize(&self, line: &str) -> Result<Vec<Token>> {
        Ok(vec![Token::new(PLAIN_CATEGORY, line)])
    }
}

/// Source of lexers for artifacts.
pub trait LexerProvider: Send + Sync {
    /// Lexer chosen from the file name, with `sample` available to disambiguate.
    fn for_filename(&self, path: &str, sample: &str) -> Option<Box<dyn Lexer>>;

    /// Lexer guessed from content alone.
    fn for_content(&self, sample: &str) -> Option<Box<dyn Lexer>>;
}

/// Resolve a lexer for `path`: by file name, then by content, then plain text.
pub fn resolve_lexer(provider: &dyn LexerProvider, path: &str, sample: &str) -> Box<dyn Lexer> {
    if let Some(lexer) = provider.for_filename(path, sample) {
        tracing::debug!(path, lexer = lexer.name(), "lexer resolved from file name");
        return lexer;
    }
    if let Some(lexer) = provider.for_content(sample) {
        tracing::debug!(path, lexer = lexer.name(), "lexer guessed from content");
        return lexer;
    }
    tracing::debug!(path, "no lexer found, using plain text");
    Box::new(PlainTextLexer)
}

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_nonewlines);

/// Lexers backed by syntect's bundled Sublime Text grammars.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyntectLexerProvider;

impl SyntectLexerProvider {
    fn lexer(syntax: &'static SyntaxReference) -> Option<Box<dyn Lexer>> {
        if syntax.name == SYNTAX_SET.find_syntax_plain_text().name {
            return None;
        }
        Some(Box::new(SyntectLexer { syntax }))
    }

    /// Every bundled grammar with the file extensions and names it claims,
    /// sorted by grammar name.
    pub fn languages() -> Vec<(&'static str, &'static [String])> {
        let mut languages: Vec<_> = SYNTAX_SET
            .syntaxes()
            .iter()
            .map(|s| (s.name.as_str(), s.file_extensions.as_slice()))
            .collect();
        languages.sort_by_key(|(name, _)| name.to_lowercase());
        languages
    }
}

impl LexerProvider for SyntectLexerProvider {
    fn for_filename(&self, path: &str, sample: &str) -> Option<Box<dyn Lexer>> {
        let path = Path::new(path);
        let file_name = path.file_name().and_then(|n| n.to_str());
        let extension = path.extension().and_then(|e| e.to_str());

        // Grammars list bare names like "Makefile" alongside extensions.
        let syntax = extension
            .and_then(|ext| SYNTAX_SET.find_syntax_by_extension(ext))
            .or_else(|| file_name.and_then(|name| SYNTAX_SET.find_syntax_by_extension(name)))?;

        // A shebang outranks a generic extension such as `.txt`.
        if syntax.name == SYNTAX_SET.find_syntax_plain_text().name {
            return self.for_content(sample);
        }
        Self::lexer(syntax)
    }

    fn for_content(&self, sample: &str) -> Option<Box<dyn Lexer>> {
        let first_line = sample.lines().next()?;
        SYNTAX_SET
            .find_syntax_by_first_line(first_line)
            .and_then(Self::lexer)
    }
}

/// A syntect grammar used one line at a time.
pub struct SyntectLexer {
    syntax: &'static SyntaxReference,
}

impl SyntectLexer {
    /// Lexer for the grammar named `name` (e.g. `"Rust"`), if bundled.
    pub fn by_name(name: &str) -> Option<Self> {
        SYNTAX_SET
            .find_syntax_by_name(name)
            .map(|syntax| Self { syntax })
    }
}

impl Lexer for SyntectLexer {
    fn name(&self) -> &str {
        &self.syntax.name
    }

    fn tokenize(&self, line: &str) -> Result<Vec<Token>> {
        let mut state = ParseState::new(self.syntax);
        let ops = state
            .parse_line(line, &SYNTAX_SET)
            .map_err(|e| EngineError::tokenize(self.name(), e))?;

        let mut stack = ScopeStack::new();
        let mut tokens = Vec::new();
        let mut start = 0;
        for (pos, op) in ops {
            if pos > start {
                tokens.push(Token::new(category_of(&stack), &line[start..pos]));
                start = pos;
            }
            stack
                .apply(&op)
                .map_err(|e| EngineError::tokenize(self.name(), format!("{:?}", e)))?;
        }
        if start < line.len() || tokens.is_empty() {
            tokens.push(Token::new(category_of(&stack), &line[start..]));
        }
        Ok(tokens)
    }
}

/// Innermost scope name, e.g. `keyword.control.rust`.
fn category_of(stack: &ScopeStack) -> String {
    stack
        .as_slice()
        .last()
        .map(|scope| scope.build_string())
        .unwrap_or_else(|| PLAIN_CATEGORY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_languages_list_rust() {
        let languages = SyntectLexerProvider::languages();
        let (_, extensions) = languages
            .iter()
            .find(|(name, _)| *name == "Rust")
            .unwrap();
        assert!(extensions.iter().any(|e| e == "rs"));
        assert!(languages
            .windows(2)
            .all(|w| w[0].0.to_lowercase() <= w[1].0.to_lowercase()));
    }

    #[test]
    fn test_plain_lexer_whole_line() {
        let tokens = PlainTextLexer.tokenize("let x = 1;").unwrap();
        assert_eq!(tokens, vec![Token::new(PLAIN_CATEGORY, "let x = 1;")]);
    }

    #[test]
    fn test_resolve_by_extension() {
        let lexer = resolve_lexer(&SyntectLexerProvider, "src/main.rs", "fn main() {}");
        assert_eq!(lexer.name(), "Rust");
    }

    #[test]
    fn test_resolve_by_shebang() {
        let lexer = resolve_lexer(&SyntectLexerProvider, "scripts/deploy", "#!/bin/bash\necho hi");
        assert_eq!(lexer.name(), "Bourne Again Shell (bash)");
    }

    #[test]
    fn test_resolve_falls_back_to_plain() {
        let lexer = resolve_lexer(&SyntectLexerProvider, "notes.unknownext", "just words");
        assert_eq!(lexer.name(), "Plain Text");
        let lexer = resolve_lexer(&SyntectLexerProvider, "", "");
        assert_eq!(lexer.name(), "Plain Text");
    }

    #[test]
    fn test_syntect_tokens_cover_line() {
        let lexer = SyntectLexer::by_name("Rust").unwrap();
        let line = "    let answer = \"forty-two\"; // comment";
        let tokens = lexer.tokenize(line).unwrap();
        assert_eq!(joined(&tokens), line);
        assert!(tokens.iter().any(|t| t.category.starts_with("comment")));
        assert!(tokens.iter().any(|t| t.category.starts_with("string")));
        assert!(tokens.iter().any(|t| t.category.starts_with("storage") || t.category.starts_with("keyword")));
    }

    #[test]
    fn test_syntect_empty_line() {
        let lexer = SyntectLexer::by_name("Python").unwrap();
        let tokens = lexer.tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "");
    }

    struct NothingProvider;

    impl LexerProvider for NothingProvider {
        fn for_filename(&self, _path: &str, _sample: &str) -> Option<Box<dyn Lexer>> {
            None
        }

        fn for_content(&self, _sample: &str) -> Option<Box<dyn Lexer>> {
            None
        }
    }

    #[test]
    fn test_custom_provider_fallback() {
        let lexer = resolve_lexer(&NothingProvider, "main.rs", "fn main() {}");
        assert_eq!(lexer.name(), "Plain Text");
    }
}
