//! diffdoc core - line diffing and syntax styling for change documents.
//!
//! Given the old and new bytes of an artifact, the engine classifies the
//! content, aligns the two versions line by line, projects the alignment
//! into numbered rows and attaches syntax-highlighting spans to each row.
//! Rendering and version retrieval live in `diffdoc-cli`.
//!
//! # Features
//!
//! - **Content classification**: text, binary, or image by extension
//! - **Line alignment**: longest-matching-block heuristic, Myers, or patience
//! - **Hunk grouping**: optional context windows around changes
//! - **Syntax styling**: syntect grammars with pluggable lexers and themes
//! - **Parallel batches**: artifacts processed concurrently with Rayon
//!
//! # Usage
//!
//! ```
//! use diffdoc_core::{ArtifactPair, DiffEngine, EngineConfig};
//!
//! let engine = DiffEngine::new(EngineConfig::default().with_context(Some(3)));
//! let diff = engine.diff(ArtifactPair::new(
//!     "hello.py",
//!     b"print('hi')\n".to_vec(),
//!     b"print('hello')\n".to_vec(),
//! ));
//! assert!(diff.has_changes());
//! ```

pub mod align;
pub mod classify;
pub mod error;
pub mod pipeline;
pub mod project;
pub mod style;
pub mod text;
pub mod types;

pub use align::{align, align_with, group_hunks, AlignOptions, Algorithm};
pub use classify::classify;
pub use error::{EngineError, Result};
pub use pipeline::{DiffEngine, EngineConfig};
pub use project::project;
pub use style::{
    style, Lexer, LexerProvider, Theme, ThemeCatalog, ThemeProvider, DEFAULT_THEME,
};
pub use text::{split_lines, TextEncoding};
pub use types::*;
