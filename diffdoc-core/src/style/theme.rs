//! Style themes: token category to visual attributes.
//!
//! Theme entries are written as attribute strings (`"bold #008000"`) and
//! parsed into [`StyleAttributes`] once, when the theme is built. Lookups
//! walk up the dotted category hierarchy, so an entry for `comment` also
//! styles `comment.line.double-slash.rust`.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use syntect::highlighting::{FontStyle, ThemeSet};

use crate::types::Rgb;

/// Name of the built-in theme used when none is configured.
pub const DEFAULT_THEME: &str = "default";

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

static SYNTECT_THEMES: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Attributes applied to a token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StyleAttributes {
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Rgb>,
}

impl StyleAttributes {
    /// Parse a space-separated attribute string.
    ///
    /// `bold`, `italic`, `nobold` and `noitalic` toggle flags and `#RRGGBB`
    /// sets the colour. Anything else (backgrounds, borders, malformed
    /// colours) is ignored.
    pub fn parse(attributes: &str) -> Self {
        let mut attrs = Self::default();
        for part in attributes.split_whitespace() {
            match part {
                "bold" => attrs.bold = true,
                "nobold" => attrs.bold = false,
                "italic" => attrs.italic = true,
                "noitalic" => attrs.italic = false,
                _ if HEX_COLOR.is_match(part) => attrs.color = Rgb::from_hex(part),
                _ => tracing::trace!(attribute = part, "ignoring style attribute"),
            }
        }
        attrs
    }
}

/// A resolved theme.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Theme {
    name: String,
    entries: HashMap<String, StyleAttributes>,
}

impl Theme {
    /// A theme with no entries; every category renders with defaults.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    /// Build a theme from `(category, attribute string)` pairs.
    pub fn from_attribute_strings<I, K, V>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        Self {
            name: name.into(),
            entries: entries
                .into_iter()
                .map(|(category, attrs)| (category.into(), StyleAttributes::parse(attrs.as_ref())))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attributes for `category`, falling back to its dotted parents.
    pub fn lookup(&self, category: &str) -> StyleAttributes {
        let mut key = category;
        loop {
            if let Some(attrs) = self.entries.get(key) {
                return *attrs;
            }
            match key.rfind('.') {
                Some(idx) => key = &key[..idx],
                None => return StyleAttributes::default(),
            }
        }
    }

    /// Convert a bundled syntect theme. Only single-scope selectors carry
    /// over; compound and excluding selectors have no category equivalent.
    fn from_syntect(name: &str, theme: &syntect::highlighting::Theme) -> Self {
        let mut entries = HashMap::new();
        for item in &theme.scopes {
            let attrs = StyleAttributes {
                bold: item
                    .style
                    .font_style
                    .is_some_and(|f| f.contains(FontStyle::BOLD)),
                italic: item
                    .style
                    .font_style
                    .is_some_and(|f| f.contains(FontStyle::ITALIC)),
                color: item
                    .style
                    .foreground
                    .map(|c| Rgb::new(c.r, c.g, c.b)),
            };
            for selector in &item.scope.selectors {
                let scopes = selector.path.as_slice();
                if scopes.len() == 1 && selector.excludes.is_empty() {
                    entries.insert(scopes[0].build_string(), attrs);
                }
            }
        }
        Self {
            name: name.to_string(),
            entries,
        }
    }
}

/// Source of themes by name.
pub trait ThemeProvider: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Theme>;

    /// Names this provider can resolve.
    fn names(&self) -> Vec<String>;
}

/// Resolve `name`, falling back to an empty theme.
pub fn resolve_theme(provider: &dyn ThemeProvider, name: &str) -> Theme {
    match provider.resolve(name) {
        Some(theme) => theme,
        None => {
            tracing::warn!(theme = name, "unknown theme, rendering without styles");
            Theme::empty(name)
        }
    }
}

/// Category entries of the `default` theme.
const DEFAULT_ENTRIES: &[(&str, &str)] = &[
    ("comment", "italic #3D7B7B"),
    ("comment.block.documentation", "italic #BA2121"),
    ("keyword", "bold #008000"),
    ("keyword.operator", "nobold #666666"),
    ("keyword.control.import", "bold #008000"),
    ("storage", "bold #008000"),
    ("storage.type", "nobold #B00040"),
    ("storage.modifier", "bold #008000"),
    ("string", "#BA2121"),
    ("string.regexp", "#A45A77"),
    ("constant.character.escape", "bold #AA5D1F"),
    ("constant.numeric", "#666666"),
    ("constant.language", "bold #008000"),
    ("constant.other", "#880000"),
    ("entity.name.function", "#0000FF"),
    ("entity.name.class", "bold #0000FF"),
    ("entity.name.type", "bold #0000FF"),
    ("entity.name.namespace", "bold #0000FF"),
    ("entity.name.tag", "bold #008000"),
    ("entity.other.attribute-name", "#687822"),
    ("entity.other.inherited-class", "bold #0000FF"),
    ("support.function", "#008000"),
    ("support.type", "#008000"),
    ("support.class", "#008000"),
    ("variable.language", "#008000"),
    ("variable.parameter", "#19177C"),
    ("variable.other.constant", "#880000"),
    ("meta.preprocessor", "noitalic #9C6500"),
    ("markup.heading", "bold #000080"),
    ("markup.inserted", "#008400"),
    ("markup.deleted", "#A00000"),
    ("markup.italic", "italic"),
    ("markup.bold", "bold"),
    ("invalid", "bg:#FF0000 border:#FF0000"),
];

/// The `default` theme plus every theme bundled with syntect.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinThemes;

impl ThemeProvider for BuiltinThemes {
    fn resolve(&self, name: &str) -> Option<Theme> {
        if name == DEFAULT_THEME {
            return Some(Theme::from_attribute_strings(
                DEFAULT_THEME,
                DEFAULT_ENTRIES.iter().copied(),
            ));
        }
        SYNTECT_THEMES
            .themes
            .get(name)
            .map(|theme| Theme::from_syntect(name, theme))
    }

    fn names(&self) -> Vec<String> {
        std::iter::once(DEFAULT_THEME.to_string())
            .chain(SYNTECT_THEMES.themes.keys().cloned())
            .collect()
    }
}

/// User-defined themes layered over [`BuiltinThemes`].
///
/// A custom theme with a built-in name shadows the built-in one.
#[derive(Clone, Debug, Default)]
pub struct ThemeCatalog {
    custom: BTreeMap<String, Theme>,
}

impl ThemeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a theme from `(category, attribute string)` pairs.
    pub fn with_theme<I, K, V>(mut self, name: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.custom.insert(
            name.to_string(),
            Theme::from_attribute_strings(name, entries),
        );
        self
    }
}

impl ThemeProvider for ThemeCatalog {
    fn resolve(&self, name: &str) -> Option<Theme> {
        self.custom
            .get(name)
            .cloned()
            .or_else(|| BuiltinThemes.resolve(name))
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.custom.keys().cloned().collect();
        for name in BuiltinThemes.names() {
            if !self.custom.contains_key(&name) {
                names.push(name);
            }
        }
        names
    }
}
