//! Code symbol model
//!
//! A [`CodeSymbol`] is one parsed declaration. Its qualified path
//! (`file::Parent.name`) is the identity key shared with the manifest.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Names never subject to coverage checks
const LIFECYCLE_NAMES: &[&str] = &[
    "__init__",
    "__str__",
    "__repr__",
    "__eq__",
    "__hash__",
    "setUp",
    "tearDown",
    "setUpClass",
    "tearDownClass",
];

/// Kind of declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// Class declaration
    Class,
    /// Free function
    Function,
    /// Function bound to a class or receiver type
    Method,
    /// Interface declaration
    Interface,
    /// Struct declaration
    Struct,
    /// Type alias
    Type,
}

impl SymbolKind {
    /// Every kind
    pub const ALL: [SymbolKind; 6] = [
        SymbolKind::Class,
        SymbolKind::Function,
        SymbolKind::Method,
        SymbolKind::Interface,
        SymbolKind::Struct,
        SymbolKind::Type,
    ];

    /// Lower-case name as written in manifests
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Interface => "interface",
            SymbolKind::Struct => "struct",
            SymbolKind::Type => "type",
        }
    }

    /// Plural form used in extractor configuration
    #[inline]
    #[must_use]
    pub const fn plural(&self) -> &'static str {
        match self {
            SymbolKind::Class => "classes",
            SymbolKind::Function => "functions",
            SymbolKind::Method => "methods",
            SymbolKind::Interface => "interfaces",
            SymbolKind::Struct => "structs",
            SymbolKind::Type => "types",
        }
    }
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SymbolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SymbolKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s || k.plural() == s)
            .ok_or_else(|| format!("unknown symbol kind: '{s}'"))
    }
}

/// A parsed code declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeSymbol {
    /// Declared name
    pub name: String,
    /// Declaration kind
    pub kind: SymbolKind,
    /// Root-relative path with `/` separators
    pub file_path: String,
    /// First line, 1-based
    pub line_start: usize,
    /// Last line, 1-based
    pub line_end: usize,
    /// Enclosing class or receiver type, for members only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl CodeSymbol {
    /// Create a top-level symbol
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        file_path: impl Into<String>,
        line_start: usize,
        line_end: usize,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            file_path: file_path.into(),
            line_start,
            line_end,
            parent: None,
        }
    }

    /// Set the enclosing type
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Manifest-format path: `file::name` or `file::Parent.name`
    #[must_use]
    pub fn qualified_path(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}::{}.{}", self.file_path, parent, self.name),
            None => format!("{}::{}", self.file_path, self.name),
        }
    }

    /// Whether the symbol participates in coverage and orphan checks
    ///
    /// Private (`_`-prefixed), lifecycle and test names are skipped.
    #[must_use]
    pub fn is_checkable(&self) -> bool {
        is_checkable_name(&self.name)
    }
}

/// Name-level checkable filter
#[must_use]
pub fn is_checkable_name(name: &str) -> bool {
    !(name.starts_with('_') || name.starts_with("test_") || LIFECYCLE_NAMES.contains(&name))
}

/// Set of kinds an extractor should emit
///
/// An empty filter accepts every kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindFilter {
    kinds: HashSet<SymbolKind>,
}

impl KindFilter {
    /// Filter that accepts everything
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter accepting exactly the given kinds
    #[must_use]
    pub fn only(kinds: impl IntoIterator<Item = SymbolKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    /// Build from configuration words (`classes`, `method`, ...)
    ///
    /// Unknown words are ignored with a warning.
    #[must_use]
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Self {
        let mut kinds = HashSet::new();
        for word in words {
            match word.as_ref().parse::<SymbolKind>() {
                Ok(kind) => {
                    kinds.insert(kind);
                }
                Err(e) => tracing::warn!("ignoring extract setting: {e}"),
            }
        }
        Self { kinds }
    }

    /// Whether a kind passes
    #[inline]
    #[must_use]
    pub fn accepts(&self, kind: SymbolKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }

    /// Whether the kind was requested explicitly
    #[inline]
    #[must_use]
    pub fn names(&self, kind: SymbolKind) -> bool {
        self.kinds.contains(&kind)
    }
}
