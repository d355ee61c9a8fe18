//! Per-language symbol extractors
//!
//! Each language implements [`SymbolExtractor`], a flat capability set:
//! which extensions it handles, how to turn one source text into symbols,
//! and (provided) how to find and read files under a service root.
//! [`ExtractorSet`] runs several extractors over one root and keeps going
//! past files that fail to parse.

use crate::error::ParseError;
use crate::symbol::{CodeSymbol, KindFilter};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

mod go;
mod python;
mod typescript;

pub use go::GoExtractor;
pub use python::PythonExtractor;
pub use typescript::TypeScriptExtractor;

/// Source language handled by an extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    /// TypeScript and JavaScript share one extractor
    TypeScript,
    Go,
}

impl Language {
    /// Get file extensions for this language (without dot)
    #[inline]
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["py"],
            Language::TypeScript => &["ts", "tsx", "js", "jsx"],
            Language::Go => &["go"],
        }
    }

    /// Detect language from file extension
    #[inline]
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.') {
            "py" => Some(Language::Python),
            "ts" | "tsx" | "js" | "jsx" => Some(Language::TypeScript),
            "go" => Some(Language::Go),
            _ => None,
        }
    }

    /// Configuration key
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::TypeScript => "typescript",
            Language::Go => "go",
        }
    }

    /// Kinds extracted when configuration says nothing
    #[must_use]
    pub fn default_extract(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["classes", "functions", "methods"],
            Language::TypeScript => &["classes", "functions", "interfaces", "types"],
            Language::Go => &["structs", "functions", "methods", "interfaces"],
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Language::Python => "Python",
            Language::TypeScript => "TypeScript",
            Language::Go => "Go",
        };
        write!(f, "{}", name)
    }
}

/// Compiled ignore globs, matched against root-relative paths
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    globs: GlobSet,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self {
            globs: GlobSet::empty(),
        }
    }
}

impl IgnoreSet {
    /// Compile patterns; patterns that fail to compile are skipped
    #[must_use]
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
            {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => tracing::warn!(pattern, "skipping invalid ignore pattern: {e}"),
            }
        }
        let globs = builder.build().unwrap_or_else(|e| {
            tracing::warn!("ignore patterns could not be combined: {e}");
            GlobSet::empty()
        });
        Self { globs }
    }

    /// Whether a root-relative path is ignored
    #[inline]
    #[must_use]
    pub fn is_ignored(&self, rel_path: &str) -> bool {
        self.globs.is_match(rel_path)
    }
}

/// Language-specific symbol extraction
pub trait SymbolExtractor: Send + Sync {
    /// Language handled
    fn language(&self) -> Language;

    /// Kinds this extractor emits
    fn kinds(&self) -> &KindFilter;

    /// Extract symbols from one source text
    ///
    /// `rel_path` becomes every symbol's `file_path`.
    ///
    /// # Errors
    /// Returns [`ParseError`] when the grammar fails to load, or when the
    /// syntax tree contains errors and the language does not tolerate them.
    fn parse_source(&self, rel_path: &str, source: &str) -> Result<Vec<CodeSymbol>, ParseError>;

    /// Supported file extensions (without dot)
    fn file_extensions(&self) -> &'static [&'static str] {
        self.language().extensions()
    }

    /// Check if this extractor can handle the given path
    fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.file_extensions().contains(&ext))
    }

    /// Read and extract one file under `root`
    ///
    /// # Errors
    /// Returns [`ParseError::Io`] when the file cannot be read, or any
    /// error from [`SymbolExtractor::parse_source`].
    fn parse_file(&self, root: &Path, path: &Path) -> Result<Vec<CodeSymbol>, ParseError> {
        let source = std::fs::read_to_string(path).map_err(|e| ParseError::io_error(path, e))?;
        self.parse_source(&relative_path(root, path), &source)
    }

    /// Recursively find handled, non-ignored files under `root`
    fn discover_files(&self, root: &Path, ignore: &IgnoreSet) -> Vec<PathBuf> {
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("skipping unreadable directory entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.can_parse(entry.path()))
            .filter(|entry| !ignore.is_ignored(&relative_path(root, entry.path())))
            .map(walkdir::DirEntry::into_path)
            .collect()
    }
}

/// Root-relative path with `/` separators
#[must_use]
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Symbols from one extraction pass plus the files that were skipped
#[derive(Debug, Default)]
pub struct Extraction {
    pub symbols: Vec<CodeSymbol>,
    pub failures: Vec<ParseError>,
}

/// Ordered collection of extractors run together over a service root
#[derive(Default)]
pub struct ExtractorSet {
    extractors: Vec<Box<dyn SymbolExtractor>>,
}

impl std::fmt::Debug for ExtractorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorSet")
            .field(
                "languages",
                &self.extractors.iter().map(|e| e.language()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ExtractorSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extractor
    pub fn register<E: SymbolExtractor + 'static>(&mut self, extractor: E) {
        self.extractors.push(Box::new(extractor));
    }

    /// Number of registered extractors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Whether no extractor is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Run every extractor over `root`
    ///
    /// Files that fail are logged, recorded in [`Extraction::failures`] and
    /// skipped.
    #[must_use]
    pub fn extract_all(&self, root: &Path, ignore: &IgnoreSet) -> Extraction {
        let mut extraction = Extraction::default();
        for extractor in &self.extractors {
            let files = extractor.discover_files(root, ignore);
            tracing::debug!(language = %extractor.language(), files = files.len(), "extracting symbols");
            for file in files {
                match extractor.parse_file(root, &file) {
                    Ok(symbols) => extraction.symbols.extend(symbols),
                    Err(e) => {
                        tracing::warn!("skipping {}: {e}", file.display());
                        extraction.failures.push(e);
                    }
                }
            }
        }
        extraction
    }
}

/// Create extractor set with every built-in language and default kinds
#[must_use]
pub fn default_extractors() -> ExtractorSet {
    let mut set = ExtractorSet::new();
    set.register(PythonExtractor::new(KindFilter::from_words(
        Language::Python.default_extract(),
    )));
    set.register(TypeScriptExtractor::new(KindFilter::from_words(
        Language::TypeScript.default_extract(),
    )));
    set.register(GoExtractor::new(KindFilter::from_words(
        Language::Go.default_extract(),
    )));
    set
}

/// What to do with a syntax tree that contains error nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SyntaxErrors {
    /// Fail the file with [`ParseError::Syntax`]
    Reject,
    /// Warn with the first error line and keep the recovered tree
    Tolerate,
}

/// Parse `source`, handling error nodes as `on_error` says
pub(crate) fn parse_tree(
    grammar: &tree_sitter::Language,
    language: Language,
    rel_path: &str,
    source: &str,
    on_error: SyntaxErrors,
) -> Result<tree_sitter::Tree, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(grammar)
        .map_err(|e| ParseError::ParserInit {
            language: language.to_string(),
            message: e.to_string(),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::ParseFailed(rel_path.to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        match on_error {
            SyntaxErrors::Reject => {
                return Err(ParseError::Syntax {
                    path: rel_path.to_string(),
                    line,
                });
            }
            SyntaxErrors::Tolerate => {
                tracing::warn!(path = rel_path, line, "syntax error; extracting from recovered tree");
            }
        }
    }
    Ok(tree)
}

fn first_error_line(node: tree_sitter::Node<'_>) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .filter(tree_sitter::Node::has_error)
        .find_map(first_error_line);
    found
}

/// Non-empty text of a named field
pub(crate) fn field_text<'a>(
    node: tree_sitter::Node<'_>,
    field: &str,
    source: &'a str,
) -> Option<&'a str> {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .filter(|text| !text.is_empty())
}

/// Build a symbol spanning `node`
pub(crate) fn symbol_at(
    node: tree_sitter::Node<'_>,
    name: &str,
    kind: crate::symbol::SymbolKind,
    rel_path: &str,
) -> CodeSymbol {
    CodeSymbol::new(
        name,
        kind,
        rel_path,
        node.start_position().row + 1,
        node.end_position().row + 1,
    )
}
