//! Python extractor
//!
//! Classes are collected at any depth. Methods are function definitions
//! directly inside a class body; functions are module-level only.

use super::{field_text, parse_tree, symbol_at, Language, SymbolExtractor, SyntaxErrors};
use crate::error::ParseError;
use crate::symbol::{CodeSymbol, KindFilter, SymbolKind};
use tree_sitter::Node;

/// Extracts classes, methods and functions from `.py` files
#[derive(Debug, Clone, Default)]
pub struct PythonExtractor {
    kinds: KindFilter,
}

impl PythonExtractor {
    /// Create extractor emitting the given kinds
    #[inline]
    #[must_use]
    pub fn new(kinds: KindFilter) -> Self {
        Self { kinds }
    }

    fn collect_classes(&self, node: Node<'_>, source: &str, rel_path: &str, out: &mut Vec<CodeSymbol>) {
        if node.kind() == "class_definition" {
            if let Some(name) = field_text(node, "name", source) {
                if self.kinds.accepts(SymbolKind::Class) {
                    out.push(symbol_at(node, name, SymbolKind::Class, rel_path));
                }
                if self.kinds.accepts(SymbolKind::Method) {
                    self.collect_methods(node, name, source, rel_path, out);
                }
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_classes(child, source, rel_path, out);
        }
    }

    fn collect_methods(
        &self,
        class: Node<'_>,
        class_name: &str,
        source: &str,
        rel_path: &str,
        out: &mut Vec<CodeSymbol>,
    ) {
        let Some(body) = class.child_by_field_name("body") else {
            return;
        };
        let mut cursor = body.walk();
        for item in body.children(&mut cursor) {
            if let Some(def) = function_definition(item) {
                if let Some(name) = field_text(def, "name", source) {
                    out.push(symbol_at(def, name, SymbolKind::Method, rel_path).with_parent(class_name));
                }
            }
        }
    }

    fn collect_functions(&self, module: Node<'_>, source: &str, rel_path: &str, out: &mut Vec<CodeSymbol>) {
        if !self.kinds.accepts(SymbolKind::Function) {
            return;
        }
        let mut cursor = module.walk();
        for item in module.children(&mut cursor) {
            if let Some(def) = function_definition(item) {
                if let Some(name) = field_text(def, "name", source) {
                    out.push(symbol_at(def, name, SymbolKind::Function, rel_path));
                }
            }
        }
    }
}

/// Function definition, looking through decorators
fn function_definition(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "function_definition" => Some(node),
        "decorated_definition" => node
            .child_by_field_name("definition")
            .filter(|def| def.kind() == "function_definition"),
        _ => None,
    }
}

impl SymbolExtractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn kinds(&self) -> &KindFilter {
        &self.kinds
    }

    fn parse_source(&self, rel_path: &str, source: &str) -> Result<Vec<CodeSymbol>, ParseError> {
        let grammar: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        let tree = parse_tree(&grammar, Language::Python, rel_path, source, SyntaxErrors::Reject)?;
        let root = tree.root_node();

        let mut symbols = Vec::new();
        self.collect_classes(root, source, rel_path, &mut symbols);
        self.collect_functions(root, source, rel_path, &mut symbols);
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"
import os


class OAuthProvider:
    """OAuth provider."""

    def __init__(self, client_id):
        self.client_id = client_id

    def authenticate(self, token):
        return True

    @staticmethod
    def from_env():
        return OAuthProvider(os.environ["ID"])

    async def refresh(self):
        pass

    class Settings:
        timeout = 30


def create_provider():
    def inner():
        pass
    return OAuthProvider("x")


@cache
def lookup(key):
    return key
"#;

    fn paths(symbols: &[CodeSymbol]) -> Vec<String> {
        symbols.iter().map(CodeSymbol::qualified_path).collect()
    }

    #[test]
    fn extracts_classes_methods_and_module_functions() {
        let extractor = PythonExtractor::new(KindFilter::all());
        let symbols = extractor.parse_source("auth/oauth.py", SOURCE).unwrap();

        assert_eq!(
            paths(&symbols),
            vec![
                "auth/oauth.py::OAuthProvider",
                "auth/oauth.py::OAuthProvider.__init__",
                "auth/oauth.py::OAuthProvider.authenticate",
                "auth/oauth.py::OAuthProvider.from_env",
                "auth/oauth.py::OAuthProvider.refresh",
                "auth/oauth.py::Settings",
                "auth/oauth.py::create_provider",
                "auth/oauth.py::lookup",
            ]
        );
    }

    #[test]
    fn line_numbers_span_the_declaration() {
        let extractor = PythonExtractor::new(KindFilter::all());
        let symbols = extractor.parse_source("a.py", "\nclass A:\n    x = 1\n    y = 2\n").unwrap();
        assert_eq!(symbols[0].line_start, 2);
        assert_eq!(symbols[0].line_end, 4);
    }

    #[test]
    fn kind_filter_limits_output() {
        let extractor = PythonExtractor::new(KindFilter::only([SymbolKind::Function]));
        let symbols = extractor.parse_source("auth/oauth.py", SOURCE).unwrap();
        assert_eq!(paths(&symbols), vec!["auth/oauth.py::create_provider", "auth/oauth.py::lookup"]);
    }

    #[test]
    fn syntax_error_is_reported() {
        let extractor = PythonExtractor::new(KindFilter::all());
        let err = extractor.parse_source("bad.py", "class Broken(\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { ref path, .. } if path == "bad.py"));
    }
}
