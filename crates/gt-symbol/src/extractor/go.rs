//! Go extractor

use super::{field_text, parse_tree, symbol_at, Language, SymbolExtractor, SyntaxErrors};
use crate::error::ParseError;
use crate::symbol::{CodeSymbol, KindFilter, SymbolKind};
use tree_sitter::Node;

/// Extracts structs, interfaces, functions and methods from `.go` files
///
/// A method's `parent` is its receiver type with pointer and type
/// arguments removed (`*Store[T]` becomes `Store`).
#[derive(Debug, Clone, Default)]
pub struct GoExtractor {
    kinds: KindFilter,
}

impl GoExtractor {
    /// Create extractor emitting the given kinds
    #[inline]
    #[must_use]
    pub fn new(kinds: KindFilter) -> Self {
        Self { kinds }
    }

    fn visit(&self, node: Node<'_>, source: &str, rel_path: &str, out: &mut Vec<CodeSymbol>) {
        match node.kind() {
            "type_spec" => self.type_spec(node, source, rel_path, out),
            "function_declaration" if self.kinds.accepts(SymbolKind::Function) => {
                if let Some(name) = field_text(node, "name", source) {
                    out.push(symbol_at(node, name, SymbolKind::Function, rel_path));
                }
            }
            "method_declaration" if self.kinds.accepts(SymbolKind::Method) => {
                let name = field_text(node, "name", source);
                let receiver = receiver_type(node, source);
                if let (Some(name), Some(receiver)) = (name, receiver) {
                    out.push(symbol_at(node, name, SymbolKind::Method, rel_path).with_parent(receiver));
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, source, rel_path, out);
        }
    }

    fn type_spec(&self, node: Node<'_>, source: &str, rel_path: &str, out: &mut Vec<CodeSymbol>) {
        let kind = match node.child_by_field_name("type").map(|t| t.kind()) {
            Some("struct_type") => SymbolKind::Struct,
            Some("interface_type") => SymbolKind::Interface,
            _ => return,
        };
        if !self.kinds.accepts(kind) {
            return;
        }
        if let Some(name) = field_text(node, "name", source) {
            out.push(symbol_at(node, name, kind, rel_path));
        }
    }
}

fn receiver_type(method: Node<'_>, source: &str) -> Option<String> {
    let receiver = method.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    let param = receiver
        .children(&mut cursor)
        .find(|child| child.kind() == "parameter_declaration")?;
    let text = field_text(param, "type", source)?;
    let base = text.trim_start_matches('*');
    let base = base.split('[').next().unwrap_or(base).trim();
    (!base.is_empty()).then(|| base.to_string())
}

impl SymbolExtractor for GoExtractor {
    fn language(&self) -> Language {
        Language::Go
    }

    fn kinds(&self) -> &KindFilter {
        &self.kinds
    }

    fn parse_source(&self, rel_path: &str, source: &str) -> Result<Vec<CodeSymbol>, ParseError> {
        let grammar: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
        let tree = parse_tree(&grammar, Language::Go, rel_path, source, SyntaxErrors::Tolerate)?;

        let mut symbols = Vec::new();
        self.visit(tree.root_node(), source, rel_path, &mut symbols);
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r"package store

type Store struct {
	items map[string]string
}

type Cache[T any] struct {
	value T
}

type Reader interface {
	Get(key string) string
}

type Alias = string

func NewStore() *Store {
	return &Store{}
}

func (s *Store) Get(key string) string {
	return s.items[key]
}

func (c Cache[T]) Value() T {
	return c.value
}
";

    #[test]
    fn extracts_types_functions_and_methods() {
        let extractor = GoExtractor::new(KindFilter::all());
        let symbols = extractor.parse_source("store/store.go", SOURCE).unwrap();
        let found: Vec<_> = symbols
            .iter()
            .map(|s| (s.qualified_path(), s.kind))
            .collect();

        assert_eq!(
            found,
            vec![
                ("store/store.go::Store".to_string(), SymbolKind::Struct),
                ("store/store.go::Cache".to_string(), SymbolKind::Struct),
                ("store/store.go::Reader".to_string(), SymbolKind::Interface),
                ("store/store.go::NewStore".to_string(), SymbolKind::Function),
                ("store/store.go::Store.Get".to_string(), SymbolKind::Method),
                ("store/store.go::Cache.Value".to_string(), SymbolKind::Method),
            ]
        );
    }

    #[test]
    fn respects_kind_filter() {
        let extractor = GoExtractor::new(KindFilter::only([SymbolKind::Interface]));
        let symbols = extractor.parse_source("store/store.go", SOURCE).unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "Reader");
    }

    #[test]
    fn partial_syntax_errors_keep_valid_declarations() {
        let source = "package server\n\ntype Server struct {\n\taddr string\n}\n\nfunc (s *Server) Run() error {\n\treturn nil\n}\n\nfunc broken( {\n";
        let extractor = GoExtractor::new(KindFilter::all());
        let symbols = extractor.parse_source("server/server.go", source).unwrap();
        let paths: Vec<_> = symbols.iter().map(|s| s.qualified_path()).collect();
        assert!(paths.contains(&"server/server.go::Server".to_string()));
        assert!(paths.contains(&"server/server.go::Server.Run".to_string()));
    }
}
