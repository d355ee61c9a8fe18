//! TypeScript / JavaScript extractor
//!
//! `.tsx`, `.jsx` and `.js` files use the TSX grammar so JSX bodies parse;
//! everything else uses the plain TypeScript grammar. Files with syntax
//! errors still yield the declarations the parser recovered.

use super::{field_text, parse_tree, symbol_at, Language, SymbolExtractor, SyntaxErrors};
use crate::error::ParseError;
use crate::symbol::{CodeSymbol, KindFilter, SymbolKind};
use tree_sitter::Node;

/// Extracts classes, functions, interfaces and type aliases
///
/// Class methods are emitted only when `methods` is configured explicitly.
#[derive(Debug, Clone, Default)]
pub struct TypeScriptExtractor {
    kinds: KindFilter,
}

impl TypeScriptExtractor {
    /// Create extractor emitting the given kinds
    #[inline]
    #[must_use]
    pub fn new(kinds: KindFilter) -> Self {
        Self { kinds }
    }

    fn grammar_for(rel_path: &str) -> tree_sitter::Language {
        if [".tsx", ".jsx", ".js"].iter().any(|ext| rel_path.ends_with(ext)) {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        }
    }

    fn visit(&self, node: Node<'_>, source: &str, rel_path: &str, out: &mut Vec<CodeSymbol>) {
        let kind = match node.kind() {
            "class_declaration" | "abstract_class_declaration" => Some(SymbolKind::Class),
            "function_declaration" | "generator_function_declaration" => Some(SymbolKind::Function),
            "interface_declaration" => Some(SymbolKind::Interface),
            "type_alias_declaration" => Some(SymbolKind::Type),
            _ => None,
        };

        if let Some(kind) = kind {
            if let Some(name) = field_text(node, "name", source) {
                if self.kinds.accepts(kind) {
                    out.push(symbol_at(node, name, kind, rel_path));
                }
                if kind == SymbolKind::Class && self.kinds.names(SymbolKind::Method) {
                    self.collect_methods(node, name, source, rel_path, out);
                }
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, source, rel_path, out);
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
        for member in body.children(&mut cursor) {
            if member.kind() != "method_definition" && member.kind() != "abstract_method_signature" {
                continue;
            }
            if let Some(name) = field_text(member, "name", source) {
                out.push(symbol_at(member, name, SymbolKind::Method, rel_path).with_parent(class_name));
            }
        }
    }
}

impl SymbolExtractor for TypeScriptExtractor {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn kinds(&self) -> &KindFilter {
        &self.kinds
    }

    fn parse_source(&self, rel_path: &str, source: &str) -> Result<Vec<CodeSymbol>, ParseError> {
        let grammar = Self::grammar_for(rel_path);
        let tree = parse_tree(&grammar, Language::TypeScript, rel_path, source, SyntaxErrors::Tolerate)?;

        let mut symbols = Vec::new();
        self.visit(tree.root_node(), source, rel_path, &mut symbols);
        Ok(symbols)
    }
}
