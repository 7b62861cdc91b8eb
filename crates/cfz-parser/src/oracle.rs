//! ast-grep wrapper around the tree-sitter C grammar.
//!
//! The rest of the crate treats the parser as an oracle: it hands in
//! source text and gets back a declaration tree plus diagnostics. Any
//! error-severity diagnostic fails extraction before the tree is
//! inspected further.

use ast_grep_core::Node;
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_language::{LanguageExt, SupportLang};

use crate::error::ParserError;

/// The concrete declaration-tree type returned by [`parse_c`].
pub type CTree = ast_grep_core::AstGrep<StrDoc<SupportLang>>;

/// Parse C source text into a declaration tree.
#[must_use]
pub fn parse_c(source: &str) -> CTree {
    SupportLang::C.ast_grep(source)
}

/// Diagnostic severity reported by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single parse diagnostic with a 1-based source line.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: u32,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{severity} at line {}: {}", self.line, self.message)
    }
}

/// Collect diagnostics by walking the tree for `ERROR` nodes.
///
/// tree-sitter recovers from syntax errors by wrapping the offending
/// region in an `ERROR` node; each one surfaces here at error severity.
#[must_use]
pub fn collect_diagnostics(tree: &CTree) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    visit(&tree.root(), &mut diagnostics);
    diagnostics
}

/// Fail with [`ParserError::ParseFailed`] if the tree carries any
/// error-severity diagnostic.
pub fn ensure_parsable(tree: &CTree) -> Result<(), ParserError> {
    let errors: Vec<_> = collect_diagnostics(tree)
        .into_iter()
        .filter(|d| d.severity == Severity::Error)
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ParserError::ParseFailed(errors))
    }
}

fn visit<D: ast_grep_core::Doc>(node: &Node<D>, out: &mut Vec<Diagnostic>) {
    if node.kind().as_ref() == "ERROR" {
        let text = node.text().to_string();
        let excerpt = text.lines().next().unwrap_or_default().trim().to_string();
        out.push(Diagnostic {
            severity: Severity::Error,
            line: node.start_pos().line() as u32 + 1,
            message: format!("unparsable construct near '{excerpt}'"),
        });
        // Nested ERROR nodes inside a broken region add noise, not signal.
        return;
    }
    for child in node.children() {
        visit(&child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_source_has_no_error_diagnostics() {
        let tree = parse_c("struct A { int x; };");
        assert!(collect_diagnostics(&tree).is_empty());
        assert!(ensure_parsable(&tree).is_ok());
    }

    #[test]
    fn root_is_translation_unit() {
        let tree = parse_c("int main(void) { return 0; }");
        assert_eq!(tree.root().kind().as_ref(), "translation_unit");
    }

    #[test]
    fn broken_source_reports_error_with_line() {
        let tree = parse_c("struct A {\nint x\n@@@\n};");
        let diagnostics = collect_diagnostics(&tree);
        assert!(!diagnostics.is_empty(), "expected at least one diagnostic");
        assert!(diagnostics.iter().all(|d| d.severity == Severity::Error));
        assert!(ensure_parsable(&tree).is_err());
    }

    #[test]
    fn parse_failed_error_mentions_first_diagnostic() {
        let tree = parse_c("typedef @ nonsense;");
        let err = ensure_parsable(&tree).unwrap_err();
        let message = err.to_string();
        assert!(
            message.contains("failed to parse"),
            "unexpected message: {message}"
        );
    }
}
