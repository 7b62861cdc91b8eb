//! Textual pre-pass that makes real-world C digestible by the oracle.
//!
//! System headers are full of GNU extensions the tree-sitter grammar
//! trips over (`__asm__`, `__attribute__((…))`, `typeof`). This module
//! strips or rewrites them, applies object-like `-D` defines, and
//! inlines quoted `#include` files so the extractor sees one flat
//! translation unit.
//!
//! Everything here is plain string scanning. Balanced parentheses
//! cannot be matched by a regex, and the string-literal awareness the
//! comment stripper needs is easier to get right by hand.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ParserError;

/// Configurable source sanitizer.
///
/// Built from preprocessor-style flags: `-I` contributes include
/// search directories, `-D` contributes object-like defines. All other
/// flags are ignored here (they matter to a real compiler, not to
/// textual cleanup).
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    include_dirs: Vec<PathBuf>,
    defines: Vec<(String, String)>,
}

impl Sanitizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sanitizer from preprocessor flags (`-Idir`, `-I dir`,
    /// `-Dname`, `-Dname=value`, and their separate-argument forms).
    #[must_use]
    pub fn with_flags(flags: &[String]) -> Self {
        let mut sanitizer = Self::new();
        let mut iter = flags.iter();
        while let Some(flag) = iter.next() {
            if let Some(rest) = flag.strip_prefix("-I") {
                if rest.is_empty() {
                    if let Some(dir) = iter.next() {
                        sanitizer.add_include_dir(dir);
                    }
                } else {
                    sanitizer.add_include_dir(rest);
                }
            } else if let Some(rest) = flag.strip_prefix("-D") {
                let spec = if rest.is_empty() {
                    iter.next().map(String::as_str).unwrap_or_default()
                } else {
                    rest
                };
                if !spec.is_empty() {
                    sanitizer.add_define_spec(spec);
                }
            }
        }
        sanitizer
    }

    pub fn add_include_dir(&mut self, dir: impl Into<PathBuf>) {
        self.include_dirs.push(dir.into());
    }

    /// Register an object-like define from `name` or `name=value`
    /// form. Defines without a value expand to the empty string, like
    /// `-DNAME` does in a compiler driver.
    pub fn add_define_spec(&mut self, spec: &str) {
        match spec.split_once('=') {
            Some((name, value)) => self
                .defines
                .push((name.to_string(), value.to_string())),
            None => self.defines.push((spec.to_string(), String::new())),
        }
    }

    /// Read and sanitize one file, inlining quoted includes it pulls in.
    pub fn sanitize_file(&self, path: &Path) -> Result<String, ParserError> {
        let source = std::fs::read_to_string(path).map_err(|source| ParserError::ReadSource {
            path: path.display().to_string(),
            source,
        })?;
        let mut seen = HashSet::new();
        if let Ok(canonical) = path.canonicalize() {
            seen.insert(canonical);
        }
        Ok(self.sanitize_inner(&source, path.parent(), &mut seen))
    }

    /// Sanitize in-memory source. Quoted includes resolve against
    /// `base_dir` (if given) and the `-I` search path.
    #[must_use]
    pub fn sanitize_source(&self, source: &str, base_dir: Option<&Path>) -> String {
        let mut seen = HashSet::new();
        self.sanitize_inner(source, base_dir, &mut seen)
    }

    fn sanitize_inner(
        &self,
        source: &str,
        base_dir: Option<&Path>,
        seen: &mut HashSet<PathBuf>,
    ) -> String {
        let text = strip_comments(source);
        let text = self.inline_quoted_includes(&text, base_dir, seen);
        let text = strip_gnu_extensions(&text);
        let text = self.apply_defines(&text);
        collapse_blank_lines(&text)
    }

    fn inline_quoted_includes(
        &self,
        source: &str,
        base_dir: Option<&Path>,
        seen: &mut HashSet<PathBuf>,
    ) -> String {
        let mut out = String::with_capacity(source.len());
        for line in source.lines() {
            match parse_quoted_include(line) {
                Some(name) => match self.resolve_include(name, base_dir) {
                    Some(path) => {
                        let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
                        if seen.insert(canonical) {
                            match std::fs::read_to_string(&path) {
                                Ok(included) => {
                                    debug!(include = %path.display(), "inlining quoted include");
                                    let inner =
                                        self.sanitize_inner(&included, path.parent(), seen);
                                    out.push_str(&inner);
                                    out.push('\n');
                                }
                                Err(err) => {
                                    warn!(include = %path.display(), error = %err,
                                        "cannot read include, leaving directive in place");
                                    out.push_str(line);
                                    out.push('\n');
                                }
                            }
                        }
                        // Already-inlined includes are dropped entirely.
                    }
                    None => {
                        out.push_str(line);
                        out.push('\n');
                    }
                },
                None => {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        out
    }

    fn resolve_include(&self, name: &str, base_dir: Option<&Path>) -> Option<PathBuf> {
        if let Some(dir) = base_dir {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        self.include_dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    fn apply_defines(&self, source: &str) -> String {
        let mut text = source.to_string();
        for (name, value) in &self.defines {
            text = replace_identifier(&text, name, value);
        }
        text
    }
}

// ── Comment stripping ────────────────────────────────────────────────

/// Remove `/* … */` and `// …` comments, leaving string and character
/// literals untouched. Block comments are replaced by a single space
/// so `a/**/b` stays two tokens.
#[must_use]
pub fn strip_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    // Keep newlines so diagnostics still line up.
                    if bytes[i] == b'\n' {
                        out.push('\n');
                    }
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
                out.push(' ');
            }
            quote @ (b'"' | b'\'') => {
                let end = skip_literal(bytes, i, quote);
                out.push_str(&source[i..end]);
                i = end;
            }
            _ => {
                let ch_end = i + utf8_len(bytes[i]);
                out.push_str(&source[i..ch_end]);
                i = ch_end;
            }
        }
    }
    out
}

/// Advance past a string or character literal starting at `start`.
fn skip_literal(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            b'\n' => return i, // unterminated, give up at line end
            _ => i += 1,
        }
    }
    bytes.len()
}

const fn utf8_len(first: u8) -> usize {
    match first {
        b if b < 0x80 => 1,
        b if b < 0xE0 => 2,
        b if b < 0xF0 => 3,
        _ => 4,
    }
}

// ── GNU extension removal ────────────────────────────────────────────

/// Tokens replaced one-for-one by word-boundary scanning.
const REWRITES: &[(&str, &str)] = &[
    ("__inline__", "inline"),
    ("__inline", "inline"),
    ("__const__", "const"),
    ("__volatile__", "volatile"),
    ("__signed__", "signed"),
    ("__restrict__", ""),
    ("__restrict", ""),
    ("__extension__", ""),
];

/// Strip the GNU-isms that break the C grammar.
#[must_use]
pub fn strip_gnu_extensions(source: &str) -> String {
    let mut text = strip_keyword_with_parens(source, "__attribute__");
    text = strip_keyword_with_parens(&text, "__asm__");
    text = strip_keyword_with_parens(&text, "__asm");
    text = replace_keyword_with_parens(&text, "typeof", "int");
    text = replace_keyword_with_parens(&text, "__typeof__", "int");
    for (from, to) in REWRITES {
        text = replace_identifier(&text, from, to);
    }
    strip_builtin_identifiers(&text)
}

/// Remove every `keyword … ( balanced )` occurrence, tolerating
/// `volatile` between the keyword and the parenthesis (as in
/// `__asm__ volatile ("…")`).
fn strip_keyword_with_parens(source: &str, keyword: &str) -> String {
    rewrite_keyword_with_parens(source, keyword, "")
}

fn replace_keyword_with_parens(source: &str, keyword: &str, replacement: &str) -> String {
    rewrite_keyword_with_parens(source, keyword, replacement)
}

fn rewrite_keyword_with_parens(source: &str, keyword: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(pos) = find_identifier(rest, keyword) {
        out.push_str(&rest[..pos]);
        let after_kw = &rest[pos + keyword.len()..];
        let mut cursor = after_kw.trim_start();
        for qualifier in ["volatile", "__volatile__"] {
            if let Some(stripped) = cursor.strip_prefix(qualifier) {
                if !stripped.starts_with(|c: char| is_ident_char(c)) {
                    cursor = stripped.trim_start();
                }
            }
        }
        if let Some(after_parens) = skip_balanced_parens(cursor) {
            out.push_str(replacement);
            rest = after_parens;
        } else {
            // No parenthesized group follows; drop the bare keyword.
            out.push_str(replacement);
            rest = after_kw;
        }
    }
    out.push_str(rest);
    out
}

/// Skip a leading balanced `( … )` group, returning the remainder.
fn skip_balanced_parens(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'(') {
        return None;
    }
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[i + 1..]);
                }
            }
            quote @ (b'"' | b'\'') => {
                i = skip_literal(bytes, i, quote);
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn strip_builtin_identifiers(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(pos) = find_identifier_prefix(rest, "__builtin_") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let end = tail
            .find(|c: char| !is_ident_char(c))
            .unwrap_or(tail.len());
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

// ── Identifier-aware replacement ─────────────────────────────────────

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Find `name` as a whole identifier (not a substring of a longer one).
fn find_identifier(text: &str, name: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = text[from..].find(name) {
        let pos = from + rel;
        let before_ok = pos == 0
            || !text[..pos].chars().next_back().is_some_and(is_ident_char);
        let after = pos + name.len();
        let after_ok = !text[after..].starts_with(is_ident_char);
        if before_ok && after_ok {
            return Some(pos);
        }
        from = pos + 1;
    }
    None
}

/// Find `prefix` at the start of an identifier.
fn find_identifier_prefix(text: &str, prefix: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = text[from..].find(prefix) {
        let pos = from + rel;
        let before_ok = pos == 0
            || !text[..pos].chars().next_back().is_some_and(is_ident_char);
        if before_ok {
            return Some(pos);
        }
        from = pos + 1;
    }
    None
}

/// Replace every whole-identifier occurrence of `name`, skipping
/// string and character literals.
#[must_use]
pub fn replace_identifier(source: &str, name: &str, replacement: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                let end = skip_literal(bytes, i, quote);
                out.push_str(&source[i..end]);
                i = end;
            }
            _ => match find_identifier(&source[i..], name) {
                Some(rel) => {
                    // Stop at literals between here and the match.
                    let upto = &source[i..i + rel];
                    if let Some(q) = upto.find(['"', '\'']) {
                        out.push_str(&upto[..=q]);
                        let end = skip_literal(bytes, i + q, bytes[i + q]);
                        out.push_str(&source[i + q + 1..end]);
                        i = end;
                    } else {
                        out.push_str(upto);
                        out.push_str(replacement);
                        i += rel + name.len();
                    }
                }
                None => {
                    out.push_str(&source[i..]);
                    break;
                }
            },
        }
    }
    out
}

// ── Line normalization ───────────────────────────────────────────────

fn parse_quoted_include(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix('#')?.trim_start();
    let rest = rest.strip_prefix("include")?.trim_start();
    let rest = rest.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Collapse runs of blank lines left behind by stripping.
fn collapse_blank_lines(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut blank_run = false;
    for line in source.lines() {
        if line.trim().is_empty() {
            if !blank_run {
                out.push('\n');
            }
            blank_run = true;
        } else {
            out.push_str(line.trim_end());
            out.push('\n');
            blank_run = false;
        }
    }
    out
}
