//! Single deterministic traversal of the declaration tree.
//!
//! The scan records every aggregate declaration and every typedef into
//! owned structures; nothing is resolved here. Forward declarations
//! yield an entry without fields, the first complete definition fills
//! it in, and later re-declarations are ignored.

use std::collections::HashMap;

use ast_grep_core::{Doc, Node};
use tracing::debug;

use crate::oracle::CTree;
use crate::types::{Field, FieldList};

/// Canonical identity of an aggregate inside one tree.
///
/// Tagged keys carry the canonical form (`struct Foo`, `union Bar`).
/// Anonymous aggregates get a synthetic id in traversal order; the id
/// never appears in output, it only ties typedef aliases to the field
/// list of the definition they wrap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum StructKey {
    Tagged(String),
    Anonymous(u32),
}

impl StructKey {
    pub(crate) fn canonical(&self) -> Option<&str> {
        match self {
            Self::Tagged(name) => Some(name),
            Self::Anonymous(_) => None,
        }
    }
}

/// One aggregate declaration. `fields` is `None` for a forward
/// declaration that never gained a definition.
#[derive(Debug, Clone)]
pub(crate) struct AggregateDecl {
    pub key: StructKey,
    pub fields: Option<FieldList>,
}

/// What a typedef's declared base type refers to, before resolution.
#[derive(Debug, Clone)]
pub(crate) enum TypedefTarget {
    /// Directly names an aggregate (`typedef struct A …`).
    Key(StructKey),
    /// Names another identifier that may itself be a typedef.
    Alias(String),
    /// A scalar or enum base; never resolves to an aggregate.
    Opaque,
}

/// One typedef declarator: `typedef struct A **ppA` has alias `ppA`
/// and declared pointer depth 2 on top of the target.
#[derive(Debug, Clone)]
pub(crate) struct TypedefDecl {
    pub alias: String,
    pub ptr_depth: u32,
    pub target: TypedefTarget,
}

#[derive(Debug, Default)]
pub(crate) struct ScanResult {
    /// Aggregates in declaration order (outer before nested).
    pub aggregates: Vec<AggregateDecl>,
    pub index: HashMap<StructKey, usize>,
    /// Typedef declarators in declaration order.
    pub typedefs: Vec<TypedefDecl>,
}

impl ScanResult {
    pub(crate) fn definition_of(&self, key: &StructKey) -> Option<&FieldList> {
        self.index
            .get(key)
            .and_then(|&i| self.aggregates[i].fields.as_ref())
    }
}

pub(crate) fn scan(tree: &CTree) -> ScanResult {
    let mut scanner = Scanner::default();
    scanner.walk(&tree.root());
    scanner.result
}

#[derive(Default)]
struct Scanner {
    result: ScanResult,
    next_anon_id: u32,
}

impl Scanner {
    fn walk<D: Doc>(&mut self, node: &Node<D>) {
        match node.kind().as_ref() {
            "struct_specifier" | "union_specifier" => {
                self.record_aggregate(node);
            }
            "type_definition" => self.record_typedef(node),
            _ => {
                for child in node.children() {
                    self.walk(&child);
                }
            }
        }
    }

    /// Record one aggregate specifier, returning its key. A body, if
    /// present, defines the aggregate unless an earlier definition
    /// already won.
    fn record_aggregate<D: Doc>(&mut self, node: &Node<D>) -> StructKey {
        let keyword = if node.kind().as_ref() == "union_specifier" {
            "union"
        } else {
            "struct"
        };
        let tag = node
            .children()
            .find(|c| c.kind().as_ref() == "type_identifier")
            .map(|c| c.text().to_string());
        let key = match tag {
            Some(name) => StructKey::Tagged(format!("{keyword} {name}")),
            None => {
                let id = self.next_anon_id;
                self.next_anon_id += 1;
                StructKey::Anonymous(id)
            }
        };

        let idx = match self.result.index.get(&key) {
            Some(&i) => i,
            None => {
                self.result.aggregates.push(AggregateDecl {
                    key: key.clone(),
                    fields: None,
                });
                let i = self.result.aggregates.len() - 1;
                self.result.index.insert(key.clone(), i);
                i
            }
        };

        if let Some(body) = node
            .children()
            .find(|c| c.kind().as_ref() == "field_declaration_list")
        {
            if self.result.aggregates[idx].fields.is_none() {
                let fields = self.collect_fields(&body);
                self.result.aggregates[idx].fields = Some(fields);
            } else if let Some(canonical) = key.canonical() {
                debug!(key = canonical, "ignoring re-declaration of defined aggregate");
            }
        }
        key
    }

    /// Ordered field list of one definition body. Nameless members
    /// (anonymous bit-field padding) are skipped, bit-field widths are
    /// dropped, and every declarator of a multi-declarator field
    /// declaration is recorded.
    fn collect_fields<D: Doc>(&mut self, body: &Node<D>) -> FieldList {
        let mut fields = Vec::new();
        for decl in body.children() {
            if decl.kind().as_ref() != "field_declaration" {
                continue;
            }
            let children: Vec<_> = decl.children().collect();
            let Some((base, specifier_idx)) = self.base_type(&children) else {
                continue;
            };
            for declarator in &children[specifier_idx + 1..] {
                let Some(info) = unwrap_declarator(declarator) else {
                    continue;
                };
                fields.push(Field::new(type_string(&base, &info), info.name));
            }
        }
        fields
    }

    /// The declared base type of a field/parameter, plus the child
    /// index it occupied (declarators follow it). Nested aggregate
    /// specifiers are recorded as a side effect.
    fn base_type<D: Doc>(&mut self, children: &[Node<D>]) -> Option<(String, usize)> {
        for (i, child) in children.iter().enumerate() {
            let base = match child.kind().as_ref() {
                "struct_specifier" | "union_specifier" => {
                    let keyword = if child.kind().as_ref() == "union_specifier" {
                        "union"
                    } else {
                        "struct"
                    };
                    match self.record_aggregate(child).canonical() {
                        Some(canonical) => canonical.to_string(),
                        None => format!("{keyword} <anonymous>"),
                    }
                }
                "enum_specifier" => child
                    .children()
                    .find(|c| c.kind().as_ref() == "type_identifier")
                    .map_or_else(|| "int".to_string(), |c| format!("enum {}", c.text())),
                "primitive_type" | "sized_type_specifier" | "type_identifier"
                | "macro_type_specifier" => normalize_ws(&child.text()),
                _ => continue,
            };
            return Some((base, i));
        }
        None
    }

    /// Record every declarator of a `typedef`. The first specifier
    /// child is the target type; whatever follows are alias
    /// declarators. Array and function-typed aliases never name an
    /// aggregate by value or single pointer, so they are dropped.
    fn record_typedef<D: Doc>(&mut self, node: &Node<D>) {
        let children: Vec<_> = node.children().collect();
        let mut target = None;
        let mut declarators_from = children.len();
        for (i, child) in children.iter().enumerate() {
            target = match child.kind().as_ref() {
                "struct_specifier" | "union_specifier" => {
                    Some(TypedefTarget::Key(self.record_aggregate(child)))
                }
                "type_identifier" => Some(TypedefTarget::Alias(child.text().to_string())),
                "primitive_type" | "sized_type_specifier" | "enum_specifier"
                | "macro_type_specifier" => Some(TypedefTarget::Opaque),
                _ => continue,
            };
            declarators_from = i + 1;
            break;
        }
        let Some(target) = target else { return };

        for declarator in &children[declarators_from..] {
            let Some(info) = unwrap_declarator(declarator) else {
                continue;
            };
            if info.is_array || info.is_function {
                debug!(alias = %info.name, "skipping array/function typedef");
                continue;
            }
            self.result.typedefs.push(TypedefDecl {
                alias: info.name,
                ptr_depth: info.ptr_depth,
                target: target.clone(),
            });
        }
    }
}

// ── Declarator unwrapping ────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct DeclInfo {
    pub name: String,
    pub ptr_depth: u32,
    pub is_array: bool,
    pub is_function: bool,
}

/// Peel pointer/array/function/parenthesized declarator layers down to
/// the declared identifier. Returns `None` for nodes that are not
/// declarators (type qualifiers, punctuation, bit-field clauses).
pub(crate) fn unwrap_declarator<D: Doc>(node: &Node<D>) -> Option<DeclInfo> {
    match node.kind().as_ref() {
        "field_identifier" | "identifier" | "type_identifier" => Some(DeclInfo {
            name: node.text().to_string(),
            ptr_depth: 0,
            is_array: false,
            is_function: false,
        }),
        "pointer_declarator" => {
            let mut info = unwrap_first_child(node)?;
            info.ptr_depth += 1;
            Some(info)
        }
        "array_declarator" => {
            let mut info = unwrap_first_child(node)?;
            info.is_array = true;
            Some(info)
        }
        "function_declarator" => {
            let mut info = unwrap_first_child(node)?;
            info.is_function = true;
            Some(info)
        }
        "parenthesized_declarator" => unwrap_first_child(node),
        _ => None,
    }
}

fn unwrap_first_child<D: Doc>(node: &Node<D>) -> Option<DeclInfo> {
    node.children().find_map(|c| unwrap_declarator(&c))
}

/// Canonical textual type: base, one `*` per pointer level, `[]` for
/// arrays. Function-typed declarators (function pointers) are encoded
/// with a parenthesized marker so they never look like a plain pointer
/// downstream.
pub(crate) fn type_string(base: &str, info: &DeclInfo) -> String {
    if info.is_function {
        return format!("{base} (*)()");
    }
    let mut out = String::from(base);
    for _ in 0..info.ptr_depth {
        out.push('*');
    }
    if info.is_array {
        out.push_str("[]");
    }
    out
}

pub(crate) fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
