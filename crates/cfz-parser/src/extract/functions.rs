//! Function-signature extraction for driver generation.
//!
//! Only full definitions count; prototypes carry no body to exercise.

use ast_grep_core::{Doc, Node};
use tracing::warn;

use crate::oracle::CTree;
use crate::types::{Field, FnSig, SignatureTable};

use super::scan::{normalize_ws, type_string, unwrap_declarator};

/// Collect every function definition in declaration order.
#[must_use]
pub fn extract_functions(tree: &CTree) -> SignatureTable {
    let mut table = Vec::new();
    visit(&tree.root(), &mut table);
    table
}

fn visit<D: Doc>(node: &Node<D>, out: &mut SignatureTable) {
    if node.kind().as_ref() == "function_definition" {
        if let Some(sig) = signature_of(node) {
            out.push(sig);
        }
        return;
    }
    for child in node.children() {
        visit(&child, out);
    }
}

fn signature_of<D: Doc>(node: &Node<D>) -> Option<FnSig> {
    let children: Vec<_> = node.children().collect();
    let (base, specifier_idx) = return_base_type(&children)?;

    // The declarator may wrap the function declarator in pointer
    // layers (`char* f(…)`).
    let mut ptr_depth = 0u32;
    let mut declarator = children.get(specifier_idx + 1)?.clone();
    while declarator.kind().as_ref() == "pointer_declarator" {
        ptr_depth += 1;
        let inner = declarator
            .children()
            .find(|c| !matches!(c.kind().as_ref(), "*" | "const" | "volatile"))?;
        declarator = inner;
    }
    if declarator.kind().as_ref() != "function_declarator" {
        return None;
    }

    let name = declarator
        .children()
        .find_map(|c| match c.kind().as_ref() {
            "identifier" | "field_identifier" => Some(c.text().to_string()),
            _ => None,
        })?;

    let mut return_type = base;
    for _ in 0..ptr_depth {
        return_type.push('*');
    }

    let params = declarator
        .children()
        .find(|c| c.kind().as_ref() == "parameter_list")
        .map(|list| collect_params(&list, &name))
        .unwrap_or_default();

    Some(FnSig {
        return_type,
        name,
        params,
    })
}

fn collect_params<D: Doc>(list: &Node<D>, function: &str) -> Vec<Field> {
    let mut params = Vec::new();
    for entry in list.children() {
        match entry.kind().as_ref() {
            "parameter_declaration" => {
                let children: Vec<_> = entry.children().collect();
                let Some((base, specifier_idx)) = return_base_type(&children) else {
                    continue;
                };
                let declarator = children[specifier_idx + 1..]
                    .iter()
                    .find_map(unwrap_declarator);
                match declarator {
                    Some(info) => {
                        params.push(Field::new(type_string(&base, &info), info.name));
                    }
                    // `f(void)` takes no parameters at all.
                    None if base == "void" && children.len() == specifier_idx + 1 => {}
                    None => {
                        warn!(function, "skipping unnamed parameter");
                    }
                }
            }
            "variadic_parameter" | "..." => {
                warn!(function, "skipping variadic parameter");
            }
            _ => {}
        }
    }
    params
}

/// Base type of a return type or parameter: the first specifier child.
/// Aggregate and enum specifiers reduce to their canonical tag form.
fn return_base_type<D: Doc>(children: &[Node<D>]) -> Option<(String, usize)> {
    for (i, child) in children.iter().enumerate() {
        let base = match child.kind().as_ref() {
            "struct_specifier" | "union_specifier" | "enum_specifier" => {
                let keyword = match child.kind().as_ref() {
                    "union_specifier" => "union",
                    "enum_specifier" => "enum",
                    _ => "struct",
                };
                let tag = child
                    .children()
                    .find(|c| c.kind().as_ref() == "type_identifier")?;
                format!("{keyword} {}", tag.text())
            }
            "primitive_type" | "sized_type_specifier" | "type_identifier"
            | "macro_type_specifier" => normalize_ws(&child.text()),
            _ => continue,
        };
        return Some((base, i));
    }
    None
}
