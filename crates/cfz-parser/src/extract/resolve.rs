//! Fixed-point alias resolution and map construction.
//!
//! Typedef chains may reference aliases declared later in the unit, so
//! resolution loops until a round makes no progress. Whatever is still
//! unresolved afterwards is a resolution gap and is dropped without
//! error; real headers are full of legitimately opaque types.

use std::collections::HashMap;

use tracing::debug;

use crate::types::TypeMaps;

use super::scan::{ScanResult, StructKey, TypedefTarget};

/// Build the two output maps from a completed scan.
///
/// Canonical tag keys come first in declaration order, then value
/// aliases, so emission order is stable for a given input.
pub(crate) fn build_maps(scanned: &ScanResult) -> TypeMaps {
    let resolved = resolve_aliases(scanned);
    let mut maps = TypeMaps::default();

    // Every defined tagged aggregate is reachable by value under its
    // canonical tag.
    for agg in &scanned.aggregates {
        if let (Some(canonical), Some(fields)) = (agg.key.canonical(), &agg.fields) {
            maps.name_to_struct.insert(canonical.to_string(), fields.clone());
        }
    }

    // Value key per aggregate: the canonical tag when there is one,
    // otherwise the first depth-0 alias of the definition.
    let mut value_key: HashMap<&StructKey, String> = HashMap::new();
    for agg in &scanned.aggregates {
        if let (Some(canonical), Some(_)) = (agg.key.canonical(), &agg.fields) {
            value_key.insert(&agg.key, canonical.to_string());
        }
    }

    // Depth-0 aliases first so a pointer alias sharing the typedef of
    // an anonymous aggregate can link to the value alias regardless of
    // declarator order.
    for decl in &scanned.typedefs {
        let Some((key, 0)) = resolved.get(decl.alias.as_str()) else {
            continue;
        };
        match scanned.definition_of(key) {
            Some(fields) => {
                maps.name_to_struct.insert(decl.alias.clone(), fields.clone());
                value_key.entry(key).or_insert_with(|| decl.alias.clone());
            }
            None => debug!(alias = %decl.alias, "value alias targets undefined aggregate"),
        }
    }

    for decl in &scanned.typedefs {
        let Some((key, depth)) = resolved.get(decl.alias.as_str()) else {
            debug!(alias = %decl.alias, "alias never resolved to an aggregate");
            continue;
        };
        match *depth {
            0 => {}
            1 => match (scanned.definition_of(key), value_key.get(key)) {
                (Some(fields), Some(value)) => {
                    maps.pointer_to_struct
                        .insert(decl.alias.clone(), fields.clone());
                    maps.pointer_links
                        .entry(decl.alias.clone())
                        .or_insert_with(|| value.clone());
                }
                _ => debug!(
                    alias = %decl.alias,
                    "pointer alias has no value-typed counterpart"
                ),
            },
            _ => debug!(alias = %decl.alias, depth, "dropping deep pointer alias"),
        }
    }

    maps
}

/// Resolve each alias to `(aggregate key, total pointer depth)`,
/// accumulating depth across multi-hop chains.
fn resolve_aliases(scanned: &ScanResult) -> HashMap<&str, (StructKey, u32)> {
    let mut resolved: HashMap<&str, (StructKey, u32)> = HashMap::new();
    let mut pending: Vec<_> = scanned.typedefs.iter().collect();

    loop {
        let before = pending.len();
        pending.retain(|decl| match &decl.target {
            TypedefTarget::Key(key) => {
                resolved
                    .entry(decl.alias.as_str())
                    .or_insert_with(|| (key.clone(), decl.ptr_depth));
                false
            }
            TypedefTarget::Alias(name) => {
                if let Some((key, depth)) = resolved.get(name.as_str()).cloned() {
                    let total = decl.ptr_depth + depth;
                    resolved
                        .entry(decl.alias.as_str())
                        .or_insert((key, total));
                    false
                } else {
                    true
                }
            }
            TypedefTarget::Opaque => false,
        });
        if pending.len() == before {
            break;
        }
    }

    for decl in &pending {
        debug!(alias = %decl.alias, "alias unresolved after fixed point");
    }
    resolved
}
