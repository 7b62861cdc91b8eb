//! Allocator function naming.
//!
//! A key like `struct Foo` becomes the suffix `struct_Foo`, giving the
//! function name `alloc_struct_Foo`. Sanitization alone is not
//! injective (`struct A_B` and `struct A B` would collide), so the
//! table disambiguates with a numeric suffix on collision.

use std::collections::{HashMap, HashSet};

use cfz_parser::TypeMaps;

/// Injective key → function-name-suffix assignment for one run.
#[derive(Debug, Default)]
pub struct NameTable {
    suffixes: HashMap<String, String>,
}

impl NameTable {
    /// Assign suffixes for every key of both maps, value keys first.
    /// Both synthesizers must build the table the same way so the
    /// driver's calls match the allocator definitions.
    #[must_use]
    pub fn for_maps(maps: &TypeMaps) -> Self {
        Self::build(
            maps.name_to_struct
                .keys()
                .chain(maps.pointer_to_struct.keys()),
        )
    }

    #[must_use]
    pub fn build<'k>(keys: impl Iterator<Item = &'k str>) -> Self {
        let mut suffixes = HashMap::new();
        let mut used = HashSet::new();
        for key in keys {
            if suffixes.contains_key(key) {
                continue;
            }
            let base = sanitize(key);
            let mut candidate = base.clone();
            let mut counter = 2;
            while !used.insert(candidate.clone()) {
                candidate = format!("{base}_{counter}");
                counter += 1;
            }
            suffixes.insert(key.to_string(), candidate);
        }
        Self { suffixes }
    }

    #[must_use]
    pub fn suffix(&self, key: &str) -> Option<&str> {
        self.suffixes.get(key).map(String::as_str)
    }

    /// The full allocator function name for a key.
    #[must_use]
    pub fn alloc_fn(&self, key: &str) -> Option<String> {
        self.suffix(key).map(|suffix| format!("alloc_{suffix}"))
    }
}

/// Strip trailing pointer markers and join the remaining words with
/// underscores: `struct Foo` → `struct_Foo`, `pA` → `pA`.
fn sanitize(key: &str) -> String {
    key.trim_end_matches('*')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}
