//! Core data types shared by the extractor and the code generators.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One field of an aggregate: a canonicalized textual type plus the
/// field name.
///
/// The type string is the base type followed by one `*` per pointer
/// level and a `[]` suffix when the field is array-typed (the array
/// size is not preserved; only "is an array" matters downstream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub type_string: String,
    pub name: String,
}

impl Field {
    #[must_use]
    pub fn new(type_string: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_string: type_string.into(),
            name: name.into(),
        }
    }
}

/// The ordered field list of one aggregate definition.
pub type FieldList = Vec<Field>;

/// An insertion-ordered map from type key to field list.
///
/// Emission order must be deterministic and follow declaration order,
/// so entries are kept in a `Vec` with a side index for lookups.
#[derive(Debug, Clone, Default)]
pub struct TypeMap {
    entries: Vec<(String, FieldList)>,
    index: HashMap<String, usize>,
}

impl TypeMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, keeping the first entry on duplicates.
    pub fn insert(&mut self, key: String, fields: FieldList) {
        if self.index.contains_key(&key) {
            return;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, fields));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldList> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldList)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for TypeMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, fields) in &self.entries {
            map.serialize_entry(key, fields)?;
        }
        map.end()
    }
}

/// The extraction result consumed by the synthesizers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeMaps {
    /// Aggregates reachable by value: canonical tags (`struct Foo`,
    /// `union Bar`) and depth-0 typedef aliases.
    pub name_to_struct: TypeMap,
    /// Typedefs exactly one pointer level away from a known aggregate.
    pub pointer_to_struct: TypeMap,
    /// Identity link from each pointer alias to the value-typed key it
    /// delegates to. Carried explicitly so the synthesizer never has
    /// to re-derive the link by comparing field lists.
    pub pointer_links: HashMap<String, String>,
}

/// A discovered function definition: return type, name, and ordered
/// named parameters (types canonicalized like [`Field`] type strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FnSig {
    pub return_type: String,
    pub name: String,
    pub params: Vec<Field>,
}

/// Function signatures in declaration order.
pub type SignatureTable = Vec<FnSig>;
