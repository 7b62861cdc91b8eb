//! Shared field-type classification.
//!
//! Both synthesizers apply the same per-type policy, so the
//! (pointer-depth × known-aggregate) decision lives here as one
//! explicit tagged variant instead of nested conditionals in two
//! places.

use cfz_parser::TypeMaps;

/// Structural view of a canonical type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeShape {
    pub base: String,
    pub ptr_depth: u32,
    pub is_array: bool,
}

impl TypeShape {
    /// Split `base***[]` form back into its parts, dropping `const`
    /// and `volatile` qualifiers from the base.
    #[must_use]
    pub fn parse(type_string: &str) -> Self {
        let mut text = type_string.trim();
        let is_array = text.ends_with("[]");
        if is_array {
            text = text[..text.len() - 2].trim_end();
        }
        let mut ptr_depth = 0;
        while let Some(stripped) = text.strip_suffix('*') {
            ptr_depth += 1;
            text = stripped.trim_end();
        }
        let base = text
            .split_whitespace()
            .filter(|word| !matches!(*word, "const" | "volatile"))
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            base,
            ptr_depth,
            is_array,
        }
    }

    /// Whether the base is a function-typed marker rather than a type
    /// name (function-pointer fields are encoded with parentheses).
    #[must_use]
    pub fn is_function(&self) -> bool {
        self.base.contains('(')
    }
}

/// The per-field initialization policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldClass {
    /// Single pointer to a known aggregate; store the recursive
    /// allocator's result directly. Carries the value-map key.
    KnownPointer(String),
    /// Known aggregate held by value; store the dereferenced result of
    /// the recursive allocator call.
    KnownValue(String),
    /// Pointer to something unrecognized; point it at an opaque
    /// filled buffer.
    OpaquePointer,
    /// Scalars, arrays, deep pointers to known aggregates: the
    /// baseline unknown fill already covers these.
    Scalar,
}

/// Classify one canonical type string against the extracted maps.
#[must_use]
pub fn classify_field(type_string: &str, maps: &TypeMaps) -> FieldClass {
    let shape = TypeShape::parse(type_string);
    if shape.is_array || shape.is_function() {
        return FieldClass::Scalar;
    }
    let known = maps.name_to_struct.contains_key(&shape.base);
    match (shape.ptr_depth, known) {
        (0, true) => FieldClass::KnownValue(shape.base),
        (1, true) => FieldClass::KnownPointer(shape.base),
        (depth, false) if depth >= 1 => FieldClass::OpaquePointer,
        _ => FieldClass::Scalar,
    }
}

#[cfg(test)]
mod tests {
    use cfz_parser::{extract_types, parse_c};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn maps() -> TypeMaps {
        extract_types(&parse_c("struct A { int a; };")).unwrap()
    }

    #[rstest]
    #[case("int", "int", 0, false)]
    #[case("char**", "char", 2, false)]
    #[case("unsigned long*", "unsigned long", 1, false)]
    #[case("int*[]", "int", 1, true)]
    #[case("const char*", "char", 1, false)]
    fn shape_parsing(
        #[case] input: &str,
        #[case] base: &str,
        #[case] ptr_depth: u32,
        #[case] is_array: bool,
    ) {
        let shape = TypeShape::parse(input);
        assert_eq!(shape.base, base);
        assert_eq!(shape.ptr_depth, ptr_depth);
        assert_eq!(shape.is_array, is_array);
    }

    #[test]
    fn known_aggregate_by_value_and_pointer() {
        let maps = maps();
        assert_eq!(
            classify_field("struct A", &maps),
            FieldClass::KnownValue("struct A".to_string())
        );
        assert_eq!(
            classify_field("struct A*", &maps),
            FieldClass::KnownPointer("struct A".to_string())
        );
    }

    #[test]
    fn unknown_pointers_are_opaque_at_any_depth() {
        let maps = maps();
        assert_eq!(classify_field("FILE*", &maps), FieldClass::OpaquePointer);
        assert_eq!(classify_field("char**", &maps), FieldClass::OpaquePointer);
        assert_eq!(classify_field("void*", &maps), FieldClass::OpaquePointer);
    }

    #[test]
    fn deep_pointer_to_known_aggregate_is_left_alone() {
        let maps = maps();
        assert_eq!(classify_field("struct A**", &maps), FieldClass::Scalar);
    }

    #[test]
    fn arrays_and_function_pointers_are_scalar() {
        let maps = maps();
        assert_eq!(classify_field("struct A[]", &maps), FieldClass::Scalar);
        assert_eq!(classify_field("struct A*[]", &maps), FieldClass::Scalar);
        assert_eq!(classify_field("int (*)()", &maps), FieldClass::Scalar);
    }

    #[test]
    fn plain_scalars_are_scalar() {
        let maps = maps();
        assert_eq!(classify_field("unsigned int", &maps), FieldClass::Scalar);
        assert_eq!(classify_field("enum Color", &maps), FieldClass::Scalar);
    }
}
