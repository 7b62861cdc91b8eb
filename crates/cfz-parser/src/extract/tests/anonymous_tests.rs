use pretty_assertions::assert_eq;

use super::*;

#[test]
fn anonymous_struct_reachable_only_via_alias() {
    let maps = extract("typedef struct { long id; } Rec;");
    assert_eq!(
        maps.name_to_struct.get("Rec"),
        Some(&vec![field("long", "id")])
    );
    assert!(!maps.name_to_struct.contains_key("struct Rec"));
    assert!(!maps.pointer_to_struct.contains_key("struct Rec"));
    assert_eq!(maps.name_to_struct.len(), 1);
}

#[test]
fn pointer_alias_to_anonymous_links_to_value_alias() {
    let maps = extract("typedef struct { int x; } V, *pV;");
    let expected = vec![field("int", "x")];
    assert_eq!(maps.name_to_struct.get("V"), Some(&expected));
    assert_eq!(maps.pointer_to_struct.get("pV"), Some(&expected));
    assert_eq!(maps.pointer_links.get("pV").map(String::as_str), Some("V"));
}

#[test]
fn declarator_order_does_not_break_anonymous_linking() {
    let maps = extract("typedef struct { int x; } *pV, V;");
    assert_eq!(maps.pointer_links.get("pV").map(String::as_str), Some("V"));
}

#[test]
fn anonymous_pointer_alias_without_value_alias_is_a_gap() {
    let maps = extract("typedef struct { int x; } *pOnly;");
    assert!(maps.name_to_struct.is_empty());
    assert!(maps.pointer_to_struct.is_empty());
}

#[test]
fn distinct_anonymous_definitions_keep_distinct_identities() {
    let maps = extract(
        "typedef struct { int x; } First;\n\
         typedef struct { int x; } Second, *pSecond;",
    );
    assert!(maps.name_to_struct.contains_key("First"));
    assert!(maps.name_to_struct.contains_key("Second"));
    // Identical field lists must not cross-link the aliases.
    assert_eq!(
        maps.pointer_links.get("pSecond").map(String::as_str),
        Some("Second")
    );
}

#[test]
fn nested_anonymous_field_stays_unresolvable() {
    let maps = extract("struct Outer { struct { int x; } inner; };");
    let fields = maps.name_to_struct.get("struct Outer").unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "inner");
    assert!(!maps.name_to_struct.contains_key(fields[0].type_string.as_str()));
}
