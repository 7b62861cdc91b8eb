//! End-to-end extraction over a realistic fixture unit.

use cfz_parser::{Field, extract_functions, extract_types, parse_c};
use pretty_assertions::assert_eq;

const SAMPLE: &str = include_str!("fixtures/sample.c");

#[test]
fn fixture_value_map_covers_tags_and_value_aliases() {
    let maps = extract_types(&parse_c(SAMPLE)).unwrap();

    let node_fields = vec![
        Field::new("int", "value"),
        Field::new("struct list_node*", "next"),
    ];
    assert_eq!(maps.name_to_struct.get("struct list_node"), Some(&node_fields));
    assert_eq!(maps.name_to_struct.get("node_t"), Some(&node_fields));

    let record_fields = vec![
        Field::new("unsigned long", "id"),
        Field::new("char[]", "name"),
    ];
    assert_eq!(maps.name_to_struct.get("record_t"), Some(&record_fields));

    assert!(maps.name_to_struct.contains_key("union payload"));
    assert!(maps.name_to_struct.contains_key("struct message"));
}

#[test]
fn fixture_pointer_map_links_back_to_value_keys() {
    let maps = extract_types(&parse_c(SAMPLE)).unwrap();

    assert_eq!(
        maps.pointer_links.get("node_ptr").map(String::as_str),
        Some("struct list_node")
    );
    assert_eq!(
        maps.pointer_links.get("record_ptr").map(String::as_str),
        Some("record_t")
    );
    assert_eq!(
        maps.pointer_links.get("payload_ptr").map(String::as_str),
        Some("union payload")
    );
    for key in maps.pointer_to_struct.keys() {
        assert!(
            maps.pointer_links.contains_key(key),
            "{key} has no value link"
        );
    }
}

#[test]
fn fixture_message_fields_are_faithful() {
    let maps = extract_types(&parse_c(SAMPLE)).unwrap();
    assert_eq!(
        maps.name_to_struct.get("struct message"),
        Some(&vec![
            Field::new("node_t", "head"),
            Field::new("payload_ptr", "body"),
            Field::new("void*", "opaque"),
            Field::new("unsigned int", "flags"),
        ])
    );
}

#[test]
fn fixture_signatures_in_declaration_order() {
    let table = extract_functions(&parse_c(SAMPLE));
    let names: Vec<_> = table.iter().map(|sig| sig.name.as_str()).collect();
    assert_eq!(names, vec!["enqueue", "reset", "main"]);
    assert_eq!(
        table[0].params,
        vec![
            Field::new("node_ptr", "head"),
            Field::new("record_t", "rec"),
        ]
    );
    assert_eq!(table[1].params, vec![Field::new("struct message*", "msg")]);
}
