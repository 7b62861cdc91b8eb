use rstest::rstest;

use super::*;

/// Depth 0 belongs to the value map, depth 1 to the pointer map, and
/// anything deeper is dropped from both.
#[rstest]
#[case(0, true, false)]
#[case(1, false, true)]
#[case(2, false, false)]
#[case(3, false, false)]
fn pointer_depth_partitions_the_maps(
    #[case] depth: usize,
    #[case] in_value_map: bool,
    #[case] in_pointer_map: bool,
) {
    let stars = "*".repeat(depth);
    let source = format!("struct A {{ int a; }}; typedef struct A{stars} T;");
    let maps = extract(&source);
    assert_eq!(maps.name_to_struct.contains_key("T"), in_value_map);
    assert_eq!(maps.pointer_to_struct.contains_key("T"), in_pointer_map);
    if in_value_map || in_pointer_map {
        assert_eq!(
            maps.name_to_struct
                .get("T")
                .or_else(|| maps.pointer_to_struct.get("T")),
            Some(&vec![field("int", "a")])
        );
    }
}

#[test]
fn depth_one_alias_always_carries_a_link() {
    let maps = extract("union U { int i; }; typedef union U* pU;");
    assert!(maps.pointer_to_struct.contains_key("pU"));
    assert_eq!(maps.pointer_links.get("pU").map(String::as_str), Some("union U"));
}

#[test]
fn value_and_pointer_keys_stay_disjoint() {
    let maps = extract(
        "struct A { int a; };\n\
         typedef struct A A_t;\n\
         typedef struct A* pA;",
    );
    for key in maps.pointer_to_struct.keys() {
        assert!(
            !maps.name_to_struct.contains_key(key),
            "{key} appears in both maps"
        );
    }
}
