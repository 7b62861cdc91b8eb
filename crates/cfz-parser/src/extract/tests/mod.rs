mod anonymous_tests;
mod pointer_depth_tests;

use crate::oracle::parse_c;
use crate::types::{Field, SignatureTable, TypeMaps};

/// Parse and extract, failing the test on any parse diagnostic.
fn extract(source: &str) -> TypeMaps {
    super::extract_types(&parse_c(source)).expect("test source should extract cleanly")
}

fn signatures(source: &str) -> SignatureTable {
    super::extract_functions(&parse_c(source))
}

fn field(type_string: &str, name: &str) -> Field {
    Field::new(type_string, name)
}
