//! # cfz-parser
//!
//! ast-grep-based C parsing and type extraction for cfz.
//!
//! Turns a C translation unit into the two maps the allocator
//! synthesizer consumes:
//! - `name_to_struct`: every aggregate reachable by value (canonical
//!   `struct Foo` / `union Foo` tags plus depth-0 typedef aliases),
//! - `pointer_to_struct`: typedefs exactly one pointer level away from
//!   a known aggregate,
//!
//! plus a function-signature table for driver generation. Forward
//! declarations, typedef chains, and anonymous aggregates are resolved
//! with a fixed-point pass; anything that cannot be linked to a known
//! definition is silently excluded (real headers are full of
//! legitimately opaque types).

pub mod error;
pub mod extract;
pub mod oracle;
pub mod sanitizer;
pub mod types;

pub use error::ParserError;
pub use extract::{extract_functions, extract_types};
pub use oracle::{CTree, Diagnostic, Severity, parse_c};
pub use sanitizer::Sanitizer;
pub use types::{Field, FieldList, FnSig, SignatureTable, TypeMap, TypeMaps};
