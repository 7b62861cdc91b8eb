//! Type and signature extraction from a parsed translation unit.
//!
//! [`extract_types`] is the core pipeline: scan the tree once into
//! owned declarations, resolve typedef chains to aggregates with a
//! fixed-point pass, and build the two value/pointer maps. The tree is
//! never mutated; the maps are owned outputs.

mod functions;
mod resolve;
mod scan;

#[cfg(test)]
mod tests;

pub use functions::extract_functions;

use crate::error::ParserError;
use crate::oracle::{CTree, ensure_parsable};
use crate::types::TypeMaps;

/// Derive `name_to_struct` and `pointer_to_struct` from a parsed unit.
///
/// Fails fast on any error-severity diagnostic; no partial maps are
/// returned, since downstream synthesis assumes complete maps for the
/// whole input set.
pub fn extract_types(tree: &CTree) -> Result<TypeMaps, ParserError> {
    ensure_parsable(tree)?;
    let scanned = scan::scan(tree);
    Ok(resolve::build_maps(&scanned))
}
