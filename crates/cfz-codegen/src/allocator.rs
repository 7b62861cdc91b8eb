//! Allocator synthesis.
//!
//! For every value-typed entry one recursive allocator is emitted; for
//! every pointer typedef a delegating wrapper. All signatures are
//! forward-declared first so mutually recursive aggregates resolve
//! without ordering constraints.

use std::fmt::Write as _;

use cfz_parser::TypeMaps;
use tracing::debug;

use crate::classify::{FieldClass, classify_field};
use crate::error::CodegenError;
use crate::names::NameTable;

/// Fixed helpers every generated file starts with. Allocation failure
/// terminates the process, so allocator bodies never observe null.
pub const PRELUDE: &str = "\
#include <stdlib.h>

static void* cfz_alloc_or_die(unsigned long size) {
    void* ptr = malloc(size);
    if (!ptr) {
        exit(1);
    }
    return ptr;
}

static void cfz_fill_unknown(void* ptr, unsigned long size) {
    unsigned char* bytes = (unsigned char*)ptr;
    unsigned long i;
    for (i = 0; i < size; i++) {
        bytes[i] = (unsigned char)rand();
    }
}
";

/// Size of the opaque buffer hung off pointer fields whose target type
/// is unrecognized.
pub const OPAQUE_FIELD_SIZE: u32 = 128;

/// Emit the complete allocator source: prelude, forward declarations,
/// then definitions in map order.
pub fn synthesize_allocators(maps: &TypeMaps) -> Result<String, CodegenError> {
    let names = NameTable::for_maps(maps);
    let mut out = String::from(PRELUDE);
    out.push('\n');

    for (key, _) in maps.name_to_struct.iter() {
        let _ = writeln!(out, "{key}* {}(int depth, int max_depth);", alloc_fn(&names, key)?);
    }
    for (key, _) in maps.pointer_to_struct.iter() {
        let _ = writeln!(out, "{key} {}(int depth, int max_depth);", alloc_fn(&names, key)?);
    }

    for (key, fields) in maps.name_to_struct.iter() {
        out.push('\n');
        emit_value_allocator(&mut out, key, fields, maps, &names)?;
    }
    for (key, _) in maps.pointer_to_struct.iter() {
        out.push('\n');
        emit_pointer_allocator(&mut out, key, maps, &names)?;
    }

    debug!(
        value_allocators = maps.name_to_struct.len(),
        pointer_allocators = maps.pointer_to_struct.len(),
        "synthesized allocators"
    );
    Ok(out)
}

fn emit_value_allocator(
    out: &mut String,
    key: &str,
    fields: &[cfz_parser::Field],
    maps: &TypeMaps,
    names: &NameTable,
) -> Result<(), CodegenError> {
    let _ = writeln!(out, "{key}* {}(int depth, int max_depth) {{", alloc_fn(names, key)?);
    let _ = writeln!(
        out,
        "    {key}* instance = ({key}*)cfz_alloc_or_die(sizeof({key}));"
    );
    let _ = writeln!(out, "    cfz_fill_unknown(instance, sizeof({key}));");

    let mut body = String::new();
    for field in fields {
        let name = &field.name;
        match classify_field(&field.type_string, maps) {
            FieldClass::KnownPointer(value_key) => {
                let _ = writeln!(
                    body,
                    "        instance->{name} = {}(depth + 1, max_depth);",
                    alloc_fn(names, &value_key)?
                );
            }
            FieldClass::KnownValue(value_key) => {
                let _ = writeln!(
                    body,
                    "        instance->{name} = *{}(depth + 1, max_depth);",
                    alloc_fn(names, &value_key)?
                );
            }
            FieldClass::OpaquePointer => {
                let _ = writeln!(
                    body,
                    "        instance->{name} = cfz_alloc_or_die({OPAQUE_FIELD_SIZE});"
                );
                let _ = writeln!(
                    body,
                    "        cfz_fill_unknown(instance->{name}, {OPAQUE_FIELD_SIZE});"
                );
            }
            FieldClass::Scalar => {}
        }
    }

    // The depth budget is checked once per call; an all-scalar body
    // needs no check at all.
    if !body.is_empty() {
        let _ = writeln!(out, "    if (depth < max_depth - 1) {{");
        out.push_str(&body);
        let _ = writeln!(out, "    }}");
    }
    let _ = writeln!(out, "    return instance;");
    let _ = writeln!(out, "}}");
    Ok(())
}

/// Pointer typedefs delegate to the value allocator unchanged: the
/// result is already the right pointer, so adding an allocation here
/// would add a bogus indirection level.
fn emit_pointer_allocator(
    out: &mut String,
    key: &str,
    maps: &TypeMaps,
    names: &NameTable,
) -> Result<(), CodegenError> {
    let value_key = maps
        .pointer_links
        .get(key)
        .ok_or_else(|| CodegenError::BrokenPointerLink {
            alias: key.to_string(),
        })?;
    let _ = writeln!(out, "{key} {}(int depth, int max_depth) {{", alloc_fn(names, key)?);
    let _ = writeln!(out, "    return {}(depth, max_depth);", alloc_fn(names, value_key)?);
    let _ = writeln!(out, "}}");
    Ok(())
}

fn alloc_fn(names: &NameTable, key: &str) -> Result<String, CodegenError> {
    names
        .alloc_fn(key)
        .ok_or_else(|| CodegenError::MissingAllocatorName {
            key: key.to_string(),
        })
}
