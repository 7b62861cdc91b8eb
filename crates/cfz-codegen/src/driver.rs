//! Driver synthesis.
//!
//! One `main` that calls every discovered function behind an
//! `if (rand())` guard, so each call site is independently and
//! unpredictably exercised. Parameters are initialized with the same
//! classification policy the allocators use.

use std::fmt::Write as _;

use cfz_parser::{Field, SignatureTable, TypeMaps};
use tracing::debug;

use crate::classify::{FieldClass, TypeShape, classify_field};
use crate::names::NameTable;

/// Depth arguments handed to every allocator call in the driver.
pub const DRIVER_DEPTH_ARGS: (u32, u32) = (0, 5);

/// Size of the opaque buffer bound to pointer parameters with no
/// recognized allocator.
pub const OPAQUE_PARAM_SIZE: u32 = 32;

/// Emit the driver `main`. Functions literally named `main` are never
/// called (the driver is itself the entry point).
#[must_use]
pub fn synthesize_driver(table: &SignatureTable, maps: &TypeMaps) -> String {
    let names = NameTable::for_maps(maps);
    let (depth, max_depth) = DRIVER_DEPTH_ARGS;
    let mut out = String::new();
    let _ = writeln!(out, "int main(void) {{");

    let mut emitted = 0usize;
    for sig in table {
        if sig.name == "main" {
            continue;
        }
        let _ = writeln!(out, "    if (rand()) {{");
        for param in &sig.params {
            emit_param_init(&mut out, param, maps, &names, depth, max_depth);
        }
        let args: Vec<&str> = sig.params.iter().map(|p| p.name.as_str()).collect();
        let _ = writeln!(out, "        {}({});", sig.name, args.join(", "));
        let _ = writeln!(out, "    }}");
        emitted += 1;
    }

    let _ = writeln!(out, "    return 0;");
    let _ = writeln!(out, "}}");
    debug!(calls = emitted, "synthesized driver");
    out
}

fn emit_param_init(
    out: &mut String,
    param: &Field,
    maps: &TypeMaps,
    names: &NameTable,
    depth: u32,
    max_depth: u32,
) {
    let name = &param.name;
    let shape = TypeShape::parse(&param.type_string);

    // Function-pointer parameters have no declarable canonical type;
    // hand them an opaque buffer through void*.
    if shape.is_function() {
        emit_opaque_param(out, "void*", name);
        return;
    }

    // Arrays decay to pointers at the call boundary.
    let decl_type = declared_type(&shape);

    if shape.ptr_depth > 0 || shape.is_array {
        // A single pointer to a known aggregate gets a real instance;
        // every other pointer shape points at an opaque buffer.
        if let FieldClass::KnownPointer(value_key) = classify_field(&param.type_string, maps) {
            if let Some(alloc) = names.alloc_fn(&value_key) {
                let _ = writeln!(
                    out,
                    "        {decl_type} {name} = {alloc}({depth}, {max_depth});"
                );
                return;
            }
        }
        emit_opaque_param(out, &decl_type, name);
        return;
    }

    if maps.name_to_struct.contains_key(&shape.base) {
        if let Some(alloc) = names.alloc_fn(&shape.base) {
            let _ = writeln!(
                out,
                "        {decl_type} {name} = *{alloc}({depth}, {max_depth});"
            );
            return;
        }
    }
    if maps.pointer_to_struct.contains_key(&shape.base) {
        if let Some(alloc) = names.alloc_fn(&shape.base) {
            let _ = writeln!(
                out,
                "        {decl_type} {name} = {alloc}({depth}, {max_depth});"
            );
            return;
        }
    }
    if matches!(shape.base.as_str(), "bool" | "_Bool") {
        let _ = writeln!(out, "        {decl_type} {name} = rand() % 2;");
        return;
    }
    let _ = writeln!(out, "        {decl_type} {name};");
    let _ = writeln!(out, "        cfz_fill_unknown(&{name}, sizeof({name}));");
}

fn emit_opaque_param(out: &mut String, decl_type: &str, name: &str) {
    let _ = writeln!(
        out,
        "        {decl_type} {name} = ({decl_type})cfz_alloc_or_die({OPAQUE_PARAM_SIZE});"
    );
    let _ = writeln!(out, "        cfz_fill_unknown({name}, {OPAQUE_PARAM_SIZE});");
}

fn declared_type(shape: &TypeShape) -> String {
    let mut out = shape.base.clone();
    let stars = shape.ptr_depth + u32::from(shape.is_array);
    for _ in 0..stars {
        out.push('*');
    }
    out
}
