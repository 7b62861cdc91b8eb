//! # cfz-codegen
//!
//! Turns the maps produced by `cfz-parser` into C source text: one
//! depth-bounded recursive allocator per value-typed aggregate, a thin
//! delegating allocator per pointer typedef, and an optional driver
//! `main` exercising every discovered function.
//!
//! Generation is a pure function of the maps (plus the signature table
//! for the driver); given well-formed maps it cannot fail, and a
//! malformed map surfaces as [`CodegenError`] rather than bad output.

pub mod allocator;
pub mod classify;
pub mod driver;
pub mod error;
pub mod names;

pub use allocator::synthesize_allocators;
pub use classify::{FieldClass, TypeShape, classify_field};
pub use driver::synthesize_driver;
pub use error::CodegenError;
pub use names::NameTable;
