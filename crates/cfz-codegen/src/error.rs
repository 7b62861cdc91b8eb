//! Synthesis errors.
//!
//! These are internal-contract violations: the extractor's invariants
//! guarantee they are unreachable for maps it produced, so hitting one
//! means extractor and synthesizer disagree, not that user input was
//! bad. They are fatal and never recovered from.

#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// A pointer typedef entry has no recorded link to a value-typed
    /// key, so there is no allocator to delegate to.
    #[error("pointer typedef '{alias}' has no value-typed link")]
    BrokenPointerLink { alias: String },

    /// A map key was never assigned a function name. The name table is
    /// built from the same keys it is queried with.
    #[error("no allocator name assigned for key '{key}'")]
    MissingAllocatorName { key: String },
}
