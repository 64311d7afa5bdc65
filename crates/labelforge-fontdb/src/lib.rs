// this_file: crates/labelforge-fontdb/src/lib.rs

//! Font discovery and fallback for labelforge.
//!
//! Every font role resolves through an ordered chain of sources exactly once,
//! before any label is rendered. The result, a [`FontSet`], is immutable and
//! shared by all workers.

pub mod builtin;
pub mod face;
pub mod resolver;
pub mod set;
pub mod source;

pub use face::FontFace;
pub use resolver::{coverage_sample, FontResolver, ResolvedFont};
pub use set::FontSet;
pub use source::{FontChain, FontConfig, FontSource};
