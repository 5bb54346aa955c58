//! magus_core: Core utilities for the magus type checker.
//!
//! Provides arena allocation, string interning, and text spans used
//! throughout the checking pipeline.

pub mod arena;
pub mod intern;
pub mod text;

// Re-export commonly used types
pub use arena::HirArena;
pub use intern::{Atom, StringInterner};
pub use text::{LineMap, TextSpan};
