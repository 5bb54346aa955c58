//! magus_hir: High-level intermediate representation of checked programs.
//!
//! Node types closely follow the surface language: statements, expressions,
//! and type annotations. Nodes reference child nodes via arena-allocated
//! references; a front end (or the [`builder::HirBuilder`] in tests) produces
//! a [`program::Module`] which the checker consumes in a single pass.

pub mod builder;
pub mod flags;
pub mod ids;
pub mod program;

pub use builder::HirBuilder;
pub use flags::TypeFlags;
pub use ids::{ClassId, TypeId};
pub use program::*;
