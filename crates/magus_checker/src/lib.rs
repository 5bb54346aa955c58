//! magus_checker: The type-level computation core.
//!
//! Four cooperating pieces:
//! - [`types`]: the interned type table (arena of type nodes addressed by
//!   `TypeId`) plus the nominal class registry.
//! - [`subtype`]: the structural subtyping engine with a memoizing cache.
//! - [`operators`]: the magic type operator evaluator (`$Keys`, `$Pick`,
//!   `$Exclude`, ...), a closed dispatch over a fixed operator set.
//! - [`throws`]: the throw-type tracker validating `$Throws` declarations.
//!
//! [`checker::Checker`] drives them over a [`magus_hir::Module`] in a single
//! pass, accumulating structured diagnostics. All failures are local: an
//! annotation that cannot be evaluated degrades to `unknown` and checking
//! continues.

pub mod checker;
pub mod env;
pub mod operators;
pub mod resolve;
pub mod subtype;
pub mod throws;
pub mod types;

pub use checker::Checker;
pub use operators::MagicOp;
pub use types::{ClassDef, Exactness, IntrinsicKind, Type, TypeKind, TypeTable};
