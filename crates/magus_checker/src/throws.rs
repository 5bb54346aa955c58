//! The throw-type tracker.
//!
//! While a function body is being checked, thrown types accumulate on a
//! per-function stack: direct `throw` statements contribute their operand's
//! type, and calls to functions whose type declares a thrown type propagate
//! it. When the body is done, the accumulated union is compared against the
//! declared `$Throws<E>` marker, if one was present in the return
//! annotation.

use crate::checker::Checker;
use magus_core::TextSpan;
use magus_diagnostics::ErrorKind;
use magus_hir::TypeId;

impl<'a> Checker<'a> {
    /// Begin tracking thrown types for a function body.
    pub(crate) fn push_throw_scope(&mut self) {
        self.thrown_stack.push(Vec::new());
    }

    /// Finish tracking, returning everything thrown in the body.
    pub(crate) fn pop_throw_scope(&mut self) -> Vec<TypeId> {
        self.thrown_stack.pop().unwrap_or_default()
    }

    /// Record a thrown type against the innermost function body, if any.
    /// Throws at module top level are tracked by nobody and permitted.
    pub(crate) fn record_thrown(&mut self, ty: TypeId) {
        if let Some(current) = self.thrown_stack.last_mut() {
            current.push(ty);
        }
    }

    /// Compare what a body actually throws against its `$Throws<E>`
    /// declaration. Undeclared throwing is permitted, just unchecked.
    pub(crate) fn validate_thrown(
        &mut self,
        declared: Option<TypeId>,
        thrown: Vec<TypeId>,
        span: TextSpan,
    ) {
        let Some(declared) = declared else {
            return;
        };
        if thrown.is_empty() {
            let declared = self.types.type_to_string(declared);
            self.report(ErrorKind::MissingThrow { declared }, span);
            return;
        }
        let thrown_union = self.types.union_of(thrown.iter().copied());
        if self.is_subtype(thrown_union, declared) {
            return;
        }
        // Name the first offending member in the diagnostic.
        let mut actual = self.types.type_to_string(thrown_union);
        for &member in &thrown {
            if !self.is_subtype(member, declared) {
                actual = self.types.type_to_string(member);
                break;
            }
        }
        let declared = self.types.type_to_string(declared);
        self.report(ErrorKind::IncompatibleThrow { declared, actual }, span);
    }
}
