//! The structural subtyping engine.
//!
//! `is_subtype(a, b)` decides whether `a` is assignable to `b`. Results are
//! memoized per pair of interned ids. Recursive shapes are handled with an
//! optimistic in-progress entry: a pair re-entered while being decided is
//! assumed to hold, which yields the coinductive reading recursive object
//! types need.

use crate::checker::Checker;
use crate::types::TypeKind;
use magus_hir::{TypeFlags, TypeId};

impl<'a> Checker<'a> {
    pub fn is_subtype(&mut self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        if let Some(&cached) = self.subtype_cache.get(&(a, b)) {
            return cached;
        }
        self.subtype_cache.insert((a, b), true);
        let result = self.is_subtype_worker(a, b);
        self.subtype_cache.insert((a, b), result);
        result
    }

    fn is_subtype_worker(&mut self, a: TypeId, b: TypeId) -> bool {
        let a_flags = self.types.flags(a);
        let b_flags = self.types.flags(b);

        // never is a subtype of everything; unknown is compatible in both
        // directions so a degraded annotation never cascades errors.
        if a_flags.contains(TypeFlags::NEVER)
            || a_flags.contains(TypeFlags::UNKNOWN)
            || b_flags.contains(TypeFlags::UNKNOWN)
        {
            return true;
        }

        // A literal is a subtype of the primitive matching its base type.
        if (a_flags.contains(TypeFlags::STRING_LITERAL) && b_flags.contains(TypeFlags::STRING))
            || (a_flags.contains(TypeFlags::NUMBER_LITERAL) && b_flags.contains(TypeFlags::NUMBER))
            || (a_flags.contains(TypeFlags::BOOLEAN_LITERAL)
                && b_flags.contains(TypeFlags::BOOLEAN))
        {
            return true;
        }

        // The immutable qualifier: a readonly value is accepted wherever the
        // unqualified type is expected, and any value can be viewed through a
        // readonly target. Array covariance requires the qualifier on BOTH
        // sides, so unwrap paired qualifiers together first.
        if let (TypeKind::Readonly { inner: ai }, TypeKind::Readonly { inner: bi }) =
            (self.types.kind(a), self.types.kind(b))
        {
            let (ai, bi) = (*ai, *bi);
            if let (TypeKind::Array { element: ae }, TypeKind::Array { element: be }) =
                (self.types.kind(ai), self.types.kind(bi))
            {
                let (ae, be) = (*ae, *be);
                return self.is_subtype(ae, be);
            }
            return self.is_subtype(ai, bi);
        }
        if let TypeKind::Readonly { inner } = self.types.kind(a) {
            let inner = *inner;
            return self.is_subtype(inner, b);
        }
        if let TypeKind::Readonly { inner } = self.types.kind(b) {
            let inner = *inner;
            return self.is_subtype(a, inner);
        }

        // Nominal class rule: assignability requires a superclass chain
        // relationship, never mere structural agreement.
        match (self.types.kind(a), self.types.kind(b)) {
            (TypeKind::Class { class: ca }, TypeKind::Class { class: cb })
            | (
                TypeKind::ClassConstructor { class: ca },
                TypeKind::ClassConstructor { class: cb },
            ) => {
                let (ca, cb) = (*ca, *cb);
                return self.types.is_class_derived_from(ca, cb);
            }
            _ => {}
        }

        // A class instance used where a structural object is expected is
        // checked against its instance shape.
        if let (TypeKind::Class { class }, TypeKind::Object { .. }) =
            (self.types.kind(a), self.types.kind(b))
        {
            let shape = self.types.class(*class).shape;
            return self.is_subtype(shape, b);
        }

        if let (
            TypeKind::Object {
                fields: a_fields, ..
            },
            TypeKind::Object {
                fields: b_fields,
                exactness: b_exactness,
            },
        ) = (self.types.kind(a), self.types.kind(b))
        {
            return self.object_subtype(
                a_fields.clone(),
                b_fields.clone(),
                *b_exactness == crate::types::Exactness::Exact,
            );
        }

        // Mutable containers are invariant in their element type.
        if let (TypeKind::Array { element: ae }, TypeKind::Array { element: be }) =
            (self.types.kind(a), self.types.kind(b))
        {
            let (ae, be) = (*ae, *be);
            return self.is_subtype(ae, be) && self.is_subtype(be, ae);
        }

        // Union source: every member must be assignable to the target.
        if let TypeKind::Union { members } = self.types.kind(a) {
            let members = members.clone();
            return members.into_iter().all(|m| self.is_subtype(m, b));
        }
        // Union target: one member accepting the source suffices.
        if let TypeKind::Union { members } = self.types.kind(b) {
            let members = members.clone();
            return members.into_iter().any(|m| self.is_subtype(a, m));
        }
        // Intersection target: the source must satisfy every member.
        if let TypeKind::Intersection { members } = self.types.kind(b) {
            let members = members.clone();
            return members.into_iter().all(|m| self.is_subtype(a, m));
        }
        // Intersection source: any member satisfying the target suffices.
        if let TypeKind::Intersection { members } = self.types.kind(a) {
            let members = members.clone();
            return members.into_iter().any(|m| self.is_subtype(m, b));
        }

        if let (
            TypeKind::Function {
                params: a_params,
                return_type: a_return,
                thrown: a_thrown,
                ..
            },
            TypeKind::Function {
                params: b_params,
                return_type: b_return,
                thrown: b_thrown,
                ..
            },
        ) = (self.types.kind(a), self.types.kind(b))
        {
            let (a_params, b_params) = (a_params.clone(), b_params.clone());
            let (a_return, b_return) = (*a_return, *b_return);
            let (a_thrown, b_thrown) = (*a_thrown, *b_thrown);
            return self.function_subtype(
                &a_params, a_return, a_thrown, &b_params, b_return, b_thrown,
            );
        }

        // Pending generic instantiations: targets follow their own rule
        // (nominal for classes), arguments are invariant.
        if let (
            TypeKind::GenericApplication {
                target: at,
                args: aa,
            },
            TypeKind::GenericApplication {
                target: bt,
                args: ba,
            },
        ) = (self.types.kind(a), self.types.kind(b))
        {
            let (at, bt) = (*at, *bt);
            let (aa, ba) = (aa.clone(), ba.clone());
            return aa.len() == ba.len()
                && self.is_subtype(at, bt)
                && aa
                    .into_iter()
                    .zip(ba)
                    .all(|(x, y)| self.is_subtype(x, y) && self.is_subtype(y, x));
        }

        // A bounded type parameter is assignable wherever its bound is.
        if let TypeKind::TypeParameter {
            constraint: Some(c),
            ..
        } = self.types.kind(a)
        {
            let c = *c;
            return self.is_subtype(c, b);
        }

        false
    }

    fn object_subtype(
        &mut self,
        a_fields: indexmap::IndexMap<magus_core::Atom, TypeId>,
        b_fields: indexmap::IndexMap<magus_core::Atom, TypeId>,
        b_exact: bool,
    ) -> bool {
        // Width: the target's fields must all be present and deeper-compatible.
        for (name, &b_field) in &b_fields {
            match a_fields.get(name) {
                Some(&a_field) => {
                    if !self.is_subtype(a_field, b_field) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        // An exact target rejects any extra source fields.
        if b_exact {
            for name in a_fields.keys() {
                if !b_fields.contains_key(name) {
                    return false;
                }
            }
        }
        true
    }

    fn function_subtype(
        &mut self,
        a_params: &[TypeId],
        a_return: TypeId,
        a_thrown: Option<TypeId>,
        b_params: &[TypeId],
        b_return: TypeId,
        b_thrown: Option<TypeId>,
    ) -> bool {
        if a_params.len() != b_params.len() {
            return false;
        }
        // Contravariant parameters.
        for (&ap, &bp) in a_params.iter().zip(b_params.iter()) {
            if !self.is_subtype(bp, ap) {
                return false;
            }
        }
        // Covariant return.
        if !self.is_subtype(a_return, b_return) {
            return false;
        }
        // If the target declares a thrown type, the source's declared thrown
        // type must fit inside it. A source that throws nothing always fits.
        if let Some(bt) = b_thrown {
            if let Some(at) = a_thrown {
                return self.is_subtype(at, bt);
            }
        }
        true
    }
}
