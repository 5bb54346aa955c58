//! The magic type operator evaluator.
//!
//! The operator set is closed: dispatch is an exhaustive match over
//! [`MagicOp`] so an unhandled operator is a compile error here, not a
//! runtime lookup miss. Each evaluation rule is a pure function from
//! argument types to a result type, consulting the subtyping engine where
//! a rule needs structural checks. Failures record one diagnostic and
//! degrade to `unknown`.

use crate::checker::Checker;
use crate::types::{Exactness, TypeKind};
use indexmap::IndexMap;
use magus_core::{Atom, TextSpan};
use magus_diagnostics::ErrorKind;
use magus_hir::TypeId;
use rustc_hash::FxHashMap;

/// The fixed set of built-in generic type operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MagicOp {
    Class,
    InstanceOf,
    Exclude,
    Immutable,
    Intersection,
    Keys,
    Values,
    Omit,
    Pick,
    Partial,
    PropertyType,
    ReturnType,
    Soft,
    Strict,
    Throws,
    TypeOf,
}

/// How many type arguments an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }

    /// The minimum count, used when reporting an arity mismatch.
    pub fn minimum(self) -> usize {
        match self {
            Arity::Exactly(n) | Arity::AtLeast(n) => n,
        }
    }
}

impl MagicOp {
    /// Look up an operator by its `$`-prefixed source name.
    pub fn from_name(name: &str) -> Option<MagicOp> {
        Some(match name {
            "$Class" => MagicOp::Class,
            "$InstanceOf" => MagicOp::InstanceOf,
            "$Exclude" => MagicOp::Exclude,
            "$Immutable" => MagicOp::Immutable,
            "$Intersection" => MagicOp::Intersection,
            "$Keys" => MagicOp::Keys,
            "$Values" => MagicOp::Values,
            "$Omit" => MagicOp::Omit,
            "$Pick" => MagicOp::Pick,
            "$Partial" => MagicOp::Partial,
            "$PropertyType" => MagicOp::PropertyType,
            "$ReturnType" => MagicOp::ReturnType,
            "$Soft" => MagicOp::Soft,
            "$Strict" => MagicOp::Strict,
            "$Throws" => MagicOp::Throws,
            "$TypeOf" => MagicOp::TypeOf,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            MagicOp::Class => "$Class",
            MagicOp::InstanceOf => "$InstanceOf",
            MagicOp::Exclude => "$Exclude",
            MagicOp::Immutable => "$Immutable",
            MagicOp::Intersection => "$Intersection",
            MagicOp::Keys => "$Keys",
            MagicOp::Values => "$Values",
            MagicOp::Omit => "$Omit",
            MagicOp::Pick => "$Pick",
            MagicOp::Partial => "$Partial",
            MagicOp::PropertyType => "$PropertyType",
            MagicOp::ReturnType => "$ReturnType",
            MagicOp::Soft => "$Soft",
            MagicOp::Strict => "$Strict",
            MagicOp::Throws => "$Throws",
            MagicOp::TypeOf => "$TypeOf",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            MagicOp::Class
            | MagicOp::Immutable
            | MagicOp::Keys
            | MagicOp::Values
            | MagicOp::Partial
            | MagicOp::Soft
            | MagicOp::Strict
            | MagicOp::Throws
            | MagicOp::TypeOf => Arity::Exactly(1),
            MagicOp::Exclude
            | MagicOp::Omit
            | MagicOp::Pick
            | MagicOp::PropertyType => Arity::Exactly(2),
            MagicOp::InstanceOf | MagicOp::ReturnType => Arity::AtLeast(1),
            MagicOp::Intersection => Arity::AtLeast(2),
        }
    }
}

impl<'a> Checker<'a> {
    /// Evaluate a magic operator over already-resolved argument types.
    ///
    /// `$TypeOf` and `$Throws` never reach this point: the resolver handles
    /// the identifier query and return-annotation marker before argument
    /// resolution.
    pub(crate) fn evaluate_operator(
        &mut self,
        op: MagicOp,
        args: &[TypeId],
        span: TextSpan,
    ) -> TypeId {
        match op {
            MagicOp::Class => self.eval_class(args[0], span),
            MagicOp::InstanceOf => self.eval_instance_of(args, span),
            MagicOp::Exclude => self.eval_exclude(args[0], args[1], span),
            MagicOp::Immutable => self.types.readonly(args[0]),
            MagicOp::Intersection => self.eval_intersection(args, span),
            MagicOp::Keys => self.eval_keys(args[0], span),
            MagicOp::Values => self.eval_values(args[0], span),
            MagicOp::Omit => self.eval_omit(args[0], args[1], span),
            MagicOp::Pick => self.eval_pick(args[0], args[1], span),
            MagicOp::Partial => self.eval_partial(args[0], span),
            MagicOp::PropertyType => self.eval_property_type(args[0], args[1], span),
            MagicOp::ReturnType => self.eval_return_type(args, span),
            MagicOp::Soft => self.eval_exactness(args[0], Exactness::Inexact, MagicOp::Soft, span),
            MagicOp::Strict => {
                self.eval_exactness(args[0], Exactness::Exact, MagicOp::Strict, span)
            }
            MagicOp::Throws => self.invalid_operator(
                MagicOp::Throws,
                "only valid inside a function return annotation",
                span,
            ),
            MagicOp::TypeOf => {
                self.invalid_operator(MagicOp::TypeOf, "only works with identifier", span)
            }
        }
    }

    fn eval_class(&mut self, arg: TypeId, span: TextSpan) -> TypeId {
        match self.types.kind(arg) {
            TypeKind::Class { class } => {
                let class = *class;
                self.types.constructor_type(class)
            }
            TypeKind::GenericApplication { target, .. } => {
                if let TypeKind::Class { class } = self.types.kind(*target) {
                    let class = *class;
                    self.types.constructor_type(class)
                } else {
                    self.invalid_operator(MagicOp::Class, "expected a class instance type", span)
                }
            }
            _ => self.invalid_operator(MagicOp::Class, "expected a class instance type", span),
        }
    }

    fn eval_instance_of(&mut self, args: &[TypeId], span: TextSpan) -> TypeId {
        let class = match self.types.kind(args[0]) {
            TypeKind::ClassConstructor { class } => *class,
            _ => {
                return self.invalid_operator(
                    MagicOp::InstanceOf,
                    "expected a constructor type such as $Class<T>",
                    span,
                )
            }
        };
        let type_args = &args[1..];
        let param_count = self.types.class(class).type_params.len();
        if type_args.len() != param_count {
            self.report(
                ErrorKind::ArityError {
                    expected: param_count,
                    actual: type_args.len(),
                },
                span,
            );
            return self.types.unknown;
        }
        let instance = self.types.instance_type(class);
        if type_args.is_empty() {
            instance
        } else {
            self.types.add(TypeKind::GenericApplication {
                target: instance,
                args: type_args.to_vec(),
            })
        }
    }

    fn eval_exclude(&mut self, target: TypeId, excluded: TypeId, span: TextSpan) -> TypeId {
        let members = match self.types.kind(target) {
            TypeKind::Union { members } => members.clone(),
            _ => {
                return self.invalid_operator(
                    MagicOp::Exclude,
                    "first argument must be a union type",
                    span,
                )
            }
        };
        let kept: Vec<TypeId> = members
            .into_iter()
            .filter(|&m| !self.is_subtype(m, excluded))
            .collect();
        self.types.union_of(kept)
    }

    /// Right-biased object merge: overlapping fields take the type from the
    /// rightmost operand that defines them; field positions come from the
    /// first operand that introduced each name. The result is inexact; an
    /// outer `$Strict`/`$Soft` wrapping decides the final exactness.
    fn eval_intersection(&mut self, args: &[TypeId], span: TextSpan) -> TypeId {
        let mut merged: IndexMap<Atom, TypeId> = IndexMap::new();
        for &arg in args {
            let fields = match self.types.kind(arg) {
                TypeKind::Object { fields, .. } => fields.clone(),
                _ => {
                    return self.invalid_operator(
                        MagicOp::Intersection,
                        "every argument must be an object type",
                        span,
                    )
                }
            };
            for (name, field) in fields {
                merged.insert(name, field);
            }
        }
        self.types.object(merged, Exactness::Inexact)
    }

    fn eval_keys(&mut self, obj: TypeId, span: TextSpan) -> TypeId {
        let fields = match self.object_fields(obj) {
            Some(fields) => fields,
            None => {
                return self.invalid_operator(MagicOp::Keys, "argument must be an object type", span)
            }
        };
        let literals: Vec<TypeId> = fields
            .keys()
            .map(|&name| self.types.string_literal(name))
            .collect();
        self.types.union_of(literals)
    }

    fn eval_values(&mut self, obj: TypeId, span: TextSpan) -> TypeId {
        let fields = match self.object_fields(obj) {
            Some(fields) => fields,
            None => {
                return self
                    .invalid_operator(MagicOp::Values, "argument must be an object type", span)
            }
        };
        let values: Vec<TypeId> = fields.values().copied().collect();
        self.types.union_of(values)
    }

    fn eval_omit(&mut self, obj: TypeId, keys: TypeId, span: TextSpan) -> TypeId {
        let (fields, exactness) = match self.types.kind(obj) {
            TypeKind::Object { fields, exactness } => (fields.clone(), *exactness),
            _ => {
                return self.invalid_operator(
                    MagicOp::Omit,
                    "first argument must be an object type",
                    span,
                )
            }
        };
        let omitted = match self.key_names(keys) {
            Some(names) => names,
            None => {
                return self.invalid_operator(
                    MagicOp::Omit,
                    "keys must be a string literal or a union of string literals",
                    span,
                )
            }
        };
        let remaining: IndexMap<Atom, TypeId> = fields
            .into_iter()
            .filter(|(name, _)| !omitted.contains(name))
            .collect();
        self.types.object(remaining, exactness)
    }

    /// The picked object is exact: selecting a known set of keys pins the
    /// shape, so `$Pick<Obj, $Keys<Obj>>` round-trips to `$Strict<Obj>`.
    fn eval_pick(&mut self, obj: TypeId, keys: TypeId, span: TextSpan) -> TypeId {
        let fields = match self.object_fields(obj) {
            Some(fields) => fields,
            None => {
                return self.invalid_operator(
                    MagicOp::Pick,
                    "first argument must be an object type",
                    span,
                )
            }
        };
        let picked = match self.key_names(keys) {
            Some(names) => names,
            None => {
                return self.invalid_operator(
                    MagicOp::Pick,
                    "keys must be a string literal or a union of string literals",
                    span,
                )
            }
        };
        for &name in &picked {
            if !fields.contains_key(&name) {
                let object_type = self.types.type_to_string(obj);
                let key = self.types.strings().resolve(name).to_string();
                self.report(ErrorKind::UnknownProperty { object_type, key }, span);
                return self.types.unknown;
            }
        }
        let selected: IndexMap<Atom, TypeId> = fields
            .into_iter()
            .filter(|(name, _)| picked.contains(name))
            .collect();
        self.types.object(selected, Exactness::Exact)
    }

    fn eval_partial(&mut self, obj: TypeId, span: TextSpan) -> TypeId {
        let (fields, exactness) = match self.types.kind(obj) {
            TypeKind::Object { fields, exactness } => (fields.clone(), *exactness),
            _ => {
                return self
                    .invalid_operator(MagicOp::Partial, "argument must be an object type", span)
            }
        };
        let undefined = self.types.undefined;
        let optional: IndexMap<Atom, TypeId> = fields
            .into_iter()
            .map(|(name, field)| (name, self.types.union_of([field, undefined])))
            .collect();
        self.types.object(optional, exactness)
    }

    fn eval_property_type(&mut self, obj: TypeId, key: TypeId, span: TextSpan) -> TypeId {
        let fields = match self.object_fields(obj) {
            Some(fields) => fields,
            None => {
                return self.invalid_operator(
                    MagicOp::PropertyType,
                    "first argument must be an object type",
                    span,
                )
            }
        };
        // A type-variable key stands in for its bound: permitted whenever
        // the bound covers a subset of the object's keys.
        let effective = match self.types.kind(key) {
            TypeKind::TypeParameter {
                constraint: Some(c),
                ..
            } => *c,
            _ => key,
        };
        let names = match self.key_names(effective) {
            Some(names) => names,
            None => {
                return self.invalid_operator(
                    MagicOp::PropertyType,
                    "key must be a string literal or a type bound to object keys",
                    span,
                )
            }
        };
        let mut values = Vec::new();
        for name in names {
            match fields.get(&name) {
                Some(&field) => values.push(field),
                None => {
                    let object_type = self.types.type_to_string(obj);
                    let key = self.types.strings().resolve(name).to_string();
                    self.report(ErrorKind::UnknownProperty { object_type, key }, span);
                    return self.types.unknown;
                }
            }
        }
        self.types.union_of(values)
    }

    fn eval_return_type(&mut self, args: &[TypeId], span: TextSpan) -> TypeId {
        let (return_type, type_params) = match self.types.kind(args[0]) {
            TypeKind::Function {
                return_type,
                type_params,
                ..
            } => (*return_type, type_params.clone()),
            _ => {
                return self.invalid_operator(
                    MagicOp::ReturnType,
                    "first argument must be a function type",
                    span,
                )
            }
        };
        let type_args = &args[1..];
        if type_args.len() != type_params.len() {
            self.report(
                ErrorKind::ArityError {
                    expected: type_params.len(),
                    actual: type_args.len(),
                },
                span,
            );
            return self.types.unknown;
        }
        if type_params.is_empty() {
            return return_type;
        }
        let map: FxHashMap<Atom, TypeId> = type_params
            .iter()
            .zip(type_args.iter())
            .map(|(tp, &arg)| (tp.name, arg))
            .collect();
        self.types.substitute(return_type, &map)
    }

    fn eval_exactness(
        &mut self,
        obj: TypeId,
        exactness: Exactness,
        op: MagicOp,
        span: TextSpan,
    ) -> TypeId {
        match self.types.kind(obj) {
            TypeKind::Object { fields, .. } => {
                let fields = fields.clone();
                self.types.object(fields, exactness)
            }
            _ => self.invalid_operator(op, "argument must be an object type", span),
        }
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    fn object_fields(&self, obj: TypeId) -> Option<IndexMap<Atom, TypeId>> {
        match self.types.kind(obj) {
            TypeKind::Object { fields, .. } => Some(fields.clone()),
            _ => None,
        }
    }

    /// Interpret a key type as a list of field names: a single string
    /// literal or a union of string literals.
    fn key_names(&self, keys: TypeId) -> Option<Vec<Atom>> {
        match self.types.kind(keys) {
            TypeKind::StringLiteral(name) => Some(vec![*name]),
            TypeKind::Union { members } => {
                let mut names = Vec::with_capacity(members.len());
                for &member in members {
                    match self.types.kind(member) {
                        TypeKind::StringLiteral(name) => names.push(*name),
                        _ => return None,
                    }
                }
                Some(names)
            }
            _ => None,
        }
    }

    pub(crate) fn invalid_operator(
        &mut self,
        op: MagicOp,
        reason: &str,
        span: TextSpan,
    ) -> TypeId {
        self.report(
            ErrorKind::InvalidOperatorArgument {
                operator: op.name(),
                reason: reason.to_string(),
            },
            span,
        );
        self.types.unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_lookup() {
        assert_eq!(MagicOp::from_name("$Keys"), Some(MagicOp::Keys));
        assert_eq!(MagicOp::from_name("$Throws"), Some(MagicOp::Throws));
        assert_eq!(MagicOp::from_name("$Bogus"), None);
        assert_eq!(MagicOp::Pick.name(), "$Pick");
    }

    #[test]
    fn test_arity_metadata() {
        assert!(MagicOp::Keys.arity().accepts(1));
        assert!(!MagicOp::Keys.arity().accepts(2));
        assert!(MagicOp::InstanceOf.arity().accepts(3));
        assert!(!MagicOp::Intersection.arity().accepts(1));
        assert_eq!(MagicOp::Pick.arity().minimum(), 2);
    }
}
