//! Annotation resolution: HIR type annotations to interned type nodes.
//!
//! This is where `$`-prefixed references dispatch into the operator
//! evaluator, `Array<T>` and class references are recognized, aliases are
//! expanded (with a cycle guard), and `$TypeOf` queries consult the value
//! environment.

use crate::checker::Checker;
use crate::operators::MagicOp;
use crate::types::{Exactness, TypeKind};
use indexmap::IndexMap;
use magus_core::{Atom, TextSpan};
use magus_diagnostics::ErrorKind;
use magus_hir::{
    KeywordType, QueryTarget, TypeAnn, TypeId, TypeRefAnn,
};
use rustc_hash::FxHashMap;

impl<'a> Checker<'a> {
    /// Resolve a type annotation to a type id. Never fails: unresolvable
    /// annotations record a diagnostic and degrade to `unknown`.
    pub fn resolve_annotation(&mut self, ann: &'a TypeAnn<'a>) -> TypeId {
        match ann {
            TypeAnn::Keyword(k) => self.keyword_type(k.keyword),
            TypeAnn::StringLit(lit) => self.types.string_literal(lit.value),
            TypeAnn::NumberLit(lit) => self.types.number_literal(lit.value),
            TypeAnn::BoolLit(lit) => self.types.boolean_literal(lit.value),
            TypeAnn::Object(obj) => {
                let mut fields = IndexMap::new();
                for field in obj.fields {
                    let ty = self.resolve_annotation(field.annotation);
                    fields.insert(field.name, ty);
                }
                let exactness = if obj.exact {
                    Exactness::Exact
                } else {
                    Exactness::Inexact
                };
                self.types.object(fields, exactness)
            }
            TypeAnn::Union(composite) => {
                let members: Vec<TypeId> = composite
                    .members
                    .iter()
                    .map(|&m| self.resolve_annotation(m))
                    .collect();
                self.types.union_of(members)
            }
            TypeAnn::Intersection(composite) => {
                let members: Vec<TypeId> = composite
                    .members
                    .iter()
                    .map(|&m| self.resolve_annotation(m))
                    .collect();
                self.types.intersection_of(members)
            }
            TypeAnn::Function(f) => {
                let params: Vec<TypeId> =
                    f.params.iter().map(|&p| self.resolve_annotation(p)).collect();
                let return_type = self.resolve_annotation(f.return_type);
                self.types.function(params, return_type, vec![], None)
            }
            TypeAnn::Query(query) => self.resolve_query(query.target, query.span),
            TypeAnn::Ref(r) => self.resolve_reference(r),
        }
    }

    fn keyword_type(&self, keyword: KeywordType) -> TypeId {
        match keyword {
            KeywordType::Unknown => self.types.unknown,
            KeywordType::Never => self.types.never,
            KeywordType::String => self.types.string,
            KeywordType::Number => self.types.number,
            KeywordType::Boolean => self.types.boolean,
            KeywordType::Null => self.types.null,
            KeywordType::Undefined => self.types.undefined,
            KeywordType::Void => self.types.void,
        }
    }

    /// `$TypeOf` resolves only bare identifiers bound in the active scope.
    fn resolve_query(&mut self, target: QueryTarget, span: TextSpan) -> TypeId {
        match target {
            QueryTarget::Ident(name) => match self.env.lookup_value(name) {
                Some(ty) => ty,
                None => {
                    let name = self.types.strings().resolve(name).to_string();
                    self.report(ErrorKind::UndefinedVariable { name }, span);
                    self.types.unknown
                }
            },
            QueryTarget::Member(..) | QueryTarget::Call(..) => {
                self.invalid_operator(MagicOp::TypeOf, "only works with identifier", span)
            }
        }
    }

    fn resolve_reference(&mut self, r: &'a TypeRefAnn<'a>) -> TypeId {
        let (op, is_dollar, is_array) = {
            let text = self.types.strings().resolve(r.name);
            (
                MagicOp::from_name(text),
                text.starts_with('$'),
                text == "Array",
            )
        };

        if is_dollar {
            let Some(op) = op else {
                let name = self.types.strings().resolve(r.name).to_string();
                self.report(ErrorKind::UnknownOperator { name }, r.span);
                return self.types.unknown;
            };
            return self.apply_operator(op, r);
        }

        if is_array {
            if r.type_args.len() != 1 {
                self.report(
                    ErrorKind::ArityError {
                        expected: 1,
                        actual: r.type_args.len(),
                    },
                    r.span,
                );
                return self.types.unknown;
            }
            let element = self.resolve_annotation(r.type_args[0]);
            return self.types.array(element);
        }

        if let Some(ty) = self.lookup_type_param(r.name) {
            return ty;
        }

        if self.env.lookup_alias(r.name).is_some() {
            return self.resolve_alias_reference(r);
        }

        if let Some(class) = self.env.lookup_class(r.name) {
            return self.resolve_class_reference(class, r);
        }

        let name = self.types.strings().resolve(r.name).to_string();
        self.report(ErrorKind::CannotFindName { name }, r.span);
        self.types.unknown
    }

    fn apply_operator(&mut self, op: MagicOp, r: &'a TypeRefAnn<'a>) -> TypeId {
        if !op.arity().accepts(r.type_args.len()) {
            self.report(
                ErrorKind::ArityError {
                    expected: op.arity().minimum(),
                    actual: r.type_args.len(),
                },
                r.span,
            );
            return self.types.unknown;
        }
        match op {
            // `$Throws` only means something inside a return annotation,
            // where the function checker strips it before resolution.
            MagicOp::Throws => self.invalid_operator(
                MagicOp::Throws,
                "only valid inside a function return annotation",
                r.span,
            ),
            // Written in reference form, `$TypeOf<x>` carries its target as
            // a bare type reference naming the value binding.
            MagicOp::TypeOf => match r.type_args[0] {
                TypeAnn::Ref(target) if target.type_args.is_empty() => {
                    self.resolve_query(QueryTarget::Ident(target.name), r.span)
                }
                _ => self.invalid_operator(MagicOp::TypeOf, "only works with identifier", r.span),
            },
            _ => {
                let args: Vec<TypeId> = r
                    .type_args
                    .iter()
                    .map(|&a| self.resolve_annotation(a))
                    .collect();
                self.evaluate_operator(op, &args, r.span)
            }
        }
    }

    fn resolve_alias_reference(&mut self, r: &'a TypeRefAnn<'a>) -> TypeId {
        let def = match self.env.lookup_alias(r.name) {
            Some(def) => def,
            None => return self.types.unknown,
        };
        if def.type_params.is_empty() {
            if !r.type_args.is_empty() {
                self.report(
                    ErrorKind::ArityError {
                        expected: 0,
                        actual: r.type_args.len(),
                    },
                    r.span,
                );
                return self.types.unknown;
            }
            if let Some(resolved) = def.resolved {
                return resolved;
            }
            // Still resolving this alias further up the stack: break the
            // cycle with unknown rather than recursing forever.
            if !self.resolving_aliases.insert(r.name) {
                return self.types.unknown;
            }
            let resolved = self.resolve_annotation(def.body);
            self.resolving_aliases.remove(&r.name);
            return resolved;
        }

        if r.type_args.len() != def.type_params.len() {
            self.report(
                ErrorKind::ArityError {
                    expected: def.type_params.len(),
                    actual: r.type_args.len(),
                },
                r.span,
            );
            return self.types.unknown;
        }
        if !self.resolving_aliases.insert(r.name) {
            return self.types.unknown;
        }
        let args: Vec<TypeId> = r
            .type_args
            .iter()
            .map(|&a| self.resolve_annotation(a))
            .collect();
        let mut scope = FxHashMap::default();
        for (tp, arg) in def.type_params.iter().zip(args) {
            scope.insert(tp.name, arg);
        }
        self.type_param_scopes.push(scope);
        let resolved = self.resolve_annotation(def.body);
        self.type_param_scopes.pop();
        self.resolving_aliases.remove(&r.name);
        resolved
    }

    fn resolve_class_reference(
        &mut self,
        class: magus_hir::ClassId,
        r: &'a TypeRefAnn<'a>,
    ) -> TypeId {
        let param_count = self.types.class(class).type_params.len();
        if r.type_args.len() != param_count {
            self.report(
                ErrorKind::ArityError {
                    expected: param_count,
                    actual: r.type_args.len(),
                },
                r.span,
            );
            return self.types.unknown;
        }
        let instance = self.types.instance_type(class);
        if r.type_args.is_empty() {
            return instance;
        }
        let args: Vec<TypeId> = r
            .type_args
            .iter()
            .map(|&a| self.resolve_annotation(a))
            .collect();
        self.types.add(TypeKind::GenericApplication {
            target: instance,
            args,
        })
    }

    /// Resolve a function's return annotation, splitting out a `$Throws`
    /// marker if the annotation is one, or contains one as a union member.
    /// Returns the value return type and the declared thrown type.
    pub(crate) fn resolve_return_annotation(
        &mut self,
        ann: Option<&'a TypeAnn<'a>>,
    ) -> (TypeId, Option<TypeId>) {
        let Some(ann) = ann else {
            return (self.types.void, None);
        };
        if let Some(err_ann) = self.as_throws_marker(ann) {
            let thrown = self.resolve_annotation(err_ann);
            return (self.types.void, Some(thrown));
        }
        if let TypeAnn::Union(composite) = ann {
            let mut thrown_parts = Vec::new();
            let mut value_parts = Vec::new();
            for &member in composite.members {
                match self.as_throws_marker(member) {
                    Some(err_ann) => thrown_parts.push(err_ann),
                    None => value_parts.push(member),
                }
            }
            if !thrown_parts.is_empty() {
                let thrown_types: Vec<TypeId> = thrown_parts
                    .into_iter()
                    .map(|e| self.resolve_annotation(e))
                    .collect();
                let thrown = self.types.union_of(thrown_types);
                let value_types: Vec<TypeId> = value_parts
                    .into_iter()
                    .map(|v| self.resolve_annotation(v))
                    .collect();
                let value = if value_types.is_empty() {
                    self.types.void
                } else {
                    self.types.union_of(value_types)
                };
                return (value, Some(thrown));
            }
        }
        (self.resolve_annotation(ann), None)
    }

    /// If `ann` is a well-formed `$Throws<E>` reference, return `E`.
    fn as_throws_marker(&self, ann: &'a TypeAnn<'a>) -> Option<&'a TypeAnn<'a>> {
        let TypeAnn::Ref(r) = ann else { return None };
        if self.types.strings().resolve(r.name) != "$Throws" {
            return None;
        }
        if r.type_args.len() == 1 {
            Some(r.type_args[0])
        } else {
            None
        }
    }

    pub(crate) fn lookup_type_param(&self, name: Atom) -> Option<TypeId> {
        self.type_param_scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
    }
}
