//! The checking driver: walks a module, resolves annotations, checks
//! assignments and calls, and runs the throw tracker over function bodies.

use crate::env::{AliasDef, Environment};
use crate::types::{ClassDef, Exactness, TypeKind, TypeParam, TypeTable};
use indexmap::IndexMap;
use magus_core::{Atom, StringInterner, TextSpan};
use magus_diagnostics::{Diagnostic, DiagnosticCollection, ErrorKind};
use magus_hir::{
    ClassDecl, Expr, FunctionDecl, Module, Stmt, TypeAliasDecl, TypeFlags, TypeId, TypeParamAnn,
    VarDecl,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// One checking pass over one module. Owns the type table, the lexical
/// environment, and the diagnostic buffer; nothing here is shared between
/// passes or threads.
pub struct Checker<'a> {
    pub types: TypeTable,
    pub diagnostics: DiagnosticCollection,
    pub(crate) env: Environment<'a>,
    pub(crate) subtype_cache: FxHashMap<(TypeId, TypeId), bool>,
    pub(crate) resolving_aliases: FxHashSet<Atom>,
    pub(crate) type_param_scopes: Vec<FxHashMap<Atom, TypeId>>,
    pub(crate) thrown_stack: Vec<Vec<TypeId>>,
    /// Declared return type of the enclosing function, when annotated.
    return_stack: Vec<Option<TypeId>>,
    file: Option<String>,
}

impl<'a> Checker<'a> {
    pub fn new(strings: StringInterner) -> Self {
        Self {
            types: TypeTable::new(strings),
            diagnostics: DiagnosticCollection::new(),
            env: Environment::new(),
            subtype_cache: FxHashMap::default(),
            resolving_aliases: FxHashSet::default(),
            type_param_scopes: Vec::new(),
            thrown_stack: Vec::new(),
            return_stack: Vec::new(),
            file: None,
        }
    }

    pub fn with_file(strings: StringInterner, file: impl Into<String>) -> Self {
        let mut checker = Self::new(strings);
        checker.file = Some(file.into());
        checker
    }

    pub(crate) fn report(&mut self, kind: ErrorKind, span: TextSpan) {
        let mut diag = Diagnostic::with_span(kind, span);
        if let Some(ref file) = self.file {
            diag = diag.in_file(file.clone());
        }
        self.diagnostics.add(diag);
    }

    /// Check a whole module in one pass. Declarations bind as they are
    /// encountered; every failure is a local diagnostic.
    pub fn check_module(&mut self, module: &'a Module<'a>) {
        self.check_statements(module.statements);
    }

    fn check_statements(&mut self, statements: &'a [Stmt<'a>]) {
        for stmt in statements {
            self.check_statement(stmt);
        }
    }

    fn check_statement(&mut self, stmt: &'a Stmt<'a>) {
        match stmt {
            Stmt::VarDecl(decl) => self.check_var_decl(decl),
            Stmt::Function(decl) => self.check_function(decl),
            Stmt::Class(decl) => self.check_class(decl),
            Stmt::TypeAlias(decl) => self.check_type_alias(decl),
            Stmt::Expr(expr) => {
                self.check_expression(expr);
            }
            Stmt::Return(ret) => {
                let actual = match ret.value {
                    Some(value) => self.check_expression(value),
                    None => self.types.undefined,
                };
                if let Some(Some(declared)) = self.return_stack.last().copied() {
                    if !self.is_subtype(actual, declared) {
                        let found = self.types.type_to_string(actual);
                        let expected = self.types.type_to_string(declared);
                        self.report(ErrorKind::IncompatibleType { found, expected }, ret.span);
                    }
                }
            }
            Stmt::Throw(throw) => {
                let ty = self.check_expression(throw.value);
                self.record_thrown(ty);
            }
            Stmt::If(if_stmt) => {
                self.check_expression(if_stmt.condition);
                self.env.push_scope();
                self.check_statements(if_stmt.then_branch);
                self.env.pop_scope();
                self.env.push_scope();
                self.check_statements(if_stmt.else_branch);
                self.env.pop_scope();
            }
            Stmt::Block(block) => {
                self.env.push_scope();
                self.check_statements(block.statements);
                self.env.pop_scope();
            }
            Stmt::Try(try_stmt) => {
                self.env.push_scope();
                self.check_statements(try_stmt.body);
                self.env.pop_scope();
                self.env.push_scope();
                if let Some(param) = try_stmt.catch_param {
                    let unknown = self.types.unknown;
                    self.env.bind_value(param, unknown);
                }
                self.check_statements(try_stmt.catch_body);
                self.env.pop_scope();
            }
        }
    }

    fn check_var_decl(&mut self, decl: &'a VarDecl<'a>) {
        let initializer = decl.initializer.map(|e| self.check_expression(e));
        let declared = decl.annotation.map(|a| self.resolve_annotation(a));

        let bound = match (declared, initializer) {
            (Some(declared), Some(actual)) => {
                if !self.is_subtype(actual, declared) {
                    let found = self.types.type_to_string(actual);
                    let expected = self.types.type_to_string(declared);
                    self.report(ErrorKind::IncompatibleType { found, expected }, decl.span);
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(actual)) => {
                if decl.is_const {
                    actual
                } else {
                    self.widen_literal(actual)
                }
            }
            (None, None) => self.types.unknown,
        };
        self.env.bind_value(decl.name, bound);
    }

    fn check_function(&mut self, decl: &'a FunctionDecl<'a>) {
        let type_params = self.bind_type_params(decl.type_params);

        let params: Vec<TypeId> = decl
            .params
            .iter()
            .map(|p| match p.annotation {
                Some(ann) => self.resolve_annotation(ann),
                None => self.types.unknown,
            })
            .collect();
        let (return_type, thrown) = self.resolve_return_annotation(decl.return_ann);
        let fn_type = self
            .types
            .function(params.clone(), return_type, type_params, thrown);
        // Bound before the body so recursive calls see the function.
        self.env.bind_value(decl.name, fn_type);

        self.env.push_scope();
        for (param, &ty) in decl.params.iter().zip(params.iter()) {
            self.env.bind_value(param.name, ty);
        }
        self.return_stack
            .push(decl.return_ann.map(|_| return_type));
        self.push_throw_scope();

        self.check_statements(decl.body);

        let collected = self.pop_throw_scope();
        self.return_stack.pop();
        self.env.pop_scope();
        if !decl.type_params.is_empty() {
            self.type_param_scopes.pop();
        }

        self.validate_thrown(thrown, collected, decl.span);
    }

    fn check_class(&mut self, decl: &'a ClassDecl<'a>) {
        let superclass = match decl.superclass {
            Some(name) => match self.env.lookup_class(name) {
                Some(class) => Some(class),
                None => {
                    let name = self.types.strings().resolve(name).to_string();
                    self.report(ErrorKind::CannotFindName { name }, decl.span);
                    None
                }
            },
            None => None,
        };
        let type_params = self.bind_type_params(decl.type_params);

        let mut fields = IndexMap::new();
        for field in decl.fields {
            let ty = self.resolve_annotation(field.annotation);
            fields.insert(field.name, ty);
        }
        // Inherited fields come first, in the superclass's order.
        if let Some(sup) = superclass {
            let sup_shape = self.types.class(sup).shape;
            if let TypeKind::Object {
                fields: sup_fields, ..
            } = self.types.kind(sup_shape)
            {
                let mut merged = sup_fields.clone();
                for (name, ty) in fields {
                    merged.insert(name, ty);
                }
                fields = merged;
            }
        }
        let shape = self.types.object(fields, Exactness::Inexact);

        let class = self.types.add_class(ClassDef {
            name: decl.name,
            superclass,
            shape,
            type_params,
        });
        self.env.bind_class(decl.name, class);

        if !decl.type_params.is_empty() {
            self.type_param_scopes.pop();
        }
    }

    fn check_type_alias(&mut self, decl: &'a TypeAliasDecl<'a>) {
        if !decl.type_params.is_empty() {
            self.env.bind_alias(
                decl.name,
                AliasDef {
                    type_params: decl.type_params,
                    body: decl.body,
                    resolved: None,
                },
            );
            return;
        }
        // Bind the unresolved definition first so a self-reference inside
        // the body hits the cycle guard instead of CannotFindName.
        self.env.bind_alias(
            decl.name,
            AliasDef {
                type_params: decl.type_params,
                body: decl.body,
                resolved: None,
            },
        );
        self.resolving_aliases.insert(decl.name);
        let resolved = self.resolve_annotation(decl.body);
        self.resolving_aliases.remove(&decl.name);
        self.env.bind_alias(
            decl.name,
            AliasDef {
                type_params: decl.type_params,
                body: decl.body,
                resolved: Some(resolved),
            },
        );
    }

    /// Resolve declared type parameters into `TypeParameter` nodes and push
    /// a resolution scope for them. The caller pops the scope when the
    /// declaration's body is done (only if the list was non-empty).
    fn bind_type_params(&mut self, type_params: &'a [TypeParamAnn<'a>]) -> Vec<TypeParam> {
        if type_params.is_empty() {
            return Vec::new();
        }
        let mut resolved = Vec::with_capacity(type_params.len());
        let mut scope = FxHashMap::default();
        for tp in type_params {
            let constraint = tp.bound.map(|b| self.resolve_annotation(b));
            let ty = self.types.add(TypeKind::TypeParameter {
                name: tp.name,
                constraint,
            });
            scope.insert(tp.name, ty);
            resolved.push(TypeParam {
                name: tp.name,
                constraint,
            });
        }
        self.type_param_scopes.push(scope);
        resolved
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    pub fn check_expression(&mut self, expr: &'a Expr<'a>) -> TypeId {
        match expr {
            Expr::Ident(ident) => match self.env.lookup_value(ident.name) {
                Some(ty) => ty,
                None => {
                    let name = self.types.strings().resolve(ident.name).to_string();
                    self.report(ErrorKind::CannotFindName { name }, ident.span);
                    self.types.unknown
                }
            },
            Expr::StringLit(lit) => self.types.string_literal(lit.value),
            Expr::NumberLit(lit) => self.types.number_literal(lit.value),
            Expr::BoolLit(lit) => self.types.boolean_literal(lit.value),
            Expr::NullLit(_) => self.types.null,
            Expr::Array(array) => {
                // Element literals widen to their base primitive; arrays are
                // invariant, so `[1, 2]` must type as `Array<number>` rather
                // than `Array<1 | 2>`.
                let elements: Vec<TypeId> = array
                    .elements
                    .iter()
                    .map(|&e| {
                        let ty = self.check_expression(e);
                        self.widen_literal(ty)
                    })
                    .collect();
                let element = self.types.union_of(elements);
                self.types.array(element)
            }
            Expr::Object(object) => {
                let mut fields = IndexMap::new();
                for prop in object.properties {
                    let ty = self.check_expression(prop.value);
                    fields.insert(prop.key, ty);
                }
                self.types.object(fields, Exactness::Exact)
            }
            Expr::Call(call) => self.check_call(call),
            Expr::New(new_expr) => {
                for &arg in new_expr.arguments {
                    self.check_expression(arg);
                }
                match self.env.lookup_class(new_expr.callee) {
                    Some(class) => self.types.instance_type(class),
                    None => {
                        let name = self.types.strings().resolve(new_expr.callee).to_string();
                        self.report(ErrorKind::CannotFindName { name }, new_expr.span);
                        self.types.unknown
                    }
                }
            }
        }
    }

    fn check_call(&mut self, call: &'a magus_hir::CallExpr<'a>) -> TypeId {
        let callee = self.check_expression(call.callee);
        let (params, return_type, thrown) = match self.types.kind(callee) {
            TypeKind::Function {
                params,
                return_type,
                thrown,
                ..
            } => (params.clone(), *return_type, *thrown),
            _ => {
                if !self.types.flags(callee).contains(TypeFlags::UNKNOWN) {
                    let found = self.types.type_to_string(callee);
                    self.report(
                        ErrorKind::IncompatibleType {
                            found,
                            expected: "function".to_string(),
                        },
                        call.span,
                    );
                }
                return self.types.unknown;
            }
        };

        if call.arguments.len() != params.len() {
            self.report(
                ErrorKind::ArityError {
                    expected: params.len(),
                    actual: call.arguments.len(),
                },
                call.span,
            );
            return return_type;
        }
        for (&arg, &param) in call.arguments.iter().zip(params.iter()) {
            let actual = self.check_expression(arg);
            if !self.is_subtype(actual, param) {
                let found = self.types.type_to_string(actual);
                let expected = self.types.type_to_string(param);
                self.report(ErrorKind::IncompatibleType { found, expected }, arg.span());
            }
        }
        // Calling a function that declares a thrown type propagates it to
        // the enclosing body's thrown set.
        if let Some(thrown) = thrown {
            self.record_thrown(thrown);
        }
        return_type
    }

    /// Widen a literal type to its base primitive; used for mutable `let`
    /// bindings without an annotation.
    fn widen_literal(&mut self, ty: TypeId) -> TypeId {
        let flags = self.types.flags(ty);
        if flags.contains(TypeFlags::STRING_LITERAL) {
            self.types.string
        } else if flags.contains(TypeFlags::NUMBER_LITERAL) {
            self.types.number
        } else if flags.contains(TypeFlags::BOOLEAN_LITERAL) {
            self.types.boolean
        } else {
            ty
        }
    }
}
