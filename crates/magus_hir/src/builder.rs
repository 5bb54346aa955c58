//! Convenience constructors for HIR nodes.
//!
//! The builder owns references to the arena and interner and hands back
//! arena-allocated nodes with synthetic (empty) spans unless told otherwise.
//! Front ends with real positions attach their own spans; tests lean on the
//! defaults.

use crate::program::*;
use magus_core::{Atom, HirArena, StringInterner, TextSpan};

pub struct HirBuilder<'a> {
    arena: &'a HirArena,
    strings: StringInterner,
}

impl<'a> HirBuilder<'a> {
    pub fn new(arena: &'a HirArena, strings: StringInterner) -> Self {
        Self { arena, strings }
    }

    pub fn strings(&self) -> &StringInterner {
        &self.strings
    }

    pub fn atom(&self, s: &str) -> Atom {
        self.strings.intern(s)
    }

    pub fn module(&self, statements: Vec<Stmt<'a>>) -> Module<'a> {
        Module {
            statements: self.stmts(statements),
        }
    }

    /// Move a batch of statements into the arena.
    pub fn stmts(&self, statements: Vec<Stmt<'a>>) -> NodeList<'a, Stmt<'a>> {
        self.arena.bump().alloc_slice_fill_iter(statements)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    pub fn var_decl(
        &self,
        name: &str,
        is_const: bool,
        annotation: Option<&'a TypeAnn<'a>>,
        initializer: Option<&'a Expr<'a>>,
    ) -> Stmt<'a> {
        Stmt::VarDecl(VarDecl {
            name: self.atom(name),
            is_const,
            annotation,
            initializer,
            span: TextSpan::default(),
        })
    }

    pub fn expr_stmt(&self, expr: &'a Expr<'a>) -> Stmt<'a> {
        Stmt::Expr(expr)
    }

    pub fn function(
        &self,
        name: &str,
        params: &[(&str, Option<&'a TypeAnn<'a>>)],
        return_ann: Option<&'a TypeAnn<'a>>,
        body: Vec<Stmt<'a>>,
    ) -> Stmt<'a> {
        self.function_generic(name, &[], params, return_ann, body)
    }

    pub fn function_generic(
        &self,
        name: &str,
        type_params: &[(&str, Option<&'a TypeAnn<'a>>)],
        params: &[(&str, Option<&'a TypeAnn<'a>>)],
        return_ann: Option<&'a TypeAnn<'a>>,
        body: Vec<Stmt<'a>>,
    ) -> Stmt<'a> {
        Stmt::Function(FunctionDecl {
            name: self.atom(name),
            type_params: self.type_params(type_params),
            params: self
                .arena
                .bump()
                .alloc_slice_fill_iter(params.iter().map(|(name, annotation)| Param {
                    name: self.atom(name),
                    annotation: *annotation,
                    span: TextSpan::default(),
                })),
            return_ann,
            body: self.stmts(body),
            span: TextSpan::default(),
        })
    }

    pub fn class(
        &self,
        name: &str,
        superclass: Option<&str>,
        fields: &[(&str, &'a TypeAnn<'a>)],
    ) -> Stmt<'a> {
        self.class_generic(name, superclass, &[], fields)
    }

    pub fn class_generic(
        &self,
        name: &str,
        superclass: Option<&str>,
        type_params: &[(&str, Option<&'a TypeAnn<'a>>)],
        fields: &[(&str, &'a TypeAnn<'a>)],
    ) -> Stmt<'a> {
        Stmt::Class(ClassDecl {
            name: self.atom(name),
            superclass: superclass.map(|s| self.atom(s)),
            type_params: self.type_params(type_params),
            fields: self
                .arena
                .bump()
                .alloc_slice_fill_iter(fields.iter().map(|(name, annotation)| ClassField {
                    name: self.atom(name),
                    annotation,
                    span: TextSpan::default(),
                })),
            span: TextSpan::default(),
        })
    }

    pub fn type_alias(&self, name: &str, body: &'a TypeAnn<'a>) -> Stmt<'a> {
        self.type_alias_generic(name, &[], body)
    }

    pub fn type_alias_generic(
        &self,
        name: &str,
        type_params: &[(&str, Option<&'a TypeAnn<'a>>)],
        body: &'a TypeAnn<'a>,
    ) -> Stmt<'a> {
        Stmt::TypeAlias(TypeAliasDecl {
            name: self.atom(name),
            type_params: self.type_params(type_params),
            body,
            span: TextSpan::default(),
        })
    }

    fn type_params(
        &self,
        type_params: &[(&str, Option<&'a TypeAnn<'a>>)],
    ) -> NodeList<'a, TypeParamAnn<'a>> {
        self.arena
            .bump()
            .alloc_slice_fill_iter(type_params.iter().map(|(name, bound)| TypeParamAnn {
                name: self.atom(name),
                bound: *bound,
                span: TextSpan::default(),
            }))
    }

    pub fn if_stmt(
        &self,
        condition: &'a Expr<'a>,
        then_branch: Vec<Stmt<'a>>,
        else_branch: Vec<Stmt<'a>>,
    ) -> Stmt<'a> {
        Stmt::If(IfStmt {
            condition,
            then_branch: self.stmts(then_branch),
            else_branch: self.stmts(else_branch),
            span: TextSpan::default(),
        })
    }

    pub fn block(&self, statements: Vec<Stmt<'a>>) -> Stmt<'a> {
        Stmt::Block(BlockStmt {
            statements: self.stmts(statements),
            span: TextSpan::default(),
        })
    }

    pub fn try_stmt(
        &self,
        body: Vec<Stmt<'a>>,
        catch_param: Option<&str>,
        catch_body: Vec<Stmt<'a>>,
    ) -> Stmt<'a> {
        Stmt::Try(TryStmt {
            body: self.stmts(body),
            catch_param: catch_param.map(|p| self.atom(p)),
            catch_body: self.stmts(catch_body),
            span: TextSpan::default(),
        })
    }

    pub fn ret(&self, value: Option<&'a Expr<'a>>) -> Stmt<'a> {
        Stmt::Return(ReturnStmt {
            value,
            span: TextSpan::default(),
        })
    }

    pub fn throw(&self, value: &'a Expr<'a>) -> Stmt<'a> {
        Stmt::Throw(ThrowStmt {
            value,
            span: TextSpan::default(),
        })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    pub fn ident(&self, name: &str) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Ident(Ident {
            name: self.atom(name),
            span: TextSpan::default(),
        }))
    }

    pub fn string(&self, value: &str) -> &'a Expr<'a> {
        self.arena.alloc(Expr::StringLit(StringLit {
            value: self.atom(value),
            span: TextSpan::default(),
        }))
    }

    pub fn number(&self, value: f64) -> &'a Expr<'a> {
        self.arena.alloc(Expr::NumberLit(NumberLit {
            value,
            span: TextSpan::default(),
        }))
    }

    pub fn bool(&self, value: bool) -> &'a Expr<'a> {
        self.arena.alloc(Expr::BoolLit(BoolLit {
            value,
            span: TextSpan::default(),
        }))
    }

    pub fn null(&self) -> &'a Expr<'a> {
        self.arena.alloc(Expr::NullLit(TextSpan::default()))
    }

    pub fn array(&self, elements: &[&'a Expr<'a>]) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Array(ArrayLit {
            elements: self.arena.alloc_slice(elements),
            span: TextSpan::default(),
        }))
    }

    pub fn object(&self, props: &[(&str, &'a Expr<'a>)]) -> &'a Expr<'a> {
        let properties = self
            .arena
            .bump()
            .alloc_slice_fill_iter(props.iter().map(|(key, value)| ObjectProp {
                key: self.atom(key),
                value,
                span: TextSpan::default(),
            }));
        self.arena.alloc(Expr::Object(ObjectLit {
            properties,
            span: TextSpan::default(),
        }))
    }

    pub fn call(&self, callee: &'a Expr<'a>, arguments: &[&'a Expr<'a>]) -> &'a Expr<'a> {
        self.arena.alloc(Expr::Call(CallExpr {
            callee,
            arguments: self.arena.alloc_slice(arguments),
            span: TextSpan::default(),
        }))
    }

    pub fn new_expr(&self, class: &str, arguments: &[&'a Expr<'a>]) -> &'a Expr<'a> {
        self.arena.alloc(Expr::New(NewExpr {
            callee: self.atom(class),
            arguments: self.arena.alloc_slice(arguments),
            span: TextSpan::default(),
        }))
    }

    // ------------------------------------------------------------------
    // Type annotations
    // ------------------------------------------------------------------

    pub fn keyword_ann(&self, keyword: KeywordType) -> &'a TypeAnn<'a> {
        self.arena.alloc(TypeAnn::Keyword(KeywordTypeAnn {
            keyword,
            span: TextSpan::default(),
        }))
    }

    pub fn string_lit_ann(&self, value: &str) -> &'a TypeAnn<'a> {
        self.arena.alloc(TypeAnn::StringLit(StringLitAnn {
            value: self.atom(value),
            span: TextSpan::default(),
        }))
    }

    pub fn number_lit_ann(&self, value: f64) -> &'a TypeAnn<'a> {
        self.arena.alloc(TypeAnn::NumberLit(NumberLitAnn {
            value,
            span: TextSpan::default(),
        }))
    }

    pub fn bool_lit_ann(&self, value: bool) -> &'a TypeAnn<'a> {
        self.arena.alloc(TypeAnn::BoolLit(BoolLitAnn {
            value,
            span: TextSpan::default(),
        }))
    }

    pub fn type_ref(&self, name: &str, type_args: &[&'a TypeAnn<'a>]) -> &'a TypeAnn<'a> {
        self.arena.alloc(TypeAnn::Ref(TypeRefAnn {
            name: self.atom(name),
            type_args: self.arena.alloc_slice(type_args),
            span: TextSpan::default(),
        }))
    }

    pub fn object_ann(&self, fields: &[(&str, &'a TypeAnn<'a>)], exact: bool) -> &'a TypeAnn<'a> {
        let fields = self
            .arena
            .bump()
            .alloc_slice_fill_iter(fields.iter().map(|(name, annotation)| ObjectAnnField {
                name: self.atom(name),
                annotation,
                span: TextSpan::default(),
            }));
        self.arena.alloc(TypeAnn::Object(ObjectAnn {
            fields,
            exact,
            span: TextSpan::default(),
        }))
    }

    pub fn union_ann(&self, members: &[&'a TypeAnn<'a>]) -> &'a TypeAnn<'a> {
        self.arena.alloc(TypeAnn::Union(CompositeAnn {
            members: self.arena.alloc_slice(members),
            span: TextSpan::default(),
        }))
    }

    pub fn intersection_ann(&self, members: &[&'a TypeAnn<'a>]) -> &'a TypeAnn<'a> {
        self.arena.alloc(TypeAnn::Intersection(CompositeAnn {
            members: self.arena.alloc_slice(members),
            span: TextSpan::default(),
        }))
    }

    pub fn function_ann(
        &self,
        params: &[&'a TypeAnn<'a>],
        return_type: &'a TypeAnn<'a>,
    ) -> &'a TypeAnn<'a> {
        self.arena.alloc(TypeAnn::Function(FunctionAnn {
            params: self.arena.alloc_slice(params),
            return_type,
            span: TextSpan::default(),
        }))
    }

    pub fn query_ann(&self, target: QueryTarget) -> &'a TypeAnn<'a> {
        self.arena.alloc(TypeAnn::Query(QueryAnn {
            target,
            span: TextSpan::default(),
        }))
    }

    pub fn typeof_ident(&self, name: &str) -> &'a TypeAnn<'a> {
        self.query_ann(QueryTarget::Ident(self.atom(name)))
    }
}
