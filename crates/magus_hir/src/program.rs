//! HIR node definitions.
//!
//! Nodes are immutable and arena-allocated; child lists are arena slices.
//! Identifiers and string literals are interned [`Atom`]s, so the nodes
//! themselves are `Copy`-cheap to traverse.

use magus_core::{Atom, TextSpan};

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

// ============================================================================
// Module and Statements
// ============================================================================

/// A single checked source module.
#[derive(Debug)]
pub struct Module<'a> {
    pub statements: NodeList<'a, Stmt<'a>>,
}

#[derive(Debug)]
pub enum Stmt<'a> {
    VarDecl(VarDecl<'a>),
    Function(FunctionDecl<'a>),
    Class(ClassDecl<'a>),
    TypeAlias(TypeAliasDecl<'a>),
    Expr(&'a Expr<'a>),
    Return(ReturnStmt<'a>),
    Throw(ThrowStmt<'a>),
    If(IfStmt<'a>),
    Block(BlockStmt<'a>),
    Try(TryStmt<'a>),
}

/// `let x: T = e;` or `const x = e;`
#[derive(Debug)]
pub struct VarDecl<'a> {
    pub name: Atom,
    pub is_const: bool,
    pub annotation: Option<&'a TypeAnn<'a>>,
    pub initializer: Option<&'a Expr<'a>>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct FunctionDecl<'a> {
    pub name: Atom,
    pub type_params: NodeList<'a, TypeParamAnn<'a>>,
    pub params: NodeList<'a, Param<'a>>,
    pub return_ann: Option<&'a TypeAnn<'a>>,
    pub body: NodeList<'a, Stmt<'a>>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct Param<'a> {
    pub name: Atom,
    pub annotation: Option<&'a TypeAnn<'a>>,
    pub span: TextSpan,
}

/// A declared type parameter, with an optional upper bound.
#[derive(Debug)]
pub struct TypeParamAnn<'a> {
    pub name: Atom,
    pub bound: Option<&'a TypeAnn<'a>>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct ClassDecl<'a> {
    pub name: Atom,
    pub superclass: Option<Atom>,
    pub type_params: NodeList<'a, TypeParamAnn<'a>>,
    pub fields: NodeList<'a, ClassField<'a>>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct ClassField<'a> {
    pub name: Atom,
    pub annotation: &'a TypeAnn<'a>,
    pub span: TextSpan,
}

/// `type Name<T> = T | ...;`
#[derive(Debug)]
pub struct TypeAliasDecl<'a> {
    pub name: Atom,
    pub type_params: NodeList<'a, TypeParamAnn<'a>>,
    pub body: &'a TypeAnn<'a>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct ReturnStmt<'a> {
    pub value: Option<&'a Expr<'a>>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct ThrowStmt<'a> {
    pub value: &'a Expr<'a>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct IfStmt<'a> {
    pub condition: &'a Expr<'a>,
    pub then_branch: NodeList<'a, Stmt<'a>>,
    pub else_branch: NodeList<'a, Stmt<'a>>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct BlockStmt<'a> {
    pub statements: NodeList<'a, Stmt<'a>>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct TryStmt<'a> {
    pub body: NodeList<'a, Stmt<'a>>,
    /// Catch clause binding name, if the catch clause binds one.
    pub catch_param: Option<Atom>,
    pub catch_body: NodeList<'a, Stmt<'a>>,
    pub span: TextSpan,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug)]
pub enum Expr<'a> {
    Ident(Ident),
    StringLit(StringLit),
    NumberLit(NumberLit),
    BoolLit(BoolLit),
    NullLit(TextSpan),
    Array(ArrayLit<'a>),
    Object(ObjectLit<'a>),
    Call(CallExpr<'a>),
    New(NewExpr<'a>),
}

impl<'a> Expr<'a> {
    pub fn span(&self) -> TextSpan {
        match self {
            Expr::Ident(e) => e.span,
            Expr::StringLit(e) => e.span,
            Expr::NumberLit(e) => e.span,
            Expr::BoolLit(e) => e.span,
            Expr::NullLit(span) => *span,
            Expr::Array(e) => e.span,
            Expr::Object(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::New(e) => e.span,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ident {
    pub name: Atom,
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct StringLit {
    pub value: Atom,
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct NumberLit {
    pub value: f64,
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct BoolLit {
    pub value: bool,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct ArrayLit<'a> {
    pub elements: NodeList<'a, &'a Expr<'a>>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct ObjectLit<'a> {
    pub properties: NodeList<'a, ObjectProp<'a>>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct ObjectProp<'a> {
    pub key: Atom,
    pub value: &'a Expr<'a>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct CallExpr<'a> {
    pub callee: &'a Expr<'a>,
    pub arguments: NodeList<'a, &'a Expr<'a>>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct NewExpr<'a> {
    pub callee: Atom,
    pub arguments: NodeList<'a, &'a Expr<'a>>,
    pub span: TextSpan,
}

// ============================================================================
// Type Annotations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordType {
    Unknown,
    Never,
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Void,
}

#[derive(Debug)]
pub enum TypeAnn<'a> {
    Keyword(KeywordTypeAnn),
    StringLit(StringLitAnn),
    NumberLit(NumberLitAnn),
    BoolLit(BoolLitAnn),
    /// A named type reference, possibly with type arguments. Operator
    /// applications (`$Pick<O, K>`) and class references both arrive here;
    /// resolution tells them apart by the `$` prefix.
    Ref(TypeRefAnn<'a>),
    Object(ObjectAnn<'a>),
    Union(CompositeAnn<'a>),
    Intersection(CompositeAnn<'a>),
    Function(FunctionAnn<'a>),
    /// A `$TypeOf`-style query over a value expression.
    Query(QueryAnn),
}

impl<'a> TypeAnn<'a> {
    pub fn span(&self) -> TextSpan {
        match self {
            TypeAnn::Keyword(a) => a.span,
            TypeAnn::StringLit(a) => a.span,
            TypeAnn::NumberLit(a) => a.span,
            TypeAnn::BoolLit(a) => a.span,
            TypeAnn::Ref(a) => a.span,
            TypeAnn::Object(a) => a.span,
            TypeAnn::Union(a) => a.span,
            TypeAnn::Intersection(a) => a.span,
            TypeAnn::Function(a) => a.span,
            TypeAnn::Query(a) => a.span,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordTypeAnn {
    pub keyword: KeywordType,
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct StringLitAnn {
    pub value: Atom,
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct NumberLitAnn {
    pub value: f64,
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct BoolLitAnn {
    pub value: bool,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct TypeRefAnn<'a> {
    pub name: Atom,
    pub type_args: NodeList<'a, &'a TypeAnn<'a>>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct ObjectAnn<'a> {
    pub fields: NodeList<'a, ObjectAnnField<'a>>,
    /// `{| ... |}` object annotations are exact; `{ ... }` are inexact.
    pub exact: bool,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct ObjectAnnField<'a> {
    pub name: Atom,
    pub annotation: &'a TypeAnn<'a>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct CompositeAnn<'a> {
    pub members: NodeList<'a, &'a TypeAnn<'a>>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct FunctionAnn<'a> {
    pub params: NodeList<'a, &'a TypeAnn<'a>>,
    pub return_type: &'a TypeAnn<'a>,
    pub span: TextSpan,
}

/// The value expression inside a type query. Only bare identifiers resolve;
/// the other forms exist so the checker can reject them with a diagnostic
/// rather than the front end silently dropping the annotation.
#[derive(Debug, Clone, Copy)]
pub enum QueryTarget {
    /// `$TypeOf<x>`
    Ident(Atom),
    /// `$TypeOf<obj.prop>`
    Member(Atom, Atom),
    /// `$TypeOf<f(...)>`
    Call(Atom),
}

#[derive(Debug, Clone, Copy)]
pub struct QueryAnn {
    pub target: QueryTarget,
    pub span: TextSpan,
}
