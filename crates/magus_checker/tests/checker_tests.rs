//! End-to-end checking over whole modules: assignments, classes, arrays,
//! and the throw-type tracker.

use magus_checker::Checker;
use magus_core::{HirArena, StringInterner};
use magus_hir::{HirBuilder, KeywordType};

fn setup(arena: &HirArena) -> (HirBuilder<'_>, Checker<'_>) {
    let strings = StringInterner::new();
    let builder = HirBuilder::new(arena, strings.clone());
    let checker = Checker::new(strings);
    (builder, checker)
}

fn messages(checker: &Checker) -> Vec<String> {
    checker
        .diagnostics
        .diagnostics()
        .iter()
        .map(|d| d.kind.to_string())
        .collect()
}

#[test]
fn test_assigning_incompatible_literal_fails() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let module = b.module(vec![b.var_decl(
        "x",
        true,
        Some(b.keyword_ann(KeywordType::String)),
        Some(b.number(5.0)),
    )]);
    c.check_module(&module);
    assert_eq!(
        messages(&c),
        vec!["type '5' is incompatible with type 'string'"]
    );
}

#[test]
fn test_status_exclude_scenario() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let status = b.union_ann(&[
        b.string_lit_ann("Ok"),
        b.string_lit_ann("Failed"),
        b.string_lit_ann("Pending"),
        b.string_lit_ann("Canceled"),
    ]);
    let excluded = b.union_ann(&[b.string_lit_ann("Ok"), b.string_lit_ann("Failed")]);
    let rest = b.type_ref("$Exclude", &[b.type_ref("Status", &[]), excluded]);

    let module = b.module(vec![
        b.type_alias("Status", status),
        b.var_decl("good", true, Some(rest), Some(b.string("Pending"))),
        b.var_decl("bad", true, Some(rest), Some(b.string("Failed"))),
        b.var_decl("arr", true, Some(rest), Some(b.array(&[b.string("Failed")]))),
    ]);
    c.check_module(&module);

    let msgs = messages(&c);
    assert_eq!(msgs.len(), 2);
    assert_eq!(
        msgs[0],
        "type '\"Failed\"' is incompatible with type '\"Pending\" | \"Canceled\"'"
    );
    assert_eq!(
        msgs[1],
        "type 'Array<string>' is incompatible with type '\"Pending\" | \"Canceled\"'"
    );
}

#[test]
fn test_undefined_name_in_expression() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let module = b.module(vec![b.var_decl("x", true, None, Some(b.ident("nope")))]);
    c.check_module(&module);
    assert_eq!(messages(&c), vec!["cannot find name 'nope'"]);
}

#[test]
fn test_let_bindings_widen_literals_const_bindings_do_not() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let module = b.module(vec![
        b.var_decl("wide", false, None, Some(b.string("Ok"))),
        b.var_decl(
            "narrowed",
            false,
            Some(b.typeof_ident("wide")),
            Some(b.string("anything")),
        ),
        b.var_decl("pinned", true, None, Some(b.string("Ok"))),
        b.var_decl(
            "must_match",
            false,
            Some(b.typeof_ident("pinned")),
            Some(b.string("Other")),
        ),
    ]);
    c.check_module(&module);
    // The let-derived type is plain string, so any string fits; the
    // const-derived type is the literal "Ok".
    assert_eq!(
        messages(&c),
        vec!["type '\"Other\"' is incompatible with type '\"Ok\"'"]
    );
}

#[test]
fn test_nominal_classes_reject_disjoint_hierarchies() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let name_field = ("name", b.keyword_ann(KeywordType::String));
    let module = b.module(vec![
        b.class("Animal", None, &[name_field]),
        b.class("Dog", Some("Animal"), &[]),
        b.class("Plant", None, &[name_field]),
        b.var_decl(
            "pet",
            true,
            Some(b.type_ref("Animal", &[])),
            Some(b.new_expr("Dog", &[])),
        ),
        b.var_decl(
            "weed",
            true,
            Some(b.type_ref("Plant", &[])),
            Some(b.new_expr("Dog", &[])),
        ),
        b.var_decl(
            "downcast",
            true,
            Some(b.type_ref("Dog", &[])),
            Some(b.new_expr("Animal", &[])),
        ),
    ]);
    c.check_module(&module);
    assert_eq!(
        messages(&c),
        vec![
            "type 'Dog' is incompatible with type 'Plant'",
            "type 'Animal' is incompatible with type 'Dog'",
        ]
    );
}

#[test]
fn test_disjoint_instance_types_via_operators() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let shape = ("name", b.keyword_ann(KeywordType::String));
    let module = b.module(vec![
        b.class("Dog", None, &[shape]),
        b.class("Plant", None, &[shape]),
    ]);
    c.check_module(&module);

    let dog = c.resolve_annotation(b.type_ref(
        "$InstanceOf",
        &[b.type_ref("$Class", &[b.type_ref("Dog", &[])])],
    ));
    let plant = c.resolve_annotation(b.type_ref(
        "$InstanceOf",
        &[b.type_ref("$Class", &[b.type_ref("Plant", &[])])],
    ));
    assert!(!c.is_subtype(dog, plant));
    assert!(!c.is_subtype(plant, dog));
}

#[test]
fn test_array_invariance_and_immutable_covariance() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let number_arr = b.type_ref("Array", &[b.keyword_ann(KeywordType::Number)]);
    let mixed = b.union_ann(&[
        b.keyword_ann(KeywordType::Number),
        b.keyword_ann(KeywordType::String),
    ]);
    let mixed_arr = b.type_ref("Array", &[mixed]);

    let module = b.module(vec![
        b.var_decl("nums", true, Some(number_arr), Some(b.array(&[b.number(1.0)]))),
        // Mutable containers are invariant: rejected.
        b.var_decl("widened", true, Some(mixed_arr), Some(b.ident("nums"))),
        // Both sides immutable: covariant, accepted.
        b.var_decl(
            "frozen",
            true,
            Some(b.type_ref("$Immutable", &[number_arr])),
            Some(b.ident("nums")),
        ),
        b.var_decl(
            "frozen_wide",
            true,
            Some(b.type_ref("$Immutable", &[mixed_arr])),
            Some(b.ident("frozen")),
        ),
    ]);
    c.check_module(&module);
    assert_eq!(
        messages(&c),
        vec!["type 'Array<number>' is incompatible with type 'Array<number | string>'"]
    );
}

#[test]
fn test_call_arity_and_argument_types_are_checked() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let number = b.keyword_ann(KeywordType::Number);
    let module = b.module(vec![
        b.function(
            "add",
            &[("a", Some(number)), ("b", Some(number))],
            Some(number),
            vec![b.ret(Some(b.ident("a")))],
        ),
        b.expr_stmt(b.call(b.ident("add"), &[b.number(1.0)])),
        b.expr_stmt(b.call(b.ident("add"), &[b.string("x"), b.number(2.0)])),
    ]);
    c.check_module(&module);
    assert_eq!(
        messages(&c),
        vec![
            "expected 2 argument(s), but got 1",
            "type '\"x\"' is incompatible with type 'number'",
        ]
    );
}

#[test]
fn test_return_statements_are_checked_against_annotation() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let module = b.module(vec![b.function(
        "bad",
        &[],
        Some(b.keyword_ann(KeywordType::Number)),
        vec![b.ret(Some(b.string("oops")))],
    )]);
    c.check_module(&module);
    assert_eq!(
        messages(&c),
        vec!["type '\"oops\"' is incompatible with type 'number'"]
    );
}

#[test]
fn test_generic_alias_instantiation() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let t_ref = b.type_ref("T", &[]);
    let nullable = b.union_ann(&[t_ref, b.keyword_ann(KeywordType::Null)]);
    let module = b.module(vec![
        b.type_alias_generic("Nullable", &[("T", None)], nullable),
        b.var_decl(
            "ok",
            true,
            Some(b.type_ref("Nullable", &[b.keyword_ann(KeywordType::Number)])),
            Some(b.null()),
        ),
        b.var_decl(
            "bad",
            true,
            Some(b.type_ref("Nullable", &[b.keyword_ann(KeywordType::Number)])),
            Some(b.string("no")),
        ),
    ]);
    c.check_module(&module);
    assert_eq!(
        messages(&c),
        vec!["type '\"no\"' is incompatible with type 'number | null'"]
    );
}

#[test]
fn test_alias_arity_mismatch() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let t_ref = b.type_ref("T", &[]);
    let module = b.module(vec![
        b.type_alias_generic("Box", &[("T", None)], t_ref),
        b.var_decl("x", true, Some(b.type_ref("Box", &[])), None),
    ]);
    c.check_module(&module);
    assert_eq!(messages(&c), vec!["expected 1 argument(s), but got 0"]);
}

// ----------------------------------------------------------------------
// Throw-type tracking
// ----------------------------------------------------------------------

#[test]
fn test_declared_throws_with_no_throw_is_missing_throw() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let module = b.module(vec![
        b.class("Error", None, &[("message", b.keyword_ann(KeywordType::String))]),
        b.function(
            "quiet",
            &[],
            Some(b.type_ref("$Throws", &[b.type_ref("Error", &[])])),
            vec![],
        ),
    ]);
    c.check_module(&module);
    assert_eq!(
        messages(&c),
        vec!["function is declared to throw 'Error' but throws nothing"]
    );
}

#[test]
fn test_throwing_superclass_against_declared_subclass_fails() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let message = ("message", b.keyword_ann(KeywordType::String));
    let module = b.module(vec![
        b.class("Error", None, &[message]),
        b.class("TypeError", Some("Error"), &[]),
        b.function(
            "boom",
            &[],
            Some(b.type_ref("$Throws", &[b.type_ref("TypeError", &[])])),
            vec![b.throw(b.new_expr("Error", &[b.string("x")]))],
        ),
    ]);
    c.check_module(&module);
    assert_eq!(
        messages(&c),
        vec!["thrown type 'Error' is incompatible with declared throw type 'TypeError'"]
    );
}

#[test]
fn test_throwing_subclass_against_declared_superclass_succeeds() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let message = ("message", b.keyword_ann(KeywordType::String));
    let module = b.module(vec![
        b.class("Error", None, &[message]),
        b.class("TypeError", Some("Error"), &[]),
        b.function(
            "boom",
            &[],
            Some(b.type_ref("$Throws", &[b.type_ref("Error", &[])])),
            vec![b.throw(b.new_expr("TypeError", &[b.string("x")]))],
        ),
    ]);
    c.check_module(&module);
    assert!(c.diagnostics.is_empty());
}

#[test]
fn test_undeclared_throwing_is_permitted() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let module = b.module(vec![
        b.class("Error", None, &[]),
        b.function(
            "unchecked",
            &[],
            Some(b.keyword_ann(KeywordType::Void)),
            vec![b.throw(b.new_expr("Error", &[]))],
        ),
    ]);
    c.check_module(&module);
    assert!(c.diagnostics.is_empty());
}

#[test]
fn test_thrown_types_propagate_through_calls() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let message = ("message", b.keyword_ann(KeywordType::String));
    let module = b.module(vec![
        b.class("Error", None, &[message]),
        b.class("TypeError", Some("Error"), &[]),
        b.function(
            "inner",
            &[],
            Some(b.type_ref("$Throws", &[b.type_ref("Error", &[])])),
            vec![b.throw(b.new_expr("Error", &[b.string("x")]))],
        ),
        // Calling `inner` propagates Error, which does not fit TypeError.
        b.function(
            "outer",
            &[],
            Some(b.type_ref("$Throws", &[b.type_ref("TypeError", &[])])),
            vec![b.expr_stmt(b.call(b.ident("inner"), &[]))],
        ),
        // Declaring the propagated type exactly is fine.
        b.function(
            "relay",
            &[],
            Some(b.type_ref("$Throws", &[b.type_ref("Error", &[])])),
            vec![b.expr_stmt(b.call(b.ident("inner"), &[]))],
        ),
    ]);
    c.check_module(&module);
    assert_eq!(
        messages(&c),
        vec!["thrown type 'Error' is incompatible with declared throw type 'TypeError'"]
    );
}

#[test]
fn test_throws_as_union_member_keeps_value_return_type() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let module = b.module(vec![
        b.class("Error", None, &[]),
        b.function(
            "parse",
            &[("input", Some(b.keyword_ann(KeywordType::String)))],
            Some(b.union_ann(&[
                b.keyword_ann(KeywordType::Number),
                b.type_ref("$Throws", &[b.type_ref("Error", &[])]),
            ])),
            vec![
                b.throw(b.new_expr("Error", &[])),
                b.ret(Some(b.number(0.0))),
            ],
        ),
        // The call's result is the value part of the annotation.
        b.var_decl(
            "n",
            true,
            Some(b.keyword_ann(KeywordType::Number)),
            Some(b.call(b.ident("parse"), &[b.string("42")])),
        ),
    ]);
    c.check_module(&module);
    assert!(c.diagnostics.is_empty(), "got {:?}", messages(&c));
}

#[test]
fn test_nested_function_throws_do_not_leak() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let module = b.module(vec![
        b.class("Error", None, &[]),
        b.function(
            "outer",
            &[],
            Some(b.type_ref("$Throws", &[b.type_ref("Error", &[])])),
            vec![
                // The inner function throws for itself; outer still needs
                // its own throw to satisfy the declaration.
                b.function(
                    "inner",
                    &[],
                    None,
                    vec![b.throw(b.new_expr("Error", &[]))],
                ),
                b.throw(b.new_expr("Error", &[])),
            ],
        ),
    ]);
    c.check_module(&module);
    assert!(c.diagnostics.is_empty());
}

#[test]
fn test_missing_throw_when_only_nested_function_throws() {
    let arena = HirArena::new();
    let (b, mut c) = setup(&arena);

    let module = b.module(vec![
        b.class("Error", None, &[]),
        b.function(
            "outer",
            &[],
            Some(b.type_ref("$Throws", &[b.type_ref("Error", &[])])),
            vec![b.function(
                "inner",
                &[],
                None,
                vec![b.throw(b.new_expr("Error", &[]))],
            )],
        ),
    ]);
    c.check_module(&module);
    assert_eq!(
        messages(&c),
        vec!["function is declared to throw 'Error' but throws nothing"]
    );
}
