use mcx_staging::{StageError, stage};
use mcx_syntax::{
    fmt::{Formatter, Ugly},
    typed::*,
};
use mcx_tests::{build::*, utils};
use pretty_assertions::assert_eq;

fn staged_body(definitions: &Definitions, name: &str) -> String {
    let definition = definitions.0.get(&main(name)).unwrap();
    match stage(definitions, definition).unwrap() {
        | Some(Definition::Function(function)) => function.body.ugly(&Formatter::new()),
        | other => panic!("expected a staged function, got {:?}", other),
    }
}

/// `twice(c: code int) = `($c + $c)`, a compile-time helper
fn twice() -> Function {
    let c = || splice(var("c", 0, code_ty(int_ty())));
    let body = quote(prelude_call("int_add", c(), c(), int_ty()));
    let mut twice = function("twice", pvar("c", 0, code_ty(int_ty())), body);
    twice.annotations.push(Annotation::Static);
    twice
}

#[test]
fn compile_time_helpers_are_inlined_into_residual_code() {
    utils::init();
    let call = run(&main("twice"), quote(var("x", 0, int_ty())), code_ty(int_ty()));
    let f = function("f", pvar("x", 0, int_ty()), splice(call));
    let definitions = program([twice().into(), f.into()]);
    assert_eq!(staged_body(&definitions, "f"), "prelude::int_add((x@0, x@0))");
    // the helper itself never reaches the backend
    assert_eq!(stage(&definitions, &twice().into()), Ok(None));
}

#[test]
fn closed_splices_are_computed() {
    utils::init();
    let five = quote(prelude_call("int_add", int(2), int(3), int_ty()));
    let f = function("f", punit(), tuple([splice(five), int(1)]));
    let definitions = program([f.into()]);
    assert_eq!(staged_body(&definitions, "f"), "(5, 1)");
}

#[test]
fn staging_is_idempotent() {
    utils::init();
    let call = run(&main("twice"), quote(var("x", 0, int_ty())), code_ty(int_ty()));
    let f = function("f", pvar("x", 0, int_ty()), splice(call));
    let definitions = program([twice().into(), f.into()]);
    let once = stage(&definitions, &definitions.0[&main("f")]).unwrap().unwrap();
    let again = stage(&definitions, &once).unwrap().unwrap();
    assert_eq!(once, again);
}

#[test]
fn missing_builtins_are_reported() {
    utils::init();
    let mut definitions = program([]);
    let mystery = Function {
        annotations: vec![Annotation::Builtin],
        name: main("mystery"),
        binder: pvar("x", 0, int_ty()),
        result: int_ty(),
        body: term(Hole, int_ty()),
    };
    definitions.insert(mystery);
    let call = quote(run(&main("mystery"), int(1), int_ty()));
    let f = function("f", punit(), splice(call));
    definitions.insert(f);
    let err = stage(&definitions, &definitions.0[&main("f")]).unwrap_err();
    assert!(matches!(err, StageError::Eval(_)));
    assert!(err.is_invariant_violation());
}
