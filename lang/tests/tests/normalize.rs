use mcx_dynamics::{Evaluator, normalize, prelude};
use mcx_syntax::{
    fmt::{Formatter, Ugly},
    packed::{Nbt, StackKind},
    typed::*,
};
use mcx_tests::{build::*, utils};
use pretty_assertions::assert_eq;

fn ugly(term: &ArcTerm) -> String {
    term.ugly(&Formatter::new())
}

/// `sum(n) = if n < 1 then 0 else n + sum(n - 1)`
fn sum() -> Definitions {
    let n = || var("n", 0, int_ty());
    let recur = run(&main("sum"), prelude_call("int_sub", n(), int(1), int_ty()), int_ty());
    let body = if_(
        prelude_call("int_lt", n(), int(1), bool_ty()),
        int(0),
        prelude_call("int_add", n(), recur, int_ty()),
    );
    program([function("sum", pvar("n", 0, int_ty()), body).into()])
}

#[test]
fn compile_time_and_run_time_agree() {
    utils::init();
    let definitions = sum();
    let build = utils::build(&definitions);
    for n in [0, 1, 4, 9] {
        let call = run(&main("sum"), int(n), int_ty());
        let expected = n * (n + 1) / 2;
        assert_eq!(ugly(&normalize(&definitions, &call).unwrap()), expected.to_string());
        let machine = utils::run(&build, "sum", &[(StackKind::Int, Nbt::Int(n))]);
        assert_eq!(machine.stack(StackKind::Int), &[Nbt::Int(expected)]);
    }
}

#[test]
fn normal_forms_are_fixed_points() {
    utils::init();
    let definitions = sum();
    let x = || var("x", 0, int_ty());
    let terms = [
        prelude_call("int_add", x(), prelude_call("int_mul", int(2), int(3), int_ty()), int_ty()),
        let_(pvar("y", 1, int_ty()), x(), tuple([var("y", 1, int_ty()), int(4)])),
        if_(is(x(), pint(0)), int(1), run(&main("sum"), int(2), int_ty())),
    ];
    for term in terms {
        let once = normalize(&definitions, &term).unwrap();
        let twice = normalize(&definitions, &once).unwrap();
        assert_eq!(ugly(&once), ugly(&twice));
    }
}

#[test]
fn arithmetic_folds_under_a_free_variable() {
    utils::init();
    let definitions = sum();
    let x = var("x", 0, int_ty());
    let term = prelude_call("int_add", x, prelude_call("int_mul", int(2), int(3), int_ty()), int_ty());
    assert_eq!(ugly(&normalize(&definitions, &term).unwrap()), "prelude::int_add((x@0, 6))");
}

#[test]
fn recursion_on_an_unknown_stays_a_call() {
    utils::init();
    let body = run(&main("loop"), var("x", 0, int_ty()), int_ty());
    let looping = function("loop", pvar("x", 0, int_ty()), body);
    let definitions = program([looping.into()]);
    let call = run(&main("loop"), var("x", 0, int_ty()), int_ty());
    let ev = Evaluator::new(&definitions, prelude()).with_unfold_limit(3);
    assert_eq!(ugly(&ev.normalize(&call).unwrap()), "main::loop(x@0)");
}
