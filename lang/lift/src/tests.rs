use crate::{free::*, *};
use mcx_syntax::{
    build::*,
    fmt::{Formatter, Ugly},
    lifted as ls,
    typed::*,
};
use pretty_assertions::assert_eq;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn int_add() -> Function {
    Function {
        annotations: vec![Annotation::Builtin],
        name: DefinitionLocation::new(["prelude"], "int_add"),
        binder: pvar("arg", 0, Type::Tuple(vec![int_ty(), int_ty()])),
        result: int_ty(),
        body: term(Hole, int_ty()),
    }
}

fn function(name: &str, binder: ArcPattern, result: Type, body: ArcTerm) -> Function {
    Function { annotations: vec![], name: DefinitionLocation::new(["main"], name), binder, result, body }
}

fn uglies(definitions: &[ls::Definition]) -> Vec<String> {
    definitions.iter().map(|definition| definition.ugly(&Formatter::new())).collect()
}

#[test]
fn lambdas_become_closures() {
    init();
    let sum = term(
        Run {
            name: int_add().name,
            arg: term(
                TupleOf(vec![var("x", 0, int_ty()), var("y", 1, int_ty())]),
                Type::Tuple(vec![int_ty(), int_ty()]),
            ),
        },
        int_ty(),
    );
    let lambda = term(FunOf { binder: pvar("y", 1, int_ty()), body: sum }, fun_ty(int_ty(), int_ty()));
    let f = function("f", pvar("x", 0, int_ty()), fun_ty(int_ty(), int_ty()), lambda);
    let definitions: Definitions = [int_add(), f.clone()].into_iter().collect();
    let mut table = FunctionTable::new();
    let lifted = lift(&definitions, &mut table, &f.into()).unwrap();
    assert_eq!(
        uglies(&lifted),
        vec![
            "function main::f(x@0) -> fun(int) -> int = {_: 0, x: x@0}".to_string(),
            "function main::f:0((y@0, {x: x@1})) -> int restore 0 = prelude::int_add((x@1, y@0))"
                .to_string(),
        ]
    );
    assert_eq!(table.len(), 1);
    assert_eq!(table.get(0), Some(&DefinitionLocation::new(["main"], "f:0")));
}

#[test]
fn tags_continue_the_table() {
    let lambda = term(
        FunOf { binder: pvar("y", 0, int_ty()), body: var("y", 0, int_ty()) },
        fun_ty(int_ty(), int_ty()),
    );
    let f = function("f", pvar("u", 0, Type::unit()), fun_ty(int_ty(), int_ty()), lambda.clone());
    let g = function("g", pvar("u", 0, Type::unit()), fun_ty(int_ty(), int_ty()), lambda);
    let definitions: Definitions = [f.clone(), g.clone()].into_iter().collect();
    let mut table = FunctionTable::new();
    lift(&definitions, &mut table, &f.into()).unwrap();
    let lifted = lift(&definitions, &mut table, &g.into()).unwrap();
    assert_eq!(uglies(&lifted)[0], "function main::g(u@0) -> fun(int) -> int = {_: 1}");
    let tags: Vec<_> = table.iter().map(|(tag, name)| (tag, name.to_string())).collect();
    assert_eq!(tags, vec![(0, "main::f:0".to_string()), (1, "main::g:0".to_string())]);
}

#[test]
fn applications_go_through_the_dispatcher() {
    let app = term(Apply { operator: var("g", 0, fun_ty(int_ty(), int_ty())), arg: int(1) }, int_ty());
    let f = function("f", pvar("g", 0, fun_ty(int_ty(), int_ty())), int_ty(), app);
    let definitions: Definitions = [f.clone()].into_iter().collect();
    let lifted = lift(&definitions, &mut FunctionTable::new(), &f.into()).unwrap();
    assert_eq!(uglies(&lifted), vec!["function main::f(g@0) -> int = mcx::dispatch((1, g@0))"]);
}

#[test]
fn branches_become_functions_of_the_scope() {
    let test = term(
        Is {
            scrutinee: var("x", 0, int_ty()),
            scrutineer: prange(1, 5),
        },
        Type::Bool(None),
    );
    let body = term(If { condition: test, then_clause: int(1), else_clause: int(0) }, int_ty());
    let f = function("f", pvar("x", 0, int_ty()), int_ty(), body);
    let definitions: Definitions = [f.clone()].into_iter().collect();
    let mut table = FunctionTable::new();
    let lifted = lift(&definitions, &mut table, &f.into()).unwrap();
    assert_eq!(
        uglies(&lifted),
        vec![
            "function main::f(x@0) -> int = if x@0 is 1..5 then main::f:0((x@0)) else main::f:1((x@0))",
            "function main::f:0((x@0)) -> int restore 1 = 1",
            "function main::f:1((x@0)) -> int = 0",
        ]
    );
    for helper in &lifted[1..] {
        let ls::Definition::Function(helper) = helper else { panic!("expected a function") };
        // the branch consumes its copy of the scope
        assert!(!helper.binder.has(ls::Annotation::NoDrop));
    }
    // branches are not closures
    assert!(table.is_empty());
}

#[test]
fn branch_shapes_must_agree() {
    let long = term(Literal::Long(0), Type::Long(None));
    let cond = term(Literal::Bool(true), Type::Bool(None));
    let body = term(If { condition: cond, then_clause: long, else_clause: int(0) }, int_ty());
    let f = function("f", pvar("u", 0, Type::unit()), int_ty(), body);
    let definitions: Definitions = [f.clone()].into_iter().collect();
    let err = lift(&definitions, &mut FunctionTable::new(), &f.into()).unwrap_err();
    assert_eq!(
        err,
        LiftError::BranchShapeMismatch {
            expected: vec![mcx_syntax::packed::StackKind::Int],
            found: vec![mcx_syntax::packed::StackKind::Long],
        }
    );
}

#[test]
fn failures_leave_the_table_untouched() {
    let lambda = term(
        FunOf { binder: pvar("y", 0, int_ty()), body: var("y", 0, int_ty()) },
        fun_ty(int_ty(), int_ty()),
    );
    let broken = term(
        TupleOf(vec![lambda, var("nowhere", 7, int_ty())]),
        Type::Tuple(vec![fun_ty(int_ty(), int_ty()), int_ty()]),
    );
    let f = function("f", pvar("u", 0, Type::unit()), Type::unit(), broken);
    let definitions: Definitions = [f.clone()].into_iter().collect();
    let mut table = FunctionTable::new();
    let err = lift(&definitions, &mut table, &f.into()).unwrap_err();
    assert_eq!(err, LiftError::UnresolvedVariable("nowhere".to_string()));
    assert!(table.is_empty());
}

#[test]
fn staging_leftovers_are_fatal() {
    let code_ty = Type::Code(Box::new(int_ty()));
    let spliced = term(Splice(var("c", 0, code_ty.clone())), int_ty());
    let f = function("f", pvar("c", 0, code_ty), int_ty(), spliced);
    let definitions: Definitions = [f.clone()].into_iter().collect();
    let err = lift(&definitions, &mut FunctionTable::new(), &f.into()).unwrap_err();
    assert_eq!(err, LiftError::UnexpectedStaging);
    assert!(err.is_invariant_violation());
}

#[test]
fn calls_must_resolve() {
    let missing = DefinitionLocation::new(["main"], "missing");
    let call = term(Run { name: missing.clone(), arg: int(0) }, int_ty());
    let f = function("f", pvar("u", 0, Type::unit()), int_ty(), call);
    let definitions: Definitions = [f.clone()].into_iter().collect();
    let err = lift(&definitions, &mut FunctionTable::new(), &f.into()).unwrap_err();
    assert_eq!(err, LiftError::UnresolvedDefinition(missing));
}

#[test]
fn annotations_are_filtered() {
    let mut exported = function("f", pvar("u", 0, Type::unit()), int_ty(), int(0));
    exported.annotations = vec![Annotation::Export, Annotation::Tick];
    let definitions: Definitions = [exported.clone()].into_iter().collect();
    let lifted = lift(&definitions, &mut FunctionTable::new(), &exported.into()).unwrap();
    let [ls::Definition::Function(lifted)] = lifted.as_slice() else { panic!("expected a function") };
    assert_eq!(lifted.annotations, vec![ls::Annotation::Tick]);

    let mut inline = function("g", pvar("u", 0, Type::unit()), int_ty(), int(0));
    inline.annotations = vec![Annotation::Inline];
    let err = lift(&definitions, &mut FunctionTable::new(), &inline.into()).unwrap_err();
    assert_eq!(err, LiftError::UnexpectedAnnotation(Annotation::Inline));
}

#[test]
fn builtins_keep_their_interface() {
    let definitions: Definitions = [int_add()].into_iter().collect();
    let lifted = lift(&definitions, &mut FunctionTable::new(), &int_add().into()).unwrap();
    assert_eq!(uglies(&lifted), vec!["builtin prelude::int_add((int, int)) -> int"]);
}

#[test]
fn let_frees_the_initializer() {
    // let x = x; x
    let shadow = term(
        Let { binder: pvar("x", 1, int_ty()), init: var("x", 0, int_ty()), body: var("x", 1, int_ty()) },
        int_ty(),
    );
    assert_eq!(shadow.free_vars(), Names::singleton("x"));
    let lambda = term(
        FunOf {
            binder: pvar("y", 2, int_ty()),
            body: term(
                TupleOf(vec![var("b", 1, int_ty()), var("y", 2, int_ty()), var("a", 0, int_ty())]),
                Type::Tuple(vec![int_ty(); 3]),
            ),
        },
        fun_ty(int_ty(), Type::Tuple(vec![int_ty(); 3])),
    );
    let names: Vec<_> = lambda.free_vars().iter().cloned().collect();
    assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
}

#[test]
fn operators_are_lifted_before_arguments() {
    let int_fun = fun_ty(int_ty(), int_ty());
    let identity = term(
        FunOf { binder: pvar("y", 1, int_ty()), body: var("y", 1, int_ty()) },
        int_fun.clone(),
    );
    let apply_to = term(
        FunOf { binder: pvar("g", 1, int_fun.clone()), body: var("g", 1, int_fun.clone()) },
        fun_ty(int_fun.clone(), int_fun.clone()),
    );
    let app = term(Apply { operator: apply_to, arg: identity }, int_fun.clone());
    let f = function("f", pvar("u", 0, Type::unit()), int_fun, app);
    let definitions: Definitions = [f.clone()].into_iter().collect();
    let mut table = FunctionTable::new();
    let lifted = lift(&definitions, &mut table, &f.into()).unwrap();
    assert_eq!(
        uglies(&lifted)[0],
        "function main::f(u@0) -> fun(int) -> int = mcx::dispatch(({_: 1}, {_: 0}))"
    );
    assert_eq!(table.get(0), Some(&DefinitionLocation::new(["main"], "f:0")));
    assert_eq!(table.get(1), Some(&DefinitionLocation::new(["main"], "f:1")));
    let ls::Definition::Function(body) = &lifted[1] else { panic!("expected a function") };
    assert_eq!(body.binder.ty.erase(), vec![mcx_syntax::packed::StackKind::Compound; 2]);
}
