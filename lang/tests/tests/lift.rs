use mcx_lift::{FunctionTable, dispatch, lift};
use mcx_staging::stage;
use mcx_syntax::{lifted as ls, typed::*};
use mcx_tests::{build::*, utils};
use std::collections::HashSet;

fn levels(pattern: &ls::Pattern, bound: &mut HashSet<usize>) {
    match &pattern.kind {
        | ls::PatternKind::Var(var) => {
            bound.insert(var.level);
        }
        | ls::PatternKind::ListOf(ListOf(elements)) | ls::PatternKind::TupleOf(TupleOf(elements)) => {
            elements.iter().for_each(|element| levels(element, bound))
        }
        | ls::PatternKind::CompoundOf(CompoundOf(fields)) => {
            fields.values().for_each(|field| levels(field, bound))
        }
        | ls::PatternKind::IntOf(_) | ls::PatternKind::IntRangeOf(_, _) | ls::PatternKind::Drop => {}
    }
}

/// Every variable a term mentions is bound by the function around it.
fn closed(term: &ls::Term, bound: &HashSet<usize>) -> bool {
    match &term.kind {
        | ls::TermKind::Lit(_) | ls::TermKind::Command(_) => true,
        | ls::TermKind::Var(var) => bound.contains(&var.level),
        | ls::TermKind::Closure(ls::Closure { captures, .. }) => {
            captures.iter().all(|capture| bound.contains(&capture.level))
        }
        | ls::TermKind::Array(ArrayOf { elements, .. })
        | ls::TermKind::List(ListOf(elements))
        | ls::TermKind::Tuple(TupleOf(elements)) => elements.iter().all(|e| closed(e, bound)),
        | ls::TermKind::Compound(CompoundOf(elements)) => {
            elements.values().all(|element| closed(element, bound))
        }
        | ls::TermKind::Ref(RefOf(element)) => closed(element, bound),
        | ls::TermKind::If(ls::Branch { condition, arg, .. }) => {
            closed(condition, bound) && closed(arg, bound)
        }
        | ls::TermKind::Let(Let { binder, init, body }) => {
            let mut inner = bound.clone();
            levels(binder, &mut inner);
            closed(init, bound) && closed(body, &inner)
        }
        | ls::TermKind::Run(Run { arg, .. }) => closed(arg, bound),
        | ls::TermKind::Is(Is { scrutinee, .. }) => closed(scrutinee, bound),
    }
}

/// A function value nested in another, with an `if` under both.
fn nested() -> Definitions {
    let x = || var("x", 0, int_ty());
    let y = || var("y", 1, int_ty());
    let z = || var("z", 2, int_ty());
    let inner = lam(
        pvar("z", 2, int_ty()),
        if_(
            prelude_call("int_lt", x(), z(), bool_ty()),
            prelude_call("int_add", y(), z(), int_ty()),
            x(),
        ),
    );
    let outer = lam(pvar("y", 1, int_ty()), inner);
    program([function("curry", pvar("x", 0, int_ty()), outer).into()])
}

fn lift_all(definitions: &Definitions) -> (Vec<ls::Definition>, FunctionTable) {
    let mut table = FunctionTable::new();
    let mut lifted = Vec::new();
    for definition in definitions.0.values() {
        let Some(staged) = stage(definitions, definition).unwrap() else { continue };
        lifted.extend(lift(definitions, &mut table, &staged).unwrap());
    }
    (lifted, table)
}

#[test]
fn lifted_functions_are_closed() {
    utils::init();
    let (lifted, _) = lift_all(&nested());
    let functions: Vec<_> = (lifted.iter())
        .filter_map(|definition| match definition {
            | ls::Definition::Function(function) => Some(function),
            | _ => None,
        })
        .collect();
    // curry, two closure bodies and two branches
    assert_eq!(functions.len(), 5);
    for function in functions {
        let mut bound = HashSet::new();
        levels(&function.binder, &mut bound);
        assert!(closed(&function.body, &bound), "{} is not closed", function.name);
    }
}

#[test]
fn closure_tags_index_the_table() {
    utils::init();
    let (lifted, table) = lift_all(&nested());
    assert_eq!(table.len(), 2);
    for (tag, name) in table.iter() {
        let body = lifted.iter().find_map(|definition| match definition {
            | ls::Definition::Function(function) if &function.name == name => Some(function),
            | _ => None,
        });
        let body = body.unwrap_or_else(|| panic!("{} was not lifted", name));
        assert_eq!(body.restore, Some(tag as i32));
    }
}

#[test]
fn applications_only_call_the_dispatcher() {
    utils::init();
    let f = lam(pvar("y", 1, int_ty()), var("y", 1, int_ty()));
    let body = apply(f, var("x", 0, int_ty()));
    let definitions = program([function("direct", pvar("x", 0, int_ty()), body).into()]);
    let (lifted, _) = lift_all(&definitions);
    let ls::Definition::Function(direct) =
        lifted.iter().find(|definition| definition.name() == &main("direct")).unwrap()
    else {
        panic!("expected a function")
    };
    let ls::TermKind::Run(Run { name, .. }) = &direct.body.kind else { panic!("expected a call") };
    assert_eq!(name, &dispatch());
}
