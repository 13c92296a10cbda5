use mcx_driver::{Conf, Driver};
use mcx_syntax::{
    packed::{self as ps, Instruction, Nbt, StackKind},
    typed::*,
};
use mcx_tests::{build::*, runs_to, utils};
use pretty_assertions::assert_eq;

/// `let x = 3; if x is 1..5 then 1 else 0`
fn scenario() -> Definitions {
    let test = is(var("x", 0, int_ty()), prange(1, 5));
    let body = let_(pvar("x", 0, int_ty()), int(3), if_(test, int(1), int(0)));
    program([function("scenario", punit(), body).into()])
}

/// `classify(n) = if n is 1..5 then 1 else 0`
fn classify() -> Definitions {
    let test = is(var("n", 0, int_ty()), prange(1, 5));
    program([function("classify", pvar("n", 0, int_ty()), if_(test, int(1), int(0))).into()])
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

/// `make(x) = \y -> x + y` and `apply(x) = make(x)(5)`
fn closures() -> Definitions {
    let adder = lam(
        pvar("y", 1, int_ty()),
        prelude_call("int_add", var("x", 0, int_ty()), var("y", 1, int_ty()), int_ty()),
    );
    let make = function("make", pvar("x", 0, int_ty()), adder);
    let applied = apply(run(&main("make"), var("x", 0, int_ty()), make.result.clone()), int(5));
    let apply = function("apply", pvar("x", 0, int_ty()), applied);
    program([make.into(), apply.into()])
}

/// `split((a, b)) = let (c, d) = (b, a); c - d`
fn split() -> Definitions {
    let pair = tuple_ty([int_ty(), int_ty()]);
    let swapped = tuple([var("b", 1, int_ty()), var("a", 0, int_ty())]);
    let body = let_(
        ptuple([pvar("c", 2, int_ty()), pvar("d", 3, int_ty())]),
        swapped,
        prelude_call("int_sub", var("c", 2, int_ty()), var("d", 3, int_ty()), int_ty()),
    );
    let binder = ptuple([pvar("a", 0, int_ty()), pvar("b", 1, int_ty())]);
    assert_eq!(binder.ty, pair);
    program([function("split", binder, body).into()])
}

/// `bump(n) = n + (if n is 1..5 then 1 else 0)`
fn bump() -> Definitions {
    let n = || var("n", 0, int_ty());
    let step = if_(is(n(), prange(1, 5)), int(1), int(0));
    let body = prelude_call("int_add", n(), step, int_ty());
    program([function("bump", pvar("n", 0, int_ty()), body).into()])
}

runs_to!(
    the_scenario_picks_the_then_branch,
    scenario(),
    "scenario",
    [],
    StackKind::Int,
    Nbt::Int(1)
);
runs_to!(
    inside_the_range,
    classify(),
    "classify",
    [(StackKind::Int, Nbt::Int(3))],
    StackKind::Int,
    Nbt::Int(1)
);
runs_to!(
    outside_the_range,
    classify(),
    "classify",
    [(StackKind::Int, Nbt::Int(7))],
    StackKind::Int,
    Nbt::Int(0)
);
runs_to!(recursion, sum(), "sum", [(StackKind::Int, Nbt::Int(4))], StackKind::Int, Nbt::Int(10));
runs_to!(
    closures_escape_their_definition,
    closures(),
    "apply",
    [(StackKind::Int, Nbt::Int(10))],
    StackKind::Int,
    Nbt::Int(15)
);
runs_to!(
    tuples_are_taken_apart,
    split(),
    "split",
    [(StackKind::Int, Nbt::Int(2)), (StackKind::Int, Nbt::Int(9))],
    StackKind::Int,
    Nbt::Int(7)
);

runs_to!(
    conditionals_as_later_arguments,
    bump(),
    "bump",
    [(StackKind::Int, Nbt::Int(3))],
    StackKind::Int,
    Nbt::Int(4)
);
runs_to!(
    conditionals_as_later_arguments_untaken,
    bump(),
    "bump",
    [(StackKind::Int, Nbt::Int(9))],
    StackKind::Int,
    Nbt::Int(9)
);

#[test]
fn the_scenario_drops_the_let_after_the_branch() {
    utils::init();
    let build = utils::build(&scenario());
    let ps::Definition::Function(scenario) = &build.definitions[0] else {
        panic!("expected a function")
    };
    let text: Vec<_> = scenario.instructions.iter().map(ToString::to_string).collect();
    let [.., then, els, drop] = text.as_slice() else { panic!("too short") };
    assert_eq!(then, "execute if score #0 mcx matches 1.. run function minecraft:main/scenario.1m0");
    assert_eq!(els, "execute if score #0 mcx matches ..0 run function minecraft:main/scenario.1m1");
    assert_eq!(drop, "data remove storage mcx: int[-2]");
}

#[test]
fn debug_output_only_adds_comments() {
    utils::init();
    let definitions = sum();
    let plain = Driver::new(Conf::default()).build(&definitions);
    let debug = Driver::new(Conf { debug: true, ..Conf::default() }).build(&definitions);
    let strip = |definition: &ps::Definition| match definition {
        | ps::Definition::Function(function) => (function.instructions.iter())
            .filter(|instruction| !matches!(instruction, Instruction::Comment(_)))
            .cloned()
            .collect::<Vec<_>>(),
        | ps::Definition::Json(_) => Vec::new(),
    };
    assert_eq!(plain.definitions.len(), debug.definitions.len());
    for (plain, debug) in plain.definitions.iter().zip(&debug.definitions) {
        assert_eq!(strip(plain), strip(debug));
    }
    let comments = (debug.definitions.iter())
        .filter_map(|definition| match definition {
            | ps::Definition::Function(function) => Some(function),
            | ps::Definition::Json(_) => None,
        })
        .flat_map(|function| function.instructions.iter())
        .filter(|instruction| matches!(instruction, Instruction::Comment(_)))
        .count();
    assert!(comments > 0);
}

#[test]
fn resources_come_out_as_data() {
    utils::init();
    let condition = lit("minecraft:random_chance".to_string());
    let body = compound([("condition", condition), ("chance", lit(0.25f64))]);
    let resource = Resource {
        annotations: vec![],
        registry: Registry::Predicates,
        name: main("lucky"),
        body,
    };
    let build = utils::build(&program([resource.into()]));
    let ps::Definition::Json(json) = &build.definitions[0] else { panic!("expected a resource") };
    assert_eq!(json.location.to_string(), "minecraft:main/lucky");
    assert_eq!(json.registry.dir(), "predicates");
    assert_eq!(
        json.body,
        ps::Json::Object(
            [
                ("condition".to_string(), ps::Json::String("minecraft:random_chance".to_string())),
                ("chance".to_string(), ps::Json::Double(0.25)),
            ]
            .into_iter()
            .collect()
        )
    );
}

#[test]
fn one_broken_definition_does_not_sink_the_build() {
    utils::init();
    let mut definitions = sum();
    definitions.insert(function("broken", pvar("x", 0, int_ty()), var("ghost", 4, int_ty())));
    let build = Driver::new(Conf::default()).build(&definitions);
    assert_eq!(build.errors.len(), 1);
    assert_eq!(build.errors[0].0, main("broken"));
    let machine = utils::run(&build, "sum", &[(StackKind::Int, Nbt::Int(3))]);
    assert_eq!(machine.stack(StackKind::Int), &[Nbt::Int(6)]);
}

#[test]
fn builds_are_deterministic() {
    utils::init();
    let mut definitions = closures();
    for (name, definition) in sum().0.into_iter().chain(split().0).chain(bump().0) {
        definitions.0.insert(name, definition);
    }
    let driver = Driver::new(Conf::default());
    let first = driver.build(&definitions);
    assert!(first.is_ok());
    let rendered = first.render();
    assert!(rendered.contains("function minecraft:main/bump {"));
    for _ in 0..4 {
        assert_eq!(driver.build(&definitions).render(), rendered);
    }
}
