//! Builders for the IRs, for writing programs by hand in tests. Every term
//! builder fills in the type the elaborator would have given the node.

use crate::typed::*;
use std::sync::Arc;

/* ---------------------------------- Types --------------------------------- */

pub fn int_ty() -> Type {
    Type::Int(None)
}

pub fn bool_ty() -> Type {
    Type::Bool(None)
}

pub fn tuple_ty(elements: impl IntoIterator<Item = Type>) -> Type {
    Type::Tuple(elements.into_iter().collect())
}

pub fn fun_ty(param: Type, result: Type) -> Type {
    Type::Fun(Box::new(param), Box::new(result))
}

pub fn code_ty(ty: Type) -> Type {
    Type::Code(Box::new(ty))
}

pub fn compound_ty<'a>(fields: impl IntoIterator<Item = (&'a str, Type)>) -> Type {
    Type::Compound(fields.into_iter().map(|(key, ty)| (key.to_string(), ty)).collect())
}

/* ---------------------------------- Terms --------------------------------- */

pub fn term(kind: impl Into<TermKind>, ty: Type) -> ArcTerm {
    Arc::new(Term::new(kind, ty))
}

pub fn lit(lit: impl Into<Literal>) -> ArcTerm {
    let lit = lit.into();
    let ty = Type::of_literal(&lit);
    term(lit, ty)
}

pub fn int(n: i32) -> ArcTerm {
    lit(n)
}

pub fn bool(b: bool) -> ArcTerm {
    lit(b)
}

pub fn var(name: &str, level: usize, ty: Type) -> ArcTerm {
    term(Var::new(name, level), ty)
}

pub fn tuple(elements: impl IntoIterator<Item = ArcTerm>) -> ArcTerm {
    let elements: Vec<_> = elements.into_iter().collect();
    let ty = tuple_ty(elements.iter().map(|element| element.ty.clone()));
    term(TupleOf(elements), ty)
}

pub fn list(element_ty: Type, elements: impl IntoIterator<Item = ArcTerm>) -> ArcTerm {
    term(ListOf(elements.into_iter().collect()), Type::List(Box::new(element_ty)))
}

pub fn compound<'a>(fields: impl IntoIterator<Item = (&'a str, ArcTerm)>) -> ArcTerm {
    let fields: indexmap::IndexMap<String, ArcTerm> =
        fields.into_iter().map(|(key, element)| (key.to_string(), element)).collect();
    let ty = Type::Compound(
        fields.iter().map(|(key, element)| (key.clone(), element.ty.clone())).collect(),
    );
    term(CompoundOf(fields), ty)
}

pub fn lam(binder: ArcPattern, body: ArcTerm) -> ArcTerm {
    let ty = fun_ty(binder.ty.clone(), body.ty.clone());
    term(FunOf { binder, body }, ty)
}

pub fn apply(operator: ArcTerm, arg: ArcTerm) -> ArcTerm {
    let ty = match &operator.ty {
        | Type::Fun(_, result) => result.as_ref().clone(),
        | _ => Type::Hole(Hole),
    };
    term(Apply { operator, arg }, ty)
}

pub fn if_(condition: ArcTerm, then_clause: ArcTerm, else_clause: ArcTerm) -> ArcTerm {
    let ty = then_clause.ty.clone();
    term(If { condition, then_clause, else_clause }, ty)
}

pub fn let_(binder: ArcPattern, init: ArcTerm, body: ArcTerm) -> ArcTerm {
    let ty = body.ty.clone();
    term(Let { binder, init, body }, ty)
}

pub fn run(name: &DefinitionLocation, arg: ArcTerm, ty: Type) -> ArcTerm {
    term(Run { name: name.clone(), arg }, ty)
}

pub fn is(scrutinee: ArcTerm, scrutineer: ArcPattern) -> ArcTerm {
    term(Is { scrutinee, scrutineer }, bool_ty())
}

pub fn quote(element: ArcTerm) -> ArcTerm {
    let ty = code_ty(element.ty.clone());
    term(CodeOf(element), ty)
}

pub fn splice(element: ArcTerm) -> ArcTerm {
    let ty = match &element.ty {
        | Type::Code(ty) => ty.as_ref().clone(),
        | _ => Type::Hole(Hole),
    };
    term(Splice(element), ty)
}

/// `prelude::<name>((a, b))`
pub fn prelude_call(name: &str, a: ArcTerm, b: ArcTerm, ty: Type) -> ArcTerm {
    run(&DefinitionLocation::new(["prelude"], name), tuple([a, b]), ty)
}

/* -------------------------------- Patterns -------------------------------- */

pub fn pattern(kind: PatternKind, ty: Type) -> ArcPattern {
    Arc::new(Pattern::new(kind, ty))
}

pub fn pvar(name: &str, level: usize, ty: Type) -> ArcPattern {
    pattern(PatternKind::Var(Var::new(name, level)), ty)
}

pub fn pint(n: i32) -> ArcPattern {
    pattern(PatternKind::IntOf(n), int_ty())
}

pub fn prange(min: i32, max: i32) -> ArcPattern {
    pattern(PatternKind::IntRangeOf(min, max), int_ty())
}

pub fn pdrop(ty: Type) -> ArcPattern {
    pattern(PatternKind::Drop, ty)
}

pub fn ptuple(elements: impl IntoIterator<Item = ArcPattern>) -> ArcPattern {
    let elements: Vec<Pattern> = elements.into_iter().map(|element| (*element).clone()).collect();
    let ty = tuple_ty(elements.iter().map(|element| element.ty.clone()));
    pattern(PatternKind::TupleOf(TupleOf(elements)), ty)
}

pub fn plist(element_ty: Type, elements: impl IntoIterator<Item = ArcPattern>) -> ArcPattern {
    let elements: Vec<Pattern> = elements.into_iter().map(|element| (*element).clone()).collect();
    pattern(PatternKind::ListOf(ListOf(elements)), Type::List(Box::new(element_ty)))
}

pub fn punit() -> ArcPattern {
    ptuple([])
}

/* ------------------------------- Definitions ------------------------------ */

/// `main::<name>`
pub fn main(name: &str) -> DefinitionLocation {
    DefinitionLocation::new(["main"], name)
}

pub fn function(name: &str, binder: ArcPattern, body: ArcTerm) -> Function {
    Function { annotations: Vec::new(), name: main(name), result: body.ty.clone(), binder, body }
}

/// The interfaces of the prelude builtins the evaluator knows.
pub fn prelude_definitions() -> Vec<Function> {
    let pair = tuple_ty([int_ty(), int_ty()]);
    let signatures = [
        ("int_add", pair.clone(), int_ty()),
        ("int_sub", pair.clone(), int_ty()),
        ("int_mul", pair.clone(), int_ty()),
        ("int_eq", pair.clone(), bool_ty()),
        ("int_lt", pair, bool_ty()),
    ];
    (signatures.into_iter())
        .map(|(name, param, result)| Function {
            annotations: vec![Annotation::Builtin],
            name: DefinitionLocation::new(["prelude"], name),
            binder: pvar("arg", 0, param),
            body: term(Hole, result.clone()),
            result,
        })
        .collect()
}

/// A definition table holding the prelude and the given definitions.
pub fn program(definitions: impl IntoIterator<Item = Definition>) -> Definitions {
    let mut table: Definitions = prelude_definitions().into_iter().collect();
    for definition in definitions {
        table.insert(definition);
    }
    table
}

/* --------------------------------- Lifted --------------------------------- */

/// The same builders over the closure-free IR, where types are already
/// erased of refinements.
pub mod lifted {
    use crate::lifted::*;

    pub fn term(kind: impl Into<TermKind>, ty: Type) -> Term {
        Term::new(kind, ty)
    }

    pub fn int(n: i32) -> Term {
        term(Literal::Int(n), Type::Int)
    }

    pub fn var(name: &str, level: usize, ty: Type) -> Term {
        term(Var::new(name, level), ty)
    }

    pub fn tuple(elements: Vec<Term>) -> Term {
        let ty = Type::Tuple(elements.iter().map(|element| element.ty.clone()).collect());
        term(TupleOf(elements), ty)
    }

    pub fn pattern(kind: PatternKind, ty: Type) -> Pattern {
        Pattern { kind, annotations: Vec::new(), ty }
    }

    pub fn pvar(name: &str, level: usize, ty: Type) -> Pattern {
        pattern(PatternKind::Var(Var::new(name, level)), ty)
    }

    pub fn punit() -> Pattern {
        pattern(PatternKind::TupleOf(TupleOf(Vec::new())), Type::Tuple(Vec::new()))
    }
}
