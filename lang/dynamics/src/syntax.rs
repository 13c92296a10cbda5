pub use mcx_syntax::typed::*;

use crate::{Evaluator, err::*};
use mcx_utils::prelude::Memo;
use std::rc::Rc;

/* ------------------------------- Identifier ------------------------------- */

pub type RcValue = Rc<Value>;

/* ---------------------------------- Value --------------------------------- */

/// The semantic domain. Subvalues are [`Lazy`] so that structure can be
/// built without forcing the parts nobody looks at.
#[derive(Clone, Debug)]
pub enum Value {
    Lit(Literal),
    Array(ArrayOf<Lazy>),
    List(ListOf<Lazy>),
    Compound(CompoundOf<Lazy>),
    Ref(RefOf<Lazy>),
    Tuple(TupleOf<Lazy>),
    Fun(Closure),
    Code(CodeOf<Lazy>),
    /* --------------------------------- Neutral -------------------------------- */
    Var(Var),
    Apply(Stuck<Apply<RcValue, Lazy>>),
    If(If<RcValue, Lazy>),
    Run(Stuck<Run<RcValue>>),
    Is(Stuck<Is<RcValue, ArcPattern>>),
    Command(Command),
    Splice(Stuck<Splice<RcValue>>),
    Project(Project),
}

/// A function value: the binder and body of the lambda together with the
/// environment it was evaluated in.
#[derive(Clone, Debug)]
pub struct Closure {
    pub binder: ArcPattern,
    pub body: ArcTerm,
    pub env: Env,
}

/// A neutral computation together with the type of its stuck argument,
/// which read-back needs and the value alone does not carry.
#[derive(Clone, Debug)]
pub struct Stuck<T> {
    pub inner: T,
    pub ty: Type,
}

/// One variable of a destructuring binder whose initializer is stuck; reads
/// back as `let binder = init; var`.
#[derive(Clone, Debug)]
pub struct Project {
    pub binder: ArcPattern,
    pub init: RcValue,
    pub var: Var,
}

impl Value {
    pub fn is_neutral(&self) -> bool {
        match self {
            | Value::Lit(_)
            | Value::Array(_)
            | Value::List(_)
            | Value::Compound(_)
            | Value::Ref(_)
            | Value::Tuple(_)
            | Value::Fun(_)
            | Value::Code(_) => false,
            | Value::Var(_)
            | Value::Apply(_)
            | Value::If(_)
            | Value::Run(_)
            | Value::Is(_)
            | Value::Command(_)
            | Value::Splice(_)
            | Value::Project(_) => true,
        }
    }
    /// A short name of the head constructor, for diagnostics.
    pub fn head(&self) -> &'static str {
        match self {
            | Value::Lit(_) => "literal",
            | Value::Array(_) => "array",
            | Value::List(_) => "list",
            | Value::Compound(_) => "compound",
            | Value::Ref(_) => "ref",
            | Value::Tuple(_) => "tuple",
            | Value::Fun(_) => "function",
            | Value::Code(_) => "code",
            | Value::Var(_) => "variable",
            | Value::Apply(_) => "application",
            | Value::If(_) => "conditional",
            | Value::Run(_) => "call",
            | Value::Is(_) => "pattern test",
            | Value::Command(_) => "command",
            | Value::Splice(_) => "splice",
            | Value::Project(_) => "projection",
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            | Value::Lit(Literal::Bool(value)) => Some(*value),
            | _ => None,
        }
    }
    pub fn as_int(&self) -> Option<i32> {
        match self {
            | Value::Lit(Literal::Int(value)) => Some(*value),
            | _ => None,
        }
    }
}

impl From<Literal> for Value {
    fn from(lit: Literal) -> Self {
        Value::Lit(lit)
    }
}

/* ---------------------------------- Lazy ---------------------------------- */

/// An on-demand value: a term suspended in the environment it appeared in,
/// evaluated on first [`force`](Lazy::force) and cached from then on.
#[derive(Clone)]
pub struct Lazy(Rc<Memo<Suspended, RcValue>>);

#[derive(Clone)]
pub struct Suspended {
    pub env: Env,
    pub term: ArcTerm,
}

impl Lazy {
    pub fn ready(value: impl Into<RcValue>) -> Self {
        Lazy(Rc::new(Memo::forced(value.into())))
    }
    pub fn suspend(env: &Env, term: &ArcTerm) -> Self {
        Lazy(Rc::new(Memo::suspended(Suspended { env: env.clone(), term: term.clone() })))
    }
    pub fn force(&self, ev: &Evaluator) -> Result<RcValue> {
        self.0.force_with(
            |Suspended { mut env, term }| ev.eval(&mut env, &term),
            || EvalError::CyclicValue,
        )
    }
    pub fn is_forced(&self) -> bool {
        self.0.is_forced()
    }
}

impl std::fmt::Debug for Lazy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/* ----------------------------------- Env ---------------------------------- */

/// Values bound so far, indexed by level. Cloning is cheap, so suspensions
/// snapshot the environment instead of sharing a mutable one.
#[derive(Clone, Debug, Default)]
pub struct Env {
    values: im::Vector<Lazy>,
    /// how many definition bodies were unfolded to reach this environment
    depth: usize,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn depth(&self) -> usize {
        self.depth
    }
    pub fn get(&self, level: usize) -> Option<&Lazy> {
        self.values.get(level)
    }
    pub fn bind(&mut self, value: Lazy) {
        self.values.push_back(value);
    }
    /// Bind every variable of `pattern` to itself, as a neutral value.
    pub fn bind_neutral(&mut self, pattern: &Pattern) {
        for var in pattern.binders() {
            self.bind(Lazy::ready(Value::Var(var.clone())));
        }
    }
    /// Run `f`, then drop every binding `f` appended.
    pub fn restoring<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.values.len();
        let res = f(self);
        self.values.truncate(saved);
        res
    }
    /// A fresh environment for the body of a top-level definition; nothing of
    /// the caller's bindings is visible in it.
    pub fn enter(&self) -> Env {
        Env { values: im::Vector::new(), depth: self.depth + 1 }
    }
}
