//! The closure-free IR produced by lifting.
//!
//! Function values only survive as closure records (a tag plus captured
//! variables), and conditionals only as jumps to named branch subroutines.

pub use crate::*;

use crate::packed::StackKind;
use derive_more::From;
use indexmap::IndexMap;

/* ---------------------------------- Type ---------------------------------- */

#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Array(ArrayKind),
    List(Box<Type>),
    Compound(IndexMap<String, Type>),
    Ref(Box<Type>),
    Tuple(Vec<Type>),
    Fun(Box<Type>, Box<Type>),
    Union(Vec<Type>),
}

impl Type {
    /// The stack kinds a value of this type occupies, in push order.
    pub fn erase(&self) -> Vec<StackKind> {
        match self {
            | Type::Bool | Type::Byte => vec![StackKind::Byte],
            | Type::Short => vec![StackKind::Short],
            | Type::Int => vec![StackKind::Int],
            | Type::Long => vec![StackKind::Long],
            | Type::Float => vec![StackKind::Float],
            | Type::Double => vec![StackKind::Double],
            | Type::String => vec![StackKind::String],
            | Type::Array(ArrayKind::Byte) => vec![StackKind::ByteArray],
            | Type::Array(ArrayKind::Int) => vec![StackKind::IntArray],
            | Type::Array(ArrayKind::Long) => vec![StackKind::LongArray],
            | Type::List(_) => vec![StackKind::List],
            | Type::Compound(_) => vec![StackKind::Compound],
            | Type::Ref(_) => vec![StackKind::Int],
            | Type::Tuple(elements) => elements.iter().flat_map(Type::erase).collect(),
            | Type::Fun(_, _) => vec![StackKind::Compound],
            | Type::Union(elements) => match elements.first() {
                | Some(first) => first.erase(),
                | None => vec![StackKind::End],
            },
        }
    }
}

/* ---------------------------------- Term ---------------------------------- */

#[derive(Clone, Debug, PartialEq)]
pub struct Term {
    pub kind: TermKind,
    pub ty: Type,
}

#[derive(From, Clone, Debug, PartialEq)]
pub enum TermKind {
    Lit(Literal),
    Array(ArrayOf<Term>),
    List(ListOf<Term>),
    Compound(CompoundOf<Term>),
    Ref(RefOf<Box<Term>>),
    Tuple(TupleOf<Term>),
    Closure(Closure),
    If(Branch),
    Let(Let<Pattern, Box<Term>>),
    Var(Var),
    Run(Run<Box<Term>>),
    Is(Is<Box<Term>, Pattern>),
    Command(Command),
}

impl Term {
    pub fn new(kind: impl Into<TermKind>, ty: Type) -> Self {
        Term { kind: kind.into(), ty }
    }
}

/// `{_: tag, x: x, ...}`, a function value after closure conversion
#[derive(Clone, Debug, PartialEq)]
pub struct Closure {
    pub tag: usize,
    pub captures: Vec<Capture>,
}

/// a captured variable, by its name and its level in the enclosing scope
#[derive(Clone, Debug, PartialEq)]
pub struct Capture {
    pub name: String,
    pub level: usize,
    pub ty: Type,
}

/// `if c then then_name(a) else else_name(a)`; `arg` copies the variables
/// in scope, and the branch taken consumes it
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub condition: Box<Term>,
    pub arg: Box<Term>,
    pub then_name: DefinitionLocation,
    pub else_name: DefinitionLocation,
}

/* --------------------------------- Pattern -------------------------------- */

#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub annotations: Vec<Annotation>,
    pub ty: Type,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PatternKind {
    IntOf(i32),
    IntRangeOf(i32, i32),
    ListOf(ListOf<Pattern>),
    CompoundOf(CompoundOf<Pattern>),
    TupleOf(TupleOf<Pattern>),
    Var(Var),
    Drop,
}

impl Pattern {
    pub fn has(&self, annotation: Annotation) -> bool {
        self.annotations.contains(&annotation)
    }
}

/* -------------------------------- Definition ------------------------------ */

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Annotation {
    Tick,
    Load,
    NoDrop,
    Builtin,
}

#[derive(From, Clone, Debug, PartialEq)]
pub enum Definition {
    Function(Function),
    Builtin(Builtin),
    Resource(Resource),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub annotations: Vec<Annotation>,
    pub name: DefinitionLocation,
    pub binder: Pattern,
    pub result: Type,
    pub body: Term,
    /// the value score register `#0` is reset to on exit
    pub restore: Option<i32>,
}

impl Function {
    pub fn has(&self, annotation: Annotation) -> bool {
        self.annotations.contains(&annotation)
    }
}

/// implemented natively by the runtime; only its interface survives
#[derive(Clone, Debug, PartialEq)]
pub struct Builtin {
    pub annotations: Vec<Annotation>,
    pub name: DefinitionLocation,
    pub param: Type,
    pub result: Type,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    pub annotations: Vec<Annotation>,
    pub registry: Registry,
    pub name: DefinitionLocation,
    pub body: Term,
}

impl Definition {
    pub fn name(&self) -> &DefinitionLocation {
        match self {
            | Definition::Function(Function { name, .. })
            | Definition::Builtin(Builtin { name, .. })
            | Definition::Resource(Resource { name, .. }) => name,
        }
    }
}
