#![allow(clippy::style)]
#![allow(clippy::useless_format)]

pub mod fmt;
pub use fmt::*;

pub mod typed;
pub mod lifted;
pub mod packed;

pub mod build;

mod impls;
pub use impls::escape;


use derive_more::From;
use indexmap::IndexMap;

/* -------------------------------- Location -------------------------------- */

/// `a/b/c`, a path of module names
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModuleLocation(pub Vec<String>);

/// `a/b::name`, a fully qualified top-level definition
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct DefinitionLocation {
    pub module: ModuleLocation,
    pub name: String,
}

/* ------------------------------- Structural ------------------------------- */

/// `_` left behind by elaboration; never valid past it
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Hole;

/// `[B; a, ...]`, `[I; a, ...]` and `[L; a, ...]`
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayOf<T> {
    pub kind: ArrayKind,
    pub elements: Vec<T>,
}
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ArrayKind {
    Byte,
    Int,
    Long,
}

/// `[a, ...]`
#[derive(Clone, Debug, PartialEq)]
pub struct ListOf<T>(pub Vec<T>);
/// `{k: a, ...}`, keyed and order-irrelevant
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundOf<T>(pub IndexMap<String, T>);
/// `&a`, a boxed value
#[derive(Clone, Debug, PartialEq)]
pub struct RefOf<T>(pub T);
/// `(a, ...)`
#[derive(Clone, Debug, PartialEq)]
pub struct TupleOf<T>(pub Vec<T>);

/* --------------------------------- Control -------------------------------- */

/// `\p -> b`
#[derive(Clone, Debug, PartialEq)]
pub struct FunOf<P, T> {
    pub binder: P,
    pub body: T,
}
/// `f(a)` where `f` is a function value
#[derive(Clone, Debug, PartialEq)]
pub struct Apply<F, A> {
    pub operator: F,
    pub arg: A,
}
/// `if c then a else b`
#[derive(Clone, Debug, PartialEq)]
pub struct If<C, T> {
    pub condition: C,
    pub then_clause: T,
    pub else_clause: T,
}
/// `let p = a; b`
#[derive(Clone, Debug, PartialEq)]
pub struct Let<P, T> {
    pub binder: P,
    pub init: T,
    pub body: T,
}
/// a variable by name and level
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Var {
    pub name: String,
    pub level: usize,
}
/// `name(a)`, a call to a top-level definition
#[derive(Clone, Debug, PartialEq)]
pub struct Run<T> {
    pub name: DefinitionLocation,
    pub arg: T,
}
/// `a is p`
#[derive(Clone, Debug, PartialEq)]
pub struct Is<T, P> {
    pub scrutinee: T,
    pub scrutineer: P,
}
/// `/command`, target text injected verbatim
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Command(pub String);

/* --------------------------------- Staging -------------------------------- */

/// `` `a `` has type `code A`
#[derive(Clone, Debug, PartialEq)]
pub struct CodeOf<T>(pub T);
/// `$a` has type `A` where `a` has type `code A`
#[derive(Clone, Debug, PartialEq)]
pub struct Splice<T>(pub T);

/* --------------------------------- Literal -------------------------------- */

/// literals in term
#[derive(From, Clone, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

/* -------------------------------- Annotation ------------------------------ */

/// data-driven registries a JSON resource may belong to
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Registry {
    Advancements,
    LootTables,
    Predicates,
    ItemModifiers,
    Recipes,
    Dimensions,
    DimensionTypes,
}

impl Registry {
    /// the directory of the registry inside a data pack
    pub fn dir(&self) -> &'static str {
        match self {
            | Registry::Advancements => "advancements",
            | Registry::LootTables => "loot_tables",
            | Registry::Predicates => "predicates",
            | Registry::ItemModifiers => "item_modifiers",
            | Registry::Recipes => "recipes",
            | Registry::Dimensions => "dimension",
            | Registry::DimensionTypes => "dimension_type",
        }
    }
}
