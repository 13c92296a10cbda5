//! The typed core IR produced by elaboration.
//!
//! Terms are immutable trees; subterms are shared through [`Arc`] so a
//! definition table can be read from several threads at once.

pub use crate::*;

use derive_more::{Deref, DerefMut, From};
use indexmap::IndexMap;
use std::sync::Arc;

/* ------------------------------- Identifier ------------------------------- */

pub type ArcTerm = Arc<Term>;
pub type ArcPattern = Arc<Pattern>;

/* ---------------------------------- Type ---------------------------------- */

/// Primitive types may be refined with a known literal, e.g. `int(5)` is the
/// singleton type whose only inhabitant is `5`.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Bool(Option<bool>),
    Byte(Option<i8>),
    Short(Option<i16>),
    Int(Option<i32>),
    Long(Option<i64>),
    Float(Option<f32>),
    Double(Option<f64>),
    String(Option<String>),
    Array(ArrayKind),
    List(Box<Type>),
    Compound(IndexMap<String, Type>),
    Ref(Box<Type>),
    Tuple(Vec<Type>),
    Fun(Box<Type>, Box<Type>),
    /// the empty union is the type with no runtime content
    Union(Vec<Type>),
    Code(Box<Type>),
    Var(Var),
    /// an application of a type alias
    Run(DefinitionLocation),
    Hole(Hole),
}

impl Type {
    /// The literal a singleton type pins its inhabitant to, if any.
    pub fn singleton(&self) -> Option<Literal> {
        match self {
            | Type::Bool(value) => value.map(Literal::Bool),
            | Type::Byte(value) => value.map(Literal::Byte),
            | Type::Short(value) => value.map(Literal::Short),
            | Type::Int(value) => value.map(Literal::Int),
            | Type::Long(value) => value.map(Literal::Long),
            | Type::Float(value) => value.map(Literal::Float),
            | Type::Double(value) => value.map(Literal::Double),
            | Type::String(value) => value.clone().map(Literal::String),
            | _ => None,
        }
    }
    /// The unrefined type of a literal.
    pub fn of_literal(lit: &Literal) -> Type {
        match lit {
            | Literal::Bool(_) => Type::Bool(None),
            | Literal::Byte(_) => Type::Byte(None),
            | Literal::Short(_) => Type::Short(None),
            | Literal::Int(_) => Type::Int(None),
            | Literal::Long(_) => Type::Long(None),
            | Literal::Float(_) => Type::Float(None),
            | Literal::Double(_) => Type::Double(None),
            | Literal::String(_) => Type::String(None),
        }
    }
    /// The element type of an array kind.
    pub fn of_array_element(kind: ArrayKind) -> Type {
        match kind {
            | ArrayKind::Byte => Type::Byte(None),
            | ArrayKind::Int => Type::Int(None),
            | ArrayKind::Long => Type::Long(None),
        }
    }
    pub fn unit() -> Type {
        Type::Tuple(Vec::new())
    }
}

/* ---------------------------------- Term ---------------------------------- */

/// Every term node carries its elaborated type.
#[derive(Clone, Debug, PartialEq)]
pub struct Term {
    pub kind: TermKind,
    pub ty: Type,
}

#[derive(From, Clone, Debug, PartialEq)]
pub enum TermKind {
    Lit(Literal),
    Array(ArrayOf<ArcTerm>),
    List(ListOf<ArcTerm>),
    Compound(CompoundOf<ArcTerm>),
    Ref(RefOf<ArcTerm>),
    Tuple(TupleOf<ArcTerm>),
    Fun(FunOf<ArcPattern, ArcTerm>),
    Apply(Apply<ArcTerm, ArcTerm>),
    If(If<ArcTerm, ArcTerm>),
    Let(Let<ArcPattern, ArcTerm>),
    Var(Var),
    Run(Run<ArcTerm>),
    Is(Is<ArcTerm, ArcPattern>),
    Command(Command),
    Code(CodeOf<ArcTerm>),
    Splice(Splice<ArcTerm>),
    Hole(Hole),
}

impl Term {
    pub fn new(kind: impl Into<TermKind>, ty: Type) -> Self {
        Term { kind: kind.into(), ty }
    }
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
    /// inclusive on both ends
    IntRangeOf(i32, i32),
    ListOf(ListOf<Pattern>),
    CompoundOf(CompoundOf<Pattern>),
    TupleOf(TupleOf<Pattern>),
    Var(Var),
    Drop,
    Hole(Hole),
}

impl Pattern {
    pub fn new(kind: PatternKind, ty: Type) -> Self {
        Pattern { kind, annotations: Vec::new(), ty }
    }
    /// Variables bound by the pattern, left to right.
    pub fn binders(&self) -> Vec<&Var> {
        fn go<'a>(pattern: &'a Pattern, acc: &mut Vec<&'a Var>) {
            match &pattern.kind {
                | PatternKind::IntOf(_)
                | PatternKind::IntRangeOf(_, _)
                | PatternKind::Drop
                | PatternKind::Hole(_) => {}
                | PatternKind::ListOf(ListOf(elements))
                | PatternKind::TupleOf(TupleOf(elements)) => {
                    elements.iter().for_each(|element| go(element, acc))
                }
                | PatternKind::CompoundOf(CompoundOf(elements)) => {
                    elements.values().for_each(|element| go(element, acc))
                }
                | PatternKind::Var(var) => acc.push(var),
            }
        }
        let mut acc = Vec::new();
        go(self, &mut acc);
        acc
    }
    /// Whether the pattern contains a hole anywhere.
    pub fn has_hole(&self) -> bool {
        match &self.kind {
            | PatternKind::Hole(_) => true,
            | PatternKind::IntOf(_)
            | PatternKind::IntRangeOf(_, _)
            | PatternKind::Var(_)
            | PatternKind::Drop => false,
            | PatternKind::ListOf(ListOf(elements)) | PatternKind::TupleOf(TupleOf(elements)) => {
                elements.iter().any(Pattern::has_hole)
            }
            | PatternKind::CompoundOf(CompoundOf(elements)) => {
                elements.values().any(Pattern::has_hole)
            }
        }
    }
}

/* -------------------------------- Definition ------------------------------ */

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Annotation {
    Tick,
    Load,
    NoDrop,
    Builtin,
    Export,
    Inline,
    Static,
}

#[derive(From, Clone, Debug, PartialEq)]
pub enum Definition {
    Resource(Resource),
    Function(Function),
    Type(TypeAlias),
}

/// a data-driven asset whose body is serialized as JSON
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    pub annotations: Vec<Annotation>,
    pub registry: Registry,
    pub name: DefinitionLocation,
    pub body: ArcTerm,
}

/// the parameter type is the binder's type
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub annotations: Vec<Annotation>,
    pub name: DefinitionLocation,
    pub binder: ArcPattern,
    pub result: Type,
    pub body: ArcTerm,
}

impl Function {
    pub fn param(&self) -> &Type {
        &self.binder.ty
    }
    pub fn has(&self, annotation: Annotation) -> bool {
        self.annotations.contains(&annotation)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeAlias {
    pub annotations: Vec<Annotation>,
    pub name: DefinitionLocation,
    pub body: Type,
}

impl Definition {
    pub fn name(&self) -> &DefinitionLocation {
        match self {
            | Definition::Resource(Resource { name, .. })
            | Definition::Function(Function { name, .. })
            | Definition::Type(TypeAlias { name, .. }) => name,
        }
    }
    pub fn annotations(&self) -> &[Annotation] {
        match self {
            | Definition::Resource(Resource { annotations, .. })
            | Definition::Function(Function { annotations, .. })
            | Definition::Type(TypeAlias { annotations, .. }) => annotations,
        }
    }
}

/// The per-compilation-unit definition table, read-only during every phase.
#[derive(Clone, Debug, Default, Deref, DerefMut, From)]
pub struct Definitions(pub IndexMap<DefinitionLocation, Definition>);

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, definition: impl Into<Definition>) -> Option<Definition> {
        let definition = definition.into();
        self.0.insert(definition.name().clone(), definition)
    }
    pub fn function(&self, name: &DefinitionLocation) -> Option<&Function> {
        match self.0.get(name) {
            | Some(Definition::Function(function)) => Some(function),
            | _ => None,
        }
    }
    /// Resolve a type alias application one step.
    pub fn alias(&self, name: &DefinitionLocation) -> Option<&Type> {
        match self.0.get(name) {
            | Some(Definition::Type(TypeAlias { body, .. })) => Some(body),
            | _ => None,
        }
    }
}

impl<D: Into<Definition>> FromIterator<D> for Definitions {
    fn from_iter<I: IntoIterator<Item = D>>(iter: I) -> Self {
        let mut definitions = Definitions::new();
        for definition in iter {
            definitions.insert(definition);
        }
        definitions
    }
}
