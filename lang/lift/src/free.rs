//! Free variables by name, in order of first use.

use indexmap::IndexSet;
use mcx_syntax::typed::*;
use std::ops::{Add, Sub};

/// An insertion-ordered set of variable names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Names(IndexSet<String>);

impl Names {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn singleton(name: impl Into<String>) -> Self {
        Names(IndexSet::from([name.into()]))
    }
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Union; names of `self` come first.
impl Add for Names {
    type Output = Names;
    fn add(mut self, rhs: Names) -> Names {
        self.0.extend(rhs.0);
        self
    }
}

impl Sub for Names {
    type Output = Names;
    fn sub(mut self, rhs: Names) -> Names {
        self.0.retain(|name| !rhs.0.contains(name));
        self
    }
}

impl FromIterator<String> for Names {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Names(iter.into_iter().collect())
    }
}

pub trait Vars {
    fn vars(&self) -> Names;
}

impl Vars for Pattern {
    fn vars(&self) -> Names {
        self.binders().into_iter().map(|var| var.name.clone()).collect()
    }
}

pub trait FreeVars {
    fn free_vars(&self) -> Names;
}

impl<T: FreeVars> FreeVars for [T] {
    fn free_vars(&self) -> Names {
        self.iter().fold(Names::new(), |acc, item| acc + item.free_vars())
    }
}

impl<T: FreeVars + ?Sized> FreeVars for std::sync::Arc<T> {
    fn free_vars(&self) -> Names {
        T::free_vars(self)
    }
}

impl FreeVars for Term {
    fn free_vars(&self) -> Names {
        match &self.kind {
            | TermKind::Lit(_) | TermKind::Command(_) | TermKind::Hole(Hole) => Names::new(),
            | TermKind::Array(ArrayOf { elements, .. })
            | TermKind::List(ListOf(elements))
            | TermKind::Tuple(TupleOf(elements)) => elements.free_vars(),
            | TermKind::Compound(CompoundOf(elements)) => {
                elements.values().fold(Names::new(), |acc, element| acc + element.free_vars())
            }
            | TermKind::Ref(RefOf(element))
            | TermKind::Code(CodeOf(element))
            | TermKind::Splice(Splice(element)) => element.free_vars(),
            | TermKind::Fun(FunOf { binder, body }) => body.free_vars() - binder.vars(),
            | TermKind::Apply(Apply { operator, arg }) => operator.free_vars() + arg.free_vars(),
            | TermKind::If(If { condition, then_clause, else_clause }) => {
                condition.free_vars() + then_clause.free_vars() + else_clause.free_vars()
            }
            | TermKind::Let(Let { binder, init, body }) => {
                init.free_vars() + (body.free_vars() - binder.vars())
            }
            | TermKind::Var(Var { name, .. }) => Names::singleton(name.clone()),
            | TermKind::Run(Run { arg, .. }) => arg.free_vars(),
            | TermKind::Is(Is { scrutinee, .. }) => scrutinee.free_vars(),
        }
    }
}
