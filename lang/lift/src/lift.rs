//! Closure conversion.
//!
//! Every lambda becomes a top-level function taking `(param, {captures})` and
//! is replaced by a closure record `{_: tag, captures...}`; applications go
//! through [`dispatch`]. Both branches of every conditional become functions
//! of the whole live environment, which the conditional passes them a copy of.
//!
//! Variables are resolved by name against the lifting scope, innermost
//! first, and renumbered by their position in it.

use crate::{err::*, free::FreeVars, table::*};
use indexmap::IndexMap;
use mcx_syntax::{
    fmt::{Formatter, Ugly},
    lifted as ls,
    typed::{self as ts, *},
};
use mcx_utils::prelude::Scope;

/// A variable in scope while lifting.
#[derive(Clone, Debug)]
struct Binding {
    name: String,
    ty: ls::Type,
}

/// The state of lifting one definition. Nothing reaches the global
/// [`FunctionTable`] until the whole definition has been lifted.
pub struct Lifter<'a> {
    definitions: &'a Definitions,
    table: &'a FunctionTable,
    name: DefinitionLocation,
    fresh: usize,
    closures: Vec<DefinitionLocation>,
    helpers: Vec<ls::Definition>,
}

impl<'a> Lifter<'a> {
    pub fn new(
        definitions: &'a Definitions, table: &'a FunctionTable, name: DefinitionLocation,
    ) -> Self {
        Lifter { definitions, table, name, fresh: 0, closures: Vec::new(), helpers: Vec::new() }
    }

    /// The lifted definition followed by its helpers, and the closure bodies
    /// to append to the table, in tag order.
    pub fn lift(
        mut self, definition: &Definition,
    ) -> Result<(Vec<ls::Definition>, Vec<DefinitionLocation>)> {
        let lifted: Option<ls::Definition> = match definition {
            | Definition::Function(function) => Some(self.lift_function(function)?),
            | Definition::Resource(Resource { annotations, registry, name, body }) => {
                let body = self.lift_term(&mut Scope::new(), body)?;
                Some(
                    ls::Resource {
                        annotations: lift_annotations(annotations)?,
                        registry: *registry,
                        name: name.clone(),
                        body,
                    }
                    .into(),
                )
            }
            | Definition::Type(_) => None,
        };
        let mut definitions: Vec<_> = lifted.into_iter().collect();
        definitions.extend(self.helpers);
        Ok((definitions, self.closures))
    }

    fn lift_function(&mut self, function: &Function) -> Result<ls::Definition> {
        let annotations = lift_annotations(&function.annotations)?;
        if function.has(Annotation::Builtin) {
            return Ok(ls::Builtin {
                annotations,
                name: function.name.clone(),
                param: self.lift_type(function.param())?,
                result: self.lift_type(&function.result)?,
            }
            .into());
        }
        let mut scope = Scope::new();
        let binder = self.lift_pattern(&mut scope, &function.binder)?;
        let body = self.lift_term(&mut scope, &function.body)?;
        Ok(ls::Function {
            annotations,
            name: function.name.clone(),
            binder,
            result: self.lift_type(&function.result)?,
            body,
            restore: None,
        }
        .into())
    }

    fn fresh_name(&mut self) -> DefinitionLocation {
        let name = self.name.module.def(format!("{}:{}", self.name.name, self.fresh));
        self.fresh += 1;
        name
    }

    /* ---------------------------------- Types --------------------------------- */

    pub fn lift_type(&self, ty: &ts::Type) -> Result<ls::Type> {
        self.lift_type_within(ty, self.definitions.len())
    }

    fn lift_type_within(&self, ty: &ts::Type, fuel: usize) -> Result<ls::Type> {
        let go = |ty: &ts::Type| self.lift_type_within(ty, fuel);
        Ok(match ty {
            | ts::Type::Bool(_) => ls::Type::Bool,
            | ts::Type::Byte(_) => ls::Type::Byte,
            | ts::Type::Short(_) => ls::Type::Short,
            | ts::Type::Int(_) => ls::Type::Int,
            | ts::Type::Long(_) => ls::Type::Long,
            | ts::Type::Float(_) => ls::Type::Float,
            | ts::Type::Double(_) => ls::Type::Double,
            | ts::Type::String(_) => ls::Type::String,
            | ts::Type::Array(kind) => ls::Type::Array(*kind),
            | ts::Type::List(element) => ls::Type::List(Box::new(go(element)?)),
            | ts::Type::Compound(elements) => ls::Type::Compound(
                elements.iter().map(|(key, ty)| Ok((key.clone(), go(ty)?))).collect::<Result<_>>()?,
            ),
            | ts::Type::Ref(element) => ls::Type::Ref(Box::new(go(element)?)),
            | ts::Type::Tuple(elements) => {
                ls::Type::Tuple(elements.iter().map(go).collect::<Result<_>>()?)
            }
            | ts::Type::Fun(param, result) => {
                ls::Type::Fun(Box::new(go(param)?), Box::new(go(result)?))
            }
            | ts::Type::Union(elements) => {
                ls::Type::Union(elements.iter().map(go).collect::<Result<_>>()?)
            }
            | ts::Type::Code(_) => Err(LiftError::UnexpectedStaging)?,
            | ts::Type::Var(_) => Err(LiftError::UnexpectedType(ty.ugly(&Formatter::new())))?,
            | ts::Type::Run(name) => match self.definitions.alias(name) {
                | _ if fuel == 0 => Err(LiftError::UnexpectedType(ty.ugly(&Formatter::new())))?,
                | Some(body) => self.lift_type_within(body, fuel - 1)?,
                | None => Err(LiftError::UnresolvedDefinition(name.clone()))?,
            },
            | ts::Type::Hole(Hole) => Err(LiftError::UnexpectedHole)?,
        })
    }

    /* -------------------------------- Patterns -------------------------------- */

    /// Variables are bound into `scope` left to right.
    fn lift_pattern(&self, scope: &mut Scope<Binding>, pattern: &Pattern) -> Result<ls::Pattern> {
        let ty = self.lift_type(&pattern.ty)?;
        let kind = match &pattern.kind {
            | PatternKind::IntOf(value) => ls::PatternKind::IntOf(*value),
            | PatternKind::IntRangeOf(min, max) => ls::PatternKind::IntRangeOf(*min, *max),
            | PatternKind::ListOf(ListOf(elements)) => ls::PatternKind::ListOf(ListOf(
                elements.iter().map(|element| self.lift_pattern(scope, element)).collect::<Result<_>>()?,
            )),
            | PatternKind::CompoundOf(CompoundOf(elements)) => {
                let mut fields = IndexMap::new();
                for (key, element) in elements {
                    fields.insert(key.clone(), self.lift_pattern(scope, element)?);
                }
                ls::PatternKind::CompoundOf(CompoundOf(fields))
            }
            | PatternKind::TupleOf(TupleOf(elements)) => ls::PatternKind::TupleOf(TupleOf(
                elements.iter().map(|element| self.lift_pattern(scope, element)).collect::<Result<_>>()?,
            )),
            | PatternKind::Var(Var { name, .. }) => {
                let level = scope.bind(Binding { name: name.clone(), ty: ty.clone() });
                ls::PatternKind::Var(Var::new(name.clone(), level))
            }
            | PatternKind::Drop => ls::PatternKind::Drop,
            | PatternKind::Hole(Hole) => Err(LiftError::UnexpectedHole)?,
        };
        Ok(ls::Pattern { kind, annotations: lift_annotations(&pattern.annotations)?, ty })
    }

    /* ---------------------------------- Terms --------------------------------- */

    fn lift_term(&mut self, scope: &mut Scope<Binding>, term: &Term) -> Result<ls::Term> {
        let ty = self.lift_type(&term.ty)?;
        let kind: ls::TermKind = match &term.kind {
            | TermKind::Lit(lit) => lit.clone().into(),
            | TermKind::Array(ArrayOf { kind, elements }) => {
                ArrayOf { kind: *kind, elements: self.lift_all(scope, elements)? }.into()
            }
            | TermKind::List(ListOf(elements)) => ListOf(self.lift_all(scope, elements)?).into(),
            | TermKind::Compound(CompoundOf(elements)) => {
                let mut fields = IndexMap::new();
                for (key, element) in elements {
                    fields.insert(key.clone(), self.lift_term(scope, element)?);
                }
                CompoundOf(fields).into()
            }
            | TermKind::Ref(RefOf(element)) => RefOf(Box::new(self.lift_term(scope, element)?)).into(),
            | TermKind::Tuple(TupleOf(elements)) => TupleOf(self.lift_all(scope, elements)?).into(),
            | TermKind::Fun(FunOf { binder, body }) => {
                self.lift_lambda(scope, term, binder, body)?.into()
            }
            | TermKind::Apply(Apply { operator, arg }) => {
                let operator = self.lift_term(scope, operator)?;
                let arg = self.lift_term(scope, arg)?;
                let pair_ty = ls::Type::Tuple(vec![arg.ty.clone(), operator.ty.clone()]);
                let pair = ls::Term::new(TupleOf(vec![arg, operator]), pair_ty);
                Run { name: dispatch(), arg: Box::new(pair) }.into()
            }
            | TermKind::If(If { condition, then_clause, else_clause }) => {
                let expected = ty.erase();
                for clause in [then_clause, else_clause] {
                    let found = self.lift_type(&clause.ty)?.erase();
                    if found != expected {
                        Err(LiftError::BranchShapeMismatch { expected: expected.clone(), found })?
                    }
                }
                let condition = Box::new(self.lift_term(scope, condition)?);
                let then_name = self.lift_branch(scope, then_clause, &ty, Some(1))?;
                let else_name = self.lift_branch(scope, else_clause, &ty, None)?;
                let arg = Box::new(live(scope));
                ls::Branch { condition, arg, then_name, else_name }.into()
            }
            | TermKind::Let(Let { binder, init, body }) => {
                let init = Box::new(self.lift_term(scope, init)?);
                scope.restoring(|scope| -> Result<ls::TermKind> {
                    let binder = self.lift_pattern(scope, binder)?;
                    let body = Box::new(self.lift_term(scope, body)?);
                    Ok(Let { binder, init, body }.into())
                })?
            }
            | TermKind::Var(var) => self.resolve(scope, &var.name)?.into(),
            | TermKind::Run(Run { name, arg }) => {
                if self.definitions.function(name).is_none() && *name != dispatch() {
                    Err(LiftError::UnresolvedDefinition(name.clone()))?
                }
                Run { name: name.clone(), arg: Box::new(self.lift_term(scope, arg)?) }.into()
            }
            | TermKind::Is(Is { scrutinee, scrutineer }) => {
                let scrutinee = Box::new(self.lift_term(scope, scrutinee)?);
                let scrutineer = scope.restoring(|scope| self.lift_pattern(scope, scrutineer))?;
                Is { scrutinee, scrutineer }.into()
            }
            | TermKind::Command(command) => command.clone().into(),
            | TermKind::Code(_) | TermKind::Splice(_) => Err(LiftError::UnexpectedStaging)?,
            | TermKind::Hole(Hole) => Err(LiftError::UnexpectedHole)?,
        };
        Ok(ls::Term::new(kind, ty))
    }

    fn lift_all(&mut self, scope: &mut Scope<Binding>, terms: &[ArcTerm]) -> Result<Vec<ls::Term>> {
        terms.iter().map(|term| self.lift_term(scope, term)).collect()
    }

    /// The innermost variable called `name`, at its level in `scope`.
    fn resolve(&self, scope: &Scope<Binding>, name: &str) -> Result<Var> {
        scope
            .position_last(|binding| binding.name == name)
            .map(|level| Var::new(name, level))
            .ok_or_else(|| LiftError::UnresolvedVariable(name.to_string()))
    }

    fn lift_lambda(
        &mut self, scope: &Scope<Binding>, term: &Term, binder: &Pattern, body: &Term,
    ) -> Result<ls::Closure> {
        // captures are looked up where the lambda stands
        let mut captures = Vec::new();
        for name in term.free_vars().iter() {
            let Var { name, level } = self.resolve(scope, name)?;
            let ty = scope.get(level).map(|binding| binding.ty.clone()).ok_or_else(|| {
                LiftError::UnresolvedVariable(name.clone())
            })?;
            captures.push(ls::Capture { name, level, ty });
        }
        let result = match self.lift_type(&term.ty)? {
            | ls::Type::Fun(_, result) => *result,
            | _ => Err(LiftError::UnexpectedType(term.ty.ugly(&Formatter::new())))?,
        };

        let mut inner = Scope::new();
        let param = self.lift_pattern(&mut inner, binder)?;
        let mut fields = IndexMap::new();
        let mut field_tys = IndexMap::new();
        for ls::Capture { name, ty, .. } in &captures {
            let level = inner.bind(Binding { name: name.clone(), ty: ty.clone() });
            let field = ls::Pattern {
                kind: ls::PatternKind::Var(Var::new(name.clone(), level)),
                annotations: Vec::new(),
                ty: ty.clone(),
            };
            fields.insert(name.clone(), field);
            field_tys.insert(name.clone(), ty.clone());
        }
        let record = ls::Pattern {
            kind: ls::PatternKind::CompoundOf(CompoundOf(fields)),
            annotations: Vec::new(),
            ty: ls::Type::Compound(field_tys),
        };
        let binder_ty = ls::Type::Tuple(vec![param.ty.clone(), record.ty.clone()]);
        let binder = ls::Pattern {
            kind: ls::PatternKind::TupleOf(TupleOf(vec![param, record])),
            annotations: Vec::new(),
            ty: binder_ty,
        };
        let body = self.lift_term(&mut inner, body)?;

        let name = self.fresh_name();
        let tag = self.table.len() + self.closures.len();
        log::trace!("lifted closure {} with tag {}", name, tag);
        self.closures.push(name.clone());
        self.helpers.push(
            ls::Function {
                annotations: Vec::new(),
                name,
                binder,
                result,
                body,
                restore: Some(tag as i32),
            }
            .into(),
        );
        Ok(ls::Closure { tag, captures })
    }

    /// A branch becomes a function of every variable in scope, taking them
    /// as a tuple in level order.
    fn lift_branch(
        &mut self, scope: &Scope<Binding>, clause: &Term, ty: &ls::Type, restore: Option<i32>,
    ) -> Result<DefinitionLocation> {
        let params: Vec<_> = scope
            .iter()
            .enumerate()
            .map(|(level, Binding { name, ty })| ls::Pattern {
                kind: ls::PatternKind::Var(Var::new(name.clone(), level)),
                annotations: Vec::new(),
                ty: ty.clone(),
            })
            .collect();
        let binder_ty = ls::Type::Tuple(params.iter().map(|param| param.ty.clone()).collect());
        let binder = ls::Pattern {
            kind: ls::PatternKind::TupleOf(TupleOf(params)),
            annotations: Vec::new(),
            ty: binder_ty,
        };
        let mut inner = scope.clone();
        let body = self.lift_term(&mut inner, clause)?;
        let name = self.fresh_name();
        self.helpers.push(
            ls::Function {
                annotations: Vec::new(),
                name: name.clone(),
                binder,
                result: ty.clone(),
                body,
                restore,
            }
            .into(),
        );
        Ok(name)
    }
}

/// `(a@0, b@1, ...)`, every variable in scope.
fn live(scope: &Scope<Binding>) -> ls::Term {
    let vars: Vec<_> = (scope.iter().enumerate())
        .map(|(level, Binding { name, ty })| {
            ls::Term::new(Var::new(name.clone(), level), ty.clone())
        })
        .collect();
    let ty = ls::Type::Tuple(vars.iter().map(|var| var.ty.clone()).collect());
    ls::Term::new(TupleOf(vars), ty)
}

fn lift_annotations(annotations: &[Annotation]) -> Result<Vec<ls::Annotation>> {
    let mut lifted = Vec::new();
    for annotation in annotations {
        match annotation {
            | Annotation::Tick => lifted.push(ls::Annotation::Tick),
            | Annotation::Load => lifted.push(ls::Annotation::Load),
            | Annotation::NoDrop => lifted.push(ls::Annotation::NoDrop),
            | Annotation::Builtin => lifted.push(ls::Annotation::Builtin),
            | Annotation::Export => {}
            | Annotation::Inline | Annotation::Static => {
                Err(LiftError::UnexpectedAnnotation(*annotation))?
            }
        }
    }
    Ok(lifted)
}

/// Lift one staged definition. `definitions` is the staged table; the closure
/// bodies the definition introduces are added to `table` only on success.
pub fn lift(
    definitions: &Definitions, table: &mut FunctionTable, definition: &Definition,
) -> Result<Vec<ls::Definition>> {
    log::debug!("lifting {}", definition.name());
    let (lifted, closures) = Lifter::new(definitions, table, definition.name().clone()).lift(definition)?;
    table.commit(closures);
    for definition in &lifted {
        log::trace!("{}", definition.ugly(&Formatter::new()));
    }
    Ok(lifted)
}
