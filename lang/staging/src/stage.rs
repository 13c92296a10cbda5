//! Collapse the compile-time part of a program.
//!
//! Only definitions whose interface is entirely at the final stage survive.
//! Their bodies are rewritten structurally, and every splice still present is
//! evaluated right away and read back as residual code.

use crate::err::*;
use mcx_dynamics::{Builtins, Env, Evaluator, Lazy, pattern, prelude};
use mcx_syntax::{
    fmt::{Formatter, Ugly},
    typed::*,
};
use std::sync::Arc;

pub struct Stager<'a> {
    ev: Evaluator<'a>,
}

impl<'a> Stager<'a> {
    pub fn new(definitions: &'a Definitions, builtins: &'a Builtins) -> Self {
        Stager { ev: Evaluator::new(definitions, builtins) }
    }
    pub fn with_unfold_limit(self, unfold_limit: usize) -> Self {
        Stager { ev: self.ev.with_unfold_limit(unfold_limit) }
    }

    /// How many code wrappers are nested in a type; aliases are looked through.
    pub fn min_stage(&self, ty: &Type) -> Result<usize> {
        self.min_stage_within(ty, self.ev.definitions().len())
    }

    fn min_stage_within(&self, ty: &Type, fuel: usize) -> Result<usize> {
        let max = |tys: &mut dyn Iterator<Item = &Type>| -> Result<usize> {
            let mut stage = 0;
            for ty in tys {
                stage = stage.max(self.min_stage_within(ty, fuel)?);
            }
            Ok(stage)
        };
        match ty {
            | Type::Bool(_)
            | Type::Byte(_)
            | Type::Short(_)
            | Type::Int(_)
            | Type::Long(_)
            | Type::Float(_)
            | Type::Double(_)
            | Type::String(_)
            | Type::Array(_)
            | Type::Fun(_, _)
            | Type::Union(_)
            | Type::Var(_) => Ok(0),
            | Type::List(element) | Type::Ref(element) => self.min_stage_within(element, fuel),
            | Type::Compound(elements) => max(&mut elements.values()),
            | Type::Tuple(elements) => max(&mut elements.iter()),
            | Type::Code(element) => Ok(self.min_stage_within(element, fuel)? + 1),
            | Type::Run(name) => match self.ev.definitions().alias(name) {
                | _ if fuel == 0 => Err(StageError::CyclicAlias(name.clone())),
                | Some(body) => self.min_stage_within(body, fuel - 1),
                | None => Ok(0),
            },
            | Type::Hole(Hole) => Err(StageError::UnexpectedHole),
        }
    }

    /// `None` when the definition does not belong to the final program.
    pub fn stage(&self, definition: &Definition) -> Result<Option<Definition>> {
        let function = match definition {
            | Definition::Function(function) => function,
            | Definition::Resource(_) | Definition::Type(_) => return Ok(Some(definition.clone())),
        };
        if function.has(Annotation::Static) || function.has(Annotation::Inline) {
            log::debug!("pruning compile-time function {}", function.name);
            return Ok(None);
        }
        if self.min_stage(function.param())? != 0 || self.min_stage(&function.result)? != 0 {
            log::debug!("pruning {}: its interface is not at the final stage", function.name);
            return Ok(None);
        }
        if function.has(Annotation::Builtin) {
            return Ok(Some(definition.clone()));
        }
        log::debug!("staging {}", function.name);
        let mut env = Env::new();
        check_pattern(&function.binder)?;
        env.bind_neutral(&function.binder);
        let body = self.stage_term(&mut env, &function.body)?;
        log::trace!("staged {} = {}", function.name, body.ugly(&Formatter::new()));
        Ok(Some(Function { body, ..function.clone() }.into()))
    }

    /// `env` holds every variable in scope, so that levels seen by the
    /// evaluator line up with the term's. Runtime variables stay neutral;
    /// compile-time ones carry their value for splices to use.
    fn stage_term(&self, env: &mut Env, term: &ArcTerm) -> Result<ArcTerm> {
        let kind: TermKind = match &term.kind {
            | TermKind::Lit(_) | TermKind::Var(_) | TermKind::Command(_) => return Ok(term.clone()),
            | TermKind::Array(ArrayOf { kind, elements }) => {
                ArrayOf { kind: *kind, elements: self.stage_all(env, elements)? }.into()
            }
            | TermKind::List(ListOf(elements)) => ListOf(self.stage_all(env, elements)?).into(),
            | TermKind::Compound(CompoundOf(elements)) => {
                let mut staged = indexmap::IndexMap::new();
                for (key, element) in elements {
                    staged.insert(key.clone(), self.stage_term(env, element)?);
                }
                CompoundOf(staged).into()
            }
            | TermKind::Ref(RefOf(element)) => RefOf(self.stage_term(env, element)?).into(),
            | TermKind::Tuple(TupleOf(elements)) => TupleOf(self.stage_all(env, elements)?).into(),
            | TermKind::Fun(FunOf { binder, body }) => {
                check_pattern(binder)?;
                let body = env.restoring(|env| {
                    env.bind_neutral(binder);
                    self.stage_term(env, body)
                })?;
                FunOf { binder: binder.clone(), body }.into()
            }
            | TermKind::Apply(Apply { operator, arg }) => {
                Apply { operator: self.stage_term(env, operator)?, arg: self.stage_term(env, arg)? }
                    .into()
            }
            | TermKind::If(If { condition, then_clause, else_clause }) => If {
                condition: self.stage_term(env, condition)?,
                then_clause: self.stage_term(env, then_clause)?,
                else_clause: self.stage_term(env, else_clause)?,
            }
            .into(),
            | TermKind::Let(Let { binder, init, body }) => {
                check_pattern(binder)?;
                let init = self.stage_term(env, init)?;
                let compile_time = self.min_stage(&binder.ty)? > 0;
                let body = env.restoring(|env| -> Result<ArcTerm> {
                    if compile_time {
                        let lazy = Lazy::suspend(env, &init);
                        pattern::bind_lazy(&self.ev, env, binder, lazy)?;
                    } else {
                        env.bind_neutral(binder);
                    }
                    self.stage_term(env, body)
                })?;
                if compile_time && self.min_stage(&term.ty)? == 0 {
                    // every use of the binding has been spliced away
                    return Ok(body);
                }
                Let { binder: binder.clone(), init, body }.into()
            }
            | TermKind::Run(Run { name, arg }) => {
                Run { name: name.clone(), arg: self.stage_term(env, arg)? }.into()
            }
            | TermKind::Is(Is { scrutinee, scrutineer }) => {
                check_pattern(scrutineer)?;
                Is { scrutinee: self.stage_term(env, scrutinee)?, scrutineer: scrutineer.clone() }
                    .into()
            }
            // splices under a quote belong to the stage that splices the quote
            | TermKind::Code(_) => return Ok(term.clone()),
            | TermKind::Splice(_) => {
                let value = self.ev.eval(env, term)?;
                let residual = self.ev.quote(&value, &term.ty)?;
                log::trace!("spliced {}", residual.ugly(&Formatter::new()));
                return Ok(residual);
            }
            | TermKind::Hole(Hole) => return Err(StageError::UnexpectedHole),
        };
        Ok(Arc::new(Term::new(kind, term.ty.clone())))
    }

    fn stage_all(&self, env: &mut Env, terms: &[ArcTerm]) -> Result<Vec<ArcTerm>> {
        terms.iter().map(|term| self.stage_term(env, term)).collect()
    }
}

fn check_pattern(pattern: &Pattern) -> Result<()> {
    if pattern.has_hole() { Err(StageError::UnexpectedHole) } else { Ok(()) }
}

/// Stage one definition against the table, with the prelude builtins.
pub fn stage(definitions: &Definitions, definition: &Definition) -> Result<Option<Definition>> {
    Stager::new(definitions, prelude()).stage(definition)
}
