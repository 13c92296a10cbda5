//! Structural matching of values against patterns, shared by `Is` and by
//! every binder (`Let`, function parameters, definition parameters).

use crate::{Evaluator, err::*, syntax::*};
use mcx_syntax::fmt::{Formatter, Ugly};
use std::{rc::Rc, sync::Arc};

/// Decide whether `value` matches `pattern`: `Some` when decidable, `None`
/// when the value is not reduced far enough yet.
pub fn match_value(ev: &Evaluator, pattern: &Pattern, value: &RcValue) -> Result<Option<bool>> {
    match &pattern.kind {
        | PatternKind::Hole(Hole) => Err(EvalError::UnexpectedHole),
        | PatternKind::Var(_) | PatternKind::Drop => Ok(Some(true)),
        | PatternKind::IntOf(expected) => match value.as_ref() {
            | Value::Lit(Literal::Int(actual)) => Ok(Some(actual == expected)),
            | v if v.is_neutral() => Ok(None),
            | v => Err(ill_typed(v, pattern)),
        },
        | PatternKind::IntRangeOf(min, max) => match value.as_ref() {
            | Value::Lit(Literal::Int(actual)) => Ok(Some(min <= actual && actual <= max)),
            | v if v.is_neutral() => Ok(None),
            | v => Err(ill_typed(v, pattern)),
        },
        | _ if value.is_neutral() => Ok(if irrefutable(pattern)? { Some(true) } else { None }),
        | PatternKind::TupleOf(TupleOf(patterns)) => match value.as_ref() {
            | Value::Tuple(TupleOf(elements)) if patterns.len() == elements.len() => {
                match_all(ev, patterns.iter().zip(elements))
            }
            | v => Err(ill_typed(v, pattern)),
        },
        | PatternKind::ListOf(ListOf(patterns)) => match value.as_ref() {
            | Value::List(ListOf(elements)) if patterns.len() != elements.len() => Ok(Some(false)),
            | Value::List(ListOf(elements)) => match_all(ev, patterns.iter().zip(elements)),
            | v => Err(ill_typed(v, pattern)),
        },
        | PatternKind::CompoundOf(CompoundOf(patterns)) => match value.as_ref() {
            | Value::Compound(CompoundOf(elements)) => {
                let mut pairs = Vec::with_capacity(patterns.len());
                for (key, field) in patterns {
                    let element = elements.get(key).ok_or_else(|| ill_typed(value, pattern))?;
                    pairs.push((field, element));
                }
                match_all(ev, pairs.into_iter())
            }
            | v => Err(ill_typed(v, pattern)),
        },
    }
}

/// All sub-patterns must match. A definite mismatch wins over an unknown.
fn match_all<'p>(
    ev: &Evaluator, pairs: impl Iterator<Item = (&'p Pattern, &'p Lazy)>,
) -> Result<Option<bool>> {
    let mut decided = true;
    for (pattern, element) in pairs {
        if irrefutable(pattern)? {
            continue;
        }
        match match_value(ev, pattern, &element.force(ev)?)? {
            | Some(false) => return Ok(Some(false)),
            | Some(true) => {}
            | None => decided = false,
        }
    }
    Ok(decided.then_some(true))
}

/// Whether a pattern matches every value of its type.
pub fn irrefutable(pattern: &Pattern) -> Result<bool> {
    match &pattern.kind {
        | PatternKind::Hole(Hole) => Err(EvalError::UnexpectedHole),
        | PatternKind::Var(_) | PatternKind::Drop => Ok(true),
        | PatternKind::IntOf(_) | PatternKind::IntRangeOf(_, _) | PatternKind::ListOf(_) => Ok(false),
        | PatternKind::TupleOf(TupleOf(patterns)) => {
            for pattern in patterns {
                if !irrefutable(pattern)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        | PatternKind::CompoundOf(CompoundOf(patterns)) => {
            for pattern in patterns.values() {
                if !irrefutable(pattern)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

/// Bind the variables of `pattern` to the matching parts of `lazy`, in the
/// order [`Pattern::binders`] lists them. A plain variable binds the whole
/// value without forcing it.
pub fn bind_lazy(ev: &Evaluator, env: &mut Env, pattern: &Pattern, lazy: Lazy) -> Result<()> {
    match &pattern.kind {
        | PatternKind::Hole(Hole) => Err(EvalError::UnexpectedHole),
        | PatternKind::Var(_) => {
            env.bind(lazy);
            Ok(())
        }
        | PatternKind::IntOf(_) | PatternKind::IntRangeOf(_, _) | PatternKind::Drop => Ok(()),
        | PatternKind::TupleOf(_) | PatternKind::ListOf(_) | PatternKind::CompoundOf(_)
            if pattern.binders().is_empty() =>
        {
            Ok(())
        }
        | PatternKind::TupleOf(TupleOf(patterns)) | PatternKind::ListOf(ListOf(patterns)) => {
            let value = lazy.force(ev)?;
            match value.as_ref() {
                | v if v.is_neutral() => bind_projections(env, pattern, &value),
                | Value::Tuple(TupleOf(elements)) | Value::List(ListOf(elements))
                    if elements.len() == patterns.len() =>
                {
                    for (pattern, element) in patterns.iter().zip(elements) {
                        bind_lazy(ev, env, pattern, element.clone())?;
                    }
                    Ok(())
                }
                | v => Err(ill_typed(v, pattern)),
            }
        }
        | PatternKind::CompoundOf(CompoundOf(patterns)) => {
            let value = lazy.force(ev)?;
            match value.as_ref() {
                | v if v.is_neutral() => bind_projections(env, pattern, &value),
                | Value::Compound(CompoundOf(elements)) => {
                    for (key, pattern) in patterns {
                        let element = elements.get(key).ok_or_else(|| ill_typed(&value, pattern))?;
                        bind_lazy(ev, env, pattern, element.clone())?;
                    }
                    Ok(())
                }
                | v => Err(ill_typed(v, pattern)),
            }
        }
    }
}

/// Destructuring a stuck value: every variable becomes a stuck projection
/// out of it.
fn bind_projections(env: &mut Env, pattern: &Pattern, init: &RcValue) -> Result<()> {
    let binder = Arc::new(pattern.clone());
    for var in pattern.binders() {
        env.bind(Lazy::ready(Rc::new(Value::Project(Project {
            binder: binder.clone(),
            init: init.clone(),
            var: var.clone(),
        }))));
    }
    Ok(())
}

fn ill_typed(value: &Value, pattern: &Pattern) -> EvalError {
    EvalError::IllTyped { value: value.head().to_string(), ty: pattern.ugly(&Formatter::new()) }
}
