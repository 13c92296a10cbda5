//! Read-back of values into terms.
//!
//! Quoting is directed by the expected type: singleton types reproduce their
//! literal whatever the value looks like, aliases are looked through, and a
//! union picks the first alternative the value reads back at. Function values
//! are read back by evaluating their body under the binder.

use crate::{Evaluator, err::*, syntax::*};
use mcx_syntax::fmt::{Formatter, Ugly};
use std::sync::Arc;

impl<'a> Evaluator<'a> {
    pub fn quote(&self, value: &RcValue, ty: &Type) -> Result<ArcTerm> {
        let kind = match ty.singleton() {
            | Some(lit) => TermKind::Lit(lit),
            | None => self.quote_kind(value, ty)?,
        };
        Ok(Arc::new(Term::new(kind, ty.clone())))
    }

    fn quote_lazy(&self, lazy: &Lazy, ty: &Type) -> Result<ArcTerm> {
        self.quote(&lazy.force(self)?, ty)
    }

    fn quote_kind(&self, value: &RcValue, ty: &Type) -> Result<TermKind> {
        let view = self.view(ty)?;
        let kind: TermKind = match (value.as_ref(), view) {
            | (Value::Lit(lit), _) => lit.clone().into(),
            | (Value::Array(ArrayOf { kind, elements }), _) => {
                let element_ty = Type::of_array_element(*kind);
                let elements = elements
                    .iter()
                    .map(|element| self.quote_lazy(element, &element_ty))
                    .collect::<Result<_>>()?;
                ArrayOf { kind: *kind, elements }.into()
            }
            | (Value::List(ListOf(elements)), Type::List(element_ty)) => ListOf(
                elements
                    .iter()
                    .map(|element| self.quote_lazy(element, element_ty))
                    .collect::<Result<_>>()?,
            )
            .into(),
            | (Value::Compound(CompoundOf(elements)), Type::Compound(field_tys)) => {
                let mut fields = indexmap::IndexMap::new();
                for (key, element) in elements {
                    let field_ty = field_tys.get(key).ok_or_else(|| ill_typed(value, ty))?;
                    fields.insert(key.clone(), self.quote_lazy(element, field_ty)?);
                }
                CompoundOf(fields).into()
            }
            | (Value::Ref(RefOf(element)), Type::Ref(element_ty)) => {
                RefOf(self.quote_lazy(element, element_ty)?).into()
            }
            | (Value::Tuple(TupleOf(elements)), Type::Tuple(element_tys))
                if elements.len() == element_tys.len() =>
            {
                TupleOf(
                    elements
                        .iter()
                        .zip(element_tys)
                        .map(|(element, element_ty)| self.quote_lazy(element, element_ty))
                        .collect::<Result<_>>()?,
                )
                .into()
            }
            | (Value::Fun(Closure { binder, body, env }), Type::Fun(_, result_ty)) => {
                let mut env = env.clone();
                env.bind_neutral(binder);
                let body = self.eval(&mut env, body)?;
                FunOf { binder: binder.clone(), body: self.quote(&body, result_ty)? }.into()
            }
            | (Value::Code(CodeOf(element)), Type::Code(element_ty)) => {
                CodeOf(self.quote_lazy(element, element_ty)?).into()
            }
            /* --------------------------------- Neutral -------------------------------- */
            | (Value::Var(var), _) => var.clone().into(),
            | (Value::Apply(Stuck { inner: Apply { operator, arg }, ty: arg_ty }), _) => {
                let fun_ty = Type::Fun(Box::new(arg_ty.clone()), Box::new(ty.clone()));
                Apply { operator: self.quote(operator, &fun_ty)?, arg: self.quote_lazy(arg, arg_ty)? }
                    .into()
            }
            | (Value::If(If { condition, then_clause, else_clause }), _) => If {
                condition: self.quote(condition, &Type::Bool(None))?,
                then_clause: self.quote_lazy(then_clause, ty)?,
                else_clause: self.quote_lazy(else_clause, ty)?,
            }
            .into(),
            | (Value::Run(Stuck { inner: Run { name, arg }, ty: arg_ty }), _) => {
                Run { name: name.clone(), arg: self.quote(arg, arg_ty)? }.into()
            }
            | (Value::Is(Stuck { inner: Is { scrutinee, scrutineer }, ty: scrutinee_ty }), _) => {
                Is { scrutinee: self.quote(scrutinee, scrutinee_ty)?, scrutineer: scrutineer.clone() }
                    .into()
            }
            | (Value::Command(command), _) => command.clone().into(),
            | (Value::Splice(Stuck { inner: Splice(element), ty: code_ty }), _) => {
                Splice(self.quote(element, code_ty)?).into()
            }
            | (Value::Project(Project { binder, init, var }), _) => {
                let body = Arc::new(Term::new(var.clone(), ty.clone()));
                Let { binder: binder.clone(), init: self.quote(init, &binder.ty)?, body }.into()
            }
            /* ---------------------------------- Union --------------------------------- */
            | (_, Type::Union(alternatives)) => {
                for alternative in alternatives {
                    if let Ok(kind) = self.quote_kind(value, alternative) {
                        return Ok(kind);
                    }
                }
                return Err(ill_typed(value, ty));
            }
            | _ => return Err(ill_typed(value, ty)),
        };
        Ok(kind)
    }

    /// Look through type alias applications.
    fn view<'t>(&self, ty: &'t Type) -> Result<&'t Type>
    where
        'a: 't,
    {
        let mut ty = ty;
        // an alias chain longer than the table is a cycle
        for _ in 0..=self.definitions().len() {
            match ty {
                | Type::Run(name) => match self.definitions().alias(name) {
                    | Some(body) => ty = body,
                    | None => return Ok(ty),
                },
                | Type::Hole(Hole) => return Err(EvalError::UnexpectedHole),
                | _ => return Ok(ty),
            }
        }
        Err(EvalError::IllTyped { value: "alias".to_string(), ty: ty.ugly(&Formatter::new()) })
    }
}

fn ill_typed(value: &Value, ty: &Type) -> EvalError {
    EvalError::IllTyped { value: value.head().to_string(), ty: ty.ugly(&Formatter::new()) }
}
