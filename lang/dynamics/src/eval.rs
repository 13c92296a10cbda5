use crate::{builtin::*, err::*, pattern, syntax::*};
use std::rc::Rc;

/// How many definition bodies may be unfolded inside each other before a
/// call is kept as a neutral [`Run`].
pub const DEFAULT_UNFOLD_LIMIT: usize = 64;

/// Call-by-need evaluation of typed terms against a frozen definition table.
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    definitions: &'a Definitions,
    builtins: &'a Builtins,
    unfold_limit: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(definitions: &'a Definitions, builtins: &'a Builtins) -> Self {
        Evaluator { definitions, builtins, unfold_limit: DEFAULT_UNFOLD_LIMIT }
    }
    pub fn with_unfold_limit(self, unfold_limit: usize) -> Self {
        Evaluator { unfold_limit, ..self }
    }
    pub fn definitions(&self) -> &'a Definitions {
        self.definitions
    }

    /// Evaluate and read back at the term's own type.
    pub fn normalize(&self, term: &ArcTerm) -> Result<ArcTerm> {
        let value = self.eval(&mut Env::new(), term)?;
        self.quote(&value, &term.ty)
    }

    pub fn eval(&self, env: &mut Env, term: &ArcTerm) -> Result<RcValue> {
        let value = match &term.kind {
            | TermKind::Lit(lit) => Value::Lit(lit.clone()),
            | TermKind::Array(ArrayOf { kind, elements }) => {
                Value::Array(ArrayOf { kind: *kind, elements: lazies(env, elements) })
            }
            | TermKind::List(ListOf(elements)) => Value::List(ListOf(lazies(env, elements))),
            | TermKind::Compound(CompoundOf(elements)) => Value::Compound(CompoundOf(
                elements.iter().map(|(key, element)| (key.clone(), Lazy::suspend(env, element))).collect(),
            )),
            | TermKind::Ref(RefOf(element)) => Value::Ref(RefOf(Lazy::suspend(env, element))),
            | TermKind::Tuple(TupleOf(elements)) => Value::Tuple(TupleOf(lazies(env, elements))),
            | TermKind::Fun(FunOf { binder, body }) => {
                Value::Fun(Closure { binder: binder.clone(), body: body.clone(), env: env.clone() })
            }
            | TermKind::Apply(Apply { operator, arg }) => {
                let operator = self.eval(env, operator)?;
                let lazy = Lazy::suspend(env, arg);
                match operator.as_ref() {
                    | Value::Fun(closure) => return self.apply(closure, lazy),
                    | _ => Value::Apply(Stuck {
                        inner: Apply { operator, arg: lazy },
                        ty: arg.ty.clone(),
                    }),
                }
            }
            | TermKind::If(If { condition, then_clause, else_clause }) => {
                let condition = self.eval(env, condition)?;
                match condition.as_bool() {
                    | Some(true) => return self.eval(env, then_clause),
                    | Some(false) => return self.eval(env, else_clause),
                    | None => Value::If(If {
                        condition,
                        then_clause: Lazy::suspend(env, then_clause),
                        else_clause: Lazy::suspend(env, else_clause),
                    }),
                }
            }
            | TermKind::Let(Let { binder, init, body }) => {
                return env.restoring(|env| {
                    let init = Lazy::suspend(env, init);
                    pattern::bind_lazy(self, env, binder, init)?;
                    self.eval(env, body)
                });
            }
            | TermKind::Var(var) => match env.get(var.level) {
                | Some(lazy) => return lazy.force(self),
                // free in the term being normalized
                | None => Value::Var(var.clone()),
            },
            | TermKind::Run(Run { name, arg }) => return self.run(env, name, arg),
            | TermKind::Is(Is { scrutinee, scrutineer }) => {
                let value = self.eval(env, scrutinee)?;
                match pattern::match_value(self, scrutineer, &value)? {
                    | Some(matched) => Value::Lit(Literal::Bool(matched)),
                    | None => Value::Is(Stuck {
                        inner: Is { scrutinee: value, scrutineer: scrutineer.clone() },
                        ty: scrutinee.ty.clone(),
                    }),
                }
            }
            | TermKind::Command(command) => Value::Command(command.clone()),
            | TermKind::Code(CodeOf(element)) => Value::Code(CodeOf(Lazy::suspend(env, element))),
            | TermKind::Splice(Splice(element)) => {
                let value = self.eval(env, element)?;
                match value.as_ref() {
                    | Value::Code(CodeOf(inner)) => return inner.force(self),
                    | _ => Value::Splice(Stuck { inner: Splice(value), ty: element.ty.clone() }),
                }
            }
            | TermKind::Hole(Hole) => return Err(EvalError::UnexpectedHole),
        };
        Ok(Rc::new(value))
    }

    /// Beta-reduce a function value applied to an on-demand argument.
    pub fn apply(&self, closure: &Closure, arg: Lazy) -> Result<RcValue> {
        let mut env = closure.env.clone();
        pattern::bind_lazy(self, &mut env, &closure.binder, arg)?;
        self.eval(&mut env, &closure.body)
    }

    /// A call to a top-level definition. The body runs in a fresh environment
    /// holding only the parameter, one unfolding deeper than the caller.
    fn run(&self, env: &mut Env, name: &DefinitionLocation, arg: &ArcTerm) -> Result<RcValue> {
        let stuck = |value: RcValue| {
            Rc::new(Value::Run(Stuck {
                inner: Run { name: name.clone(), arg: value },
                ty: arg.ty.clone(),
            }))
        };
        match self.definitions.get(name) {
            | Some(Definition::Function(function)) if function.has(Annotation::Builtin) => {
                let native =
                    self.builtins.get(name).ok_or_else(|| EvalError::MissingBuiltin(name.clone()))?;
                let value = self.eval(env, arg)?;
                match native(self, &value)? {
                    | Some(res) => Ok(res),
                    | None => Ok(stuck(value)),
                }
            }
            | Some(Definition::Function(function)) => {
                if env.depth() >= self.unfold_limit {
                    log::trace!("unfolding limit reached at {}", name);
                    return Ok(stuck(self.eval(env, arg)?));
                }
                let mut callee = env.enter();
                pattern::bind_lazy(self, &mut callee, &function.binder, Lazy::suspend(env, arg))?;
                self.eval(&mut callee, &function.body)
            }
            | Some(Definition::Resource(_) | Definition::Type(_)) => {
                Err(EvalError::NotAFunction(name.clone()))
            }
            | None => Ok(stuck(self.eval(env, arg)?)),
        }
    }
}

fn lazies(env: &Env, elements: &[ArcTerm]) -> Vec<Lazy> {
    elements.iter().map(|element| Lazy::suspend(env, element)).collect()
}

/// Normalize a closed term against `definitions` with the prelude builtins.
pub fn normalize(definitions: &Definitions, term: &ArcTerm) -> Result<ArcTerm> {
    Evaluator::new(definitions, prelude()).normalize(term)
}
