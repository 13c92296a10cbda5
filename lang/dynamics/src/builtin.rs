//! Natively implemented definitions.
//!
//! A builtin receives its argument already evaluated and either reduces it to
//! a value or answers `None` when the argument is not known well enough yet;
//! the call is then kept as a neutral [`Run`].

use crate::{Evaluator, err::*, syntax::*};
use once_cell::sync::OnceCell;
use std::collections::HashMap;

pub type BuiltinFn = fn(&Evaluator, &RcValue) -> Result<Option<RcValue>>;

#[derive(Clone, Default)]
pub struct Builtins {
    table: HashMap<DefinitionLocation, BuiltinFn>,
}

impl Builtins {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn register(&mut self, name: DefinitionLocation, body: BuiltinFn) -> &mut Self {
        self.table.insert(name, body);
        self
    }
    pub fn get(&self, name: &DefinitionLocation) -> Option<BuiltinFn> {
        self.table.get(name).copied()
    }
    pub fn contains(&self, name: &DefinitionLocation) -> bool {
        self.table.contains_key(name)
    }
}

/// The builtins of the `prelude` module.
pub fn prelude() -> &'static Builtins {
    static PRELUDE: OnceCell<Builtins> = OnceCell::new();
    PRELUDE.get_or_init(|| {
        let mut builtins = Builtins::new();
        let module = ModuleLocation::new(["prelude"]);
        builtins
            .register(module.def("int_add"), |ev, arg| int2(ev, arg, |a, b| Some(a.wrapping_add(b))))
            .register(module.def("int_sub"), |ev, arg| int2(ev, arg, |a, b| Some(a.wrapping_sub(b))))
            .register(module.def("int_mul"), |ev, arg| int2(ev, arg, |a, b| Some(a.wrapping_mul(b))))
            .register(module.def("int_div"), |ev, arg| int2(ev, arg, |a, b| a.checked_div(b)))
            .register(module.def("int_mod"), |ev, arg| int2(ev, arg, |a, b| a.checked_rem(b)))
            .register(module.def("int_eq"), |ev, arg| cmp2(ev, arg, |a, b| a == b))
            .register(module.def("int_lt"), |ev, arg| cmp2(ev, arg, |a, b| a < b))
            .register(module.def("bool_not"), |_, arg| {
                Ok(arg.as_bool().map(|b| RcValue::new(Literal::Bool(!b).into())))
            })
            .register(module.def("bool_and"), |ev, arg| bool2(ev, arg, |a, b| a && b))
            .register(module.def("bool_or"), |ev, arg| bool2(ev, arg, |a, b| a || b));
        builtins
    })
}

/// Force both components of a pair argument.
fn pair(ev: &Evaluator, arg: &RcValue) -> Result<Option<(RcValue, RcValue)>> {
    match arg.as_ref() {
        | Value::Tuple(TupleOf(elements)) if elements.len() == 2 => {
            Ok(Some((elements[0].force(ev)?, elements[1].force(ev)?)))
        }
        | _ => Ok(None),
    }
}

fn int2(
    ev: &Evaluator, arg: &RcValue, op: impl Fn(i32, i32) -> Option<i32>,
) -> Result<Option<RcValue>> {
    let Some((a, b)) = pair(ev, arg)? else { return Ok(None) };
    Ok(a.as_int()
        .zip(b.as_int())
        .and_then(|(a, b)| op(a, b))
        .map(|res| RcValue::new(Literal::Int(res).into())))
}

fn cmp2(
    ev: &Evaluator, arg: &RcValue, op: impl Fn(i32, i32) -> bool,
) -> Result<Option<RcValue>> {
    let Some((a, b)) = pair(ev, arg)? else { return Ok(None) };
    Ok(a.as_int().zip(b.as_int()).map(|(a, b)| RcValue::new(Literal::Bool(op(a, b)).into())))
}

fn bool2(
    ev: &Evaluator, arg: &RcValue, op: impl Fn(bool, bool) -> bool,
) -> Result<Option<RcValue>> {
    let Some((a, b)) = pair(ev, arg)? else { return Ok(None) };
    Ok(a.as_bool().zip(b.as_bool()).map(|(a, b)| RcValue::new(Literal::Bool(op(a, b)).into())))
}
