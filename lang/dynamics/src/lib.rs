#![allow(clippy::style)]
#![allow(clippy::useless_format)]

pub mod syntax;
pub use syntax::{Env, Lazy, RcValue, Value};
pub mod err;
pub use err::*;
pub mod builtin;
pub use builtin::{Builtins, prelude};
pub mod eval;
pub use eval::*;
pub mod quote;
pub mod pattern;
