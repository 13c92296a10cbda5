#![allow(clippy::style)]

pub mod err;
pub use err::*;
pub mod free;
pub use free::FreeVars;
pub mod table;
pub use table::{FunctionTable, dispatch};
pub mod lift;
pub use lift::*;

#[cfg(test)]
mod tests;
