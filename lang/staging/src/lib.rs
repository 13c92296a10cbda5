#![allow(clippy::style)]

pub mod err;
pub use err::*;
pub mod stage;
pub use stage::*;
