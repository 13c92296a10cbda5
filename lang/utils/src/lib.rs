#![allow(clippy::style)]
#![allow(clippy::useless_format)]

pub mod cells;
pub mod scope;


pub mod prelude {
    /// Data structures.
    pub use crate::{cells::Memo, scope::Scope};
}
