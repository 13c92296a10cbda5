#![allow(clippy::style)]

pub mod err;
pub use err::*;
pub mod location;
pub use location::pack_location;
pub mod stack;
pub mod json;
pub use json::pack_json;
pub mod pack;
pub use pack::*;
pub mod dispatch;
pub use dispatch::pack_dispatch;
