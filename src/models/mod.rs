//! Data models for the RT REST 2.0 API.
//!
//! Each module pairs RT wire types (RT field casing, deserialize only) with
//! the normalized snake_case records that tools return.

mod attachment;
mod common;
mod directory;
mod history;
mod links;
mod ticket;

pub use attachment::*;
pub use common::*;
pub use directory::*;
pub use history::*;
pub use links::*;
pub use ticket::*;
