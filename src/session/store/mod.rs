//! Reducer-style session updates + backend commands.

mod action;
mod command;
mod reducer;
mod runtime;

pub use action::{Action, AsyncAction, SessionAction};
pub use command::Command;
pub(crate) use reducer::{SessionStore, reduce};
pub(crate) use runtime::run;
