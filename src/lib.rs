//! Desktop shell core for the flux version control system.
//!
//! The [`session::SessionController`] owns the open repository and its
//! lifecycle operations, [`navigation::NavigationComposer`] builds the sidebar
//! and [`app::FluxApp`] ties both together for a front end.

pub mod app;
pub mod domain;
pub mod infra;
pub mod navigation;
pub mod session;
