//! Domain types for the flux desktop shell.
//! Defines the repository snapshot, its wire record and the error taxonomy.

pub mod error;
pub mod repo;
pub mod settings;
pub mod snapshot;

pub use error::*;
pub use repo::*;
pub use settings::*;
pub use snapshot::*;
