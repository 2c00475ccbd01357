//! Infrastructure layer (adapters/implementations).
//!
//! This module contains the IO-heavy parts: the on-disk repository store, the
//! backend command boundary and the application preferences file.

pub mod app_config;
pub mod backend;
pub mod hash;
pub mod store;
