//! peds-core
//!
//! Domain types, the error taxonomy, the trait seams every adapter plugs
//! into, configuration loading and the reference-page loader.

pub mod config;
pub mod error;
pub mod reference;
pub mod traits;
pub mod types;
