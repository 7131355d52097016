//! Core types shared by every HandleKit crate.
//!
//! - `types`: the opaque [`Handle`] and the [`StructureKind`] tag
//! - `error`: the error taxonomy surfaced by the registry
//! - `config_manager`: layered configuration (dotenv, TOML, environment)
//! - `logging`: tracing subscriber bootstrap

pub mod config_manager;
pub mod error;
pub mod logging;
pub mod types;

pub use config_manager::*;
pub use error::*;
pub use logging::init_logging;
pub use types::*;
