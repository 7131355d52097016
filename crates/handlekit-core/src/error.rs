use crate::config_manager::ConfigError;
use crate::types::{Handle, StructureKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandleKitError {
    #[error("Invalid handle: {0} was never issued")]
    InvalidHandle(Handle),

    #[error("Wrong kind: handle {handle} refers to a {actual}, expected a {expected}")]
    WrongKind {
        handle: Handle,
        expected: StructureKind,
        actual: StructureKind,
    },

    #[error("Handle space exhausted")]
    HandlesExhausted,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, HandleKitError>;
