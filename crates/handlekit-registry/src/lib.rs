//! Handle registry: owns every map and queue created through HandleKit and resolves
//! opaque handles back to them.

pub mod registry;

pub use registry::{global, HandleRegistry, Structure};
