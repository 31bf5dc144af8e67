//! Domain layer: frames and the registry that owns them.

pub mod frame;
pub mod registry;
