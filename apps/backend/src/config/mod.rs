pub mod rotation;

pub use rotation::{ConfigError, RotationConfig};
