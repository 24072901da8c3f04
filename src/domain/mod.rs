//! Domain layer: location entities and the forest
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;

pub use arena::{LocationForest, LocationNode};
pub use builder::ForestBuilder;
pub use entities::*;
pub use error::{DomainError, DomainResult};
