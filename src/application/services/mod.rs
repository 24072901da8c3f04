//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.

mod locations;

pub use locations::{LocationDetail, LocationService, NewLocation, UnknownParentPolicy};
