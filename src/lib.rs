//! sdsloc: location hierarchy of an SDS management portal
//!
//! Layers, innermost first:
//! - `domain`: location records, the arena-backed forest and its builder
//! - `application`: presentation projections, the location service, portal state
//! - `infrastructure`: filesystem access, seed providers, service container
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
