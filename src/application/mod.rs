//! Application layer: services, presentation and portal state
//!
//! This layer orchestrates domain logic and produces display-ready structures.

pub mod error;
pub mod portal;
pub mod presentation;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use portal::{DashboardSummary, NavigationIntent, Navigator, Portal, Section};
pub use presentation::{
    breadcrumbs, collapse_breadcrumbs, filter_locations, format_trail, render_tree,
    render_tree_string, to_table_row, Breadcrumb, BreadcrumbItem, LocationTable, TreeFilterMode,
    TreeOptions, EMPTY_STATE,
};
pub use services::{LocationDetail, LocationService, NewLocation, UnknownParentPolicy};
