//! Location service
//!
//! Owns the in-process forest snapshot and applies the configured policy for
//! locations whose parent cannot be found.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use termtree::Tree;
use tracing::{debug, info, instrument, warn};

use crate::application::presentation::{
    self, Breadcrumb, BreadcrumbItem, LocationTable, TreeOptions,
};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{self, DomainError, LocationData, LocationForest, LocationId};

/// What to do with a new location whose parent id does not resolve.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum UnknownParentPolicy {
    /// Refuse the insertion, the forest stays unchanged
    #[default]
    Reject,
    /// Insert as a new root with the parent reference cleared
    Root,
}

impl FromStr for UnknownParentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "root" => Ok(Self::Root),
            other => Err(format!("unknown parent policy: {other}")),
        }
    }
}

/// Input of the location creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLocation {
    pub name: String,
    pub address: Option<String>,
    pub parent_id: Option<LocationId>,
}

impl NewLocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn under(mut self, parent_id: impl Into<LocationId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Everything the detail view shows for one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationDetail {
    pub row: LocationData,
    pub favorite: bool,
    pub is_root: bool,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub children: Vec<LocationData>,
    /// SDS count of the location and all locations below it
    pub total_sds_count: u64,
}

/// Service holding the location forest.
pub struct LocationService {
    forest: LocationForest,
    policy: UnknownParentPolicy,
    breadcrumb_tail: usize,
}

impl LocationService {
    pub fn new(forest: LocationForest, settings: &Settings) -> Self {
        Self {
            forest,
            policy: settings.unknown_parent,
            breadcrumb_tail: settings.breadcrumb_tail,
        }
    }

    /// Service with default settings and an explicit policy.
    pub fn with_policy(forest: LocationForest, policy: UnknownParentPolicy) -> Self {
        Self {
            forest,
            policy,
            breadcrumb_tail: Settings::default().breadcrumb_tail,
        }
    }

    pub fn forest(&self) -> &LocationForest {
        &self.forest
    }

    pub fn policy(&self) -> UnknownParentPolicy {
        self.policy
    }

    /// Create a location and attach it to the forest using the service policy.
    pub fn create_location(&mut self, new: NewLocation) -> ApplicationResult<LocationId> {
        self.create_location_with_policy(new, self.policy)
    }

    /// Create a location and attach it to the forest.
    ///
    /// Empty names fail validation. A parent id that does not resolve is
    /// handled by `policy`; with `Root` the stored record has no parent so
    /// containment stays consistent.
    #[instrument(level = "debug", skip(self))]
    pub fn create_location_with_policy(
        &mut self,
        new: NewLocation,
        policy: UnknownParentPolicy,
    ) -> ApplicationResult<LocationId> {
        let mut record = domain::create_location(
            &new.name,
            new.parent_id.as_deref(),
            new.address.as_deref(),
        )?;
        let id = record.id.clone();

        match self.forest.insert_under_parent(record.clone()) {
            Ok(_) => {}
            Err(DomainError::NotFound(parent_id)) => match policy {
                UnknownParentPolicy::Reject => {
                    warn!("parent {} not found, rejecting {}", parent_id, new.name);
                    return Err(DomainError::NotFound(parent_id).into());
                }
                UnknownParentPolicy::Root => {
                    warn!("parent {} not found, adding {} as root", parent_id, new.name);
                    record.parent_location_id = None;
                    self.forest.insert_under_parent(record)?;
                }
            },
            Err(e) => return Err(e.into()),
        }

        info!("created location {} ({})", new.name, id);
        Ok(id)
    }

    /// Detail view of a location, None when the id is unknown.
    #[instrument(level = "debug", skip(self))]
    pub fn select(&self, id: &str) -> Option<LocationDetail> {
        let node = self.forest.find_by_id(id)?;
        let idx = self.forest.index_of(id)?;
        let totals = self.forest.subtree_sds_totals();
        let children = self
            .forest
            .children_of(id)?
            .into_iter()
            .map(|child| presentation::to_table_row(&child.data))
            .collect();

        Some(LocationDetail {
            row: presentation::to_table_row(&node.data),
            favorite: node.data.favorite,
            is_root: node.data.is_root(),
            breadcrumbs: presentation::breadcrumbs(&self.forest, id)?,
            children,
            total_sds_count: totals.get(&idx).copied().unwrap_or(0),
        })
    }

    /// Breadcrumb trail for display, collapsed unless `full` is set.
    pub fn trail(&self, id: &str, full: bool) -> Option<Vec<BreadcrumbItem>> {
        let trail = presentation::breadcrumbs(&self.forest, id)?;
        if full {
            Some(trail.into_iter().map(BreadcrumbItem::Crumb).collect())
        } else {
            Some(presentation::collapse_breadcrumbs(&trail, self.breadcrumb_tail))
        }
    }

    /// Location table, optionally restricted to the subtree below `under`.
    pub fn table(&self, query: &str, under: Option<&str>) -> ApplicationResult<LocationTable> {
        debug!("table: query={:?}, under={:?}", query, under);
        LocationTable::build(&self.forest, query, under).ok_or_else(|| {
            ApplicationError::from(DomainError::NotFound(under.unwrap_or_default().to_string()))
        })
    }

    pub fn tree(&self, options: &TreeOptions) -> Vec<Tree<String>> {
        presentation::render_tree(&self.forest, options)
    }
}
