//! Forest builder for turning nested seed locations into an arena forest.

use tracing::{debug, instrument};

use crate::domain::arena::LocationForest;
use crate::domain::entities::{Location, NAME_REQUIRED};
use crate::domain::error::{DomainError, DomainResult};

/// Constructs a `LocationForest` from nested locations.
///
/// Validates while building: names must be non-empty, ids unique, and every
/// `parent_location_id` must name the location that actually contains it.
#[derive(Debug)]
pub struct ForestBuilder {
    strict_parents: bool,
}

impl Default for ForestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self {
            strict_parents: true,
        }
    }

    /// Fill in missing or wrong `parent_location_id` values from containment
    /// instead of rejecting them.
    pub fn lenient_parents(mut self) -> Self {
        self.strict_parents = false;
        self
    }

    #[instrument(level = "debug", skip(self, roots), fields(roots = roots.len()))]
    pub fn build(&self, roots: Vec<Location>) -> DomainResult<LocationForest> {
        let mut forest = LocationForest::new();
        // (location, id of the containing location); pushed in reverse so that
        // siblings are inserted in their original order
        let mut stack: Vec<(Location, Option<String>)> =
            roots.into_iter().rev().map(|root| (root, None)).collect();

        while let Some((mut location, container_id)) = stack.pop() {
            if location.name.trim().is_empty() {
                return Err(DomainError::validation("name", NAME_REQUIRED));
            }
            if location.parent_location_id != container_id {
                if self.strict_parents {
                    return Err(DomainError::ParentMismatch {
                        id: location.id,
                        declared: location.parent_location_id,
                        actual: container_id,
                    });
                }
                debug!(
                    "fixing parent of {}: {:?} -> {:?}",
                    location.id, location.parent_location_id, container_id
                );
                location.parent_location_id = container_id;
            }

            let children = std::mem::take(&mut location.children);
            let id = location.id.clone();
            forest.insert_under_parent(location.record())?;

            for child in children.into_iter().rev() {
                stack.push((child, Some(id.clone())));
            }
        }

        debug!("built forest with {} locations", forest.len());
        Ok(forest)
    }
}
