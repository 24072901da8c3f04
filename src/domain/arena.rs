use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::entities::{Location, LocationId, LocationRecord};
use crate::domain::error::{DomainError, DomainResult};

/// Tree node in the arena-based location forest.
#[derive(Debug)]
pub struct LocationNode {
    /// Location data for this node
    pub data: LocationRecord,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in display order
    pub children: Vec<Index>,
}

impl LocationNode {
    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-based forest of locations.
///
/// Uses a generational arena for memory-safe node references and keeps an
/// id table next to it, so lookups by id are O(1). Roots keep their
/// insertion order; so do the children of every node.
#[derive(Debug)]
pub struct LocationForest {
    /// Arena storage for all location nodes
    arena: Arena<LocationNode>,
    /// Root nodes in display order
    roots: Vec<Index>,
    /// Location id to arena index
    by_id: HashMap<LocationId, Index>,
}

impl Default for LocationForest {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationForest {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: Index) -> Option<&LocationNode> {
        self.arena.get(idx)
    }

    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.by_id.get(id).copied()
    }

    /// Look up a location anywhere in the forest.
    #[instrument(level = "trace", skip(self))]
    pub fn find_by_id(&self, id: &str) -> Option<&LocationNode> {
        self.index_of(id).and_then(|idx| self.arena.get(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Attach a new location as the last root or as the last child of the
    /// location named by its `parent_location_id`.
    ///
    /// Fails with `NotFound` when the parent id does not resolve and with
    /// `DuplicateId` when the id is already taken. The forest is unchanged on
    /// failure.
    #[instrument(level = "debug", skip(self, record), fields(id = %record.id))]
    pub fn insert_under_parent(&mut self, record: LocationRecord) -> DomainResult<Index> {
        if self.by_id.contains_key(&record.id) {
            return Err(DomainError::DuplicateId(record.id));
        }
        let parent = match record.parent_location_id.as_deref() {
            None => None,
            Some(parent_id) => Some(
                self.index_of(parent_id)
                    .ok_or_else(|| DomainError::NotFound(parent_id.to_string()))?,
            ),
        };

        let id = record.id.clone();
        let node = LocationNode {
            data: record,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }
        self.by_id.insert(id, node_idx);

        Ok(node_idx)
    }

    /// Ancestors of a location, root first, excluding the location itself.
    ///
    /// Walks `parent_location_id` upwards and stops at the first id that does
    /// not resolve. Unknown start ids yield an empty path.
    #[instrument(level = "debug", skip(self))]
    pub fn ancestor_path(&self, id: &str) -> Vec<&LocationNode> {
        let mut path = Vec::new();
        let Some(mut current) = self.find_by_id(id) else {
            return path;
        };
        while let Some(parent_id) = current.data.parent_location_id.as_deref() {
            if path.len() >= self.len() {
                break;
            }
            match self.find_by_id(parent_id) {
                Some(parent) => {
                    path.push(parent);
                    current = parent;
                }
                None => {
                    debug!("dangling parent reference {} from {}", parent_id, current.id());
                    break;
                }
            }
        }
        path.reverse();
        path
    }

    /// Direct children of a location, in display order.
    pub fn children_of(&self, id: &str) -> Option<Vec<&LocationNode>> {
        let node = self.find_by_id(id)?;
        Some(
            node.children
                .iter()
                .filter_map(|&child| self.arena.get(child))
                .collect(),
        )
    }

    /// Depth-first pre-order traversal over all roots.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> ForestIterator<'_> {
        ForestIterator::new(self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Pre-order traversal of the subtree below `id`, excluding `id` itself.
    pub fn descendants(&self, id: &str) -> Option<Vec<&LocationNode>> {
        let node = self.find_by_id(id)?;
        let mut stack: Vec<Index> = node.children.iter().rev().copied().collect();
        let mut result = Vec::new();
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.get(current) {
                stack.extend(node.children.iter().rev());
                result.push(node);
            }
        }
        Some(result)
    }

    /// Number of levels of the deepest tree, 0 for an empty forest.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(Index, usize)> = self.roots.iter().map(|&root| (root, 1)).collect();
        while let Some((idx, level)) = stack.pop() {
            if let Some(node) = self.get_node(idx) {
                deepest = deepest.max(level);
                stack.extend(node.children.iter().map(|&child| (child, level + 1)));
            }
        }
        deepest
    }

    /// Ids of all locations without children, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_ids(&self) -> Vec<LocationId> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.data.id.clone())
            .collect()
    }

    /// SDS count of every location including all of its descendants.
    #[instrument(level = "debug", skip(self))]
    pub fn subtree_sds_totals(&self) -> HashMap<Index, u64> {
        let mut totals: HashMap<Index, u64> = HashMap::with_capacity(self.len());
        for (idx, node) in self.iter_postorder() {
            let below: u64 = node
                .children
                .iter()
                .filter_map(|child| totals.get(child))
                .sum();
            totals.insert(idx, u64::from(node.data.sds_count_or_default()) + below);
        }
        totals
    }

    /// Rebuild the nested representation of the whole forest.
    ///
    /// Children are nested bottom-up from a post-order walk.
    pub fn to_locations(&self) -> Vec<Location> {
        let mut built: HashMap<Index, Location> = HashMap::with_capacity(self.len());
        for (idx, node) in self.iter_postorder() {
            let children = node
                .children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(idx, node.data.clone().into_location(children));
        }
        self.roots
            .iter()
            .filter_map(|root| built.remove(root))
            .collect()
    }
}

pub struct ForestIterator<'a> {
    forest: &'a LocationForest,
    stack: Vec<Index>,
}

impl<'a> ForestIterator<'a> {
    fn new(forest: &'a LocationForest) -> Self {
        // Roots in reverse so the first root is visited first
        let stack = forest.roots().iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for ForestIterator<'a> {
    type Item = (Index, &'a LocationNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    forest: &'a LocationForest,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(forest: &'a LocationForest) -> Self {
        let stack = forest
            .roots()
            .iter()
            .rev()
            .map(|&root| (root, false))
            .collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a LocationNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, parent: Option<&str>) -> LocationRecord {
        LocationRecord {
            id: id.to_string(),
            name: id.to_uppercase(),
            favorite: false,
            parent_location_id: parent.map(str::to_string),
            address: None,
            sds_count: None,
        }
    }

    //   a         d
    //  / \
    // b   c
    fn sample() -> LocationForest {
        let mut forest = LocationForest::new();
        forest.insert_under_parent(record("a", None)).unwrap();
        forest.insert_under_parent(record("b", Some("a"))).unwrap();
        forest.insert_under_parent(record("c", Some("a"))).unwrap();
        forest.insert_under_parent(record("d", None)).unwrap();
        forest
    }

    #[test]
    fn given_forest_when_iterating_then_visits_preorder_across_roots() {
        let forest = sample();
        let ids: Vec<_> = forest.iter().map(|(_, n)| n.id().to_string()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn given_forest_when_iterating_postorder_then_children_come_first() {
        let forest = sample();
        let ids: Vec<_> = forest
            .iter_postorder()
            .map(|(_, n)| n.id().to_string())
            .collect();
        assert_eq!(ids, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn given_forest_when_computing_depth_and_leaves_then_spans_all_roots() {
        let forest = sample();
        assert_eq!(forest.depth(), 2);
        assert_eq!(forest.leaf_ids(), vec!["b", "c", "d"]);
    }

    #[test]
    fn given_duplicate_id_when_inserting_then_forest_is_unchanged() {
        let mut forest = sample();
        let err = forest.insert_under_parent(record("b", None)).unwrap_err();
        assert_eq!(err, DomainError::DuplicateId("b".into()));
        assert_eq!(forest.len(), 4);
        assert_eq!(forest.roots().len(), 2);
    }

    #[test]
    fn given_empty_forest_when_querying_then_everything_is_empty() {
        let forest = LocationForest::new();
        assert!(forest.is_empty());
        assert_eq!(forest.depth(), 0);
        assert!(forest.find_by_id("a").is_none());
        assert!(forest.ancestor_path("a").is_empty());
        assert_eq!(forest.iter().count(), 0);
    }
}
