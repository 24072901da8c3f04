//! Display-ready projections of the location forest
//!
//! Table rows, breadcrumb trails, text filtering and the sidebar tree.
//! Nothing in here mutates the forest.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use generational_arena::Index;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use termtree::Tree;
use tracing::instrument;

use crate::domain::{LocationData, LocationForest, LocationId, LocationNode, LocationRecord};

/// Shown instead of an empty table body or an empty tree.
pub const EMPTY_STATE: &str = "No locations found";

const ELLIPSIS: &str = "...";
const FAVORITE_MARK: &str = " ★";
const SELECTED_MARK: &str = "> ";

/// Project a location onto a table row.
pub fn to_table_row(record: &LocationRecord) -> LocationData {
    LocationData::from(record)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub id: LocationId,
    pub name: String,
}

impl From<&LocationNode> for Breadcrumb {
    fn from(node: &LocationNode) -> Self {
        Self {
            id: node.data.id.clone(),
            name: node.data.name.clone(),
        }
    }
}

/// One rendered element of a (possibly collapsed) breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreadcrumbItem {
    Crumb(Breadcrumb),
    Ellipsis,
}

impl fmt::Display for BreadcrumbItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreadcrumbItem::Crumb(crumb) => write!(f, "{}", crumb.name),
            BreadcrumbItem::Ellipsis => write!(f, "{}", ELLIPSIS),
        }
    }
}

/// Trail from the root down to and including the selected location.
///
/// Returns None when the selected id is not in the forest.
#[instrument(level = "debug", skip(forest))]
pub fn breadcrumbs(forest: &LocationForest, selected_id: &str) -> Option<Vec<Breadcrumb>> {
    let selected = forest.find_by_id(selected_id)?;
    let mut trail: Vec<Breadcrumb> = forest
        .ancestor_path(selected_id)
        .into_iter()
        .map(Breadcrumb::from)
        .collect();
    trail.push(Breadcrumb::from(selected));
    Some(trail)
}

/// Collapse a trail for display.
///
/// The root and the last `tail` ancestors stay visible; anything between them
/// is replaced by a single ellipsis. The selected location (last element) is
/// always shown.
pub fn collapse_breadcrumbs(trail: &[Breadcrumb], tail: usize) -> Vec<BreadcrumbItem> {
    let Some((selected, ancestors)) = trail.split_last() else {
        return Vec::new();
    };
    let mut items = Vec::with_capacity(tail + 3);
    if ancestors.len() <= tail + 1 {
        items.extend(ancestors.iter().cloned().map(BreadcrumbItem::Crumb));
    } else {
        items.push(BreadcrumbItem::Crumb(ancestors[0].clone()));
        items.push(BreadcrumbItem::Ellipsis);
        items.extend(
            ancestors[ancestors.len() - tail..]
                .iter()
                .cloned()
                .map(BreadcrumbItem::Crumb),
        );
    }
    items.push(BreadcrumbItem::Crumb(selected.clone()));
    items
}

pub fn format_trail(items: &[BreadcrumbItem]) -> String {
    items.iter().join(" / ")
}

fn normalize_query(query: &str) -> Option<String> {
    let query = query.trim();
    (!query.is_empty()).then(|| query.to_lowercase())
}

fn name_matches(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle)
}

/// Flattened pre-order list of locations whose name contains `query`,
/// ignoring case. Surrounding whitespace in `query` is trimmed before
/// matching, so `" lab "` finds "Laboratory A". An empty or blank query
/// keeps every location.
#[instrument(level = "debug", skip(forest))]
pub fn filter_locations<'a>(forest: &'a LocationForest, query: &str) -> Vec<&'a LocationNode> {
    let needle = normalize_query(query);
    forest
        .iter()
        .map(|(_, node)| node)
        .filter(|node| {
            needle
                .as_deref()
                .map_or(true, |needle| name_matches(&node.data.name, needle))
        })
        .collect()
}

/// Flat table of locations for list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationTable {
    pub rows: Vec<LocationData>,
}

impl LocationTable {
    pub fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a LocationNode>) -> Self {
        Self {
            rows: nodes
                .into_iter()
                .map(|node| to_table_row(&node.data))
                .collect(),
        }
    }

    /// Rows for the whole forest, or for the subtree below `under`, filtered
    /// by name. Returns None when `under` does not resolve.
    #[instrument(level = "debug", skip(forest))]
    pub fn build(forest: &LocationForest, query: &str, under: Option<&str>) -> Option<Self> {
        let needle = normalize_query(query);
        let keep = |node: &&LocationNode| {
            needle
                .as_deref()
                .map_or(true, |needle| name_matches(&node.data.name, needle))
        };
        let nodes = match under {
            Some(id) => forest.descendants(id)?.into_iter().filter(keep).collect_vec(),
            None => filter_locations(forest, query),
        };
        Some(Self::from_nodes(nodes))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl fmt::Display for LocationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(f, "{}", EMPTY_STATE);
        }
        let headers = ["Location Name", "Address", "SDS Files"];
        let cells: Vec<[String; 3]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.name.clone(),
                    row.address.clone(),
                    format!("{} files", row.sds_count),
                ]
            })
            .collect();
        let mut widths = headers.map(|h| h.chars().count());
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        writeln!(
            f,
            "{:<w0$}  {:<w1$}  {}",
            headers[0],
            headers[1],
            headers[2],
            w0 = widths[0],
            w1 = widths[1]
        )?;
        writeln!(
            f,
            "{}  {}  {}",
            "-".repeat(widths[0]),
            "-".repeat(widths[1]),
            "-".repeat(widths[2])
        )?;
        let body = cells
            .iter()
            .map(|[name, address, count]| {
                format!(
                    "{:<w0$}  {:<w1$}  {}",
                    name,
                    address,
                    count,
                    w0 = widths[0],
                    w1 = widths[1]
                )
            })
            .join("\n");
        write!(f, "{}", body)
    }
}

/// How a text query affects the sidebar tree.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TreeFilterMode {
    /// Keep the full tree and mark matching names
    #[default]
    Highlight,
    /// Keep only matches and their ancestors
    Prune,
}

impl FromStr for TreeFilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "highlight" => Ok(Self::Highlight),
            "prune" => Ok(Self::Prune),
            other => Err(format!("unknown tree filter mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeOptions {
    pub query: Option<String>,
    pub mode: TreeFilterMode,
    pub selected: Option<LocationId>,
}

/// Render the forest as one `termtree` per root.
///
/// Labels carry `> ` for the selected location, ` ★` for favorites and
/// square brackets around names matching the query. An empty result means
/// there is nothing to show.
#[instrument(level = "debug", skip(forest))]
pub fn render_tree(forest: &LocationForest, options: &TreeOptions) -> Vec<Tree<String>> {
    let needle = options.query.as_deref().and_then(normalize_query);
    let visible = match (&needle, options.mode) {
        (Some(needle), TreeFilterMode::Prune) => Some(matching_with_ancestors(forest, needle)),
        _ => None,
    };
    let labels = Labeler {
        needle: needle.as_deref(),
        selected: options.selected.as_deref(),
    };

    // Built bottom-up; a hidden node never has visible children
    let mut built: HashMap<Index, Tree<String>> = HashMap::new();
    for (idx, node) in forest.iter_postorder() {
        if visible.as_ref().is_some_and(|visible| !visible.contains(&idx)) {
            continue;
        }
        let leaves: Vec<_> = node
            .children
            .iter()
            .filter_map(|child| built.remove(child))
            .collect();
        built.insert(idx, Tree::new(labels.label(node)).with_leaves(leaves));
    }
    forest
        .roots()
        .iter()
        .filter_map(|root| built.remove(root))
        .collect()
}

/// Forest rendered as text, or the empty state.
pub fn render_tree_string(forest: &LocationForest, options: &TreeOptions) -> String {
    let trees = render_tree(forest, options);
    if trees.is_empty() {
        return EMPTY_STATE.to_string();
    }
    trees.iter().map(|tree| tree.to_string()).join("")
}

fn matching_with_ancestors(forest: &LocationForest, needle: &str) -> HashSet<Index> {
    let mut visible = HashSet::new();
    for (idx, node) in forest.iter_postorder() {
        let child_visible = node.children.iter().any(|child| visible.contains(child));
        if child_visible || name_matches(&node.data.name, needle) {
            visible.insert(idx);
        }
    }
    visible
}

struct Labeler<'a> {
    needle: Option<&'a str>,
    selected: Option<&'a str>,
}

impl Labeler<'_> {
    fn label(&self, node: &LocationNode) -> String {
        let data = &node.data;
        let marker = if self.selected == Some(data.id.as_str()) {
            SELECTED_MARK
        } else {
            ""
        };
        let star = if data.favorite { FAVORITE_MARK } else { "" };
        let hit = self
            .needle
            .is_some_and(|needle| name_matches(&data.name, needle));
        if hit {
            format!("{marker}[{}]{star}", data.name)
        } else {
            format!("{marker}{}{star}", data.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crumbs(names: &[&str]) -> Vec<Breadcrumb> {
        names
            .iter()
            .map(|n| Breadcrumb {
                id: n.to_string(),
                name: n.to_string(),
            })
            .collect()
    }

    #[test]
    fn given_short_trail_when_collapsing_then_keeps_everything() {
        let trail = crumbs(&["root", "a", "b", "leaf"]);
        let items = collapse_breadcrumbs(&trail, 2);
        assert_eq!(format_trail(&items), "root / a / b / leaf");
    }

    #[test]
    fn given_long_trail_when_collapsing_then_hides_middle() {
        let trail = crumbs(&["root", "a", "b", "c", "leaf"]);
        let items = collapse_breadcrumbs(&trail, 2);
        assert_eq!(format_trail(&items), "root / ... / b / c / leaf");
        assert_eq!(items[1], BreadcrumbItem::Ellipsis);
    }

    #[test]
    fn given_empty_trail_when_collapsing_then_returns_nothing() {
        assert!(collapse_breadcrumbs(&[], 2).is_empty());
    }

    #[test]
    fn given_mode_names_when_parsing_then_accepts_any_case() {
        assert_eq!("Prune".parse::<TreeFilterMode>(), Ok(TreeFilterMode::Prune));
        assert_eq!(
            "highlight".parse::<TreeFilterMode>(),
            Ok(TreeFilterMode::Highlight)
        );
        assert!("hide".parse::<TreeFilterMode>().is_err());
    }

    #[test]
    fn given_empty_table_when_rendering_then_shows_empty_state() {
        let table = LocationTable { rows: Vec::new() };
        assert_eq!(table.to_string(), EMPTY_STATE);
    }
}
