//! Domain entities: locations in the facility hierarchy

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{DomainError, DomainResult};

/// Opaque location identifier, unique across the forest.
pub type LocationId = String;

/// Table cell shown when a location has no address.
pub const NO_ADDRESS: &str = "No address specified";

/// Field-level message for an empty location name.
pub const NAME_REQUIRED: &str = "Location name is required";

/// Nested location as it appears in seed files and exports.
///
/// Children are owned, so a well-formed value cannot contain cycles.
/// `parent_location_id` must match the id of the containing location
/// (or be absent for roots); `ForestBuilder` enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_location_id: Option<LocationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sds_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Location>,
}

impl Location {
    /// Scalar fields of this location, without its children.
    pub fn record(&self) -> LocationRecord {
        LocationRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            favorite: self.favorite,
            parent_location_id: self.parent_location_id.clone(),
            address: self.address.clone(),
            sds_count: self.sds_count,
        }
    }
}

/// Data payload of a node in the location arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRecord {
    pub id: LocationId,
    pub name: String,
    pub favorite: bool,
    pub parent_location_id: Option<LocationId>,
    pub address: Option<String>,
    pub sds_count: Option<u32>,
}

impl LocationRecord {
    pub fn is_root(&self) -> bool {
        self.parent_location_id.is_none()
    }

    /// SDS count with the absent value read as zero.
    pub fn sds_count_or_default(&self) -> u32 {
        self.sds_count.unwrap_or(0)
    }

    pub fn into_location(self, children: Vec<Location>) -> Location {
        Location {
            id: self.id,
            name: self.name,
            favorite: self.favorite,
            parent_location_id: self.parent_location_id,
            address: self.address,
            sds_count: self.sds_count,
            children,
        }
    }
}

impl fmt::Display for LocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Flattened projection of a location for tabular display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub id: LocationId,
    pub name: String,
    pub address: String,
    pub sds_count: u32,
}

impl From<&LocationRecord> for LocationData {
    fn from(record: &LocationRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            address: record
                .address
                .clone()
                .unwrap_or_else(|| NO_ADDRESS.to_string()),
            sds_count: record.sds_count_or_default(),
        }
    }
}

/// Generate a fresh location id (`loc-` followed by a random v4 uuid).
pub fn generate_location_id() -> LocationId {
    format!("loc-{}", Uuid::new_v4().simple())
}

/// Create a detached location record ready for insertion.
///
/// The name must contain at least one non-whitespace character. An empty
/// address is stored as absent.
pub fn create_location(
    name: &str,
    parent_id: Option<&str>,
    address: Option<&str>,
) -> DomainResult<LocationRecord> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name", NAME_REQUIRED));
    }
    Ok(LocationRecord {
        id: generate_location_id(),
        name: name.to_string(),
        favorite: false,
        parent_location_id: parent_id.map(str::to_string),
        address: address
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
        sds_count: Some(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_empty_name_when_creating_location_then_reports_name_field() {
        let err = create_location("   ", None, None).unwrap_err();
        assert_eq!(err, DomainError::validation("name", NAME_REQUIRED));
    }

    #[test]
    fn given_valid_input_when_creating_location_then_sets_defaults() {
        let record = create_location("Lab 3", Some("loc1"), Some("")).unwrap();
        assert!(record.id.starts_with("loc-"));
        assert_eq!(record.name, "Lab 3");
        assert!(!record.favorite);
        assert_eq!(record.parent_location_id.as_deref(), Some("loc1"));
        assert_eq!(record.address, None);
        assert_eq!(record.sds_count, Some(0));
    }

    #[test]
    fn given_two_creations_when_comparing_ids_then_they_differ() {
        let a = create_location("A", None, None).unwrap();
        let b = create_location("A", None, None).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn given_record_without_optionals_when_projecting_then_uses_defaults() {
        let record = LocationRecord {
            id: "r1".into(),
            name: "Main".into(),
            favorite: true,
            parent_location_id: None,
            address: None,
            sds_count: None,
        };
        let row = LocationData::from(&record);
        assert_eq!(row.address, NO_ADDRESS);
        assert_eq!(row.sds_count, 0);
        assert_eq!(row, LocationData::from(&record));
    }
}
