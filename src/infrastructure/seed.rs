//! Seed data for the location forest
//!
//! Exactly one provider feeds the process at startup: the built-in sample
//! facilities or a TOML file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Location;
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::{InfraError, InfraResult};

/// On-disk seed format: `[[locations]]` with nested `[[locations.children]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedDocument {
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl SeedDocument {
    pub fn parse(content: &str, path: &Path) -> ApplicationResult<Self> {
        toml::from_str(content).map_err(|e| ApplicationError::Seed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Seed {
            path: PathBuf::from("<export>"),
            message: e.to_string(),
        })
    }
}

/// Source of the initial location forest.
pub trait SeedProvider: Send + Sync {
    /// Human readable origin, used in logs and `dashboard` output.
    fn describe(&self) -> String;

    fn load(&self) -> InfraResult<Vec<Location>>;
}

/// The sample facilities shipped with the binary.
#[derive(Debug, Default)]
pub struct BuiltinSeed;

impl SeedProvider for BuiltinSeed {
    fn describe(&self) -> String {
        "built-in sample data".to_string()
    }

    fn load(&self) -> InfraResult<Vec<Location>> {
        Ok(sample_locations())
    }
}

/// Seed read from a TOML file.
pub struct FileSeed {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileSeed {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }
}

impl SeedProvider for FileSeed {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> InfraResult<Vec<Location>> {
        let content = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| InfraError::io(format!("read seed file {}", self.path.display()), e))?;
        let document = SeedDocument::parse(&content, &self.path)?;
        debug!("loaded {} root locations", document.locations.len());
        Ok(document.locations)
    }
}

fn loc(
    id: &str,
    name: &str,
    favorite: bool,
    parent: Option<&str>,
    children: Vec<Location>,
) -> Location {
    Location {
        id: id.to_string(),
        name: name.to_string(),
        favorite,
        parent_location_id: parent.map(str::to_string),
        address: None,
        sds_count: None,
        children,
    }
}

fn with_details(mut location: Location, address: &str, sds_count: u32) -> Location {
    location.address = Some(address.to_string());
    location.sds_count = Some(sds_count);
    location
}

/// Two facilities, four levels deep.
pub fn sample_locations() -> Vec<Location> {
    vec![
        with_details(
            loc(
                "loc1",
                "Main Facility",
                true,
                None,
                vec![
                    loc(
                        "loc1-1",
                        "Research Building",
                        false,
                        Some("loc1"),
                        vec![
                            with_details(
                                loc(
                                    "loc1-1-1",
                                    "Laboratory A",
                                    true,
                                    Some("loc1-1"),
                                    vec![
                                        with_details(
                                            loc(
                                                "loc1-1-1-1",
                                                "Chemical Storage A1",
                                                false,
                                                Some("loc1-1-1"),
                                                vec![],
                                            ),
                                            "Building 3, Basement",
                                            28,
                                        ),
                                        loc(
                                            "loc1-1-1-2",
                                            "Equipment Room A2",
                                            false,
                                            Some("loc1-1-1"),
                                            vec![],
                                        ),
                                    ],
                                ),
                                "123 Science Blvd, Floor 2",
                                45,
                            ),
                            with_details(
                                loc(
                                    "loc1-1-2",
                                    "Laboratory B",
                                    false,
                                    Some("loc1-1"),
                                    vec![loc(
                                        "loc1-1-2-1",
                                        "Chemical Storage B1",
                                        false,
                                        Some("loc1-1-2"),
                                        vec![],
                                    )],
                                ),
                                "555 Innovation Drive, Suite 201",
                                15,
                            ),
                        ],
                    ),
                    loc(
                        "loc1-2",
                        "Production Building",
                        false,
                        Some("loc1"),
                        vec![with_details(
                            loc(
                                "loc1-2-1",
                                "Assembly Line",
                                false,
                                Some("loc1-2"),
                                vec![
                                    loc("loc1-2-1-1", "Station 1", false, Some("loc1-2-1"), vec![]),
                                    loc("loc1-2-1-2", "Station 2", true, Some("loc1-2-1"), vec![]),
                                ],
                            ),
                            "Factory Building, East Wing",
                            37,
                        )],
                    ),
                ],
            ),
            "123 Science Blvd",
            0,
        ),
        loc(
            "loc2",
            "Remote Facility North",
            false,
            None,
            vec![with_details(
                loc(
                    "loc2-1",
                    "Warehouse",
                    true,
                    Some("loc2"),
                    vec![loc(
                        "loc2-1-1",
                        "Chemical Storage Area",
                        false,
                        Some("loc2-1"),
                        vec![
                            loc(
                                "loc2-1-1-1",
                                "Flammable Materials",
                                false,
                                Some("loc2-1-1"),
                                vec![],
                            ),
                            loc(
                                "loc2-1-1-2",
                                "Corrosive Materials",
                                false,
                                Some("loc2-1-1"),
                                vec![],
                            ),
                        ],
                    )],
                ),
                "78 Industrial Parkway",
                7,
            )],
        ),
    ]
}
