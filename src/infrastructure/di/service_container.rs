//! Service container for dependency injection
//!
//! Wires settings, filesystem and seed provider into the location service.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::application::{ApplicationError, LocationService, Portal};
use crate::config::Settings;
use crate::domain::{ForestBuilder, LocationForest};
use crate::infrastructure::seed::{BuiltinSeed, FileSeed, SeedProvider};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraResult;

/// Container holding the application dependencies.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Single source of the initial forest
    pub seed: Arc<dyn SeedProvider>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with a custom filesystem (for testing).
    ///
    /// The seed comes from `settings.seed_file` when set, otherwise the
    /// built-in sample data is used.
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let seed: Arc<dyn SeedProvider> = match &settings.seed_file {
            Some(path) => Arc::new(FileSeed::new(Arc::clone(&fs), path.clone())),
            None => Arc::new(BuiltinSeed),
        };
        Self::with_seed(settings, fs, seed)
    }

    pub fn with_seed(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        seed: Arc<dyn SeedProvider>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
            seed,
        }
    }

    /// Build the forest from the seed provider.
    #[instrument(level = "debug", skip(self))]
    pub fn load_forest(&self) -> InfraResult<LocationForest> {
        let roots = self.seed.load()?;
        let builder = if self.settings.infer_parents {
            ForestBuilder::new().lenient_parents()
        } else {
            ForestBuilder::new()
        };
        let forest = builder.build(roots).map_err(ApplicationError::from)?;
        info!(
            "loaded {} locations from {}",
            forest.len(),
            self.seed.describe()
        );
        Ok(forest)
    }

    pub fn location_service(&self) -> InfraResult<LocationService> {
        Ok(LocationService::new(self.load_forest()?, &self.settings))
    }

    pub fn portal(&self) -> InfraResult<Portal> {
        Ok(Portal::new(self.location_service()?))
    }
}
