//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/sdsloc/sdsloc.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `SDSLOC_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, TreeFilterMode, UnknownParentPolicy};
use crate::util::path::expand_path;

/// Unified configuration for sdsloc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// TOML seed file with the location forest (default: built-in sample data)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,
    /// Derive parentLocationId from nesting instead of rejecting mismatches
    pub infer_parents: bool,
    /// Handling of new locations whose parent does not exist
    pub unknown_parent: UnknownParentPolicy,
    /// Effect of a text query on the tree view
    pub tree_filter: TreeFilterMode,
    /// Ancestors kept visible before the selected location in collapsed breadcrumbs
    pub breadcrumb_tail: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed_file: None,
            infer_parents: false,
            unknown_parent: UnknownParentPolicy::default(),
            tree_filter: TreeFilterMode::default(),
            breadcrumb_tail: 2,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub seed_file: Option<PathBuf>,
    pub infer_parents: Option<bool>,
    pub unknown_parent: Option<UnknownParentPolicy>,
    pub tree_filter: Option<TreeFilterMode>,
    pub breadcrumb_tail: Option<usize>,
}

/// Get the XDG config directory for sdsloc.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sdsloc").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("sdsloc.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(seed) = &self.seed_file {
            self.seed_file = Some(expand_path(seed));
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            seed_file: overlay
                .seed_file
                .clone()
                .or_else(|| self.seed_file.clone()),
            infer_parents: overlay.infer_parents.unwrap_or(self.infer_parents),
            unknown_parent: overlay.unknown_parent.unwrap_or(self.unknown_parent),
            tree_filter: overlay.tree_filter.unwrap_or(self.tree_filter),
            breadcrumb_tail: overlay.breadcrumb_tail.unwrap_or(self.breadcrumb_tail),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/sdsloc/sdsloc.toml`
    /// 3. Explicit config file
    /// 4. Environment variables: `SDSLOC_*` prefix
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = config_file {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Load defaults plus a single config file, ignoring global config and
    /// environment variables.
    pub fn load_file_only(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        let mut settings = Self::default().merge_with(&raw);
        settings.expand_paths();
        Ok(settings)
    }

    /// Apply SDSLOC_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SDSLOC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("seed_file") {
            settings.seed_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("infer_parents") {
            settings.infer_parents = val;
        }
        if let Ok(val) = config.get_string("unknown_parent") {
            settings.unknown_parent = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("tree_filter") {
            settings.tree_filter = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_int("breadcrumb_tail") {
            settings.breadcrumb_tail = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("breadcrumb_tail must not be negative: {val}"),
            })?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# sdsloc configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/sdsloc/sdsloc.toml
#   Explicit: file passed with --config
#   Env:      SDSLOC_* environment variables (e.g. SDSLOC_TREE_FILTER=prune)

# TOML file with the location forest; built-in sample data when unset
# seed_file = "~/sds/locations.toml"

# Fill in parentLocationId from nesting instead of rejecting mismatches
# infer_parents = false

# New location with unknown parent: "reject" or "root"
# unknown_parent = "reject"

# Tree search: "highlight" keeps the full tree, "prune" keeps matches and their ancestors
# tree_filter = "highlight"

# Ancestors shown before the selected location in collapsed breadcrumbs
# breadcrumb_tail = 2
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_uses_safe_policies() {
        let settings = Settings::default();
        assert_eq!(settings.seed_file, None);
        assert_eq!(settings.unknown_parent, UnknownParentPolicy::Reject);
        assert_eq!(settings.tree_filter, TreeFilterMode::Highlight);
        assert_eq!(settings.breadcrumb_tail, 2);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_values() {
        let overlay = RawSettings {
            tree_filter: Some(TreeFilterMode::Prune),
            ..RawSettings::default()
        };
        let merged = Settings::default().merge_with(&overlay);
        assert_eq!(merged.tree_filter, TreeFilterMode::Prune);
        assert_eq!(merged.unknown_parent, UnknownParentPolicy::Reject);
        assert_eq!(merged.breadcrumb_tail, 2);
    }

    #[test]
    fn given_tilde_in_seed_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            seed_file: Some(PathBuf::from("~/locations.toml")),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let seed = settings.seed_file.unwrap();
        assert!(seed.to_string_lossy().starts_with(&home));
        assert!(!seed.to_string_lossy().contains('~'));
    }

    #[test]
    fn given_template_when_parsing_then_yields_defaults() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), Settings::default());
    }

    #[test]
    fn given_settings_when_serializing_then_toml_parses_back() {
        let settings = Settings {
            unknown_parent: UnknownParentPolicy::Root,
            ..Settings::default()
        };
        let text = settings.to_toml().unwrap();
        assert!(text.contains("unknown_parent = \"root\""));
        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), settings);
    }
}
