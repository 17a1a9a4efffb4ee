//! Configuration loading for viewkit.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.viewkit/config.toml`)
//! 3. User config (`~/.viewkit/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The system runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FailOpen, Result, ViewkitError};

/// Main configuration struct for viewkit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Template lookup configuration.
    pub templates: TemplatesConfig,
    /// Capability composition configuration.
    pub capabilities: CapabilitiesConfig,
    /// Role registry configuration.
    pub roles: RolesConfig,
}

/// Template lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Override roots, highest priority first. Relative paths resolve
    /// against the working directory.
    pub search_paths: Vec<PathBuf>,
    /// Template file extension, without the dot.
    pub extension: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            search_paths: vec![
                PathBuf::from(".viewkit").join("templates"),
                PathBuf::from("templates"),
            ],
            extension: "php".to_string(),
        }
    }
}

/// Capability composition configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CapabilitiesConfig {
    /// Whether the full-access sentinel grants the whole closed set.
    pub full_access: bool,
    /// Extra equivalences, applied after the defaults in file order.
    ///
    /// Written as `[[capabilities.equivalences]]` tables. A source may feed
    /// several targets.
    pub equivalences: Vec<EquivalencePair>,
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            full_access: true,
            equivalences: Vec::new(),
        }
    }
}

/// One configured equivalence: holding `source` backfills `target`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EquivalencePair {
    /// Capability whose value is copied.
    pub source: String,
    /// Capability filled in when absent.
    pub target: String,
}

impl EquivalencePair {
    /// Create a pair.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Role registry configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RolesConfig {
    /// Path of the role registry file. Defaults to `<viewkit_home>/roles.json`.
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.viewkit/config.toml` in cwd)
    /// 3. User config (`~/.viewkit/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.viewkit/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = viewkit_home()?;
        Self::load_layer(&home.join("config.toml"))
    }

    /// Load project config from `.viewkit/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_layer(&project_config_path(cwd))
    }

    /// Load one optional config layer.
    ///
    /// A missing file is skipped silently. An unreadable or malformed file
    /// is logged and skipped so the remaining layers still apply.
    fn load_layer(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        Self::load_from_file(path)
            .map(Some)
            .fail_open_default(&format!("loading config {}", path.display()))
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| ViewkitError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| ViewkitError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // VIEWKIT_TEMPLATE_EXTENSION
        if let Ok(val) = env::var("VIEWKIT_TEMPLATE_EXTENSION") {
            let trimmed = val.trim_start_matches('.');
            if trimmed.contains(['/', '\\']) {
                eprintln!(
                    "Warning: Invalid VIEWKIT_TEMPLATE_EXTENSION value '{}'. \
                    Must not contain path separators. Using '{}'.",
                    val, self.templates.extension
                );
            } else {
                self.templates.extension = trimmed.to_string();
            }
        }

        // VIEWKIT_FULL_ACCESS
        if let Ok(val) = env::var("VIEWKIT_FULL_ACCESS") {
            match val.as_str() {
                "true" | "1" => self.capabilities.full_access = true,
                "false" | "0" => self.capabilities.full_access = false,
                _ => eprintln!(
                    "Warning: Invalid VIEWKIT_FULL_ACCESS value '{}'. \
                    Expected true/false. Using '{}'.",
                    val, self.capabilities.full_access
                ),
            }
        }

        // VIEWKIT_ROLES_FILE
        if let Ok(val) = env::var("VIEWKIT_ROLES_FILE") {
            if val.is_empty() {
                tracing::warn!("VIEWKIT_ROLES_FILE is empty, ignoring");
            } else {
                self.roles.file = Some(PathBuf::from(val));
            }
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Merging is field-by-field: a value from `other` wins only when it
    /// differs from the default. Equivalences merge additively: pairs from
    /// `other` follow the existing ones, and repeated pairs are dropped.
    ///
    /// A higher-precedence file cannot reset a field to its default once a
    /// lower-precedence file changed it.
    fn merge(mut self, other: Config) -> Self {
        let default_templates = TemplatesConfig::default();
        if other.templates.search_paths != default_templates.search_paths {
            self.templates.search_paths = other.templates.search_paths;
        }
        if other.templates.extension != default_templates.extension {
            self.templates.extension = other.templates.extension;
        }

        if other.capabilities.full_access != CapabilitiesConfig::default().full_access {
            self.capabilities.full_access = other.capabilities.full_access;
        }
        for pair in other.capabilities.equivalences {
            if !self.capabilities.equivalences.contains(&pair) {
                self.capabilities.equivalences.push(pair);
            }
        }

        if other.roles.file.is_some() {
            self.roles.file = other.roles.file;
        }

        self
    }

    /// Path of the role registry file.
    ///
    /// The configured `roles.file` wins; otherwise `<viewkit_home>/roles.json`.
    pub fn roles_path(&self) -> Option<PathBuf> {
        self.roles.file.clone().or_else(roles_file)
    }
}

/// Get the viewkit home directory.
///
/// Checks `VIEWKIT_HOME` environment variable first, then falls back to
/// `~/.viewkit`. An empty `VIEWKIT_HOME` is ignored.
pub fn viewkit_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("VIEWKIT_HOME") {
        if home.is_empty() {
            tracing::warn!("VIEWKIT_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("VIEWKIT_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".viewkit"));
    }

    let fallback_path = fallback_viewkit_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Fallback home when HOME is unavailable.
#[cfg(unix)]
fn fallback_viewkit_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/viewkit-{}", uid))
}

/// Fallback home when HOME is unavailable.
#[cfg(not(unix))]
fn fallback_viewkit_home() -> PathBuf {
    std::env::temp_dir().join("viewkit")
}

/// Default role registry file.
///
/// Returns `<viewkit_home>/roles.json`.
pub fn roles_file() -> Option<PathBuf> {
    viewkit_home().map(|h| h.join("roles.json"))
}

/// Project config file for a working directory.
///
/// Returns `<cwd>/.viewkit/config.toml`.
pub fn project_config_path(cwd: &Path) -> PathBuf {
    cwd.join(".viewkit").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        env::remove_var("VIEWKIT_TEMPLATE_EXTENSION");
        env::remove_var("VIEWKIT_FULL_ACCESS");
        env::remove_var("VIEWKIT_ROLES_FILE");
    }

    fn write_project_config(dir: &Path, content: &str) {
        let path = project_config_path(dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.templates.extension, "php");
        assert_eq!(config.templates.search_paths.len(), 2);
        assert!(config.capabilities.full_access);
        assert!(config.capabilities.equivalences.is_empty());
        assert!(config.roles.file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        let toml_content = r#"
[templates]
search_paths = ["theme/gravityview", "plugin/templates"]

[capabilities]
full_access = false

[[capabilities.equivalences]]
source = "gravityforms_view_entries"
target = "gravityview_view_others_entries"

[[capabilities.equivalences]]
source = "gravityforms_view_entries"
target = "gravityview_view_entries"
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();

        assert_eq!(
            config.templates.search_paths,
            vec![
                PathBuf::from("theme/gravityview"),
                PathBuf::from("plugin/templates")
            ]
        );
        assert!(!config.capabilities.full_access);
        assert_eq!(
            config.capabilities.equivalences,
            vec![
                EquivalencePair::new(
                    "gravityforms_view_entries",
                    "gravityview_view_others_entries"
                ),
                EquivalencePair::new("gravityforms_view_entries", "gravityview_view_entries"),
            ]
        );

        // Unset fields keep their defaults
        assert_eq!(config.templates.extension, "php");
    }

    #[test]
    fn test_load_from_file_missing() {
        let result = Config::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        let result = Config::load_from_file(&config_path);
        assert!(matches!(result, Err(ViewkitError::Config { .. })));
    }

    #[test]
    #[serial]
    fn test_project_config_precedence() {
        clear_env();
        let home = TempDir::new().unwrap();
        env::set_var("VIEWKIT_HOME", home.path());
        fs::write(
            home.path().join("config.toml"),
            "[templates]\nextension = \"twig\"\n",
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[templates]\nextension = \"html\"\n");

        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config.templates.extension, "html");

        env::remove_var("VIEWKIT_HOME");
    }

    #[test]
    #[serial]
    fn test_user_config_applies_without_project() {
        clear_env();
        let home = TempDir::new().unwrap();
        env::set_var("VIEWKIT_HOME", home.path());
        fs::write(
            home.path().join("config.toml"),
            "[capabilities]\nfull_access = false\n",
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());
        assert!(!config.capabilities.full_access);

        env::remove_var("VIEWKIT_HOME");
    }

    #[test]
    #[serial]
    fn test_env_var_precedence() {
        clear_env();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[templates]\nextension = \"html\"\n");

        env::set_var("VIEWKIT_TEMPLATE_EXTENSION", ".twig");
        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config.templates.extension, "twig");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        clear_env();
        env::set_var("VIEWKIT_FULL_ACCESS", "0");
        env::set_var("VIEWKIT_ROLES_FILE", "/srv/roles.json");

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());
        assert!(!config.capabilities.full_access);
        assert_eq!(config.roles.file, Some(PathBuf::from("/srv/roles.json")));
        assert_eq!(config.roles_path(), Some(PathBuf::from("/srv/roles.json")));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_invalid_values_ignored() {
        clear_env();
        env::set_var("VIEWKIT_FULL_ACCESS", "maybe");
        env::set_var("VIEWKIT_TEMPLATE_EXTENSION", "../php");
        env::set_var("VIEWKIT_ROLES_FILE", "");

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());
        assert!(config.capabilities.full_access);
        assert_eq!(config.templates.extension, "php");
        assert!(config.roles.file.is_none());

        clear_env();
    }

    #[test]
    fn test_merge_field_by_field() {
        let mut user = Config::default();
        user.templates.extension = "twig".to_string();
        user.capabilities.equivalences.push(EquivalencePair::new("z", "b"));

        let mut project = Config::default();
        project.capabilities.full_access = false;
        project.capabilities.equivalences = vec![
            EquivalencePair::new("a", "d"),
            EquivalencePair::new("z", "b"),
        ];

        let merged = Config::default().merge(user).merge(project);
        assert_eq!(merged.templates.extension, "twig");
        assert!(!merged.capabilities.full_access);
        assert_eq!(
            merged.capabilities.equivalences,
            vec![EquivalencePair::new("z", "b"), EquivalencePair::new("a", "d")]
        );
    }

    #[test]
    fn test_merge_roles_file() {
        let mut user = Config::default();
        user.roles.file = Some(PathBuf::from("/a.json"));
        let merged = Config::default().merge(user).merge(Config::default());
        assert_eq!(merged.roles.file, Some(PathBuf::from("/a.json")));
    }

    #[test]
    #[serial]
    fn test_viewkit_home_with_env() {
        let dir = TempDir::new().unwrap();
        env::set_var("VIEWKIT_HOME", dir.path());

        assert_eq!(viewkit_home().unwrap(), dir.path());
        assert_eq!(roles_file().unwrap(), dir.path().join("roles.json"));

        env::remove_var("VIEWKIT_HOME");
    }

    #[test]
    #[serial]
    fn test_viewkit_home_empty_env() {
        env::set_var("VIEWKIT_HOME", "");

        let home = viewkit_home();
        assert!(home.is_some());
        assert!(home.unwrap().ends_with(".viewkit"));

        env::remove_var("VIEWKIT_HOME");
    }

    #[test]
    #[serial]
    fn test_roles_path_defaults_to_home() {
        clear_env();
        let dir = TempDir::new().unwrap();
        env::set_var("VIEWKIT_HOME", dir.path());

        let config = Config::default();
        assert_eq!(config.roles_path(), Some(dir.path().join("roles.json")));

        env::remove_var("VIEWKIT_HOME");
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.templates.extension = "html".to_string();
        config.roles.file = Some(PathBuf::from("/tmp/roles.json"));

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    #[serial]
    fn test_malformed_project_config_skipped() {
        clear_env();
        let home = TempDir::new().unwrap();
        env::set_var("VIEWKIT_HOME", home.path());
        fs::write(
            home.path().join("config.toml"),
            "[templates]\nextension = \"twig\"\n",
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "this is not valid toml [[[");

        assert!(Config::load_layer(&project_config_path(dir.path())).is_none());
        let config = Config::load_from_cwd(dir.path());
        assert_eq!(config.templates.extension, "twig");

        env::remove_var("VIEWKIT_HOME");
    }

    #[test]
    fn test_missing_layer_skipped() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_layer(&dir.path().join("config.toml")).is_none());
    }
}
