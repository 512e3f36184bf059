//! Bootstrap configuration loading and config file resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `KENBIO_CONFIG` environment variable
//! 3. Per-user config file, then system-wide file (Linux only)
//! 4. Compiled defaults (a missing file is not an error)

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "KENBIO_CONFIG";

/// Default Registry (GBIF) API root
pub const DEFAULT_REGISTRY_BASE_URL: &str = "https://api.gbif.org/v1";

/// Default Observation Service (iNaturalist) API root
pub const DEFAULT_OBSERVATION_BASE_URL: &str = "https://api.inaturalist.org/v1";

/// Nairobi, Kenya. Locality prior for image identification when the caller has no coordinates.
pub const DEFAULT_BIAS_LATITUDE: f64 = -1.286389;
pub const DEFAULT_BIAS_LONGITUDE: f64 = 36.817223;

/// Bootstrap configuration loaded from TOML file
///
/// Every section is optional; absent sections take the compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub country: CountryScope,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub observation: ObservationConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Region name → Observation Service place id, consulted before autocomplete
    #[serde(default)]
    pub place_overrides: BTreeMap<String, PlaceIdValue>,
}

/// Country the region catalog is scoped to
#[derive(Debug, Clone, Deserialize)]
pub struct CountryScope {
    /// GADM level-0 code used by the Registry boundary browse (e.g. "KEN")
    #[serde(default = "default_gadm_code")]
    pub gadm_code: String,

    /// ISO 3166-1 alpha-2 code used by the Registry occurrence search (e.g. "KE")
    #[serde(default = "default_iso2")]
    pub iso2: String,

    /// Token looked for in autocomplete display labels
    #[serde(default = "default_qualifier")]
    pub qualifier: String,
}

impl Default for CountryScope {
    fn default() -> Self {
        Self {
            gadm_code: default_gadm_code(),
            iso2: default_iso2(),
            qualifier: default_qualifier(),
        }
    }
}

/// Registry (boundary + raw occurrence provider) connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Observation Service connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationConfig {
    #[serde(default = "default_observation_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Candidate page size requested from place autocomplete
    #[serde(default = "default_autocomplete_per_page")]
    pub autocomplete_per_page: u32,

    #[serde(default = "default_latitude")]
    pub default_latitude: f64,

    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self {
            base_url: default_observation_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            autocomplete_per_page: default_autocomplete_per_page(),
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
        }
    }
}

impl ObservationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Read-through cache lifetimes
///
/// A TTL of 0 disables that cache. `region_ttl_secs` unset means the region
/// list is kept for the process lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub region_ttl_secs: Option<u64>,

    #[serde(default = "default_place_ttl_secs")]
    pub place_ttl_secs: u64,

    #[serde(default = "default_detail_ttl_secs")]
    pub detail_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            region_ttl_secs: None,
            place_ttl_secs: default_place_ttl_secs(),
            detail_ttl_secs: default_detail_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn region_ttl(&self) -> Option<Duration> {
        self.region_ttl_secs.map(Duration::from_secs)
    }

    pub fn place_ttl(&self) -> Option<Duration> {
        non_zero_secs(self.place_ttl_secs)
    }

    pub fn detail_ttl(&self) -> Option<Duration> {
        non_zero_secs(self.detail_ttl_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Place id as written in the overrides table
///
/// Observation Service ids are numeric, but quoted ids are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PlaceIdValue {
    Number(u64),
    Text(String),
}

impl fmt::Display for PlaceIdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceIdValue::Number(id) => write!(f, "{}", id),
            PlaceIdValue::Text(id) => f.write_str(id),
        }
    }
}

fn default_gadm_code() -> String {
    "KEN".to_string()
}

fn default_iso2() -> String {
    "KE".to_string()
}

fn default_qualifier() -> String {
    "Kenya".to_string()
}

fn default_registry_base_url() -> String {
    DEFAULT_REGISTRY_BASE_URL.to_string()
}

fn default_observation_base_url() -> String {
    DEFAULT_OBSERVATION_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_autocomplete_per_page() -> u32 {
    5
}

fn default_latitude() -> f64 {
    DEFAULT_BIAS_LATITUDE
}

fn default_longitude() -> f64 {
    DEFAULT_BIAS_LONGITUDE
}

fn default_place_ttl_secs() -> u64 {
    3600
}

fn default_detail_ttl_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl TomlConfig {
    /// Parse a TOML config file
    ///
    /// # Errors
    /// - `Error::Io` if the file cannot be read
    /// - `Error::TomlParse` if it is not valid for this schema
    /// - `Error::InvalidInput` if a `[place_overrides]` entry has a blank name or id
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve and load the config file, falling back to compiled defaults
    ///
    /// An explicitly named file (CLI or environment) that does not exist is an
    /// error; an absent default-location file is not.
    pub fn load_or_default(cli_arg: Option<&Path>) -> Result<Self> {
        Self::load_located(cli_arg).map(|(config, _)| config)
    }

    /// Like [`TomlConfig::load_or_default`], also returning where the file came from
    ///
    /// Nothing is logged here: callers load config before tracing exists and
    /// report the location once it does.
    pub fn load_located(cli_arg: Option<&Path>) -> Result<(Self, ConfigLocation)> {
        let location = resolve_config_path(cli_arg);
        let config = match &location {
            ConfigLocation::Explicit(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::load(path)?
            }
            ConfigLocation::Discovered(path) => Self::load(path)?,
            ConfigLocation::NotFound => Self::default(),
        };
        Ok((config, location))
    }

    fn validate(&self) -> Result<()> {
        for (name, id) in &self.place_overrides {
            if name.trim().is_empty() {
                return Err(Error::InvalidInput(
                    "[place_overrides] entry with a blank region name".to_string(),
                ));
            }
            if id.to_string().trim().is_empty() {
                return Err(Error::InvalidInput(format!(
                    "[place_overrides] \"{}\" has a blank place id",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Where the config file came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Named on the command line or via `KENBIO_CONFIG`
    Explicit(PathBuf),
    /// Found at a platform default location
    Discovered(PathBuf),
    NotFound,
}

impl ConfigLocation {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigLocation::Explicit(path) | ConfigLocation::Discovered(path) => Some(path),
            ConfigLocation::NotFound => None,
        }
    }
}

/// Resolve the config file location following the documented priority order
pub fn resolve_config_path(cli_arg: Option<&Path>) -> ConfigLocation {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigLocation::Explicit(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigLocation::Explicit(PathBuf::from(path));
        }
    }

    // Priority 3: Platform default locations
    default_config_candidates()
        .into_iter()
        .find(|p| p.exists())
        .map(ConfigLocation::Discovered)
        .unwrap_or(ConfigLocation::NotFound)
}

/// Platform default config file locations, most specific first
pub fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("kenbio").join("config.toml"));
    }

    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc/kenbio/config.toml"));
    }

    candidates
}

/// User-Agent sent on every upstream request
pub fn get_user_agent() -> String {
    format!("kenbio/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config.country.gadm_code, "KEN");
        assert_eq!(config.country.iso2, "KE");
        assert_eq!(config.country.qualifier, "Kenya");
        assert_eq!(config.registry.base_url, DEFAULT_REGISTRY_BASE_URL);
        assert_eq!(config.observation.autocomplete_per_page, 5);
        assert_eq!(config.logging.level, "info");
        assert!(config.place_overrides.is_empty());
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let cache = CacheConfig {
            region_ttl_secs: None,
            place_ttl_secs: 0,
            detail_ttl_secs: 30,
        };
        assert_eq!(cache.place_ttl(), None);
        assert_eq!(cache.detail_ttl(), Some(Duration::from_secs(30)));
        assert_eq!(cache.region_ttl(), None);
    }

    #[test]
    fn test_place_override_accepts_numbers_and_strings() {
        let config: TomlConfig = toml::from_str(
            r#"
            [place_overrides]
            "Tharaka-Nithi" = 12345
            "Elgeyo-Marakwet" = "67890"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.place_overrides.get("Tharaka-Nithi"),
            Some(&PlaceIdValue::Number(12345))
        );
        assert_eq!(
            config.place_overrides["Elgeyo-Marakwet"].to_string(),
            "67890"
        );
    }

    #[test]
    fn test_user_agent_format() {
        let ua = get_user_agent();
        assert_eq!(ua, format!("kenbio/{}", env!("CARGO_PKG_VERSION")));
        assert!(!ua.contains("http"));
    }
}
