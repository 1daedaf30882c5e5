//! # Mirror Configuration Module
//!
//! Provides configuration management for the data mirror.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`MirrorConfig`]. It enforces fail-fast validation so that a running
//! scheduler never observes a configuration without credentials or with a
//! zero sync interval.
//!
//! Hosts usually do not call the builder directly. They hand the raw
//! attribute map they received to [`MirrorConfig::from_attributes`], which
//! applies the documented defaults:
//!
//! | attribute | default |
//! |-----------|---------|
//! | `dataset_id` | absent |
//! | `tags` / `labels` | empty |
//! | `delete` | `false` |
//! | `sync_frequency` | 60 seconds (0 also means default) |
//! | `mirror_path` | `~/.viam/data_mirror` (relative values resolve under `~/.viam/`) |
//! | `max_concurrent_fetches` | 1 |
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::MirrorConfig;
//! use std::time::Duration;
//!
//! let config = MirrorConfig::builder()
//!     .credentials("key-id", "key")
//!     .mirror_root("/srv/mirror")
//!     .dataset_id("ds-1")
//!     .interval(Duration::from_secs(300))
//!     .delete(true)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::MirrorConfig;
//!
//! // Credentials are required
//! let config = MirrorConfig::builder()
//!     .mirror_root("/srv/mirror")
//!     .build()
//!     .expect("Should fail - missing credentials");
//! ```

use crate::error::{Error, Result};
use bridge_traits::ApiCredentials;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Interval between sync cycles when none is configured.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60);

/// Directory under the user's home that relative mirror paths resolve in.
pub const MIRROR_BASE_DIR: &str = ".viam";

/// Mirror directory name used when no `mirror_path` is configured.
pub const DEFAULT_MIRROR_DIR: &str = "data_mirror";

/// Upper bound for `max_concurrent_fetches`.
pub const MAX_CONCURRENT_FETCHES: usize = 64;

/// Configuration of one mirror instance.
///
/// Immutable once built; the scheduler holds it as `Arc<MirrorConfig>` and
/// replaces it wholesale on reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Restrict the mirror to one dataset
    pub dataset_id: Option<String>,

    /// Only mirror objects carrying one of these tags
    pub tags: BTreeSet<String>,

    /// Only mirror objects with a bounding box carrying one of these labels
    pub labels: BTreeSet<String>,

    /// Absolute directory the remote catalog is mirrored into
    pub mirror_root: PathBuf,

    /// Time between the end of one cycle and the start of the next
    pub interval: Duration,

    /// Delete local files no longer present remotely
    pub delete: bool,

    pub credentials: ApiCredentials,

    /// Fetches in flight within a page. 1 keeps fetching sequential.
    pub max_concurrent_fetches: usize,

    /// Override for the catalog API endpoint
    pub api_base_url: Option<String>,
}

impl MirrorConfig {
    /// Creates a new builder for constructing a `MirrorConfig`.
    pub fn builder() -> MirrorConfigBuilder {
        MirrorConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Both credential fields are non-empty
    /// - The mirror root is an absolute path
    /// - The interval is positive
    /// - Fetch concurrency is between 1 and [`MAX_CONCURRENT_FETCHES`]
    pub fn validate(&self) -> Result<()> {
        if self.credentials.api_key.is_empty() {
            return Err(Error::Config("app_api_key attribute is required".to_string()));
        }

        if self.credentials.api_key_id.is_empty() {
            return Err(Error::Config(
                "app_api_key_id attribute is required".to_string(),
            ));
        }

        if self.mirror_root.as_os_str().is_empty() {
            return Err(Error::Config("Mirror root cannot be empty".to_string()));
        }

        if !self.mirror_root.is_absolute() {
            return Err(Error::Config(format!(
                "Mirror root must be an absolute path, got {}",
                self.mirror_root.display()
            )));
        }

        if self.interval.is_zero() {
            return Err(Error::Config(
                "Sync interval must be greater than zero".to_string(),
            ));
        }

        if self.max_concurrent_fetches == 0 || self.max_concurrent_fetches > MAX_CONCURRENT_FETCHES
        {
            return Err(Error::Config(format!(
                "max_concurrent_fetches must be between 1 and {}",
                MAX_CONCURRENT_FETCHES
            )));
        }

        if let Some(url) = &self.api_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "api_base_url must be an http(s) URL, got {}",
                    url
                )));
            }
        }

        Ok(())
    }

    /// Builds a configuration from a host attribute map.
    ///
    /// Missing optional attributes take their defaults; attributes present
    /// with the wrong JSON type are rejected, as are empty `tags` or `labels`
    /// entries.
    pub fn from_attributes(attributes: &Map<String, Value>) -> Result<Self> {
        let home = home_dir()?;
        Self::from_attributes_with_home(attributes, &home)
    }

    /// Like [`from_attributes`](Self::from_attributes) with an explicit home
    /// directory.
    pub fn from_attributes_with_home(
        attributes: &Map<String, Value>,
        home: &Path,
    ) -> Result<Self> {
        let api_key = string_attr(attributes, "app_api_key")?.unwrap_or_default();
        let api_key_id = string_attr(attributes, "app_api_key_id")?.unwrap_or_default();

        let mut builder = MirrorConfig::builder()
            .credentials(api_key_id, api_key)
            .mirror_root(resolve_mirror_path(
                home,
                string_attr(attributes, "mirror_path")?.as_deref(),
            ))
            .tags(string_list_attr(attributes, "tags")?)
            .labels(string_list_attr(attributes, "labels")?)
            .delete(bool_attr(attributes, "delete")?.unwrap_or(false));

        if let Some(dataset_id) = string_attr(attributes, "dataset_id")? {
            builder = builder.dataset_id(dataset_id);
        }

        if let Some(seconds) = number_attr(attributes, "sync_frequency")? {
            if seconds < 0.0 || !seconds.is_finite() {
                return Err(Error::Config(format!(
                    "sync_frequency must be a non-negative number of seconds, got {}",
                    seconds
                )));
            }
            if seconds > 0.0 {
                let interval = Duration::try_from_secs_f64(seconds).map_err(|e| {
                    Error::Config(format!(
                        "sync_frequency of {} seconds is out of range: {}",
                        seconds, e
                    ))
                })?;
                if interval.is_zero() {
                    return Err(Error::Config(format!(
                        "sync_frequency of {} seconds is too small to schedule",
                        seconds
                    )));
                }
                builder = builder.interval(interval);
            }
        }

        if let Some(n) = number_attr(attributes, "max_concurrent_fetches")? {
            if n < 1.0 || n.fract() != 0.0 {
                return Err(Error::Config(format!(
                    "max_concurrent_fetches must be a positive integer, got {}",
                    n
                )));
            }
            builder = builder.max_concurrent_fetches(n as usize);
        }

        if let Some(url) = string_attr(attributes, "api_base_url")? {
            builder = builder.api_base_url(url);
        }

        builder.build()
    }
}

/// Reads the attribute map stored as a JSON object in `path`.
pub fn read_attributes_file(path: &Path) -> Result<Map<String, Value>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;

    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| Error::Config(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    match value {
        Value::Object(attributes) => Ok(attributes),
        _ => Err(Error::Config(format!(
            "Config file {} must contain a JSON object",
            path.display()
        ))),
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        Error::CapabilityMissing {
            capability: "HomeDirectory".to_string(),
            message: "Cannot determine the user's home directory. \
                      Set an absolute mirror_path or run with HOME set."
                .to_string(),
        }
    })
}

/// Resolves the configured mirror path.
///
/// Relative values are placed under `<home>/.viam/`; absolute values are
/// used as given.
pub fn resolve_mirror_path(home: &Path, mirror_path: Option<&str>) -> PathBuf {
    let base = home.join(MIRROR_BASE_DIR);
    match mirror_path.filter(|p| !p.is_empty()) {
        Some(path) => base.join(path),
        None => base.join(DEFAULT_MIRROR_DIR),
    }
}

fn string_attr(attributes: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match attributes.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(type_error(key, "a string", other)),
    }
}

fn bool_attr(attributes: &Map<String, Value>, key: &str) -> Result<Option<bool>> {
    match attributes.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(type_error(key, "a boolean", other)),
    }
}

fn number_attr(attributes: &Map<String, Value>, key: &str) -> Result<Option<f64>> {
    match attributes.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| Error::Config(format!("{} is not a representable number", key))),
        Some(other) => Err(type_error(key, "a number", other)),
    }
}

fn string_list_attr(attributes: &Map<String, Value>, key: &str) -> Result<Vec<String>> {
    match attributes.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) if s.is_empty() => Err(Error::Config(format!(
                    "{} entries must be non-empty strings",
                    key
                ))),
                Value::String(s) => Ok(s.clone()),
                other => Err(type_error(key, "a list of strings", other)),
            })
            .collect(),
        Some(other) => Err(type_error(key, "a list of strings", other)),
    }
}

fn type_error(key: &str, expected: &str, got: &Value) -> Error {
    Error::Config(format!("{} must be {}, got {}", key, expected, got))
}

/// Builder for [`MirrorConfig`].
#[derive(Debug, Default)]
pub struct MirrorConfigBuilder {
    dataset_id: Option<String>,
    tags: BTreeSet<String>,
    labels: BTreeSet<String>,
    mirror_root: Option<PathBuf>,
    interval: Option<Duration>,
    delete: bool,
    credentials: Option<ApiCredentials>,
    max_concurrent_fetches: Option<usize>,
    api_base_url: Option<String>,
}

impl MirrorConfigBuilder {
    /// Sets the API key pair. Required.
    pub fn credentials(mut self, api_key_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.credentials = Some(ApiCredentials::new(api_key_id, api_key));
        self
    }

    /// Sets the mirror root. Required, must be absolute.
    pub fn mirror_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.mirror_root = Some(path.into());
        self
    }

    /// Restricts the mirror to a dataset. Empty ids are ignored.
    pub fn dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        let dataset_id = dataset_id.into();
        self.dataset_id = (!dataset_id.is_empty()).then_some(dataset_id);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the sync interval.
    ///
    /// Default: [`DEFAULT_SYNC_INTERVAL`]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Enables deletion of local files absent from the remote catalog.
    ///
    /// Default: false
    pub fn delete(mut self, enabled: bool) -> Self {
        self.delete = enabled;
        self
    }

    /// Sets the number of fetches allowed in flight.
    ///
    /// Default: 1
    pub fn max_concurrent_fetches(mut self, n: usize) -> Self {
        self.max_concurrent_fetches = Some(n);
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Builds the final `MirrorConfig` instance.
    ///
    /// Returns an error with an actionable message if a required value is
    /// missing or a value is out of range.
    pub fn build(self) -> Result<MirrorConfig> {
        let credentials = self.credentials.ok_or_else(|| {
            Error::Config(
                "Credentials are required. Use .credentials() to set them.".to_string(),
            )
        })?;

        let mirror_root = self.mirror_root.ok_or_else(|| {
            Error::Config("Mirror root is required. Use .mirror_root() to set it.".to_string())
        })?;

        let config = MirrorConfig {
            dataset_id: self.dataset_id,
            tags: self.tags.into_iter().filter(|t| !t.is_empty()).collect(),
            labels: self.labels.into_iter().filter(|l| !l.is_empty()).collect(),
            mirror_root,
            interval: self.interval.unwrap_or(DEFAULT_SYNC_INTERVAL),
            delete: self.delete,
            credentials,
            max_concurrent_fetches: self.max_concurrent_fetches.unwrap_or(1),
            api_base_url: self.api_base_url,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn valid_builder() -> MirrorConfigBuilder {
        MirrorConfig::builder()
            .credentials("key-id", "key")
            .mirror_root("/tmp/mirror")
    }

    #[test]
    fn test_builder_with_required_fields() {
        let config = valid_builder().build().unwrap();

        assert_eq!(config.interval, DEFAULT_SYNC_INTERVAL);
        assert!(!config.delete);
        assert_eq!(config.max_concurrent_fetches, 1);
        assert!(config.dataset_id.is_none());
        assert!(config.tags.is_empty());
    }

    #[test]
    fn test_builder_requires_credentials() {
        let result = MirrorConfig::builder().mirror_root("/tmp/mirror").build();
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("Credentials")));
    }

    #[test]
    fn test_builder_requires_mirror_root() {
        let result = MirrorConfig::builder().credentials("id", "key").build();
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("Mirror root")));
    }

    #[test]
    fn test_validate_rejects_relative_root() {
        let result = valid_builder().mirror_root("relative/dir").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let result = valid_builder().interval(Duration::ZERO).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_concurrency() {
        assert!(valid_builder().max_concurrent_fetches(0).build().is_err());
        assert!(valid_builder()
            .max_concurrent_fetches(MAX_CONCURRENT_FETCHES + 1)
            .build()
            .is_err());
        assert!(valid_builder().max_concurrent_fetches(4).build().is_ok());
    }

    #[test]
    fn test_builder_drops_empty_filter_values() {
        let config = valid_builder()
            .dataset_id("")
            .tags(vec!["", "a"])
            .labels(Vec::<String>::new())
            .build()
            .unwrap();

        assert!(config.dataset_id.is_none());
        assert_eq!(config.tags.len(), 1);
        assert!(config.labels.is_empty());
    }

    #[test]
    fn test_from_attributes_defaults() {
        let home = Path::new("/home/tester");
        let config = MirrorConfig::from_attributes_with_home(
            &attrs(json!({"app_api_key": "k", "app_api_key_id": "kid"})),
            home,
        )
        .unwrap();

        assert_eq!(config.credentials, ApiCredentials::new("kid", "k"));
        assert_eq!(
            config.mirror_root,
            PathBuf::from("/home/tester/.viam/data_mirror")
        );
        assert_eq!(config.interval, Duration::from_secs(60));
        assert!(!config.delete);
    }

    #[test]
    fn test_from_attributes_full() {
        let home = Path::new("/home/tester");
        let config = MirrorConfig::from_attributes_with_home(
            &attrs(json!({
                "app_api_key": "k",
                "app_api_key_id": "kid",
                "dataset_id": "ds",
                "tags": ["t1", "t2"],
                "labels": ["cat"],
                "delete": true,
                "sync_frequency": 5,
                "mirror_path": "images",
                "max_concurrent_fetches": 4,
                "api_base_url": "https://api.example.com"
            })),
            home,
        )
        .unwrap();

        assert_eq!(config.dataset_id.as_deref(), Some("ds"));
        assert_eq!(config.tags.len(), 2);
        assert!(config.labels.contains("cat"));
        assert!(config.delete);
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.mirror_root, PathBuf::from("/home/tester/.viam/images"));
        assert_eq!(config.max_concurrent_fetches, 4);
        assert_eq!(
            config.api_base_url.as_deref(),
            Some("https://api.example.com")
        );
    }

    #[test]
    fn test_from_attributes_zero_frequency_uses_default() {
        let config = MirrorConfig::from_attributes_with_home(
            &attrs(json!({"app_api_key": "k", "app_api_key_id": "kid", "sync_frequency": 0})),
            Path::new("/h"),
        )
        .unwrap();

        assert_eq!(config.interval, DEFAULT_SYNC_INTERVAL);
    }

    #[test]
    fn test_from_attributes_empty_tag_rejected() {
        let err = MirrorConfig::from_attributes_with_home(
            &attrs(json!({"app_api_key": "k", "app_api_key_id": "kid", "tags": ["a", ""]})),
            Path::new("/h"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("tags")));

        let err = MirrorConfig::from_attributes_with_home(
            &attrs(json!({"app_api_key": "k", "app_api_key_id": "kid", "labels": [""]})),
            Path::new("/h"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("labels")));
    }

    #[test]
    fn test_from_attributes_huge_frequency_rejected() {
        let err = MirrorConfig::from_attributes_with_home(
            &attrs(json!({"app_api_key": "k", "app_api_key_id": "kid", "sync_frequency": 1e20})),
            Path::new("/h"),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Config(ref msg) if msg.contains("sync_frequency")));
    }

    #[test]
    fn test_from_attributes_subnanosecond_frequency_rejected() {
        let err = MirrorConfig::from_attributes_with_home(
            &attrs(json!({"app_api_key": "k", "app_api_key_id": "kid", "sync_frequency": 1e-12})),
            Path::new("/h"),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Config(ref msg) if msg.contains("sync_frequency")));
    }

    #[test]
    fn test_from_attributes_absolute_mirror_path_kept() {
        let config = MirrorConfig::from_attributes_with_home(
            &attrs(json!({"app_api_key": "k", "app_api_key_id": "kid", "mirror_path": "/data/m"})),
            Path::new("/h"),
        )
        .unwrap();

        assert_eq!(config.mirror_root, PathBuf::from("/data/m"));
    }

    #[test]
    fn test_from_attributes_missing_key_rejected() {
        let result = MirrorConfig::from_attributes_with_home(
            &attrs(json!({"app_api_key_id": "kid"})),
            Path::new("/h"),
        );
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("app_api_key ")));

        let result = MirrorConfig::from_attributes_with_home(
            &attrs(json!({"app_api_key": "k", "app_api_key_id": ""})),
            Path::new("/h"),
        );
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("app_api_key_id")));
    }

    #[test]
    fn test_from_attributes_wrong_type_rejected() {
        let result = MirrorConfig::from_attributes_with_home(
            &attrs(json!({"app_api_key": "k", "app_api_key_id": "kid", "tags": "t1"})),
            Path::new("/h"),
        );
        assert!(result.is_err());

        let result = MirrorConfig::from_attributes_with_home(
            &attrs(json!({"app_api_key": "k", "app_api_key_id": "kid", "delete": "yes"})),
            Path::new("/h"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_read_attributes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"app_api_key": "k", "app_api_key_id": "kid", "mirror_path": "/data/x"}"#,
        )
        .unwrap();

        let attributes = read_attributes_file(&path).unwrap();
        let config = MirrorConfig::from_attributes_with_home(&attributes, Path::new("/h")).unwrap();
        assert_eq!(config.mirror_root, PathBuf::from("/data/x"));

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(read_attributes_file(&path).is_err());

        std::fs::write(&path, "{not json").unwrap();
        assert!(read_attributes_file(&path).is_err());

        assert!(read_attributes_file(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = valid_builder().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("REDACTED"));
    }
}
