//! Filter Builder
//!
//! Derives the catalog query from the active configuration. Only non-empty
//! settings become filter fields; the rest stay absent.

use bridge_traits::catalog::CatalogFilter;
use core_runtime::config::MirrorConfig;

/// Construction of a [`CatalogFilter`] from a [`MirrorConfig`].
pub trait FilterFromConfig {
    fn from_config(config: &MirrorConfig) -> Self;
}

impl FilterFromConfig for CatalogFilter {
    fn from_config(config: &MirrorConfig) -> Self {
        let mut builder = CatalogFilter::builder();
        if let Some(dataset_id) = &config.dataset_id {
            builder = builder.dataset_id(dataset_id.as_str());
        }
        builder
            .tags(config.tags.iter().map(String::as_str))
            .labels(config.labels.iter().map(String::as_str))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn config() -> core_runtime::config::MirrorConfigBuilder {
        MirrorConfig::builder()
            .credentials("key-id", "key")
            .mirror_root("/tmp/mirror")
    }

    #[test]
    fn test_empty_config_matches_everything() {
        let filter = CatalogFilter::from_config(&config().build().unwrap());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_dataset_only() {
        let filter = CatalogFilter::from_config(&config().dataset_id("ds-1").build().unwrap());

        assert_eq!(filter.dataset_id.as_deref(), Some("ds-1"));
        assert!(filter.tags.is_none());
        assert!(filter.labels.is_none());
    }

    #[test]
    fn test_tags_and_labels_are_conjunctive_fields() {
        let filter = CatalogFilter::from_config(
            &config()
                .tags(["a", "b"])
                .labels(["cat"])
                .build()
                .unwrap(),
        );

        let tags: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(filter.tags, Some(tags));
        assert_eq!(filter.labels.unwrap().len(), 1);
        assert!(filter.dataset_id.is_none());
    }
}
