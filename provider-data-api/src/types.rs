//! Data API request and response types
//!
//! Wire structures for the `binary-data` endpoints.

use bridge_traits::catalog::{BinaryId, CatalogFilter, RemoteObjectMetadata};
use serde::{Deserialize, Serialize};

/// Filter as sent on the wire. Unset fields are omitted entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WireFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags_filter: Option<TagsFilter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox_labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagsFilter {
    pub tags: Vec<String>,
}

impl From<&CatalogFilter> for WireFilter {
    fn from(filter: &CatalogFilter) -> Self {
        Self {
            dataset_id: filter.dataset_id.clone(),
            tags_filter: filter.tags.as_ref().map(|tags| TagsFilter {
                tags: tags.iter().cloned().collect(),
            }),
            bbox_labels: filter
                .labels
                .as_ref()
                .map(|labels| labels.iter().cloned().collect()),
        }
    }
}

/// `POST /v1/binary-data/by-filter` body
#[derive(Debug, Serialize)]
pub struct ByFilterRequest<'a> {
    pub filter: WireFilter,
    pub include_binary_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<&'a str>,
    pub limit: u32,
}

/// `POST /v1/binary-data/by-filter` response
#[derive(Debug, Deserialize)]
pub struct ByFilterResponse {
    #[serde(default)]
    pub data: Vec<BinaryDataEntry>,

    #[serde(default)]
    pub count: u64,

    /// Continuation token for the next page
    #[serde(default)]
    pub last: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BinaryDataEntry {
    pub metadata: BinaryMetadata,

    /// Base64 payload, only present on by-ids responses
    #[serde(default)]
    pub binary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BinaryMetadata {
    pub id: String,

    #[serde(default)]
    pub file_name: Option<String>,

    pub capture_metadata: CaptureMetadata,
}

#[derive(Debug, Deserialize)]
pub struct CaptureMetadata {
    #[serde(default)]
    pub mime_type: String,
    pub organization_id: String,
    pub location_id: String,
}

impl From<BinaryMetadata> for RemoteObjectMetadata {
    fn from(metadata: BinaryMetadata) -> Self {
        Self {
            id: metadata.id,
            file_name: metadata.file_name.filter(|name| !name.is_empty()),
            mime_type: metadata.capture_metadata.mime_type,
            organization_id: metadata.capture_metadata.organization_id,
            location_id: metadata.capture_metadata.location_id,
        }
    }
}

/// `POST /v1/binary-data/by-ids` body
#[derive(Debug, Serialize)]
pub struct ByIdsRequest<'a> {
    pub binary_ids: Vec<&'a BinaryId>,
    pub include_binary: bool,
}

/// `POST /v1/binary-data/by-ids` response
#[derive(Debug, Deserialize)]
pub struct ByIdsResponse {
    #[serde(default)]
    pub data: Vec<BinaryPayload>,
}

#[derive(Debug, Deserialize)]
pub struct BinaryPayload {
    #[serde(default)]
    pub binary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_filter_omits_unset_fields() {
        let filter = CatalogFilter::builder().dataset_id("ds").build();
        let json = serde_json::to_value(WireFilter::from(&filter)).unwrap();

        assert_eq!(json, serde_json::json!({"dataset_id": "ds"}));
    }

    #[test]
    fn test_wire_filter_maps_tags_and_labels() {
        let filter = CatalogFilter::builder()
            .tags(["b", "a"])
            .labels(["cat"])
            .build();
        let json = serde_json::to_value(WireFilter::from(&filter)).unwrap();

        assert_eq!(json["tags_filter"]["tags"], serde_json::json!(["a", "b"]));
        assert_eq!(json["bbox_labels"], serde_json::json!(["cat"]));
        assert!(json.get("dataset_id").is_none());
    }

    #[test]
    fn test_metadata_conversion_treats_empty_name_as_absent() {
        let entry: BinaryDataEntry = serde_json::from_str(
            r#"{"metadata": {"id": "o1", "file_name": "",
                "capture_metadata": {"mime_type": "image/png",
                "organization_id": "org", "location_id": "loc"}}}"#,
        )
        .unwrap();

        let meta = RemoteObjectMetadata::from(entry.metadata);
        assert_eq!(meta.id, "o1");
        assert!(meta.file_name.is_none());
        assert_eq!(meta.mime_type, "image/png");
    }
}
