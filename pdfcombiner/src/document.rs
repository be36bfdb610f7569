//! Document references and resolution.
//!
//! A [`Document`] names one input to a combination job. Its payload comes
//! from one of two places: an inline base64 string embedded in the request,
//! or the job's blob store under a key derived from the document name.
//! Inline data short-circuits remote retrieval entirely.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{CombinerError, Result};
use crate::storage::BlobStore;

/// A reference to one document to be combined.
///
/// Created by the request parser, immutable, consumed once by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier used to derive the storage key.
    pub name: String,

    /// Optional base64-encoded payload. When present (and non-empty) the
    /// document never touches the network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl Document {
    /// Creates a reference to a remotely stored document.
    pub fn remote(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: None,
        }
    }

    /// Creates a document carrying an inline base64 payload.
    pub fn inline(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Some(data.into()),
        }
    }

    /// Check whether this document carries a usable inline payload.
    ///
    /// An empty string counts as absent, matching the request convention
    /// where callers send `""` to mean "fetch it remotely".
    pub fn has_inline_data(&self) -> bool {
        self.data.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Derives the storage key for this document.
    ///
    /// With a job prefix the key is `{prefix}/{name}`, otherwise just the
    /// document name.
    pub fn storage_key(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}/{}", self.name),
            _ => self.name.clone(),
        }
    }

    /// Resolves this document to its raw bytes.
    ///
    /// Inline data is decoded without any network access; otherwise the
    /// payload is fetched from `store`. Fetch failures of any kind
    /// (not-found, denied, transient) are reported uniformly as
    /// [`CombinerError::Retrieval`] — callers record them, they do not
    /// retry.
    pub async fn resolve(&self, store: &dyn BlobStore, prefix: Option<&str>) -> Result<Vec<u8>> {
        if self.has_inline_data() {
            return self.decode_inline();
        }
        self.fetch_remote(store, prefix).await
    }

    /// Decodes the inline payload.
    ///
    /// Fails with [`CombinerError::Decode`] on malformed base64.
    pub(crate) fn decode_inline(&self) -> Result<Vec<u8>> {
        let data = self
            .data
            .as_deref()
            .ok_or_else(|| CombinerError::decode(&self.name, "no inline data present"))?;

        STANDARD
            .decode(data)
            .map_err(|err| CombinerError::decode(&self.name, err.to_string()))
    }

    pub(crate) async fn fetch_remote(
        &self,
        store: &dyn BlobStore,
        prefix: Option<&str>,
    ) -> Result<Vec<u8>> {
        let key = self.storage_key(prefix);

        store
            .get(&key)
            .await
            .map_err(|err| CombinerError::retrieval(&key, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use rstest::rstest;

    #[rstest]
    #[case(None, "report.pdf")]
    #[case(Some(""), "report.pdf")]
    #[case(Some("42-docs"), "42-docs/report.pdf")]
    fn test_storage_key(#[case] prefix: Option<&str>, #[case] expected: &str) {
        let doc = Document::remote("report.pdf");
        assert_eq!(doc.storage_key(prefix), expected);
    }

    #[test]
    fn test_has_inline_data() {
        assert!(!Document::remote("a.pdf").has_inline_data());
        assert!(!Document::inline("a.pdf", "").has_inline_data());
        assert!(Document::inline("a.pdf", "aGk=").has_inline_data());
    }

    #[tokio::test]
    async fn test_resolve_inline_never_touches_store() {
        let store = MemoryStore::new();
        let doc = Document::inline("a.pdf", STANDARD.encode(b"hello"));

        // The store is empty, so any network path would fail.
        let bytes = doc.resolve(&store, None).await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn test_resolve_inline_malformed() {
        let store = MemoryStore::new();
        let doc = Document::inline("a.pdf", "not&base64!");

        let err = doc.resolve(&store, None).await.unwrap_err();
        assert!(matches!(err, CombinerError::Decode { .. }));
        assert!(err.is_isolated());
    }

    #[tokio::test]
    async fn test_resolve_remote() {
        let store = MemoryStore::new();
        store
            .put("42-docs/a.pdf", b"remote bytes".to_vec(), "application/pdf")
            .await
            .unwrap();

        let doc = Document::remote("a.pdf");
        let bytes = doc.resolve(&store, Some("42-docs")).await.unwrap();
        assert_eq!(bytes, b"remote bytes");
    }

    #[tokio::test]
    async fn test_resolve_remote_missing() {
        let store = MemoryStore::new();
        let doc = Document::remote("missing.pdf");

        let err = doc.resolve(&store, None).await.unwrap_err();
        assert!(matches!(err, CombinerError::Retrieval { .. }));
    }

    #[tokio::test]
    async fn test_empty_data_falls_back_to_remote() {
        let store = MemoryStore::new();
        store
            .put("a.pdf", b"from store".to_vec(), "application/pdf")
            .await
            .unwrap();

        let doc = Document::inline("a.pdf", "");
        let bytes = doc.resolve(&store, None).await.unwrap();
        assert_eq!(bytes, b"from store");
    }

    #[test]
    fn test_deserialize_request_shape() {
        let doc: Document = serde_json::from_str(r#"{"name":"a.pdf"}"#).unwrap();
        assert_eq!(doc, Document::remote("a.pdf"));

        let doc: Document = serde_json::from_str(r#"{"name":"b.pdf","data":"aGk="}"#).unwrap();
        assert!(doc.has_inline_data());
    }
}
