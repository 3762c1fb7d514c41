//! Translation resource backends.
//!
//! A backend hands out one JSON object per `(language, namespace)` pair.

use crate::error::BackendError;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Resource tree for one language and namespace.
pub type Resource = Map<String, Value>;

/// Source of translation resources.
pub trait Backend: Send + Sync {
    /// `Ok(None)` when the resource does not exist.
    fn read<'a>(
        &'a self,
        language: &'a str,
        namespace: &'a str,
    ) -> BoxFuture<'a, Result<Option<Resource>, BackendError>>;
}

/// Reads `{root}/{language}/{namespace}.json`.
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resource_path(&self, language: &str, namespace: &str) -> Option<PathBuf> {
        // Both parts end up in a filesystem path.
        let is_safe = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };
        if !is_safe(language) || !is_safe(namespace) {
            return None;
        }
        Some(self.root.join(language).join(format!("{}.json", namespace)))
    }
}

impl Backend for FsBackend {
    fn read<'a>(
        &'a self,
        language: &'a str,
        namespace: &'a str,
    ) -> BoxFuture<'a, Result<Option<Resource>, BackendError>> {
        Box::pin(async move {
            let Some(path) = self.resource_path(language, namespace) else {
                debug!(language, namespace, "Rejected unsafe resource name");
                return Ok(None);
            };
            let display = path.display().to_string();

            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(source) => return Err(BackendError::Io { path: display, source }),
            };

            match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(resource)) => Ok(Some(resource)),
                Ok(_) => Err(BackendError::NotAnObject {
                    language: language.to_string(),
                    namespace: namespace.to_string(),
                }),
                Err(source) => Err(BackendError::Parse { path: display, source }),
            }
        })
    }
}

/// Resources held in memory, keyed by language then namespace.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    resources: HashMap<String, HashMap<String, Resource>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource. Non-object values are ignored.
    pub fn with_resource(mut self, language: &str, namespace: &str, resource: Value) -> Self {
        if let Value::Object(map) = resource {
            self.resources
                .entry(language.to_string())
                .or_default()
                .insert(namespace.to_string(), map);
        }
        self
    }
}

impl Backend for MemoryBackend {
    fn read<'a>(
        &'a self,
        language: &'a str,
        namespace: &'a str,
    ) -> BoxFuture<'a, Result<Option<Resource>, BackendError>> {
        let resource = self
            .resources
            .get(language)
            .and_then(|namespaces| namespaces.get(namespace))
            .cloned();
        Box::pin(async move { Ok(resource) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_resource(dir: &TempDir, language: &str, namespace: &str, body: &str) {
        let lang_dir = dir.path().join(language);
        std::fs::create_dir_all(&lang_dir).unwrap();
        std::fs::write(lang_dir.join(format!("{}.json", namespace)), body).unwrap();
    }

    #[tokio::test]
    async fn test_fs_backend_reads_resource() {
        let dir = TempDir::new().unwrap();
        write_resource(&dir, "nb", "common", r#"{"greeting": "Hei"}"#);

        let backend = FsBackend::new(dir.path());
        let resource = backend.read("nb", "common").await.unwrap().unwrap();
        assert_eq!(resource.get("greeting"), Some(&json!("Hei")));
    }

    #[tokio::test]
    async fn test_fs_backend_missing_resource() {
        let dir = TempDir::new().unwrap();
        let backend = FsBackend::new(dir.path());
        assert!(backend.read("nb", "common").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fs_backend_invalid_json() {
        let dir = TempDir::new().unwrap();
        write_resource(&dir, "nb", "common", "{ not json");

        let backend = FsBackend::new(dir.path());
        let result = backend.read("nb", "common").await;
        assert!(matches!(result, Err(BackendError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_fs_backend_rejects_non_object() {
        let dir = TempDir::new().unwrap();
        write_resource(&dir, "nb", "common", r#"["a", "b"]"#);

        let backend = FsBackend::new(dir.path());
        let result = backend.read("nb", "common").await;
        assert!(matches!(result, Err(BackendError::NotAnObject { .. })));
    }

    #[tokio::test]
    async fn test_fs_backend_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let backend = FsBackend::new(dir.path().join("locales"));
        assert!(backend.read("..", "common").await.unwrap().is_none());
        assert!(backend.read("nb", "../secret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_backend() {
        let backend = MemoryBackend::new()
            .with_resource("en", "common", json!({"greeting": "Hello"}))
            .with_resource("en", "ignored", json!("not an object"));

        assert!(backend.read("en", "common").await.unwrap().is_some());
        assert!(backend.read("en", "ignored").await.unwrap().is_none());
        assert!(backend.read("nb", "common").await.unwrap().is_none());
    }
}
