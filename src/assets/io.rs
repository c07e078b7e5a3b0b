#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::errors::{Result, StageError};

/// Asynchronous byte source for models and motion files.
///
/// Loads are awaited on the caller's task; nothing is spawned, so readers do
/// not need to be `Send`.
pub trait AssetReader {
    fn read_bytes(&self, uri: &str) -> impl std::future::Future<Output = Result<Vec<u8>>>;
}

impl<R: AssetReader> AssetReader for &R {
    fn read_bytes(&self, uri: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> {
        (**self).read_bytes(uri)
    }
}

/// Reads assets from a local directory.
#[cfg(not(target_arch = "wasm32"))]
pub struct FileAssetReader {
    root_path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileAssetReader {
    /// `path` may be the asset directory itself or a file inside it.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        log::debug!("Reading asset {}", path.display());
        tokio::fs::read(&path)
            .await
            .map_err(|err| StageError::asset_load(uri, err))
    }
}

/// Fetches assets relative to a base URL.
#[cfg(feature = "http")]
pub struct HttpAssetReader {
    root_url: url::Url,
}

#[cfg(feature = "http")]
impl HttpAssetReader {
    pub fn new(url_str: &str) -> Result<Self> {
        let url = url::Url::parse(url_str).map_err(|err| StageError::asset_load(url_str, err))?;
        let root_url = if url.path().ends_with('/') {
            url
        } else {
            let mut dir = url.clone();
            if let Ok(mut segments) = dir.path_segments_mut() {
                segments.pop();
                segments.push("");
            }
            dir
        };
        Ok(Self { root_url })
    }

    #[inline]
    #[must_use]
    pub fn root_url(&self) -> &url::Url {
        &self.root_url
    }
}

#[cfg(feature = "http")]
impl AssetReader for HttpAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let url = self
            .root_url
            .join(uri)
            .map_err(|err| StageError::asset_load(uri, err))?;
        log::debug!("Fetching asset {url}");
        let response = ehttp::fetch_async(ehttp::Request::get(url.as_str()))
            .await
            .map_err(|err| StageError::asset_load(uri, err))?;
        if !response.ok {
            return Err(StageError::asset_load(
                uri,
                format!("HTTP {} {}", response.status, response.status_text),
            ));
        }
        Ok(response.bytes)
    }
}

/// In-memory asset table for bundled assets.
///
/// Individual entries can be marked as failing to simulate rejected fetches.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssetReader {
    entries: FxHashMap<String, Vec<u8>>,
    failures: FxHashMap<String, String>,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(uri.into(), bytes.into());
    }

    #[must_use]
    pub fn with(mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(uri, bytes);
        self
    }

    /// Makes every read of `uri` fail with `reason`.
    pub fn fail(&mut self, uri: impl Into<String>, reason: impl Into<String>) {
        self.failures.insert(uri.into(), reason.into());
    }

    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.entries.contains_key(uri)
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        if let Some(reason) = self.failures.get(uri) {
            return Err(StageError::asset_load(uri, reason));
        }
        self.entries
            .get(uri)
            .cloned()
            .ok_or_else(|| StageError::asset_load(uri, "not found"))
    }
}
