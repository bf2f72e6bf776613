use crate::application::ports::storage_backend::StorageBackend;
use crate::shared::error::AppError;
use anyhow::Context;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const APP_DIR: &str = "tailor-offline";
const STORE_DIR: &str = "offline_store";

/// キーごとに `<key>.json` を 1 ファイル書き出すバックエンド。
pub struct FileStorageBackend {
    root: PathBuf,
}

impl FileStorageBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// プラットフォームのローカルデータディレクトリ配下を使う
    pub fn default_location() -> Self {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path.push(STORE_DIR);
        Self::new(path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn item_path(&self, key: &str) -> Result<PathBuf, AppError> {
        Self::validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }

    fn validate_key(key: &str) -> Result<(), AppError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(())
        } else {
            Err(AppError::ValidationError(format!(
                "Storage key must be [A-Za-z0-9_-]+: {key:?}"
            )))
        }
    }

    async fn write_atomically(&self, path: &Path, value: &str) -> anyhow::Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed to create {}", self.root.display()))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FileStorageBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.item_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.item_path(key)?;
        self.write_atomically(&path, value).await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), AppError> {
        let path = self.item_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
