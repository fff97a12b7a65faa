use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{reject_empty, SecretStore, StoreError, StoreResult};

/// Token stored as a single file `<dir>/<key>`.
///
/// The directory is created on first write. Writes land in a temp file in
/// the same directory, are fsynced, and are then renamed over the target, so
/// readers never see a partially written token.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
    key: String,
}

impl FileTokenStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> StoreResult<Self> {
        if key.is_empty()
            || key.starts_with('.')
            || key.contains(['/', '\\'])
            || key.chars().any(char::is_control)
        {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            key: key.to_string(),
        })
    }

    fn path(&self) -> PathBuf {
        self.dir.join(&self.key)
    }

    async fn write_temp(&self, tmp: &Path, value: &str) -> StoreResult<()> {
        let mut file = fs::File::create(tmp)
            .await
            .map_err(|e| StoreError::io(tmp, e))?;
        file.write_all(value.as_bytes())
            .await
            .map_err(|e| StoreError::io(tmp, e))?;
        file.sync_all().await.map_err(|e| StoreError::io(tmp, e))
    }
}

#[async_trait]
impl SecretStore for FileTokenStore {
    async fn get(&self) -> StoreResult<Option<String>> {
        let path = self.path();
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(path, e)),
        };

        let raw = String::from_utf8(bytes).map_err(|_| StoreError::Corrupt)?;
        let token = raw.trim_end_matches(['\r', '\n']);
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token.to_string()))
    }

    async fn set(&self, value: &str) -> StoreResult<()> {
        reject_empty(value)?;

        // Already-exists is success; racing creators are fine.
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?;

        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", self.key, Uuid::new_v4().simple()));

        if let Err(e) = self.write_temp(&tmp, value).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e);
        }

        let path = self.path();
        if let Err(e) = fs::rename(&tmp, &path).await {
            warn!("Token file replace failed, discarding temp file");
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::io(path, e));
        }

        debug!("Token file replaced at {}", path.display());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
