use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::hash::ContentHash;
use super::public_id::{MediaFolder, PublicId};
use super::traits::{BoxReader, MediaStore};

/// Filesystem-backed media store.
///
/// Files live at `{base_path}/{folder}/{sha256}.{ext}`. Identical uploads to
/// the same folder share one file. URLs are `{public_base_url}/{public_id}`.
pub struct FilesystemMediaStore {
    base_path: PathBuf,
    public_base_url: String,
    max_size: u64,
}

impl FilesystemMediaStore {
    pub async fn new(
        base_path: PathBuf,
        public_base_url: &str,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(base_path.join(".tmp")).await?;
        for folder in MediaFolder::ALL {
            fs::create_dir_all(base_path.join(folder.as_str())).await?;
        }
        Ok(Self {
            base_path,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_size,
        })
    }

    fn file_path(&self, id: &PublicId) -> PathBuf {
        self.base_path
            .join(id.folder().as_str())
            .join(id.file_name())
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn upload(
        &self,
        folder: MediaFolder,
        extension: &str,
        data: &[u8],
    ) -> Result<PublicId, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let id = PublicId::new(folder, ContentHash::compute(data), extension)?;
        let path = self.file_path(&id);

        if fs::try_exists(&path).await? {
            return Ok(id);
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(id)
    }

    async fn open(&self, id: &PublicId) -> Result<BoxReader, StorageError> {
        match fs::File::open(self.file_path(id)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn url_for(&self, id: &PublicId) -> String {
        format!("{}/{id}", self.public_base_url)
    }

    async fn destroy(&self, id: &PublicId) -> Result<bool, StorageError> {
        match fs::remove_file(self.file_path(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
