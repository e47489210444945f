use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;
use super::public_id::{MediaFolder, PublicId};

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Image hosting used for student photos, gallery items and announcement
/// attachments.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an image and return its public id.
    ///
    /// `extension` is checked against the allowed image types.
    async fn upload(
        &self,
        folder: MediaFolder,
        extension: &str,
        data: &[u8],
    ) -> Result<PublicId, StorageError>;

    /// Open a stored file for streaming.
    async fn open(&self, id: &PublicId) -> Result<BoxReader, StorageError>;

    /// Renderable URL for a stored file.
    fn url_for(&self, id: &PublicId) -> String;

    /// Remove a stored file.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn destroy(&self, id: &PublicId) -> Result<bool, StorageError>;
}
