use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::StorageError;
use super::hash::ContentHash;

pub use crate::image::ALLOWED_EXTENSIONS;

/// Folder a stored file belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFolder {
    StudentPhotos,
    MediaUploads,
    AnnouncementUploads,
}

impl MediaFolder {
    pub const ALL: [MediaFolder; 3] = [
        Self::StudentPhotos,
        Self::MediaUploads,
        Self::AnnouncementUploads,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StudentPhotos => "student_photos",
            Self::MediaUploads => "media_uploads",
            Self::AnnouncementUploads => "announcement_uploads",
        }
    }
}

impl FromStr for MediaFolder {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| StorageError::InvalidPublicId(format!("unknown folder '{s}'")))
    }
}

/// Normalize and check an image extension.
pub fn image_extension(ext: &str) -> Result<String, StorageError> {
    let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(StorageError::UnsupportedType(ext))
    }
}

/// Provider-side identifier of a stored file: `{folder}/{sha256}.{ext}`.
///
/// Parsing only accepts ids of exactly this shape, so a `PublicId` can never
/// name a path outside its folder.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicId {
    folder: MediaFolder,
    hash: ContentHash,
    ext: String,
}

impl PublicId {
    pub fn new(folder: MediaFolder, hash: ContentHash, ext: &str) -> Result<Self, StorageError> {
        Ok(Self {
            folder,
            hash,
            ext: image_extension(ext)?,
        })
    }

    pub fn folder(&self) -> MediaFolder {
        self.folder
    }

    pub fn extension(&self) -> &str {
        &self.ext
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.hash, self.ext)
    }
}

impl FromStr for PublicId {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (folder, file) = s
            .split_once('/')
            .ok_or_else(|| StorageError::InvalidPublicId(format!("missing folder in '{s}'")))?;
        let (stem, ext) = file
            .rsplit_once('.')
            .ok_or_else(|| StorageError::InvalidPublicId(format!("missing extension in '{s}'")))?;
        Self::new(folder.parse()?, ContentHash::from_hex(stem)?, ext)
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}.{}", self.folder.as_str(), self.hash, self.ext)
    }
}

impl fmt::Debug for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicId({self})")
    }
}
