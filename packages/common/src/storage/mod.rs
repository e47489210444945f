mod error;
mod hash;
mod public_id;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use filesystem::FilesystemMediaStore;
pub use hash::ContentHash;
pub use public_id::{ALLOWED_EXTENSIONS, MediaFolder, PublicId, image_extension};
pub use traits::{BoxReader, MediaStore};
