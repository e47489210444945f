pub mod api;
pub mod contact_status;
pub mod form;
pub mod grading;
pub mod image;
pub mod lookup;
pub mod media_type;
pub mod student;

#[cfg(feature = "media-store")]
pub mod storage;

pub use contact_status::ContactStatus;
pub use grading::{Aggregate, Grade};
pub use media_type::MediaType;
pub use student::{CoScholasticArea, MarkPair, MediaRef, ResultPayload, StudentResult, Subject};
