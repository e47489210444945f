pub mod activity;
pub mod announcement;
pub mod assets;
pub mod auth;
pub mod contact;
pub mod media;
pub mod result;
pub mod upload;
