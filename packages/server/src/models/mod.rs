pub mod activity;
pub mod announcement;
pub mod auth;
pub mod contact;
pub mod media;
pub mod result;
pub mod shared;
