pub mod activity;
pub mod admin;
pub mod announcement;
pub mod contact;
pub mod media;
pub mod student_result;
