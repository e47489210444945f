pub mod activity;
pub mod announcements;
pub mod contact;
pub mod inbox;
pub mod login;
pub mod lookup;
pub mod media;
pub mod results;
