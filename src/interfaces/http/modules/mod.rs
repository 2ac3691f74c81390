pub mod health;
pub mod home;
pub mod registration;
pub mod request_id;
