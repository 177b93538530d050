pub mod handlers;
pub mod photo;
