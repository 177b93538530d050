pub mod handlers;
pub mod selection;
