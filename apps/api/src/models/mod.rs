pub mod job;
pub mod painting;
pub mod preference;
pub mod style;
