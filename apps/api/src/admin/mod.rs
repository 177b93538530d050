pub mod deletion;
pub mod handlers;
pub mod importer;
