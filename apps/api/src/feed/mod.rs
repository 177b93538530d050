pub mod handlers;
pub mod ranker;
