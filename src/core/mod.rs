pub mod config;
pub mod pipeline;
pub mod preprocess;
pub mod store;
pub mod workspace;
