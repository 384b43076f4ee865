pub mod app;
pub mod config;
pub mod selector;
pub mod version;
