pub mod app;
pub mod config;
pub mod log;
pub mod search;
pub mod state;
pub mod upstream;
