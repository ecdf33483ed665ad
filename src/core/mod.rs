pub mod config;
pub mod models;
pub mod timestamps;
pub mod window;
