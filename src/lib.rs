pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod probe;
pub mod server;
pub mod transport;
pub mod ui;
