//! Compression client and configuration.

mod tinify_client;
mod tinify_config;

pub use tinify_client::TinifyClient;
pub use tinify_config::TinifyConfig;
