//! Configuration module

pub mod cache_config;
pub mod cli;

pub use cache_config::{CacheConfig, CacheOptions, ClientOptions, Endpoint};
pub use cli::{CliArgs, OutputFormat};
