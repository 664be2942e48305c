pub mod appender;
pub mod config;
pub mod error;
pub mod handler;
pub mod normalizer;
pub mod response;
pub mod store;
pub mod types;
