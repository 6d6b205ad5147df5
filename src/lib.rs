pub mod config;
pub mod error;
pub mod migrate;
pub mod platform;
pub mod translate;
