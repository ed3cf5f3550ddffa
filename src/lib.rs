pub mod config;
pub mod gradle;
pub mod integration;
pub mod logging;
pub mod manifest;
pub mod parser;
mod persist;
pub mod version;
