pub mod commands;
pub mod config;
pub mod logging;
pub mod manifest;
pub mod resolver;

pub use resolver::Maven2Resolver;
