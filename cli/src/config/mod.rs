//! Configuration management for artifetch
//!
//! All config operations go through this module so that every read and write
//! is validated.
//!
//! ## Architecture
//!
//! - `schema` - Configuration data structures and validation
//! - `io` - Reading, writing, and updating the config file
//! - `paths` - Directory path management
//! - `utils` - Path expansion and id validation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use artifetch::config;
//!
//! # fn example() -> anyhow::Result<()> {
//! // Load config (returns default if file doesn't exist)
//! let config = config::load_config()?;
//!
//! // Settings for a dependency manager, Maven Central if nothing is configured
//! let settings = config.manager_settings()?;
//! # Ok(())
//! # }
//! ```

pub mod io;
pub mod paths;
pub mod schema;
pub mod utils;

pub use io::{add_repository, load_config, remove_repository, save_config, update_config};
pub use paths::{get_artifetch_dir, get_config_path, get_default_local_repository, get_log_dir};
pub use schema::{ArtifetchConfig, RetrySection};
