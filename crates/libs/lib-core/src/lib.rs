//! # Core Library
//!
//! Domain model, SQLite store, configuration, errors and the pure reporting
//! functions shared by the server and the admin CLI.

pub mod config;
pub mod dataset;
pub mod demo;
pub mod dto;
pub mod error;
pub mod model;
pub mod report;

// Re-export commonly used types
pub use config::{ChainConfig, ChainMode, Config};
pub use dataset::{DataSource, Dataset};
pub use error::{AppError, Result};
pub use model::store::{create_pool, memory_pool, run_migrations, DbPool, Scope};
