//! # IMDB ETL Common Library
//!
//! Shared code for the IMDB ETL workspace:
//! - Error types
//! - Configuration loading and root folder resolution
//! - Working folder initialization
//! - Human-readable size/duration formatting

pub mod config;
pub mod error;
pub mod human_units;

pub use error::{Error, Result};
