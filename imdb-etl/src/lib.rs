//! imdb-etl library interface
//!
//! Interactive ETL over the IMDB `title.basics` / `title.ratings` dumps:
//! load and join once, then filter by title type and extract top-percent
//! slices on operator demand, writing each result as a CSV artifact.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use crate::error::{EtlError, EtlResult};
