//! Data models for imdb-etl

pub mod relation;
pub mod title;

pub use relation::Relation;
pub use title::TitleRecord;
