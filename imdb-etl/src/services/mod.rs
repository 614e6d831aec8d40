//! Service modules for the ETL session
//!
//! Core engines (record store, filter, ranking, output writer) plus the
//! fetch and workspace collaborators.

pub mod fetcher;
pub mod filter_engine;
pub mod output_writer;
pub mod ranking_engine;
pub mod record_store;
pub mod workspace;

pub use fetcher::{gunzip, DatasetFetcher, FetchReport, SourceFiles};
pub use filter_engine::filter_by_type;
pub use output_writer::{OutputWriter, WriteResult};
pub use ranking_engine::{top_percent, RankingOptions, SortKey, TieBreak};
pub use record_store::{load, load_with_report, LoadReport};
pub use workspace::Workspace;
