//! Test Helper Utilities
//!
//! TSV fixture writers and session setup shared by imdb-etl tests

#![allow(dead_code)]

use std::path::Path;

use imdb_common::config::RootFolderInitializer;
use imdb_etl::services::{RankingOptions, SourceFiles, Workspace};
use imdb_etl::session::SessionSettings;

pub const BASICS_HEADER: &str =
    "tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres";
pub const RATINGS_HEADER: &str = "tconst\taverageRating\tnumVotes";

/// Builder for a pair of basics/ratings dumps
#[derive(Debug, Clone, Default)]
pub struct SourceFixture {
    basics: Vec<String>,
    ratings: Vec<String>,
}

impl SourceFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Basics row only
    pub fn title(mut self, id: &str, title_type: &str, original_title: &str) -> Self {
        self.basics.push(format!(
            "{id}\t{title_type}\t{original_title}\t{original_title}\t0\t2001\t\\N\t90\tDrama"
        ));
        self
    }

    /// Ratings row only
    pub fn rating(mut self, id: &str, average_rating: f64, num_votes: u64) -> Self {
        self.ratings.push(format!("{id}\t{average_rating}\t{num_votes}"));
        self
    }

    /// Basics and ratings row for the same id
    pub fn rated(self, id: &str, title_type: &str, average_rating: f64, num_votes: u64) -> Self {
        let original_title = format!("Title {id}");
        self.title(id, title_type, &original_title)
            .rating(id, average_rating, num_votes)
    }

    pub fn basics_len(&self) -> usize {
        self.basics.len()
    }

    pub fn ratings_len(&self) -> usize {
        self.ratings.len()
    }

    /// Write `title_basics.tsv` and `title_ratings.tsv` into `raw_folder`
    pub fn write_to(&self, raw_folder: &Path) -> SourceFiles {
        std::fs::create_dir_all(raw_folder).unwrap();
        let files = SourceFiles::in_folder(raw_folder);
        std::fs::write(&files.basics, with_header(BASICS_HEADER, &self.basics)).unwrap();
        std::fs::write(&files.ratings, with_header(RATINGS_HEADER, &self.ratings)).unwrap();
        files
    }
}

fn with_header(header: &str, rows: &[String]) -> String {
    let mut content = String::from(header);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    content
}

/// 100 rated titles, 40 of them movies; no shorts
///
/// Types cycle movie, movie, tvEpisode, tvSeries, video. Ratings are spread
/// over 1.0..=10.0.
pub fn hundred_titles() -> SourceFixture {
    let types = ["movie", "movie", "tvEpisode", "tvSeries", "video"];
    (0..100u64).fold(SourceFixture::new(), |fixture, i| {
        let rating = ((i * 37) % 91) as f64 / 10.0 + 1.0;
        fixture.rated(&format!("tt{:07}", i + 1), types[(i % 5) as usize], rating, i * 10)
    })
}

/// Workspace under `root` with the standard working folder names
pub fn workspace(root: &Path) -> Workspace {
    Workspace::from_initializer(&RootFolderInitializer::new(root.to_path_buf()))
}

/// Write `fixture` into `root/Raw` and build controller settings for `root`
pub fn settings_with_sources(root: &Path, fixture: &SourceFixture) -> SessionSettings {
    let workspace = workspace(root);
    let sources = fixture.write_to(workspace.raw_folder());
    SessionSettings {
        workspace,
        sources,
        ranking: RankingOptions::default(),
    }
}

/// Header and data rows of a CSV artifact
pub fn read_artifact(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (headers, rows)
}
