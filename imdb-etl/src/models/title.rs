//! Joined title + rating record

use serde::Serialize;

/// One row of the joined basics/ratings relation
///
/// Field order is the artifact column order; serde names are the IMDB column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleRecord {
    /// Join key (`tconst`), never empty
    #[serde(rename = "tconst")]
    pub id: String,
    /// Category discovered from the data (`movie`, `tvEpisode`, `short`, ...)
    pub title_type: String,
    pub primary_title: Option<String>,
    pub original_title: Option<String>,
    pub is_adult: Option<u8>,
    pub start_year: Option<u16>,
    pub end_year: Option<u16>,
    pub runtime_minutes: Option<u32>,
    pub genres: Option<String>,
    /// Ranking score, observed range 1.0 - 10.0
    pub average_rating: Option<f64>,
    /// Vote count backing the rating
    pub num_votes: Option<u64>,
}

impl TitleRecord {
    /// Artifact header row, in serialization order
    pub const COLUMNS: [&'static str; 11] = [
        "tconst",
        "titleType",
        "primaryTitle",
        "originalTitle",
        "isAdult",
        "startYear",
        "endYear",
        "runtimeMinutes",
        "genres",
        "averageRating",
        "numVotes",
    ];

    /// Minimal record, mostly for tests and fixtures
    pub fn new(id: impl Into<String>, title_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title_type: title_type.into(),
            primary_title: None,
            original_title: None,
            is_adult: None,
            start_year: None,
            end_year: None,
            runtime_minutes: None,
            genres: None,
            average_rating: None,
            num_votes: None,
        }
    }

    pub fn with_rating(mut self, average_rating: f64, num_votes: u64) -> Self {
        self.average_rating = Some(average_rating);
        self.num_votes = Some(num_votes);
        self
    }

    pub fn with_titles(mut self, primary: &str, original: &str) -> Self {
        self.primary_title = Some(primary.to_string());
        self.original_title = Some(original.to_string());
        self
    }
}
