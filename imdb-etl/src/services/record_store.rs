//! Record store: loads and joins the basics and ratings dumps
//!
//! Both inputs are tab-separated with a header row and no quoting (IMDB titles
//! contain bare `"` characters). Numeric fields that fail to parse, including
//! the IMDB null marker `\N`, become missing values instead of errors.
//!
//! The join is an inner join on `tconst` in basics-file order. Rows present on
//! only one side are dropped; the counts go to the diagnostics log only.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{debug, info, warn};

use crate::error::{EtlError, EtlResult};
use crate::models::{Relation, TitleRecord};

/// Join key column present in both dumps
pub const KEY_COLUMN: &str = "tconst";

/// IMDB null marker
const NULL_MARKER: &str = "\\N";

/// Row of `title.basics.tsv`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BasicsRow {
    tconst: String,
    #[serde(default)]
    title_type: String,
    #[serde(default, deserialize_with = "nullable_string")]
    primary_title: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    original_title: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    is_adult: Option<u8>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    start_year: Option<u16>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    end_year: Option<u16>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    runtime_minutes: Option<u32>,
    #[serde(default, deserialize_with = "nullable_string")]
    genres: Option<String>,
}

/// Row of `title.ratings.tsv`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatingsRow {
    tconst: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    average_rating: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    num_votes: Option<u64>,
}

fn nullable_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty() && s != NULL_MARKER))
}

/// Row accounting for one `load` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub basics_rows: usize,
    pub ratings_rows: usize,
    pub joined_rows: usize,
    /// Undecodable rows skipped across both files
    pub skipped_rows: usize,
    /// Duplicate ids in the ratings file (first occurrence kept)
    pub duplicate_ratings: usize,
}

impl LoadReport {
    /// Basics rows with no matching rating
    pub fn unmatched_basics(&self) -> usize {
        self.basics_rows - self.joined_rows
    }
}

/// Load both files and inner-join them on `tconst`
pub fn load(basics_path: &Path, ratings_path: &Path) -> EtlResult<Relation> {
    load_with_report(basics_path, ratings_path).map(|(relation, _)| relation)
}

/// Same as [`load`], also returning row accounting
pub fn load_with_report(
    basics_path: &Path,
    ratings_path: &Path,
) -> EtlResult<(Relation, LoadReport)> {
    let mut report = LoadReport::default();

    let mut ratings_reader = open_tsv(ratings_path)?;
    let mut ratings: HashMap<String, RatingsRow> = HashMap::new();
    for row in ratings_reader.deserialize::<RatingsRow>() {
        let row = match row {
            Ok(row) if !row.tconst.is_empty() => row,
            Ok(_) => {
                report.skipped_rows += 1;
                continue;
            }
            Err(e) => {
                skip_row(ratings_path, &e, &mut report)?;
                continue;
            }
        };
        report.ratings_rows += 1;
        if ratings.contains_key(&row.tconst) {
            report.duplicate_ratings += 1;
        } else {
            ratings.insert(row.tconst.clone(), row);
        }
    }
    debug!(rows = report.ratings_rows, path = %ratings_path.display(), "Ratings loaded");

    let mut basics_reader = open_tsv(basics_path)?;
    let mut records = Vec::new();
    for row in basics_reader.deserialize::<BasicsRow>() {
        let row = match row {
            Ok(row) if !row.tconst.is_empty() => row,
            Ok(_) => {
                report.skipped_rows += 1;
                continue;
            }
            Err(e) => {
                skip_row(basics_path, &e, &mut report)?;
                continue;
            }
        };
        report.basics_rows += 1;

        if let Some(rating) = ratings.get(&row.tconst) {
            records.push(TitleRecord {
                id: row.tconst,
                title_type: row.title_type,
                primary_title: row.primary_title,
                original_title: row.original_title,
                is_adult: row.is_adult,
                start_year: row.start_year,
                end_year: row.end_year,
                runtime_minutes: row.runtime_minutes,
                genres: row.genres,
                average_rating: rating.average_rating,
                num_votes: rating.num_votes,
            });
        }
    }
    report.joined_rows = records.len();

    if report.skipped_rows > 0 {
        warn!(skipped = report.skipped_rows, "Skipped undecodable source rows");
    }
    if report.duplicate_ratings > 0 {
        warn!(duplicates = report.duplicate_ratings, "Duplicate ids in ratings file");
    }
    info!(
        basics = report.basics_rows,
        ratings = report.ratings_rows,
        joined = report.joined_rows,
        unmatched_basics = report.unmatched_basics(),
        "Base relation joined"
    );

    Ok((Relation::from_records(records), report))
}

/// Open a TSV file and verify the join key column is present
fn open_tsv(path: &Path) -> EtlResult<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| {
        EtlError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers()?;
    if !headers.iter().any(|h| h == KEY_COLUMN) {
        return Err(EtlError::Schema(format!(
            "{}: required column '{}' is absent",
            path.display(),
            KEY_COLUMN
        )));
    }

    Ok(reader)
}

/// Count an undecodable row; I/O failures still abort the load
fn skip_row(path: &Path, err: &csv::Error, report: &mut LoadReport) -> EtlResult<()> {
    if err.is_io_error() {
        return Err(EtlError::Io(std::io::Error::other(format!(
            "{}: {}",
            path.display(),
            err
        ))));
    }
    debug!(path = %path.display(), error = %err, "Skipping row");
    report.skipped_rows += 1;
    Ok(())
}
