//! Record store join tests
//!
//! Covers:
//! - Inner join membership and size bound
//! - Basics-file order of the joined relation
//! - Fatal IO and schema errors

mod helpers;

use std::collections::HashSet;

use helpers::SourceFixture;
use imdb_etl::services::record_store::{load, load_with_report};
use imdb_etl::EtlError;
use tempfile::TempDir;

fn ids(relation: &imdb_etl::models::Relation) -> Vec<String> {
    relation.iter().map(|r| r.id.clone()).collect()
}

#[test]
fn test_join_keeps_only_ids_present_in_both() {
    // Given: basics tt1..tt6 and ratings tt4..tt9
    let dir = TempDir::new().unwrap();
    let fixture = (1..=6)
        .fold(SourceFixture::new(), |f, i| f.title(&format!("tt{i}"), "movie", "x"));
    let fixture = (4..=9).fold(fixture, |f, i| f.rating(&format!("tt{i}"), 5.0, 1));
    let files = fixture.write_to(dir.path());

    // When: Loading
    let (relation, report) = load_with_report(&files.basics, &files.ratings).unwrap();

    // Then: Exactly the shared ids survive, in basics order
    assert_eq!(ids(&relation), vec!["tt4", "tt5", "tt6"]);
    assert!(relation.len() <= fixture.basics_len().min(fixture.ratings_len()));
    assert_eq!(report.basics_rows, 6);
    assert_eq!(report.ratings_rows, 6);
    assert_eq!(report.unmatched_basics(), 3);
}

#[test]
fn test_join_membership_on_larger_fixture() {
    // Given: 100 titles where only even-numbered ones have ratings
    let dir = TempDir::new().unwrap();
    let mut fixture = SourceFixture::new();
    let mut rated = HashSet::new();
    for i in 0..100 {
        let id = format!("tt{:04}", i);
        fixture = fixture.title(&id, "movie", "x");
        if i % 2 == 0 {
            fixture = fixture.rating(&id, 6.0, 10);
            rated.insert(id);
        }
    }
    // Ratings for ids absent from basics are dropped too
    fixture = fixture.rating("tt9999", 9.0, 10);
    let files = fixture.write_to(dir.path());

    // When: Loading
    let relation = load(&files.basics, &files.ratings).unwrap();

    // Then: A record is present iff its id is in both inputs
    let loaded: HashSet<String> = ids(&relation).into_iter().collect();
    assert_eq!(loaded, rated);
    assert_eq!(relation.len(), 50);
}

#[test]
fn test_duplicate_rating_ids_keep_first() {
    // Given: Two rating rows for tt1
    let dir = TempDir::new().unwrap();
    let files = SourceFixture::new()
        .title("tt1", "movie", "x")
        .rating("tt1", 8.0, 100)
        .rating("tt1", 2.0, 5)
        .write_to(dir.path());

    // When: Loading
    let (relation, report) = load_with_report(&files.basics, &files.ratings).unwrap();

    // Then: One record carrying the first rating
    assert_eq!(relation.len(), 1);
    assert_eq!(relation.records()[0].average_rating, Some(8.0));
    assert_eq!(report.duplicate_ratings, 1);
}

#[test]
fn test_missing_file_is_io_error() {
    // Given: Only a ratings file on disk
    let dir = TempDir::new().unwrap();
    let files = SourceFixture::new().rating("tt1", 5.0, 1).write_to(dir.path());
    std::fs::remove_file(&files.basics).unwrap();

    // When/Then: Loading fails with Io
    let result = load(&files.basics, &files.ratings);
    assert!(matches!(result, Err(EtlError::Io(_))));
}

#[test]
fn test_missing_key_column_is_schema_error() {
    // Given: A basics file without tconst
    let dir = TempDir::new().unwrap();
    let files = SourceFixture::new().rated("tt1", "movie", 5.0, 1).write_to(dir.path());
    std::fs::write(&files.basics, "id\ttitleType\ntt1\tmovie\n").unwrap();

    // When/Then: Loading fails with Schema
    let result = load(&files.basics, &files.ratings);
    assert!(matches!(result, Err(EtlError::Schema(_))));
}

#[test]
fn test_title_types_discovered_in_first_seen_order() {
    // Given: The hundred-title fixture
    let dir = TempDir::new().unwrap();
    let files = helpers::hundred_titles().write_to(dir.path());

    // When: Loading
    let relation = load(&files.basics, &files.ratings).unwrap();

    // Then: Types come back in the order they first appear
    assert_eq!(relation.len(), 100);
    assert_eq!(
        relation.distinct_title_types(),
        vec!["movie", "tvEpisode", "tvSeries", "video"]
    );
}
