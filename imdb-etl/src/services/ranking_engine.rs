//! Ranking engine: percentage-based top-K selection by `averageRating`
//!
//! Selection:
//! 1. `k = floor(len * percent / 100)`; `k == 0` yields an empty relation.
//! 2. The `k` highest-rated records are chosen with a stable sort, so the
//!    boundary tie-break is reproducible (see [`TieBreak`]).
//! 3. The chosen records are re-sorted ascending by the configured
//!    [`SortKey`]; equal keys keep input-relation order.
//!
//! Missing (or NaN) ratings rank below every rated record.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{EtlError, EtlResult};
use crate::models::{Relation, TitleRecord};

/// Final ascending order of a top-percent slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Rating,
    OriginalTitle,
}

/// Which record wins when ratings tie at the selection boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Earlier records in the input relation win
    #[default]
    InputOrder,
    /// Higher `numVotes` wins, then input order
    NumVotes,
}

/// Ranking policy parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RankingOptions {
    pub sort_key: SortKey,
    pub tie_break: TieBreak,
}

impl FromStr for SortKey {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "rating" | "average_rating" => Ok(SortKey::Rating),
            "original_title" => Ok(SortKey::OriginalTitle),
            other => Err(EtlError::Config(format!(
                "Unknown sort key '{}' (expected rating or original_title)",
                other
            ))),
        }
    }
}

impl FromStr for TieBreak {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "input_order" => Ok(TieBreak::InputOrder),
            "num_votes" => Ok(TieBreak::NumVotes),
            other => Err(EtlError::Config(format!(
                "Unknown tie break '{}' (expected input_order or num_votes)",
                other
            ))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Rating => write!(f, "rating"),
            SortKey::OriginalTitle => write!(f, "original_title"),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::InputOrder => write!(f, "input_order"),
            TieBreak::NumVotes => write!(f, "num_votes"),
        }
    }
}

/// Number of records a top-percent selection yields
pub fn selection_size(len: usize, percent: f64) -> usize {
    let k = ((len as f64) * percent / 100.0).floor();
    (k as usize).min(len)
}

/// Top `percent` of `relation` by rating
///
/// Fails with `InvalidParameter` unless `0 < percent <= 100`.
pub fn top_percent(
    relation: &Relation,
    percent: f64,
    options: &RankingOptions,
) -> EtlResult<Relation> {
    if !(percent > 0.0 && percent <= 100.0) {
        return Err(EtlError::InvalidParameter(format!(
            "percent must be in (0, 100], got {}",
            percent
        )));
    }

    let k = selection_size(relation.len(), percent);
    if k == 0 {
        return Ok(Relation::default());
    }

    let records = relation.records();
    let mut selected: Vec<usize> = (0..records.len()).collect();
    selected.sort_by(|&a, &b| rank_order(&records[a], &records[b], options.tie_break));
    selected.truncate(k);

    // Back to input order so equal sort keys stay stable
    selected.sort_unstable();
    selected.sort_by(|&a, &b| key_order(&records[a], &records[b], options.sort_key));

    Ok(selected
        .into_iter()
        .map(|i| Arc::clone(&records[i]))
        .collect())
}

fn rating(record: &TitleRecord) -> Option<f64> {
    record.average_rating.filter(|v| !v.is_nan())
}

/// Best first: rating descending, missing last
fn rank_order(a: &TitleRecord, b: &TitleRecord, tie_break: TieBreak) -> Ordering {
    let by_rating = match (rating(a), rating(b)) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    match tie_break {
        TieBreak::InputOrder => by_rating,
        TieBreak::NumVotes => by_rating.then_with(|| match (a.num_votes, b.num_votes) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
    }
}

/// Ascending by the chosen key, missing last
fn key_order(a: &TitleRecord, b: &TitleRecord, sort_key: SortKey) -> Ordering {
    match sort_key {
        SortKey::Rating => match (rating(a), rating(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::OriginalTitle => {
            match (a.original_title.as_deref(), b.original_title.as_deref()) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(id: &str, rating: f64, votes: u64) -> TitleRecord {
        TitleRecord::new(id, "movie").with_rating(rating, votes)
    }

    fn ids(relation: &Relation) -> Vec<&str> {
        relation.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_selection_size_floors() {
        assert_eq!(selection_size(40, 10.0), 4);
        assert_eq!(selection_size(9, 50.0), 4);
        assert_eq!(selection_size(3, 10.0), 0);
        assert_eq!(selection_size(7, 100.0), 7);
    }

    #[test]
    fn test_rejects_out_of_range_percent() {
        let relation = Relation::from_records(vec![rated("tt1", 5.0, 1)]);
        let options = RankingOptions::default();

        for bad in [0.0, -1.0, 100.5, f64::NAN] {
            let result = top_percent(&relation, bad, &options);
            assert!(
                matches!(result, Err(EtlError::InvalidParameter(_))),
                "percent {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_zero_k_is_empty() {
        let relation = Relation::from_records(vec![rated("tt1", 5.0, 1), rated("tt2", 6.0, 1)]);
        let top = top_percent(&relation, 10.0, &RankingOptions::default()).unwrap();
        assert!(top.is_empty());
    }

    #[test]
    fn test_selects_highest_and_sorts_ascending() {
        let relation = Relation::from_records(vec![
            rated("tt1", 6.0, 1),
            rated("tt2", 9.1, 1),
            rated("tt3", 3.2, 1),
            rated("tt4", 8.4, 1),
        ]);

        let top = top_percent(&relation, 50.0, &RankingOptions::default()).unwrap();
        assert_eq!(ids(&top), vec!["tt4", "tt2"]);
    }

    #[test]
    fn test_boundary_ties_prefer_input_order() {
        let relation = Relation::from_records(vec![
            rated("tt1", 7.0, 10),
            rated("tt2", 9.0, 10),
            rated("tt3", 7.0, 900),
            rated("tt4", 7.0, 50),
        ]);

        // k = 2: tt2 plus the first 7.0 in input order
        let top = top_percent(&relation, 50.0, &RankingOptions::default()).unwrap();
        assert_eq!(ids(&top), vec!["tt1", "tt2"]);

        // Deterministic across repeated calls
        let again = top_percent(&relation, 50.0, &RankingOptions::default()).unwrap();
        assert_eq!(ids(&top), ids(&again));
    }

    #[test]
    fn test_boundary_ties_by_num_votes() {
        let relation = Relation::from_records(vec![
            rated("tt1", 7.0, 10),
            rated("tt2", 9.0, 10),
            rated("tt3", 7.0, 900),
            rated("tt4", 7.0, 50),
        ]);
        let options = RankingOptions {
            tie_break: TieBreak::NumVotes,
            ..Default::default()
        };

        let top = top_percent(&relation, 50.0, &options).unwrap();
        assert_eq!(ids(&top), vec!["tt3", "tt2"]);
    }

    #[test]
    fn test_full_percent_returns_everything_sorted_by_title() {
        let relation = Relation::from_records(vec![
            rated("tt1", 5.0, 1).with_titles("c", "Casablanca"),
            rated("tt2", 9.0, 1).with_titles("a", "Alien"),
            TitleRecord::new("tt3", "movie").with_rating(7.0, 1),
            rated("tt4", 2.0, 1).with_titles("b", "Brazil"),
        ]);
        let options = RankingOptions {
            sort_key: SortKey::OriginalTitle,
            ..Default::default()
        };

        let top = top_percent(&relation, 100.0, &options).unwrap();
        assert_eq!(ids(&top), vec!["tt2", "tt4", "tt1", "tt3"]);
    }

    #[test]
    fn test_missing_ratings_rank_last() {
        let relation = Relation::from_records(vec![
            TitleRecord::new("tt1", "movie"),
            rated("tt2", 1.0, 1),
            TitleRecord::new("tt3", "movie").with_rating(f64::NAN, 3),
            rated("tt4", 2.0, 1),
        ]);

        let top = top_percent(&relation, 50.0, &RankingOptions::default()).unwrap();
        assert_eq!(ids(&top), vec!["tt2", "tt4"]);
    }

    #[test]
    fn test_policy_names_parse() {
        assert_eq!("original_title".parse::<SortKey>().unwrap(), SortKey::OriginalTitle);
        assert_eq!("num_votes".parse::<TieBreak>().unwrap(), TieBreak::NumVotes);
        assert!(matches!("votes".parse::<TieBreak>(), Err(EtlError::Config(_))));
        assert_eq!(SortKey::Rating.to_string(), "rating");
    }
}
