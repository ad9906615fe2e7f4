//! Reading statistics over a working set
//!
//! Every figure is its own reduction over the working set. A read missing a
//! page count still counts towards demographics, an unrated read still counts
//! towards page totals, and so on. Nothing here fails: empty input yields the
//! defaults documented on [`ReadingStats`].

use crate::reads::{BookType, Demographic, Rating, ReadRecord};
use chrono::{Datelike, Month};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Number of authors kept in [`ReadingStats::top_authors`]
pub const TOP_AUTHORS: usize = 10;

/// All derived figures for one working set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStats {
    /// First-time reads
    pub completed: usize,
    pub rereads: usize,
    /// Longest valid page count; `None` when no read has one
    pub max_length: Option<u32>,
    /// Shortest valid page count; `None` when no read has one
    pub min_length: Option<u32>,
    /// Mean over valid page counts, 2 decimals; 0 when none
    pub average_length: f64,
    /// Sum of page counts, missing counted as 0
    pub total_length: u64,
    /// Mean days from start to finish, 3 decimals; 0 when none
    pub average_duration_days: f64,
    /// Sorted by demographic name
    pub demographics: Vec<DemographicCount>,
    /// In order of first appearance
    pub book_types: Vec<BookTypeCount>,
    /// In order of first appearance
    pub fiction: Vec<FictionCount>,
    /// In order of first appearance
    pub reread_split: Vec<RereadCount>,
    /// Rated reads only, ascending by rating
    pub ratings: Vec<RatingCount>,
    /// Most-read authors, ties in order of first appearance
    pub top_authors: Vec<AuthorCount>,
    /// Always twelve entries, January first
    pub months: Vec<MonthTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicCount {
    pub demographic: Demographic,
    pub total_reads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTypeCount {
    pub book_type: BookType,
    pub total_reads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FictionCount {
    pub fiction: bool,
    pub total_reads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RereadCount {
    pub reread: bool,
    pub total_reads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingCount {
    pub rating: Rating,
    pub total_reads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorCount {
    pub author: String,
    pub total_reads: usize,
}

/// Reads finished in one calendar month, across all selected years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotals {
    #[serde(with = "month_abbrev")]
    pub month: Month,
    pub total_reads: usize,
    pub total_pages: u64,
}

impl ReadingStats {
    /// Statistics of an empty working set
    pub fn empty() -> Self {
        aggregate(&[])
    }
}

impl Default for ReadingStats {
    fn default() -> Self {
        Self::empty()
    }
}

/// Compute every statistic for the working set
pub fn aggregate(working_set: &[&ReadRecord]) -> ReadingStats {
    let (completed, rereads) = reread_totals(working_set);
    let page_counts: Vec<u32> = working_set.iter().filter_map(|r| r.page_count).collect();

    ReadingStats {
        completed,
        rereads,
        max_length: page_counts.iter().copied().max(),
        min_length: page_counts.iter().copied().min(),
        average_length: average_length(&page_counts),
        total_length: total_length(working_set),
        average_duration_days: average_duration_days(working_set),
        demographics: demographic_breakdown(working_set),
        book_types: book_type_breakdown(working_set),
        fiction: count_first_seen(working_set.iter().map(|r| r.fiction))
            .into_iter()
            .map(|(fiction, total_reads)| FictionCount { fiction, total_reads })
            .collect(),
        reread_split: count_first_seen(working_set.iter().map(|r| r.reread))
            .into_iter()
            .map(|(reread, total_reads)| RereadCount { reread, total_reads })
            .collect(),
        ratings: rating_distribution(working_set),
        top_authors: top_authors(working_set),
        months: monthly_breakdown(working_set),
    }
}

fn reread_totals(working_set: &[&ReadRecord]) -> (usize, usize) {
    let rereads = working_set.iter().filter(|r| r.reread).count();
    (working_set.len() - rereads, rereads)
}

fn average_length(page_counts: &[u32]) -> f64 {
    if page_counts.is_empty() {
        return 0.0;
    }
    let sum: u64 = page_counts.iter().map(|&p| u64::from(p)).sum();
    round_to(sum as f64 / page_counts.len() as f64, 2)
}

fn total_length(working_set: &[&ReadRecord]) -> u64 {
    working_set
        .iter()
        .map(|r| u64::from(r.page_count.unwrap_or(0)))
        .sum()
}

fn average_duration_days(working_set: &[&ReadRecord]) -> f64 {
    let durations: Vec<i64> = working_set.iter().filter_map(|r| r.duration_days()).collect();
    if durations.is_empty() {
        return 0.0;
    }
    let sum: i64 = durations.iter().sum();
    round_to(sum as f64 / durations.len() as f64, 3)
}

fn demographic_breakdown(working_set: &[&ReadRecord]) -> Vec<DemographicCount> {
    let mut counts: Vec<DemographicCount> =
        count_first_seen(working_set.iter().map(|r| r.demographic))
            .into_iter()
            .map(|(demographic, total_reads)| DemographicCount {
                demographic,
                total_reads,
            })
            .collect();
    counts.sort_by(|a, b| a.demographic.as_str().cmp(b.demographic.as_str()));
    counts
}

fn book_type_breakdown(working_set: &[&ReadRecord]) -> Vec<BookTypeCount> {
    count_first_seen(working_set.iter().map(|r| r.book_type))
        .into_iter()
        .map(|(book_type, total_reads)| BookTypeCount {
            book_type,
            total_reads,
        })
        .collect()
}

fn rating_distribution(working_set: &[&ReadRecord]) -> Vec<RatingCount> {
    let mut counts: Vec<RatingCount> = count_first_seen(working_set.iter().filter_map(|r| r.rating))
        .into_iter()
        .map(|(rating, total_reads)| RatingCount {
            rating,
            total_reads,
        })
        .collect();
    counts.sort_by_key(|c| c.rating);
    counts
}

fn top_authors(working_set: &[&ReadRecord]) -> Vec<AuthorCount> {
    let mut counts = count_first_seen(working_set.iter().map(|r| r.author.as_str()));
    // stable: equal counts keep first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_AUTHORS);
    counts
        .into_iter()
        .map(|(author, total_reads)| AuthorCount {
            author: author.to_string(),
            total_reads,
        })
        .collect()
}

fn monthly_breakdown(working_set: &[&ReadRecord]) -> Vec<MonthTotals> {
    let mut reads = [0usize; 12];
    let mut pages = [0u64; 12];

    for record in working_set {
        if let Some(finish) = record.finish_date {
            let index = finish.month0() as usize;
            reads[index] += 1;
            pages[index] += u64::from(record.page_count.unwrap_or(0));
        }
    }

    let mut month = Month::January;
    let mut totals = Vec::with_capacity(12);
    for index in 0..12 {
        totals.push(MonthTotals {
            month,
            total_reads: reads[index],
            total_pages: pages[index],
        });
        month = month.succ();
    }
    totals
}

/// Count occurrences of each key, in order of first appearance
fn count_first_seen<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();

    for key in keys {
        match positions.get(&key) {
            Some(&position) => counts[position].1 += 1,
            None => {
                positions.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Months on the wire as "Jan" .. "Dec"
mod month_abbrev {
    use chrono::Month;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(month: &Month, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&month.name()[..3])
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Month, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<Month>()
            .map_err(|_| serde::de::Error::custom(format!("unknown month: {}", raw)))
    }
}
