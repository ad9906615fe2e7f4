//! Working-set selection
//!
//! A read is selected when its finish year is active and its content type
//! passes the type filter. Reads without a usable finish date can't be placed
//! in a year and are never selected.

use super::filter::{ContentType, FilterState};
use crate::reads::ReadRecord;

/// Select the working set, preserving input order
pub fn select<'a>(records: &'a [ReadRecord], filter: &FilterState) -> Vec<&'a ReadRecord> {
    let books = filter.is_type_active(ContentType::Books);
    let manga = filter.is_type_active(ContentType::Manga);

    let selected: Vec<&ReadRecord> = records
        .iter()
        .filter(|r| {
            r.reading_year()
                .is_some_and(|year| filter.is_year_active(year))
        })
        .filter(|r| match (books, manga) {
            (true, true) => true,
            (true, false) => !r.is_manga(),
            (false, true) => r.is_manga(),
            (false, false) => false,
        })
        .collect();

    tracing::debug!(
        "Selected {} of {} reads (years={:?}, types={:?})",
        selected.len(),
        records.len(),
        filter.active_years(),
        filter.active_types()
    );
    selected
}

/// The working set ordered by finish date for the reads list
pub fn reads_table<'a>(working_set: &[&'a ReadRecord]) -> Vec<&'a ReadRecord> {
    let mut table = working_set.to_vec();
    table.sort_by_key(|r| r.finish_date);
    table
}
