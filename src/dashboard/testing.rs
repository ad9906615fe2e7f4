//! Record fixtures shared by the dashboard tests

use crate::reads::{parse_date, BookType, Demographic, ReadRecord};

/// A 200-page unrated adult fiction read finished on `finish`
pub(crate) fn read(id: u64, title: &str, book_type: BookType, finish: Option<&str>) -> ReadRecord {
    ReadRecord {
        id,
        title: title.to_string(),
        author: "Test Author".to_string(),
        book_type,
        page_count: Some(200),
        rating: None,
        start_date: None,
        finish_date: finish.and_then(parse_date),
        demographic: Demographic::Adult,
        standalone: true,
        partofseries: None,
        fiction: true,
        reread: false,
    }
}
