//! Read-record types for the record store API
//!
//! Defines the stored read-record, the draft submitted on create, the fixed
//! category enumerations, and the API error envelope. Field names follow the
//! snake_case wire format the store has always used.

use super::lenient;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Store-assigned read identifier
pub type ReadId = u64;

/// Kind of book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BookType {
    Novel,
    Novella,
    #[serde(rename = "Short Story")]
    ShortStory,
    Memoir,
    Manga,
    #[serde(rename = "Graphic Novel")]
    GraphicNovel,
    Anthology,
}

impl BookType {
    pub const ALL: [BookType; 7] = [
        Self::Novel,
        Self::Novella,
        Self::ShortStory,
        Self::Memoir,
        Self::Manga,
        Self::GraphicNovel,
        Self::Anthology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Novel => "Novel",
            Self::Novella => "Novella",
            Self::ShortStory => "Short Story",
            Self::Memoir => "Memoir",
            Self::Manga => "Manga",
            Self::GraphicNovel => "Graphic Novel",
            Self::Anthology => "Anthology",
        }
    }
}

impl std::fmt::Display for BookType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown book type: {}", s))
    }
}

/// Target readership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Demographic {
    Adult,
    #[serde(rename = "Young Adult")]
    YoungAdult,
    #[serde(rename = "Middle Grade")]
    MiddleGrade,
    Shounen,
    Shoujo,
    Josei,
    Seinen,
}

impl Demographic {
    pub const ALL: [Demographic; 7] = [
        Self::Adult,
        Self::YoungAdult,
        Self::MiddleGrade,
        Self::Shounen,
        Self::Shoujo,
        Self::Josei,
        Self::Seinen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adult => "Adult",
            Self::YoungAdult => "Young Adult",
            Self::MiddleGrade => "Middle Grade",
            Self::Shounen => "Shounen",
            Self::Shoujo => "Shoujo",
            Self::Josei => "Josei",
            Self::Seinen => "Seinen",
        }
    }
}

impl std::fmt::Display for Demographic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Demographic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown demographic: {}", s))
    }
}

/// Star rating in half-star steps from 0 to 5
///
/// Stored as a count of half stars so equal ratings always compare and
/// group equal; on the wire it is a plain number such as `4.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub const MAX_HALF_STARS: u8 = 10;

    /// Build from a star value; `None` if off the half-star grid or out of range
    pub fn from_stars(stars: f64) -> Option<Self> {
        if !stars.is_finite() {
            return None;
        }
        let halves = stars * 2.0;
        if halves.fract() != 0.0 || halves < 0.0 || halves > f64::from(Self::MAX_HALF_STARS) {
            return None;
        }
        Some(Self(halves as u8))
    }

    /// Build from a half-star count; `None` above 10
    pub fn from_half_stars(halves: u8) -> Option<Self> {
        (halves <= Self::MAX_HALF_STARS).then_some(Self(halves))
    }

    pub fn half_stars(&self) -> u8 {
        self.0
    }

    pub fn stars(&self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.stars())
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.stars())
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stars = f64::deserialize(deserializer)?;
        Self::from_stars(stars).ok_or_else(|| {
            serde::de::Error::custom(format!("rating {} is not a half-star value in 0..=5", stars))
        })
    }
}

fn default_true() -> bool {
    true
}

/// A single logged read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadRecord {
    pub id: ReadId,
    pub title: String,
    pub author: String,
    pub book_type: BookType,
    #[serde(default, deserialize_with = "lenient::page_count")]
    pub page_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient::rating")]
    pub rating: Option<Rating>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub finish_date: Option<NaiveDate>,
    pub demographic: Demographic,
    #[serde(default = "default_true")]
    pub standalone: bool,
    #[serde(default)]
    pub partofseries: Option<String>,
    pub fiction: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub reread: bool,
}

impl ReadRecord {
    /// Calendar year of the finish date, if it parsed
    pub fn reading_year(&self) -> Option<i32> {
        self.finish_date.map(|d| d.year())
    }

    /// Days between start and finish; negative when finish precedes start
    pub fn duration_days(&self) -> Option<i64> {
        match (self.start_date, self.finish_date) {
            (Some(start), Some(finish)) => Some((finish - start).num_days()),
            _ => None,
        }
    }

    pub fn is_manga(&self) -> bool {
        self.book_type == BookType::Manga
    }
}

/// Request body for creating a read (the id is store-assigned)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadDraft {
    pub title: String,
    pub author: String,
    pub book_type: BookType,
    #[serde(default, deserialize_with = "lenient::page_count")]
    pub page_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient::rating")]
    pub rating: Option<Rating>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub finish_date: Option<NaiveDate>,
    pub demographic: Demographic,
    #[serde(default = "default_true")]
    pub standalone: bool,
    #[serde(default)]
    pub partofseries: Option<String>,
    pub fiction: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub reread: bool,
}

impl ReadDraft {
    /// Check required fields and normalize text, returning the cleaned draft
    pub fn validate(mut self) -> crate::Result<Self> {
        self.title = self.title.trim().to_string();
        self.author = self.author.trim().to_string();

        if self.title.is_empty() {
            return Err(crate::Error::Validation("title must not be empty".to_string()));
        }
        if self.author.is_empty() {
            return Err(crate::Error::Validation("author must not be empty".to_string()));
        }
        if self.start_date.is_none() {
            return Err(crate::Error::Validation(
                "start_date must be a YYYY-MM-DD date".to_string(),
            ));
        }
        if self.finish_date.is_none() {
            return Err(crate::Error::Validation(
                "finish_date must be a YYYY-MM-DD date".to_string(),
            ));
        }

        if self.standalone {
            self.partofseries = None;
        } else {
            let series = self
                .partofseries
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    crate::Error::Validation(
                        "partofseries is required when standalone is false".to_string(),
                    )
                })?
                .to_string();
            self.partofseries = Some(series);
        }

        Ok(self)
    }

    /// Attach a store-assigned id
    pub fn into_record(self, id: ReadId) -> ReadRecord {
        ReadRecord {
            id,
            title: self.title,
            author: self.author,
            book_type: self.book_type,
            page_count: self.page_count,
            rating: self.rating,
            start_date: self.start_date,
            finish_date: self.finish_date,
            demographic: self.demographic,
            standalone: self.standalone,
            partofseries: self.partofseries,
            fiction: self.fiction,
            reread: self.reread,
        }
    }
}

/// Response body for the legacy `POST /post-read` endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct PostReadResponse {
    pub message: String,
    pub read: ReadRecord,
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code("NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code("BAD_REQUEST", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code("INTERNAL_ERROR", message)
    }

    fn with_code(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ReadDraft {
        ReadDraft {
            title: "  Piranesi ".to_string(),
            author: "Susanna Clarke".to_string(),
            book_type: BookType::Novel,
            page_count: Some(272),
            rating: Rating::from_stars(4.5),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            finish_date: NaiveDate::from_ymd_opt(2024, 3, 10),
            demographic: Demographic::Adult,
            standalone: true,
            partofseries: Some("ignored".to_string()),
            fiction: true,
            reread: false,
        }
    }

    #[test]
    fn test_read_record_wire_format() {
        let record = draft().validate().unwrap().into_record(7);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"id\":7"));
        assert!(json.contains("\"title\":\"Piranesi\""));
        assert!(json.contains("\"book_type\":\"Novel\""));
        assert!(json.contains("\"rating\":4.5"));
        assert!(json.contains("\"finish_date\":\"2024-03-10\""));
        assert!(json.contains("\"partofseries\":null"));

        let parsed: ReadRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_read_record_tolerates_malformed_fields() {
        let json = r#"{
            "id": 3,
            "title": "Berserk Vol. 1",
            "author": "Kentaro Miura",
            "book_type": "Manga",
            "page_count": "lots",
            "rating": 4.3,
            "start_date": "sometime",
            "finish_date": "2023-05-02",
            "demographic": "Seinen",
            "standalone": false,
            "partofseries": "Berserk",
            "fiction": true,
            "reread": null
        }"#;

        let record: ReadRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.page_count, None);
        assert_eq!(record.rating, None);
        assert_eq!(record.start_date, None);
        assert_eq!(record.reading_year(), Some(2023));
        assert!(!record.reread);
        assert!(record.is_manga());
        assert_eq!(record.duration_days(), None);
    }

    #[test]
    fn test_read_record_missing_optional_fields() {
        let json = r#"{
            "id": 1,
            "title": "Dune",
            "author": "Frank Herbert",
            "book_type": "Novel",
            "demographic": "Adult",
            "fiction": true
        }"#;

        let record: ReadRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.page_count, None);
        assert_eq!(record.rating, None);
        assert_eq!(record.finish_date, None);
        assert!(record.standalone);
        assert!(!record.reread);
    }

    #[test]
    fn test_duration_can_be_negative() {
        let mut record = draft().validate().unwrap().into_record(1);
        assert_eq!(record.duration_days(), Some(9));

        record.start_date = NaiveDate::from_ymd_opt(2024, 3, 12);
        assert_eq!(record.duration_days(), Some(-2));
    }

    #[test]
    fn test_rating_grid() {
        assert_eq!(Rating::from_stars(4.5).unwrap().half_stars(), 9);
        assert_eq!(
            serde_json::from_str::<Rating>("4").unwrap(),
            serde_json::from_str::<Rating>("4.0").unwrap()
        );
        assert_eq!(Rating::from_stars(0.0).unwrap().stars(), 0.0);
        assert_eq!(Rating::from_stars(5.0).unwrap().half_stars(), 10);
        assert!(Rating::from_stars(5.5).is_none());
        assert!(Rating::from_stars(-0.5).is_none());
        assert!(Rating::from_stars(3.25).is_none());
        assert!(Rating::from_stars(f64::NAN).is_none());
        assert!(Rating::from_half_stars(11).is_none());
        assert!(Rating::from_stars(2.0).unwrap() < Rating::from_stars(2.5).unwrap());
    }

    #[test]
    fn test_rating_strict_deserialize() {
        let rating: Rating = serde_json::from_str("3.5").unwrap();
        assert_eq!(rating.stars(), 3.5);
        assert!(serde_json::from_str::<Rating>("3.7").is_err());
    }

    #[test]
    fn test_book_type_from_str() {
        assert_eq!("Short Story".parse::<BookType>().unwrap(), BookType::ShortStory);
        assert_eq!("manga".parse::<BookType>().unwrap(), BookType::Manga);
        assert!("Comic".parse::<BookType>().is_err());
        assert_eq!(BookType::GraphicNovel.to_string(), "Graphic Novel");
    }

    #[test]
    fn test_demographic_from_str() {
        assert_eq!(
            "young adult".parse::<Demographic>().unwrap(),
            Demographic::YoungAdult
        );
        assert!("Kodomo".parse::<Demographic>().is_err());
        assert_eq!(
            serde_json::to_string(&Demographic::MiddleGrade).unwrap(),
            "\"Middle Grade\""
        );
    }

    #[test]
    fn test_validate_trims_and_clears_series() {
        let draft = draft().validate().unwrap();
        assert_eq!(draft.title, "Piranesi");
        assert!(draft.partofseries.is_none());
    }

    #[test]
    fn test_validate_rejects_empty_author() {
        let mut d = draft();
        d.author = "   ".to_string();
        assert!(matches!(d.validate(), Err(crate::Error::Validation(_))));
    }

    #[test]
    fn test_validate_requires_dates() {
        let mut d = draft();
        d.finish_date = None;
        assert!(matches!(d.validate(), Err(crate::Error::Validation(_))));
    }

    #[test]
    fn test_validate_requires_series_title() {
        let mut d = draft();
        d.standalone = false;
        d.partofseries = Some(" ".to_string());
        assert!(d.clone().validate().is_err());

        d.partofseries = Some(" The Expanse ".to_string());
        let validated = d.validate().unwrap();
        assert_eq!(validated.partofseries.as_deref(), Some("The Expanse"));
    }

    #[test]
    fn test_api_error_not_found() {
        let err = ApiError::not_found("Read 99 not found");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\":\"NOT_FOUND\""));
        assert!(json.contains("Read 99"));
    }

    #[test]
    fn test_api_error_bad_request() {
        let err = ApiError::bad_request("title must not be empty");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\":\"BAD_REQUEST\""));
    }
}
