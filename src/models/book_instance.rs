//! Book instance (a physical, loanable copy) model and related types

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Loan status of a copy.
///
/// Any status may follow any other; no transition rules are enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    #[default]
    #[serde(rename = "m")]
    Maintenance,
    #[serde(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "r")]
    Reserved,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Maintenance,
        LoanStatus::OnLoan,
        LoanStatus::Available,
        LoanStatus::Reserved,
    ];

    /// Single-character code stored in the database
    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status code: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus (VARCHAR(1) column)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: &str = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.code(), buf)
    }
}

/// Full book instance model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookInstance {
    /// Random UUID, unique across the whole library
    pub id: Uuid,
    /// Cannot be deleted while referenced
    pub book_id: Option<i64>,
    /// Publisher and edition
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    /// `None` when left blank
    pub status: Option<LoanStatus>,
    // Computed field (populated when queried with the book JOIN, None otherwise)
    #[sqlx(default)]
    #[serde(default)]
    pub book_title: Option<String>,
}

impl BookInstance {
    /// `"{id} ({book title})"`; a copy without a book has no label.
    pub fn label(&self) -> AppResult<String> {
        let title = self.book_title.as_deref().ok_or_else(|| {
            AppError::NotFound(format!("Book instance {} has no book", self.id))
        })?;
        Ok(format!("{} ({})", self.id, title))
    }
}

/// Row of the book instance list view: (book, status, due back)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookInstanceListRow {
    pub id: Uuid,
    pub book: Option<String>,
    pub status: Option<&'static str>,
    pub due_back: Option<NaiveDate>,
}

impl From<&BookInstance> for BookInstanceListRow {
    fn from(instance: &BookInstance) -> Self {
        Self {
            id: instance.id,
            book: instance.book_title.clone(),
            status: instance.status.map(|s| s.label()),
            due_back: instance.due_back,
        }
    }
}

/// Create book instance request.
///
/// `id` is generated when absent. An absent `status` defaults to maintenance,
/// an explicit `null` leaves it blank.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookInstance {
    pub id: Option<Uuid>,
    pub book_id: Option<i64>,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1-200 characters"))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub status: Option<Option<LoanStatus>>,
}

impl CreateBookInstance {
    pub fn resolved_status(&self) -> Option<LoanStatus> {
        self.status.unwrap_or(Some(LoanStatus::default()))
    }
}

/// Update book instance request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBookInstance {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub book_id: Option<Option<i64>>,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1-200 characters"))]
    pub imprint: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub due_back: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub status: Option<Option<LoanStatus>>,
}

/// Status filter of the book instance list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    Blank,
    Is(LoanStatus),
}

/// Due-back filter of the book instance list, relative to a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueBackFilter {
    Today,
    PastSevenDays,
    ThisMonth,
    ThisYear,
    NoDate,
    HasDate,
}

/// Date condition a due-back filter resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueBackRange {
    /// `start <= due_back < end`
    Between(NaiveDate, NaiveDate),
    /// `start <= due_back`, used when the end is past the last representable date
    Since(NaiveDate),
    IsNull,
    IsNotNull,
}

impl DueBackFilter {
    pub const ALL: [DueBackFilter; 6] = [
        DueBackFilter::Today,
        DueBackFilter::PastSevenDays,
        DueBackFilter::ThisMonth,
        DueBackFilter::ThisYear,
        DueBackFilter::NoDate,
        DueBackFilter::HasDate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DueBackFilter::Today => "Today",
            DueBackFilter::PastSevenDays => "Past 7 days",
            DueBackFilter::ThisMonth => "This month",
            DueBackFilter::ThisYear => "This year",
            DueBackFilter::NoDate => "No date",
            DueBackFilter::HasDate => "Has date",
        }
    }

    pub fn range(&self, today: NaiveDate) -> DueBackRange {
        let tomorrow = today.checked_add_signed(Duration::days(1));
        let until = |start: NaiveDate, end: Option<NaiveDate>| match end {
            Some(end) => DueBackRange::Between(start, end),
            None => DueBackRange::Since(start),
        };
        match self {
            DueBackFilter::Today => until(today, tomorrow),
            DueBackFilter::PastSevenDays => {
                let start = today
                    .checked_sub_signed(Duration::days(7))
                    .unwrap_or(NaiveDate::MIN);
                until(start, tomorrow)
            }
            DueBackFilter::ThisMonth => {
                let start = today.with_day(1).unwrap_or(today);
                let end = if start.month() == 12 {
                    NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
                };
                until(start, end)
            }
            DueBackFilter::ThisYear => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                until(start, NaiveDate::from_ymd_opt(today.year() + 1, 1, 1))
            }
            DueBackFilter::NoDate => DueBackRange::IsNull,
            DueBackFilter::HasDate => DueBackRange::IsNotNull,
        }
    }
}

/// Book instance list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookInstanceQuery {
    pub status: Option<StatusFilter>,
    pub due_back: Option<DueBackFilter>,
    pub book_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_codes() {
        for status in LoanStatus::ALL {
            assert_eq!(status.code().parse::<LoanStatus>().unwrap(), status);
        }
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
        assert_eq!(LoanStatus::OnLoan.to_string(), "On loan");
        assert!("x".parse::<LoanStatus>().is_err());
        assert_eq!(serde_json::to_string(&LoanStatus::Reserved).unwrap(), "\"r\"");
    }

    #[test]
    fn test_label_requires_book() {
        let id = Uuid::new_v4();
        let mut instance = BookInstance {
            id,
            book_id: Some(1),
            imprint: "Allen & Unwin, 1937".to_string(),
            due_back: None,
            status: Some(LoanStatus::Available),
            book_title: Some("The Hobbit".to_string()),
        };
        assert_eq!(instance.label().unwrap(), format!("{} (The Hobbit)", id));

        instance.book_id = None;
        instance.book_title = None;
        assert!(matches!(instance.label(), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_create_status_defaults() {
        let absent: CreateBookInstance =
            serde_json::from_str(r#"{"imprint": "Penguin"}"#).unwrap();
        assert_eq!(absent.resolved_status(), Some(LoanStatus::Maintenance));
        assert_eq!(absent.id, None);

        let blank: CreateBookInstance =
            serde_json::from_str(r#"{"imprint": "Penguin", "status": null}"#).unwrap();
        assert_eq!(blank.resolved_status(), None);

        let reserved: CreateBookInstance =
            serde_json::from_str(r#"{"imprint": "Penguin", "status": "r"}"#).unwrap();
        assert_eq!(reserved.resolved_status(), Some(LoanStatus::Reserved));
    }

    #[test]
    fn test_list_row_uses_status_label() {
        let instance = BookInstance {
            id: Uuid::new_v4(),
            book_id: None,
            imprint: "Penguin".to_string(),
            due_back: Some(date(2024, 5, 1)),
            status: Some(LoanStatus::OnLoan),
            book_title: None,
        };
        let row = BookInstanceListRow::from(&instance);
        assert_eq!(row.status, Some("On loan"));
        assert_eq!(row.book, None);
        assert_eq!(row.due_back, Some(date(2024, 5, 1)));
    }

    #[test]
    fn test_due_back_ranges() {
        let today = date(2024, 12, 15);
        assert_eq!(
            DueBackFilter::Today.range(today),
            DueBackRange::Between(today, date(2024, 12, 16))
        );
        assert_eq!(
            DueBackFilter::PastSevenDays.range(today),
            DueBackRange::Between(date(2024, 12, 8), date(2024, 12, 16))
        );
        assert_eq!(
            DueBackFilter::ThisMonth.range(today),
            DueBackRange::Between(date(2024, 12, 1), date(2025, 1, 1))
        );
        assert_eq!(
            DueBackFilter::ThisMonth.range(date(2024, 2, 29)),
            DueBackRange::Between(date(2024, 2, 1), date(2024, 3, 1))
        );
        assert_eq!(
            DueBackFilter::ThisYear.range(today),
            DueBackRange::Between(date(2024, 1, 1), date(2025, 1, 1))
        );
        assert_eq!(DueBackFilter::NoDate.range(today), DueBackRange::IsNull);
        assert_eq!(DueBackFilter::HasDate.range(today), DueBackRange::IsNotNull);
    }

    #[test]
    fn test_due_back_ranges_at_calendar_limits() {
        let last = NaiveDate::MAX;
        assert_eq!(DueBackFilter::Today.range(last), DueBackRange::Since(last));
        assert!(matches!(
            DueBackFilter::ThisYear.range(last),
            DueBackRange::Since(_)
        ));

        let first = NaiveDate::MIN;
        match DueBackFilter::PastSevenDays.range(first) {
            DueBackRange::Between(start, end) => {
                assert_eq!(start, first);
                assert!(end > first);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_query_deserializes_filters() {
        let query: BookInstanceQuery =
            serde_json::from_str(r#"{"status": {"is": "o"}, "due_back": "past_seven_days"}"#)
                .unwrap();
        assert_eq!(query.status, Some(StatusFilter::Is(LoanStatus::OnLoan)));
        assert_eq!(query.due_back, Some(DueBackFilter::PastSevenDays));

        let query: BookInstanceQuery = serde_json::from_str(r#"{"status": "blank"}"#).unwrap();
        assert_eq!(query.status, Some(StatusFilter::Blank));
    }
}
