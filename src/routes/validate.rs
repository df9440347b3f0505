//! Query and path parameter checks shared by the handlers
//!
//! Every check fails with `AppError::Validation`, so a bad request is answered
//! with 400 before any cache or upstream work.

use chrono::NaiveDate;

use crate::error::AppError;
use crate::upstream::{MediaType, Rover};

pub const INVALID_DATE: &str = "Invalid date format. Use YYYY-MM-DD";

/// `YYYY-MM-DD` with exactly four, two and two digits
fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parses a `YYYY-MM-DD` string that names a real calendar date
pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    if !is_iso_date(value) {
        return Err(AppError::Validation(INVALID_DATE.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date: {}", value)))
}

/// Like `parse_date`, treating a missing or empty parameter as absent
pub fn optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    value.filter(|v| !v.is_empty()).map(parse_date).transpose()
}

pub fn ordered_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::Validation(
            "end_date must not be before start_date".to_string(),
        ));
    }
    Ok(())
}

/// Rejects a range reaching outside `first..=last`
pub fn range_within(
    start: NaiveDate,
    end: NaiveDate,
    first: NaiveDate,
    last: NaiveDate,
) -> Result<(), AppError> {
    if start < first || end > last {
        return Err(AppError::Validation(format!(
            "Dates must be between {} and {}",
            first, last
        )));
    }
    Ok(())
}

/// 1-based page number, defaulting to the first page
pub fn parse_page(value: Option<&str>) -> Result<usize, AppError> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(1),
        Some(raw) => match raw.parse::<usize>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err(AppError::Validation(
                "Invalid page. Must be a positive integer.".to_string(),
            )),
        },
    }
}

/// Martian day, defaulting to sol 1000
pub fn parse_sol(value: Option<&str>) -> Result<u32, AppError> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(1000),
        Some(raw) => raw.parse().map_err(|_| {
            AppError::Validation("Invalid sol value. Must be a non-negative number.".to_string())
        }),
    }
}

pub fn parse_rover(value: Option<&str>) -> Result<Rover, AppError> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(Rover::default()),
        Some(raw) => raw.parse().map_err(|_| {
            let names: Vec<&str> = Rover::ALL.iter().map(|r| r.as_str()).collect();
            AppError::Validation(format!("Invalid rover. Must be one of: {}", names.join(", ")))
        }),
    }
}

pub fn parse_media_type(value: Option<&str>) -> Result<MediaType, AppError> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(MediaType::default()),
        Some(raw) => raw.parse().map_err(|_| {
            AppError::Validation(
                "Invalid media_type. Must be one of: image, video, audio".to_string(),
            )
        }),
    }
}

/// Items on 1-based `page`; empty past the last page
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

pub fn total_pages(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_format_is_strict() {
        assert!(parse_date("2025-07-01").is_ok());
        assert!(parse_date("2025-7-1").is_err());
        assert!(parse_date("20250701").is_err());
        assert!(parse_date("2025-07-01T00:00").is_err());
    }

    #[test]
    fn test_date_must_exist() {
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("2024-02-29").is_ok());
    }

    #[test]
    fn test_empty_date_is_absent() {
        assert_eq!(optional_date(Some("")).unwrap(), None);
        assert_eq!(optional_date(None).unwrap(), None);
    }

    #[test]
    fn test_page_must_be_positive() {
        assert_eq!(parse_page(None).unwrap(), 1);
        assert_eq!(parse_page(Some("3")).unwrap(), 3);
        assert!(parse_page(Some("0")).is_err());
        assert!(parse_page(Some("-1")).is_err());
        assert!(parse_page(Some("two")).is_err());
    }

    #[test]
    fn test_sol_defaults_and_rejects_negative() {
        assert_eq!(parse_sol(None).unwrap(), 1000);
        assert_eq!(parse_sol(Some("0")).unwrap(), 0);
        assert!(parse_sol(Some("-5")).is_err());
    }

    #[test]
    fn test_rover_error_lists_choices() {
        match parse_rover(Some("sojourner")) {
            Err(AppError::Validation(msg)) => {
                assert_eq!(
                    msg,
                    "Invalid rover. Must be one of: curiosity, opportunity, spirit, perseverance"
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(parse_rover(Some("Spirit")).unwrap(), Rover::Spirit);
    }

    #[test]
    fn test_range_must_stay_within_bounds() {
        let first = NaiveDate::from_ymd_opt(1995, 6, 16).unwrap();
        let last = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let day = |s: &str| parse_date(s).unwrap();

        assert!(range_within(first, last, first, last).is_ok());
        assert!(range_within(day("1995-06-15"), day("1995-07-01"), first, last).is_err());
        assert!(range_within(day("2025-06-30"), day("2025-07-02"), first, last).is_err());
        match range_within(day("1900-01-01"), day("2099-12-31"), first, last) {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Dates must be between 1995-06-16 and 2025-07-01");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_media_type_uses_default() {
        assert_eq!(parse_media_type(Some("")).unwrap(), MediaType::default());
        assert_eq!(parse_media_type(None).unwrap(), MediaType::default());
        assert_eq!(parse_media_type(Some("video")).unwrap(), MediaType::Video);
        assert!(parse_media_type(Some("gif")).is_err());
    }

    #[test]
    fn test_page_slice_bounds() {
        let items: Vec<u32> = (0..30).collect();

        assert_eq!(page_slice(&items, 1, 25).len(), 25);
        assert_eq!(page_slice(&items, 2, 25), &items[25..]);
        assert!(page_slice(&items, 3, 25).is_empty());
        assert_eq!(total_pages(items.len(), 25), 2);
        assert_eq!(total_pages(0, 25), 0);
    }
}
