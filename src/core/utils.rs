use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn display_offset() -> FixedOffset {
    // +0700
    FixedOffset::east_opt(7 * 60 * 60).unwrap_or_else(|| Utc.fix())
}

pub fn datetime_to_string(datetime: DateTime<FixedOffset>) -> String {
    datetime
        .with_timezone(&display_offset())
        .format(DATETIME_FORMAT)
        .to_string()
}

pub fn date_to_string(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Treat a missing or blank string as absent.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|val| !val.is_empty())
}

/// Id taken from a path. A malformed id cannot match a record, so it is
/// reported with the same `not_found` message.
pub fn parse_path_id(value: &str, not_found: &str) -> ServiceResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| ServiceError::not_found(not_found))
}

/// Loose `local@domain.tld` shape check.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(name, tld)| !name.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn test_datetime_to_string_uses_display_offset() {
        let datetime = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .unwrap()
            .fixed_offset();
        assert_eq!(datetime_to_string(datetime), "2025-01-01 07:00:00");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("1995-04-24"),
            NaiveDate::from_ymd_opt(1995, 4, 24)
        );
        assert!(parse_date("24-04-1995").is_none());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(&Some("  staff ".to_string())), Some("staff"));
        assert_eq!(non_blank(&Some("   ".to_string())), None);
        assert_eq!(non_blank(&None), None);
    }

    #[test]
    fn test_parse_path_id() {
        let id = Uuid::now_v7();
        assert_eq!(parse_path_id(&id.to_string(), "missing").unwrap(), id);
        let err = parse_path_id("12", "The role does not exist!").unwrap_err();
        assert_eq!(err.messages(), vec!["The role does not exist!".to_string()]);
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("admin@gmail.com"));
        assert!(is_valid_email("first.last@mail.example.co.id"));
        assert!(!is_valid_email("admin"));
        assert!(!is_valid_email("admin@"));
        assert!(!is_valid_email("@gmail.com"));
        assert!(!is_valid_email("admin@gmail"));
        assert!(!is_valid_email("ad min@gmail.com"));
        assert!(!is_valid_email("admin@@gmail.com"));
    }
}
