use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use regsgov_api::types::ObjectId;
use regsgov_api::LAST_MODIFIED_FORMAT;

use crate::error::HarvestError;

pub const MAX_SEARCH_LENGTH: usize = 200;
pub const MAX_ID_LENGTH: usize = 100;

/// Smallest page size the list endpoints accept.
pub const MIN_PAGE_SIZE: u32 = 5;
/// Largest page size the list endpoints accept.
pub const MAX_PAGE_SIZE: u32 = 250;
/// Highest page number the list endpoints serve for one query.
pub const MAX_PAGES: u32 = 20;

/// Agency prefix followed by dash-separated segments, e.g. `FDA-2021-N-0270`
/// or `EPA-HQ-OAR-2021-0317-0001`.
fn public_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]+(?:-[A-Za-z0-9._]+)+$").unwrap_or_else(|e| {
            unreachable!("static public ID pattern failed to compile: {e}")
        })
    })
}

fn object_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9a-f]{16}$")
            .unwrap_or_else(|e| unreachable!("static object ID pattern failed to compile: {e}"))
    })
}

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, HarvestError> {
    if input.len() > max_len {
        return Err(HarvestError::Invalid(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(HarvestError::Invalid(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Validate a full-text search term.
pub fn validate_search(input: &str) -> Result<String, HarvestError> {
    sanitize_text(input, MAX_SEARCH_LENGTH)
}

fn validate_public_id(input: &str, what: &str, example: &str) -> Result<String, HarvestError> {
    let trimmed = input.trim();
    if trimmed.len() <= MAX_ID_LENGTH && public_id_pattern().is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(HarvestError::Invalid(format!(
            "invalid {} ID '{}'. Expected an agency-prefixed ID (e.g., {})",
            what, input, example
        )))
    }
}

/// Validate a docket ID such as `FDA-2021-N-0270`.
pub fn validate_docket_id(input: &str) -> Result<String, HarvestError> {
    validate_public_id(input, "docket", "FDA-2021-N-0270")
}

/// Validate a document ID such as `FDA-2021-N-0270-0001`.
pub fn validate_document_id(input: &str) -> Result<String, HarvestError> {
    validate_public_id(input, "document", "FDA-2021-N-0270-0001")
}

/// Validate a comment ID such as `FDA-2021-N-0270-0002`.
pub fn validate_comment_id(input: &str) -> Result<String, HarvestError> {
    validate_public_id(input, "comment", "FDA-2021-N-0270-0002")
}

/// Validate an internal object ID: 16 lowercase hex digits.
pub fn validate_object_id(input: &str) -> Result<ObjectId, HarvestError> {
    let lower = input.trim().to_ascii_lowercase();
    if object_id_pattern().is_match(&lower) {
        Ok(ObjectId::new(lower))
    } else {
        Err(HarvestError::Invalid(format!(
            "invalid object ID '{}'. Expected 16 hex digits (e.g., 0900006484b3c8a2)",
            input
        )))
    }
}

/// Validate page size (must be 5..=250).
pub fn validate_page_size(page_size: u32) -> Result<u32, HarvestError> {
    if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(HarvestError::Invalid(format!(
            "page size must be between {} and {}, got {}",
            MIN_PAGE_SIZE, MAX_PAGE_SIZE, page_size
        )));
    }
    Ok(page_size)
}

/// Validate the per-pass page cap (must be 1..=20).
pub fn validate_max_pages(max_pages: u32) -> Result<u32, HarvestError> {
    if !(1..=MAX_PAGES).contains(&max_pages) {
        return Err(HarvestError::Invalid(format!(
            "max pages must be between 1 and {}, got {}",
            MAX_PAGES, max_pages
        )));
    }
    Ok(max_pages)
}

/// Validate a YYYY-MM-DD date string.
pub fn validate_date(input: &str) -> Result<NaiveDate, HarvestError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        HarvestError::Invalid(format!(
            "invalid date '{}'. Expected format: YYYY-MM-DD (e.g., 2024-06-01)",
            trimmed
        ))
    })
}

/// Validate an Eastern wall-clock timestamp for the last-modified filter.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, or a bare date meaning midnight.
pub fn validate_modified(input: &str) -> Result<NaiveDateTime, HarvestError> {
    let trimmed = input.trim();
    if let Ok(at) = NaiveDateTime::parse_from_str(trimmed, LAST_MODIFIED_FORMAT) {
        return Ok(at);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            HarvestError::Invalid(format!(
                "invalid timestamp '{}'. Expected format: YYYY-MM-DD HH:MM:SS (e.g., 2021-04-06 10:51:27)",
                trimmed
            ))
        })
}

/// Validate an API key: non-empty, printable, no whitespace.
pub fn validate_api_key(input: &str) -> Result<String, HarvestError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(HarvestError::Invalid("API key is empty".to_string()));
    }
    if !trimmed.chars().all(|c| c.is_ascii_graphic()) {
        return Err(HarvestError::Invalid(
            "API key contains whitespace or non-printable characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docket_id_valid() {
        assert_eq!(validate_docket_id("FDA-2021-N-0270").unwrap(), "FDA-2021-N-0270");
    }

    #[test]
    fn docket_id_trims() {
        assert_eq!(
            validate_docket_id("  EPA-HQ-OAR-2021-0317 ").unwrap(),
            "EPA-HQ-OAR-2021-0317"
        );
    }

    #[test]
    fn docket_id_without_dash_rejected() {
        assert!(validate_docket_id("FDA2021").is_err());
    }

    #[test]
    fn docket_id_with_spaces_rejected() {
        assert!(validate_docket_id("FDA 2021 N").is_err());
    }

    #[test]
    fn docket_id_empty_rejected() {
        assert!(validate_docket_id("").is_err());
    }

    #[test]
    fn docket_id_query_injection_rejected() {
        assert!(validate_docket_id("FDA-2021&filter[x]=1").is_err());
    }

    #[test]
    fn document_id_valid() {
        assert!(validate_document_id("FDA-2021-N-0270-0001").is_ok());
    }

    #[test]
    fn comment_id_valid() {
        assert!(validate_comment_id("FDA-2021-N-0270-0002").is_ok());
    }

    #[test]
    fn object_id_lowercased() {
        assert_eq!(
            validate_object_id("0900006484B3C8A2").unwrap().as_str(),
            "0900006484b3c8a2"
        );
    }

    #[test]
    fn object_id_wrong_length() {
        assert!(validate_object_id("0900006484b3c8").is_err());
    }

    #[test]
    fn object_id_non_hex() {
        assert!(validate_object_id("0900006484b3c8zz").is_err());
    }

    #[test]
    fn page_size_bounds() {
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(1).is_err());
        assert!(validate_page_size(4).is_err());
        assert_eq!(validate_page_size(5).unwrap(), 5);
        assert_eq!(validate_page_size(250).unwrap(), 250);
        assert!(validate_page_size(251).is_err());
    }

    #[test]
    fn max_pages_bounds() {
        assert!(validate_max_pages(0).is_err());
        assert_eq!(validate_max_pages(20).unwrap(), 20);
        assert!(validate_max_pages(21).is_err());
    }

    #[test]
    fn date_valid() {
        assert_eq!(
            validate_date("2021-04-06").unwrap(),
            NaiveDate::from_ymd_opt(2021, 4, 6).unwrap()
        );
    }

    #[test]
    fn date_invalid_format() {
        assert!(validate_date("04/06/2021").is_err());
    }

    #[test]
    fn modified_full_timestamp() {
        let at = validate_modified("2021-04-06 10:51:27").unwrap();
        assert_eq!(at.format(LAST_MODIFIED_FORMAT).to_string(), "2021-04-06 10:51:27");
    }

    #[test]
    fn modified_bare_date_is_midnight() {
        let at = validate_modified("2021-04-06").unwrap();
        assert_eq!(at.format(LAST_MODIFIED_FORMAT).to_string(), "2021-04-06 00:00:00");
    }

    #[test]
    fn modified_iso_t_separator_rejected() {
        assert!(validate_modified("2021-04-06T10:51:27Z").is_err());
    }

    #[test]
    fn search_strips_control_chars() {
        assert_eq!(validate_search("  ozone\u{0007} rule ").unwrap(), "ozone rule");
    }

    #[test]
    fn search_too_long() {
        assert!(validate_search(&"a".repeat(MAX_SEARCH_LENGTH + 1)).is_err());
    }

    #[test]
    fn search_only_whitespace() {
        assert!(validate_search("   ").is_err());
    }

    #[test]
    fn api_key_valid() {
        assert_eq!(validate_api_key(" DEMO_KEY\n").unwrap(), "DEMO_KEY");
    }

    #[test]
    fn api_key_empty() {
        assert!(validate_api_key("  ").is_err());
    }

    #[test]
    fn api_key_inner_space() {
        assert!(validate_api_key("abc def").is_err());
    }
}
