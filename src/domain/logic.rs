// src/domain/logic.rs

use chrono::{NaiveDate, NaiveDateTime};

/// ISO format SaleDate is stored in once the dates stage has run.
pub const ISO_DATE: &str = "%Y-%m-%d";

/// Tries each format in turn, first as a bare date, then as a datetime whose
/// time part is discarded. Returns None when nothing matches; never panics.
pub fn parse_sale_date<S: AsRef<str>>(raw: &str, formats: &[S]) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    formats.iter().find_map(|fmt| {
        let fmt = fmt.as_ref();
        NaiveDate::parse_from_str(trimmed, fmt)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(trimmed, fmt)
                    .ok()
                    .map(|dt| dt.date())
            })
    })
}

/// Splits a comma-delimited address into exactly `parts` trimmed segments,
/// taken from the left. Missing segments come back as empty strings.
///
/// "123 Main St, Nashville" with 2 parts is ["123 Main St", "Nashville"];
/// "123 Main St" with 2 parts is ["123 Main St", ""].
pub fn split_address(address: &str, parts: usize) -> Vec<String> {
    let mut segments: Vec<String> = address
        .split(',')
        .take(parts)
        .map(|s| s.trim().to_string())
        .collect();
    segments.resize(parts, String::new());
    segments
}

/// Maps the short SoldAsVacant codes onto their long form.
/// Anything else, including NULL and already-long values, passes through.
pub fn normalize_sold_as_vacant(value: Option<&str>) -> Option<String> {
    match value {
        Some("Y") => Some("Yes".to_string()),
        Some("N") => Some("No".to_string()),
        other => other.map(str::to_string),
    }
}

/// Strips currency decoration ("$120,000") from a SalePrice cell.
pub fn clean_sale_price(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMATS: [&str; 3] = ["%B %d, %Y", "%Y-%m-%d", "%Y-%m-%d %H:%M:%S"];

    #[test]
    fn parses_long_month_dates() {
        let d = parse_sale_date("April 9, 2013", &FORMATS).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2013, 4, 9).unwrap());
    }

    #[test]
    fn parses_datetime_and_drops_time() {
        let d = parse_sale_date("2014-06-10 00:00:00", &FORMATS).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2014, 6, 10).unwrap());
    }

    #[test]
    fn unparsable_dates_are_none() {
        assert_eq!(parse_sale_date("not a date", &FORMATS), None);
        assert_eq!(parse_sale_date("February 30, 2015", &FORMATS), None);
        assert_eq!(parse_sale_date("   ", &FORMATS), None);
    }

    #[test]
    fn splits_street_and_city() {
        assert_eq!(
            split_address("123 Main St, Nashville", 2),
            vec!["123 Main St".to_string(), "Nashville".to_string()]
        );
    }

    #[test]
    fn missing_city_is_empty() {
        assert_eq!(
            split_address("123 Main St", 2),
            vec!["123 Main St".to_string(), String::new()]
        );
    }

    #[test]
    fn owner_address_takes_first_three_segments() {
        let parts = split_address("1808  FOX CHASE DR, GOODLETTSVILLE, TN, USA", 3);
        assert_eq!(parts, vec!["1808  FOX CHASE DR", "GOODLETTSVILLE", "TN"]);
    }

    #[test]
    fn sold_as_vacant_mapping() {
        assert_eq!(normalize_sold_as_vacant(Some("N")).as_deref(), Some("No"));
        assert_eq!(normalize_sold_as_vacant(Some("Y")).as_deref(), Some("Yes"));
        assert_eq!(normalize_sold_as_vacant(Some("Yes")).as_deref(), Some("Yes"));
        assert_eq!(normalize_sold_as_vacant(Some("maybe")).as_deref(), Some("maybe"));
        assert_eq!(normalize_sold_as_vacant(None), None);
    }

    #[test]
    fn sale_price_decoration_is_removed() {
        assert_eq!(clean_sale_price("$120,000"), "120000");
        assert_eq!(clean_sale_price(" 85000 "), "85000");
    }
}
