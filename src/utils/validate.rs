use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Presence check for required request fields: empty or whitespace-only
/// strings count as missing.
pub fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Names of the fields in `fields` that failed the presence check.
pub fn missing_fields(fields: &[(&'static str, &Option<String>)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(name, _)| *name)
        .collect()
}

/// Coordinate pairs must be exactly [lng, lat]; any other shape is dropped
/// before it reaches the store (the schema CHECK is the backstop).
pub fn valid_coordinates(coordinates: Option<Vec<f64>>) -> Option<Vec<f64>> {
    coordinates.filter(|c| c.len() == 2)
}

/// Accepts RFC 3339 or bare YYYY-MM-DD (midnight UTC), the two shapes
/// clients actually send for dates.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = raw.parse::<NaiveDate>().ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_missing() {
        assert_eq!(present(&None), None);
        assert_eq!(present(&Some("".to_string())), None);
        assert_eq!(present(&Some("   ".to_string())), None);
        assert_eq!(present(&Some(" x ".to_string())), Some("x"));
    }

    #[test]
    fn missing_fields_lists_only_the_absent_ones() {
        let name = Some("Asha".to_string());
        let email = None;
        let password = Some("".to_string());
        let missing = missing_fields(&[
            ("name", &name),
            ("email", &email),
            ("password", &password),
        ]);
        assert_eq!(missing, vec!["email", "password"]);
    }

    #[test]
    fn only_two_element_coordinates_survive() {
        assert_eq!(valid_coordinates(None), None);
        assert_eq!(valid_coordinates(Some(vec![77.59])), None);
        assert_eq!(valid_coordinates(Some(vec![77.59, 12.97, 0.0])), None);
        assert_eq!(
            valid_coordinates(Some(vec![77.59, 12.97])),
            Some(vec![77.59, 12.97])
        );
    }

    #[test]
    fn dates_parse_in_both_accepted_shapes() {
        let bare = parse_datetime("2025-12-01").unwrap();
        assert_eq!(bare.to_rfc3339(), "2025-12-01T00:00:00+00:00");
        let full = parse_datetime("2025-12-01T09:30:00+05:30").unwrap();
        assert_eq!(full.to_rfc3339(), "2025-12-01T04:00:00+00:00");
        assert!(parse_datetime("next tuesday").is_none());
    }
}
