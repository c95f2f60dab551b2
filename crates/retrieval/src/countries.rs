//! Supported issuing countries.

/// Canonical country names present in the corpus.
pub const SUPPORTED_COUNTRIES: [&str; 22] = [
    "United States",
    "United Kingdom",
    "China",
    "Russia",
    "Japan",
    "Spain",
    "Germany",
    "France",
    "Australia",
    "Canada",
    "India",
    "Taiwan",
    "Netherlands",
    "Sweden",
    "Jamaica",
    "South Korea",
    "Israel",
    "Singapore",
    "Brazil",
    "Mexico",
    "Poland",
    "Italy",
];

/// Canonical spelling of `name`, matched case-insensitively.
pub fn canonical_country(name: &str) -> Option<&'static str> {
    let trimmed = name.trim();
    SUPPORTED_COUNTRIES
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(trimmed))
}

/// Comma-separated list used in the intent prompt.
pub fn country_list_text() -> String {
    SUPPORTED_COUNTRIES.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_country() {
        assert_eq!(canonical_country("japan"), Some("Japan"));
        assert_eq!(canonical_country("  SOUTH KOREA "), Some("South Korea"));
        assert_eq!(canonical_country("Narnia"), None);
    }

    #[test]
    fn test_country_list_text() {
        let text = country_list_text();
        assert!(text.starts_with("United States, United Kingdom"));
        assert!(text.ends_with("Poland, Italy"));
    }
}
