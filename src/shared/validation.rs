use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for country code fields: 2 or 3 uppercase letters (ISO 3166
    /// alpha-2/alpha-3 style).
    /// - Valid: "AR", "ARG", "US"
    /// - Invalid: "ar", "A", "ARGE", "A1"
    pub static ref COUNTRY_CODE_REGEX: Regex = Regex::new(r"^[A-Z]{2,3}$").unwrap();
}

/// Normalize a search term: trim whitespace, returning None when nothing
/// usable remains. Services reject a None term with BadRequest.
pub fn normalize_search_term(term: &str) -> Option<&str> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_code_regex_valid() {
        assert!(COUNTRY_CODE_REGEX.is_match("AR"));
        assert!(COUNTRY_CODE_REGEX.is_match("ARG"));
        assert!(COUNTRY_CODE_REGEX.is_match("US"));
        assert!(COUNTRY_CODE_REGEX.is_match("BRA"));
    }

    #[test]
    fn country_code_regex_invalid() {
        assert!(!COUNTRY_CODE_REGEX.is_match("ar")); // lowercase
        assert!(!COUNTRY_CODE_REGEX.is_match("A")); // too short
        assert!(!COUNTRY_CODE_REGEX.is_match("ARGE")); // too long
        assert!(!COUNTRY_CODE_REGEX.is_match("A1")); // digit
        assert!(!COUNTRY_CODE_REGEX.is_match("")); // empty
        assert!(!COUNTRY_CODE_REGEX.is_match("A R")); // space
    }

    #[test]
    fn normalize_search_term_trims_and_rejects_blank() {
        assert_eq!(normalize_search_term("  córdoba "), Some("córdoba"));
        assert_eq!(normalize_search_term(""), None);
        assert_eq!(normalize_search_term("   "), None);
        assert_eq!(normalize_search_term("\t\n"), None);
    }
}
