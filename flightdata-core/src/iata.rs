// ============================================================================
// IATA airport codes
// ============================================================================

/// Uppercases an airport code so lookups are case-insensitive for callers.
pub fn normalize_airport_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// True when `code` is exactly three uppercase ASCII letters (`^[A-Z]{3}$`).
pub fn is_valid_airport_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// Optional variant used by filters: `None` stays `None`, blanks are dropped.
pub fn normalize_optional_code(code: Option<&str>) -> Option<String> {
    code.map(normalize_airport_code).filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_uppercases_and_trims() {
        assert_eq!(normalize_airport_code(" jfk "), "JFK");
        assert_eq!(normalize_airport_code("LaX"), "LAX");
    }

    #[test]
    fn test_airport_code_pattern() {
        assert!(is_valid_airport_code("JFK"));
        assert!(!is_valid_airport_code("jfk"));
        assert!(!is_valid_airport_code("JF"));
        assert!(!is_valid_airport_code("JFKX"));
        assert!(!is_valid_airport_code("J1K"));
        assert!(!is_valid_airport_code("ÄBC"));
    }

    #[test]
    fn test_optional_blank_is_none() {
        assert_eq!(normalize_optional_code(Some("  ")), None);
        assert_eq!(normalize_optional_code(None), None);
        assert_eq!(normalize_optional_code(Some("cdg")), Some("CDG".to_string()));
    }
}
