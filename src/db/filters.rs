//! SQL filter pattern helpers for the list queries.

/// Escape LIKE wildcards in user input and wrap it for a substring match,
/// suitable for binding against `ILIKE`.
pub fn contains_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Build a POSIX alternation `(a|b|c)` from a list of strings, escaping
/// regex metacharacters in each alternative. Bound against `~*` for a
/// case-insensitive "contains one of" match.
pub fn alternation_pattern(values: &[String]) -> String {
    let joined = values
        .iter()
        .map(|v| regex::escape(v))
        .collect::<Vec<_>>()
        .join("|");
    format!("({joined})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_pattern_wraps_plain_input() {
        assert_eq!(contains_pattern("tomato"), "%tomato%");
    }

    #[test]
    fn contains_pattern_escapes_like_wildcards() {
        assert_eq!(contains_pattern("50%_done"), "%50\\%\\_done%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn alternation_pattern_joins_values() {
        let values = vec!["Tomato".to_string(), "Wheat".to_string()];
        assert_eq!(alternation_pattern(&values), "(Tomato|Wheat)");
    }

    #[test]
    fn alternation_pattern_escapes_metacharacters() {
        let values = vec!["a.b".to_string(), "c|d".to_string()];
        assert_eq!(alternation_pattern(&values), r"(a\.b|c\|d)");
    }

    #[test]
    fn alternation_pattern_single_value() {
        let values = vec!["Italian".to_string()];
        assert_eq!(alternation_pattern(&values), "(Italian)");
    }
}
