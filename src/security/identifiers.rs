//! Schema and object filter token sanitization.
//!
//! Filter tokens end up inside generated T-SQL, so anything that could break
//! out of an identifier is dropped rather than escaped.

use crate::constants::MAX_IDENTIFIER_LENGTH;
use once_cell::sync::Lazy;
use regex::Regex;

/// Character sequences that are never allowed inside a filter token.
///
/// Covers SQL comments, statement separators, string and quoted-identifier
/// delimiters, the escape character, and ASCII control characters.
static FORBIDDEN_SEQUENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"--|/\*|\*/|[;'"\\\x00-\x1F\x7F]"#)
        .unwrap_or_else(|e| panic!("Internal error: invalid token pattern: {}", e))
});

/// Check whether a single, already trimmed token is usable as a filter.
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && token.chars().count() <= MAX_IDENTIFIER_LENGTH
        && !FORBIDDEN_SEQUENCES.is_match(token)
}

/// Remove invalid tokens from a filter list.
///
/// Tokens are trimmed of boundary whitespace. Empty, oversized, or unsafe
/// tokens are dropped. Order and duplicates are preserved.
///
/// # Examples
///
/// ```
/// use sql_index_manager::security::sanitize_tokens;
///
/// let tokens = sanitize_tokens([" ", "dbo", "", "  sales  "]);
/// assert_eq!(tokens, vec!["dbo", "sales"]);
/// ```
pub fn sanitize_tokens<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .filter_map(|token| {
            let trimmed = token.as_ref().trim();
            is_valid_token(trimmed).then(|| trimmed.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_blank_tokens() {
        assert_eq!(
            sanitize_tokens([" ", "dbo", "", "  sales  "]),
            vec!["dbo", "sales"]
        );
        assert!(sanitize_tokens(["\t", "\n "]).is_empty());
    }

    #[test]
    fn test_preserves_order_and_duplicates() {
        assert_eq!(
            sanitize_tokens(["b", "a", "b"]),
            vec!["b", "a", "b"]
        );
    }

    #[test]
    fn test_keeps_ordinary_identifiers() {
        assert!(is_valid_token("dbo"));
        assert!(is_valid_token("Sales.Orders"));
        assert!(is_valid_token("[My Table]"));
        assert!(is_valid_token("tmp_%"));
    }

    #[test]
    fn test_drops_unsafe_tokens() {
        assert!(!is_valid_token("Users--"));
        assert!(!is_valid_token("Users/*comment"));
        assert!(!is_valid_token("a*/"));
        assert!(!is_valid_token("Users;DROP"));
        assert!(!is_valid_token("O'Brien"));
        assert!(!is_valid_token("\"quoted\""));
        assert!(!is_valid_token("back\\slash"));
        assert!(!is_valid_token("nul\0byte"));
        assert!(!is_valid_token("tab\tinside"));
    }

    #[test]
    fn test_length_limit() {
        let longest = "a".repeat(MAX_IDENTIFIER_LENGTH);
        let too_long = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert!(is_valid_token(&longest));
        assert!(!is_valid_token(&too_long));
    }

    #[test]
    fn test_accepts_owned_strings() {
        let input = vec![String::from(" hr "), String::from("x;y")];
        assert_eq!(sanitize_tokens(&input), vec!["hr"]);
    }
}
