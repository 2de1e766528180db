//! Query-string editing — pure string transforms for the free-text query.
//!
//! [`toggle_clause`] implements the single clause-append/remove edit the view
//! supports: strip any prior occurrence of a `field:"value"` clause (with
//! either polarity prefix) and append it again with the requested polarity.

use std::fmt;

/// Polarity prefix of a query clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClausePolarity {
    /// `+field:"value"` — the clause must match.
    Must,
    /// `-field:"value"` — the clause must not match.
    MustNot,
}

impl fmt::Display for ClausePolarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClausePolarity::Must => write!(f, "+"),
            ClausePolarity::MustNot => write!(f, "-"),
        }
    }
}

/// Escape a value for embedding inside a double-quoted clause.
///
/// Backslash is escaped first so the escapes inserted for the other
/// characters are not themselves re-escaped.
pub fn escape_for_quoted_clause(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('"', "\\\"")
        .replace('\0', "\\0")
}

/// Escape every regex metacharacter in `value` with a backslash prefix.
pub fn escape_for_regex(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(
            c,
            '-' | '/' | '\\' | '^' | '$' | '*' | '+' | '?' | '.' | '(' | ')' | '|' | '[' | ']'
                | '{' | '}'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Toggle a `field:"value"` clause on the query string.
///
/// For each value: build the clause with the value escaped, remove the first
/// pre-existing occurrence of that exact clause regardless of its `+`/`-`
/// prefix, then append `polarity + clause`. Values are applied sequentially,
/// each edit operating on the accumulated string. No side effects beyond the
/// returned string.
pub fn toggle_clause(
    query: &str,
    field: &str,
    values: &[&str],
    polarity: ClausePolarity,
) -> String {
    let mut query = query.to_string();
    for value in values {
        let clause = format!("{field}:\"{}\"", escape_for_quoted_clause(value));
        let pattern = format!("[+-]{}\\s*", escape_for_regex(&clause));
        let re = regex::Regex::new(&pattern)
            .expect("escaped clause must always form a valid pattern");
        query = re.replace(&query, "").into_owned();
        query = format!("{query} {polarity}{clause}");
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quoted_clause_escapes_backslash_first() {
        assert_eq!(escape_for_quoted_clause(r#"a"b\c"#), r#"a\"b\\c"#);
    }

    #[test]
    fn quoted_clause_escapes_quote_and_nul() {
        assert_eq!(escape_for_quoted_clause("it's"), r"it\'s");
        assert_eq!(escape_for_quoted_clause("a\0b"), r"a\0b");
    }

    #[test]
    fn regex_escape_covers_the_metacharacter_set() {
        assert_eq!(escape_for_regex("a.b*c"), r"a\.b\*c");
        assert_eq!(
            escape_for_regex(r"-/\^$*+?.()|[]{}"),
            r"\-\/\\\^\$\*\+\?\.\(\)\|\[\]\{\}"
        );
    }

    #[test]
    fn toggle_appends_clause_with_polarity() {
        let q = toggle_clause("", "host", &["web-01"], ClausePolarity::Must);
        assert_eq!(q, r#" +host:"web-01""#);

        let q = toggle_clause("", "host", &["web-01"], ClausePolarity::MustNot);
        assert_eq!(q, r#" -host:"web-01""#);
    }

    #[test]
    fn toggling_twice_leaves_exactly_one_occurrence() {
        let clause = r#"+host:"web-01""#;
        let once = toggle_clause("", "host", &["web-01"], ClausePolarity::Must);
        let twice = toggle_clause(&once, "host", &["web-01"], ClausePolarity::Must);
        assert_eq!(twice.matches(clause).count(), 1);
        assert_eq!(twice.trim(), clause);
    }

    #[test]
    fn toggle_removes_clause_of_opposite_polarity() {
        let q = toggle_clause("", "level", &["error"], ClausePolarity::Must);
        let q = toggle_clause(&q, "level", &["error"], ClausePolarity::MustNot);
        assert_eq!(q.trim(), r#"-level:"error""#);
    }

    #[test]
    fn toggle_leaves_unrelated_clauses_alone() {
        let q = r#"free text +host:"web-01""#;
        let q = toggle_clause(q, "level", &["error"], ClausePolarity::Must);
        assert!(q.contains(r#"+host:"web-01""#));
        assert!(q.contains("free text"));
        assert!(q.ends_with(r#"+level:"error""#));
    }

    #[test]
    fn multiple_values_apply_sequentially() {
        let q = toggle_clause("", "host", &["a", "b"], ClausePolarity::Must);
        assert!(q.contains(r#"+host:"a""#));
        assert!(q.ends_with(r#"+host:"b""#));
    }

    #[test]
    fn toggle_escapes_regex_metacharacters_in_the_value() {
        // A value full of metacharacters must round-trip like any other.
        let value = "1.2.3 (build*)";
        let once = toggle_clause("", "version", &[value], ClausePolarity::Must);
        let twice = toggle_clause(&once, "version", &[value], ClausePolarity::Must);
        assert_eq!(once.trim(), twice.trim());
    }
}
