//! `?` → `$n` placeholder rewriting.
//!
//! Builders emit JDBC-style `?` placeholders; Postgres only accepts numbered ones.

/// Rewrite each `?` outside quoted text into `$1`, `$2`, ...
///
/// Single-quoted literals, double-quoted identifiers and backtick identifiers are copied
/// verbatim. Doubled quotes inside them (`'O''Connor'`) are handled by toggling twice.
///
/// ```
/// use sqlblock::placeholder::to_positional;
///
/// assert_eq!(
///     to_positional("SELECT * FROM user WHERE name = ? AND note <> '?' AND age > ?"),
///     "SELECT * FROM user WHERE name = $1 AND note <> '?' AND age > $2"
/// );
/// ```
pub fn to_positional(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut quote: Option<char> = None;
    let mut index = 0usize;

    for ch in sql.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                out.push(ch);
            }
            None => match ch {
                '\'' | '"' | '`' => {
                    quote = Some(ch);
                    out.push(ch);
                }
                '?' => {
                    index += 1;
                    out.push('$');
                    out.push_str(&index.to_string());
                }
                _ => out.push(ch),
            },
        }
    }
    out
}

/// Number of placeholders [`to_positional`] would rewrite.
pub fn count_placeholders(sql: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut count = 0;
    for ch in sql.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(ch),
            (None, '?') => count += 1,
            (None, _) => {}
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrites_in_order() {
        assert_eq!(
            to_positional("INSERT INTO users ( id, name ) VALUES ( ?, ? )"),
            "INSERT INTO users ( id, name ) VALUES ( $1, $2 )"
        );
    }

    #[test]
    fn test_skips_quoted_text() {
        let sql = r#"SELECT `a?` , "b?" FROM t WHERE c = 'O''Connor?' AND d = ?"#;
        assert_eq!(
            to_positional(sql),
            r#"SELECT `a?` , "b?" FROM t WHERE c = 'O''Connor?' AND d = $1"#
        );
        assert_eq!(count_placeholders(sql), 1);
    }

    #[test]
    fn test_no_placeholders() {
        assert_eq!(to_positional("SELECT 1"), "SELECT 1");
        assert_eq!(count_placeholders("SELECT 1"), 0);
    }

    #[test]
    fn test_double_digit_indexes() {
        let sql = vec!["?"; 11].join(", ");
        assert!(to_positional(&sql).ends_with("$10, $11"));
    }
}
