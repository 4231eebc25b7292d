//! SQL identifier helpers.
//!
//! - [`quote`] wraps a name in the dialect's quote character.
//! - [`escape_table_names`] rewrites bare `table.column` tokens into `"table".column`,
//!   leaving string literals and already-quoted identifiers untouched.
//! - [`snake_case`] converts property names into column names.
//!
//! # Example
//! ```
//! use sqlblock::ident::escape_table_names;
//!
//! let sql = escape_table_names("user.id = 1 AND name = 'a.b'", '"');
//! assert_eq!(sql, r#""user".id = 1 AND name = 'a.b'"#);
//! ```

use heck::ToSnakeCase;

/// Wrap `name` in `quote_char`, doubling any embedded quote characters.
pub fn quote(name: &str, quote_char: char) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote_char);
    for c in name.chars() {
        if c == quote_char {
            out.push(quote_char);
        }
        out.push(c);
    }
    out.push(quote_char);
    out
}

/// Convert a property name (`userId`, `UserRole`) into a column/table name (`user_id`, `user_role`).
pub fn snake_case(name: &str) -> String {
    name.to_snake_case()
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn is_quote(c: char) -> bool {
    matches!(c, '\'' | '"' | '`')
}

/// Rewrite every unquoted `table.column` token in `statement` to `<q>table<q>.column`.
///
/// Tokens inside single-quoted literals, double-quoted or backtick-quoted identifiers and
/// numeric literals (`1.5`) are copied verbatim. Qualified chains are quoted segment by
/// segment except the last one (`s.t.c` becomes `"s"."t".c`).
pub fn escape_table_names(statement: &str, quote_char: char) -> String {
    let chars: Vec<char> = statement.chars().collect();
    let mut out = String::with_capacity(statement.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Quoted literal or identifier: copy through the closing quote ('' and "" escapes included).
        if is_quote(c) {
            out.push(c);
            i += 1;
            while i < chars.len() {
                out.push(chars[i]);
                if chars[i] == c {
                    if chars.get(i + 1) == Some(&c) {
                        out.push(c);
                        i += 2;
                        continue;
                    }
                    i += 1;
                    break;
                }
                i += 1;
            }
            continue;
        }

        // Numeric literal.
        if c.is_ascii_digit() {
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '.' || chars[i] == '_') {
                out.push(chars[i]);
                i += 1;
            }
            continue;
        }

        if is_ident_start(c) {
            let start = i;
            while i < chars.len() && is_ident_char(chars[i]) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let qualifies = chars.get(i) == Some(&'.')
                && chars
                    .get(i + 1)
                    .is_some_and(|&n| is_ident_start(n) || n == '*' || is_quote(n));
            if qualifies {
                out.push_str(&quote(&word, quote_char));
            } else {
                out.push_str(&word);
            }
            continue;
        }

        out.push(c);
        i += 1;
    }

    out
}
