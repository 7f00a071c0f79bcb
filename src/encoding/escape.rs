/// Escape `input` for use inside a single-quoted MySQL string literal (quotes not included).
///
/// With backslash escapes enabled this mirrors the client library's escape set. Under
/// `NO_BACKSLASH_ESCAPES` a backslash is an ordinary character, so only `'` is doubled.
#[must_use]
pub fn escape_string(input: &str, no_backslash_escapes: bool) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    if no_backslash_escapes {
        for ch in input.chars() {
            if ch == '\'' {
                out.push_str("''");
            } else {
                out.push(ch);
            }
        }
        return out;
    }

    for ch in input.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape and wrap in single quotes.
#[must_use]
pub fn quote_string(input: &str, no_backslash_escapes: bool) -> String {
    let escaped = escape_string(input, no_backslash_escapes);
    let mut out = String::with_capacity(escaped.len() + 2);
    out.push('\'');
    out.push_str(&escaped);
    out.push('\'');
    out
}

/// Backtick-quote an identifier such as `posts` or `blog.posts`.
///
/// Each dot-separated part is quoted on its own, `*` is left bare, an already quoted part is
/// kept as is, and embedded backticks are doubled.
#[must_use]
pub fn quote_identifier(identifier: &str) -> String {
    let identifier = identifier.trim();
    if identifier == "*" {
        return identifier.to_string();
    }
    identifier
        .split('.')
        .map(|part| {
            let part = part.trim();
            if part == "*" || (part.len() >= 2 && part.starts_with('`') && part.ends_with('`')) {
                part.to_string()
            } else {
                format!("`{}`", part.replace('`', "``"))
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_client_library_set() {
        assert_eq!(escape_string("O'Reilly", false), "O\\'Reilly");
        assert_eq!(escape_string("a\\b", false), "a\\\\b");
        assert_eq!(escape_string("say \"hi\"", false), "say \\\"hi\\\"");
        assert_eq!(escape_string("l1\nl2\r", false), "l1\\nl2\\r");
        assert_eq!(escape_string("nul\0sub\x1a", false), "nul\\0sub\\Z");
        assert_eq!(escape_string("plain ünïcode", false), "plain ünïcode");
    }

    #[test]
    fn no_backslash_escapes_only_doubles_quotes() {
        assert_eq!(escape_string("O'Reilly", true), "O''Reilly");
        assert_eq!(escape_string("a\\b\n", true), "a\\b\n");
        assert_eq!(quote_string("it's", true), "'it''s'");
        assert_eq!(quote_string("it's", false), "'it\\'s'");
    }

    #[test]
    fn quotes_identifiers_per_part() {
        assert_eq!(quote_identifier("posts"), "`posts`");
        assert_eq!(quote_identifier("blog.posts"), "`blog`.`posts`");
        assert_eq!(quote_identifier("Post.*"), "`Post`.*");
        assert_eq!(quote_identifier("*"), "*");
        assert_eq!(quote_identifier("`done`"), "`done`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }
}
