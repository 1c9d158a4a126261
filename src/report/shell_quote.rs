//! Quoting for the one place a shell string is unavoidable: the script handed
//! to `bash -c` inside the render container.

use std::borrow::Cow;

pub const STATEMENT_SEPARATOR: &str = "; ";

/// Quotes one argument so a POSIX shell reads it back as exactly one word.
pub fn quote_word(word: &str) -> String {
    shell_escape::unix::escape(Cow::Borrowed(word)).into_owned()
}

pub fn join_words<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|word| quote_word(word.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn join_statements<S: AsRef<str>>(statements: &[S]) -> String {
    statements
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(STATEMENT_SEPARATOR)
}

/// Encodes a value as an R double-quoted string literal.
pub fn r_string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => literal.push_str("\\\\"),
            '"' => literal.push_str("\\\""),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            c if c.is_control() => literal.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words_are_left_alone() {
        assert_eq!(quote_word("pandas"), "pandas");
        assert_eq!(quote_word("/home/quarto"), "/home/quarto");
        assert_eq!(quote_word(""), "''");
    }

    #[test]
    fn metacharacters_are_single_quoted() {
        assert_eq!(quote_word("a;b"), "'a;b'");
        assert_eq!(quote_word("$(id)"), "'$(id)'");
        assert_eq!(quote_word("it's"), "'it'\\''s'");
    }

    #[test]
    fn quoted_words_split_back_to_the_original() {
        let words = [
            "pip",
            "install",
            "evil\";rm -rf ./x",
            "a'b",
            "`id`",
            "$HOME",
            "line\nbreak",
        ];
        let joined = join_words(&words);
        let parsed = shell_words::split(&joined).expect("split");
        assert_eq!(parsed, words);
    }

    #[test]
    fn r_literals_escape_quotes_and_backslashes() {
        assert_eq!(r_string_literal("dplyr"), "\"dplyr\"");
        assert_eq!(r_string_literal("a\"b"), "\"a\\\"b\"");
        assert_eq!(r_string_literal("a\\b"), "\"a\\\\b\"");
        assert_eq!(r_string_literal("a\u{1}b"), "\"a\\u{1}b\"");
    }

    #[test]
    fn statements_use_semicolon_separator() {
        assert_eq!(join_statements(&["cd /x", "ls"]), "cd /x; ls");
    }
}
