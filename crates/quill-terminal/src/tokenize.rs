//! Shell-style splitting and quoting of command lines.

use quill_types::error::{ConsoleError, Result};

/// Split a line into tokens respecting quotes and backslash escapes.
///
/// - Single-quoted text is taken literally.
/// - Inside double quotes a backslash escapes `"` and `\`.
/// - Outside quotes a backslash escapes the next character.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // A quoted empty string ('' or "") still makes a token.
    let mut pending = false;
    let mut chars = input.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;

    while let Some(ch) = chars.next() {
        if in_single {
            if ch == '\'' {
                in_single = false;
            } else {
                current.push(ch);
            }
        } else if in_double {
            if ch == '"' {
                in_double = false;
            } else if ch == '\\'
                && let Some(&next) = chars.peek()
                && matches!(next, '"' | '\\')
            {
                current.push(next);
                chars.next();
            } else {
                current.push(ch);
            }
        } else {
            match ch {
                '\'' => {
                    in_single = true;
                    pending = true;
                },
                '"' => {
                    in_double = true;
                    pending = true;
                },
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                        pending = true;
                    }
                },
                c if c.is_whitespace() => {
                    if pending || !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                        pending = false;
                    }
                },
                _ => current.push(ch),
            }
        }
    }

    if in_single {
        return Err(ConsoleError::Tokenize("unterminated single quote".to_string()));
    }
    if in_double {
        return Err(ConsoleError::Tokenize("unterminated double quote".to_string()));
    }

    if pending || !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}

fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c)
}

/// Quote a token so that [`tokenize`] yields it back unchanged.
pub fn quote(token: &str) -> String {
    if token.is_empty() {
        return "''".to_string();
    }
    if token.chars().all(is_safe) {
        return token.to_string();
    }
    format!("'{}'", token.replace('\'', r#"'"'"'"#))
}

/// Join tokens into a line, quoting where needed.
pub fn join(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| quote(t))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_simple() {
        assert_eq!(tokenize("greet Ada").unwrap(), vec!["greet", "Ada"]);
    }

    #[test]
    fn tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  a \t b  ").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn tokenize_single_quotes() {
        assert_eq!(
            tokenize("echo 'hello world'").unwrap(),
            vec!["echo", "hello world"]
        );
    }

    #[test]
    fn tokenize_double_quotes_with_escape() {
        assert_eq!(
            tokenize(r#"say "a \"b\" c""#).unwrap(),
            vec!["say", r#"a "b" c"#]
        );
    }

    #[test]
    fn tokenize_backslash_escape() {
        assert_eq!(tokenize(r"a\ b c").unwrap(), vec!["a b", "c"]);
    }

    #[test]
    fn tokenize_mixed_quotes() {
        assert_eq!(tokenize(r#"x'y'"z""#).unwrap(), vec!["xyz"]);
    }

    #[test]
    fn tokenize_empty_quoted_token() {
        assert_eq!(tokenize("set name ''").unwrap(), vec!["set", "name", ""]);
    }

    #[test]
    fn tokenize_empty() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn tokenize_unterminated_single() {
        assert!(matches!(tokenize("'abc"), Err(ConsoleError::Tokenize(_))));
    }

    #[test]
    fn tokenize_unterminated_double() {
        assert!(matches!(tokenize("\"abc"), Err(ConsoleError::Tokenize(_))));
    }

    #[test]
    fn quote_safe_and_unsafe() {
        assert_eq!(quote("plain-word_1.2"), "plain-word_1.2");
        assert_eq!(quote("two words"), "'two words'");
        assert_eq!(quote(""), "''");
        assert_eq!(quote("it's"), r#"'it'"'"'s'"#);
    }

    #[test]
    fn join_then_tokenize() {
        let tokens: Vec<String> = vec!["say".into(), "it's fine".into(), "".into(), "x".into()];
        let line = join(&tokens);
        assert_eq!(tokenize(&line).unwrap(), tokens);
    }
}
