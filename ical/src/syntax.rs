// SPDX-FileCopyrightText: 2026 Kalends Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Content lines (RFC 5545 Section 3.1): lexing, unfolding and the
//! `name *(";" param) ":" value` structure, plus TEXT escaping.

use logos::Logos;

/// Tokens of the content-line grammar.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Logos)]
pub enum Token<'src> {
    /// A run of characters that is not a delimiter, whitespace or quote.
    /// Whether it is a name or a value is decided by the scanner.
    #[regex(r#"[^;:,\r\n\t ="]+"#)]
    Word(&'src str),

    /// Semicolon, separating parameters.
    #[token(";")]
    Semi,

    /// Colon, separating the name/parameter list from the value.
    #[token(":")]
    Colon,

    /// Equals sign inside a parameter.
    #[token("=")]
    Eq,

    /// Comma, separating list values.
    #[token(",")]
    Comma,

    /// Line terminator. RFC 5545 mandates CRLF; bare LF is tolerated.
    #[token("\r\n")]
    #[token("\n")]
    Newline,

    /// Space.
    #[token(" ")]
    Space,

    /// Horizontal tab.
    #[token("\t")]
    Tab,

    /// A quoted parameter value, quotes included.
    #[regex(r#""([^"\\\r\n]|\\.)*""#)]
    Quoted(&'src str),
}

fn token_text<'src>(token: &Token<'src>) -> &'src str {
    match token {
        Token::Word(s) | Token::Quoted(s) => s,
        Token::Semi => ";",
        Token::Colon => ":",
        Token::Eq => "=",
        Token::Comma => ",",
        Token::Newline => "\r\n",
        Token::Space => " ",
        Token::Tab => "\t",
    }
}

/// A scanned content line: `name *(";" param) ":" value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name, e.g. `DTSTART`.
    pub name: String,
    /// Parameters between the name and the value.
    pub parameters: Vec<RawParameter>,
    /// The raw value text, unescaped by the typed layer, not here.
    pub value: String,
}

/// A scanned parameter: `name "=" value *("," value)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParameter {
    /// Parameter name, e.g. `TZID`.
    pub name: String,
    /// Parameter values, quotes removed.
    pub values: Vec<String>,
}

/// Errors rejecting malformed content lines.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// A character outside the content-line alphabet.
    #[error("line {line}: unrecognized character")]
    InvalidCharacter {
        /// One-based logical line number.
        line: usize,
    },

    /// A line with no `:` separating name from value.
    #[error("line {line}: content line has no ':' separator")]
    MissingColon {
        /// One-based logical line number.
        line: usize,
    },

    /// A line starting with something other than a name.
    #[error("line {line}: content line has an empty name")]
    EmptyName {
        /// One-based logical line number.
        line: usize,
    },

    /// A parameter without `=` or without a name.
    #[error("line {line}: malformed parameter")]
    MalformedParameter {
        /// One-based logical line number.
        line: usize,
    },
}

/// Remove RFC 5545 Section 3.1 line folds: a CRLF (or bare LF)
/// immediately followed by a space or tab joins two physical lines.
#[must_use]
pub fn unfold(src: &str) -> String {
    let bytes = src.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\r'
            && i + 2 < bytes.len()
            && bytes[i + 1] == b'\n'
            && (bytes[i + 2] == b' ' || bytes[i + 2] == b'\t')
        {
            i += 3;
            continue;
        }
        if bytes[i] == b'\n'
            && i + 1 < bytes.len()
            && (bytes[i + 1] == b' ' || bytes[i + 1] == b'\t')
        {
            i += 2;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    // Only ASCII sequences were removed, so the result stays valid UTF-8.
    String::from_utf8_lossy(&out).into_owned()
}

/// Unfold and scan source text into content lines.
///
/// # Errors
///
/// The first malformed line aborts the scan with a [`SyntaxError`]
/// naming its logical line number.
pub fn scan(src: &str) -> Result<Vec<ContentLine>, SyntaxError> {
    let unfolded = unfold(src);
    let mut lexer = Token::lexer(&unfolded);
    let mut lines = Vec::new();
    let mut tokens: Vec<Token<'_>> = Vec::new();
    let mut line = 1;

    loop {
        match lexer.next() {
            Some(Ok(Token::Newline)) => {
                if !tokens.is_empty() {
                    lines.push(scan_line(&tokens, line)?);
                    tokens.clear();
                }
                line += 1;
            }
            Some(Ok(token)) => tokens.push(token),
            Some(Err(())) => return Err(SyntaxError::InvalidCharacter { line }),
            None => {
                if !tokens.is_empty() {
                    lines.push(scan_line(&tokens, line)?);
                }
                break;
            }
        }
    }
    Ok(lines)
}

fn scan_line(tokens: &[Token<'_>], line: usize) -> Result<ContentLine, SyntaxError> {
    let Some(Token::Word(name)) = tokens.first() else {
        return Err(SyntaxError::EmptyName { line });
    };
    let name = (*name).to_owned();
    let mut index = 1;
    let mut parameters = Vec::new();

    loop {
        match tokens.get(index) {
            Some(Token::Semi) => {
                index += 1;
                let (parameter, next) = scan_parameter(tokens, index, line)?;
                parameters.push(parameter);
                index = next;
            }
            Some(Token::Colon) => {
                index += 1;
                break;
            }
            _ => return Err(SyntaxError::MissingColon { line }),
        }
    }

    let mut value = String::new();
    for token in tokens.get(index..).unwrap_or_default() {
        value.push_str(token_text(token));
    }
    Ok(ContentLine {
        name,
        parameters,
        value,
    })
}

fn scan_parameter(
    tokens: &[Token<'_>],
    mut index: usize,
    line: usize,
) -> Result<(RawParameter, usize), SyntaxError> {
    let Some(Token::Word(name)) = tokens.get(index) else {
        return Err(SyntaxError::MalformedParameter { line });
    };
    index += 1;
    if !matches!(tokens.get(index), Some(Token::Eq)) {
        return Err(SyntaxError::MalformedParameter { line });
    }
    index += 1;

    let mut values = Vec::new();
    loop {
        match tokens.get(index) {
            Some(Token::Word(word)) => {
                values.push((*word).to_owned());
                index += 1;
            }
            Some(Token::Quoted(quoted)) => {
                let inner = quoted
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .unwrap_or(quoted);
                values.push(inner.to_owned());
                index += 1;
            }
            _ => values.push(String::new()),
        }
        if matches!(tokens.get(index), Some(Token::Comma)) {
            index += 1;
        } else {
            break;
        }
    }

    Ok((
        RawParameter {
            name: (*name).to_owned(),
            values,
        },
        index,
    ))
}

/// Escape a TEXT value for serialization (RFC 5545 Section 3.3.11).
#[must_use]
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Undo TEXT escaping. Unknown escapes keep the escaped character.
#[must_use]
pub fn unescape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_simple_line() {
        let lines = scan("SUMMARY:Hello World\r\n").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "SUMMARY");
        assert!(lines[0].parameters.is_empty());
        assert_eq!(lines[0].value, "Hello World");
    }

    #[test]
    fn scans_parameters() {
        let lines = scan("DTSTART;TZID=America/New_York;VALUE=DATE-TIME:20250101T090000\r\n")
            .unwrap();
        let line = &lines[0];
        assert_eq!(line.name, "DTSTART");
        assert_eq!(line.parameters.len(), 2);
        assert_eq!(line.parameters[0].name, "TZID");
        assert_eq!(line.parameters[0].values, ["America/New_York"]);
        assert_eq!(line.parameters[1].name, "VALUE");
        assert_eq!(line.parameters[1].values, ["DATE-TIME"]);
        assert_eq!(line.value, "20250101T090000");
    }

    #[test]
    fn scans_quoted_and_multi_valued_parameters() {
        let lines =
            scan("ATTENDEE;MEMBER=\"mailto:a@example.com\",\"mailto:b@example.com\":mailto:c@example.com\r\n")
                .unwrap();
        let parameter = &lines[0].parameters[0];
        assert_eq!(parameter.name, "MEMBER");
        assert_eq!(
            parameter.values,
            ["mailto:a@example.com", "mailto:b@example.com"]
        );
        assert_eq!(lines[0].value, "mailto:c@example.com");
    }

    #[test]
    fn unfolds_continuation_lines() {
        let src = "DESCRIPTION:This is a lo\r\n ng description\r\n";
        let lines = scan(src).unwrap();
        assert_eq!(lines[0].value, "This is a long description");

        // Tab continuations and bare LF input are tolerated.
        let src = "DESCRIPTION:split\n\tacross\n";
        let lines = scan(src).unwrap();
        assert_eq!(lines[0].value, "splitacross");
    }

    #[test]
    fn value_keeps_delimiters_after_colon() {
        let lines = scan("RRULE:FREQ=WEEKLY;BYDAY=MO,WE\r\n").unwrap();
        assert_eq!(lines[0].value, "FREQ=WEEKLY;BYDAY=MO,WE");
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(
            scan("SUMMARY Hello\r\n"),
            Err(SyntaxError::MissingColon { line: 1 })
        );
        assert_eq!(
            scan("DTSTART;TZID:20250101\r\n"),
            Err(SyntaxError::MalformedParameter { line: 1 })
        );
        assert_eq!(scan(":value\r\n"), Err(SyntaxError::EmptyName { line: 1 }));
    }

    #[test]
    fn reports_line_numbers_after_folds() {
        let src = "SUMMARY:ok\r\nBROKEN second\r\n";
        assert_eq!(scan(src), Err(SyntaxError::MissingColon { line: 2 }));
    }

    #[test]
    fn escapes_round_trip() {
        let cases = [
            ("plain", "plain"),
            ("semi;colon", "semi\\;colon"),
            ("comma,separated", "comma\\,separated"),
            ("back\\slash", "back\\\\slash"),
            ("multi\nline", "multi\\nline"),
        ];
        for (raw, escaped) in cases {
            assert_eq!(escape_text(raw), escaped);
            assert_eq!(unescape_text(escaped), raw);
        }
        assert_eq!(unescape_text("upper\\Ncase"), "upper\ncase");
    }
}
