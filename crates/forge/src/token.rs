//! Tokenizer for Forge source text.
//!
//! The surface syntax is deliberately flat: `#` comments run to end of
//! line, string literals are double-quoted with no escape processing (a
//! backslash is an ordinary character), and everything else splits on
//! whitespace. A bare token is an `Int` if it is an optional sign plus
//! digits, a `Float` if it additionally carries one decimal point, and a
//! `Word` otherwise.

use crate::error::{Error, Result};

/// A span in the source code (byte offsets).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One token of a Forge program.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Word(String),
}

/// Split source text into tokens with their spans.
///
/// The two returned vectors are always the same length.
pub fn tokenize(source: &str) -> Result<(Vec<Token>, Vec<Span>)> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b.is_ascii_whitespace() {
            i += 1;
        } else if b == b'#' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
        } else if b == b'"' {
            let start = i;
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' && bytes[i] != b'\n' {
                i += 1;
            }
            if i >= bytes.len() || bytes[i] != b'"' {
                return Err(Error::Lex(format!(
                    "unterminated string literal on line {}",
                    line_of(source, start)
                )));
            }
            tokens.push(Token::Str(source[start + 1..i].to_string()));
            i += 1;
            spans.push(Span::new(start, i));
        } else {
            let start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'#' {
                i += 1;
            }
            let word = &source[start..i];
            let span = Span::new(start, i);
            tokens.push(classify(word, source, start)?);
            spans.push(span);
        }
    }

    Ok((tokens, spans))
}

/// Classify a whitespace-delimited token as a number or a bareword.
fn classify(word: &str, source: &str, start: usize) -> Result<Token> {
    if is_int_literal(word) {
        let value = word.parse::<i64>().map_err(|_| {
            Error::Lex(format!(
                "integer literal `{}` out of range on line {}",
                word,
                line_of(source, start)
            ))
        })?;
        return Ok(Token::Int(value));
    }
    if is_float_literal(word) {
        let value = word.parse::<f64>().map_err(|_| {
            Error::Lex(format!(
                "malformed float literal `{}` on line {}",
                word,
                line_of(source, start)
            ))
        })?;
        return Ok(Token::Float(value));
    }
    Ok(Token::Word(word.to_string()))
}

fn is_int_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_float_literal(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let mut dots = 0;
    let mut digits = 0;
    for b in body.bytes() {
        match b {
            b'.' => dots += 1,
            b'0'..=b'9' => digits += 1,
            _ => return false,
        }
    }
    dots == 1 && digits > 0
}

/// 1-based line number of a byte offset, for lex error messages.
fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        tokenize(src).unwrap().0
    }

    #[test]
    fn test_numbers_and_words() {
        assert_eq!(
            lex("1 -2 +3 2.5 -0.5 3. .5 add"),
            vec![
                Token::Int(1),
                Token::Int(-2),
                Token::Int(3),
                Token::Float(2.5),
                Token::Float(-0.5),
                Token::Float(3.0),
                Token::Float(0.5),
                Token::Word("add".into()),
            ]
        );
    }

    #[test]
    fn test_not_quite_numbers_are_words() {
        assert_eq!(
            lex("1x 1.2.3 - + . -."),
            vec![
                Token::Word("1x".into()),
                Token::Word("1.2.3".into()),
                Token::Word("-".into()),
                Token::Word("+".into()),
                Token::Word(".".into()),
                Token::Word("-.".into()),
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            lex(r#""hello world" "" "a\b""#),
            vec![
                Token::Str("hello world".into()),
                Token::Str("".into()),
                // No escape processing: the backslash is literal
                Token::Str("a\\b".into()),
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            lex("1 # everything after is gone\n2 add# trailing"),
            vec![Token::Int(1), Token::Int(2), Token::Word("add".into())]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("1\n\"oops").unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {}", err);

        let err = tokenize("\"spans\nlines\"").unwrap_err();
        assert!(err.to_string().contains("unterminated"), "got: {}", err);
    }

    #[test]
    fn test_int_overflow_is_a_lex_error() {
        let err = tokenize("99999999999999999999999").unwrap_err();
        assert!(err.to_string().contains("out of range"), "got: {}", err);
    }

    #[test]
    fn test_spans_cover_tokens() {
        let src = r#"12 "ab" w"#;
        let (tokens, spans) = tokenize(src).unwrap();
        assert_eq!(tokens.len(), spans.len());
        assert_eq!(&src[spans[0].start..spans[0].end], "12");
        assert_eq!(&src[spans[1].start..spans[1].end], "\"ab\"");
        assert_eq!(&src[spans[2].start..spans[2].end], "w");
    }
}
