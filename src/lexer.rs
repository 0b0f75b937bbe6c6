//! Tokenizes a single, already-isolated MI line.
//!
//! The lexer is re-entrant — it carries no state beyond a single call to
//! [`lex`] — and column positions reset to 1 at the start of every line,
//! matching spec §4.2. Whitespace (spaces) is skipped silently; every
//! other token is preserved with its 1-based, byte-indexed column span.

use nom::branch::alt;
use nom::bytes::complete::is_not;
use nom::character::complete::{anychar, char as nom_char};
use nom::combinator::recognize;
use nom::multi::many0;
use nom::sequence::{delimited, pair};
use nom::Parser;

use crate::error::{GdbMiError, GdbMiResult};

/// A single lexical token together with its 1-based, inclusive column span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub start_col: usize,
    pub end_col: usize,
}

/// The kinds of token the MI grammar's lexical layer recognizes. Every
/// variant's payload is a borrowed slice, so the whole enum is `Copy` —
/// callers can pull a token's kind out of a borrowed `Token` without
/// fighting the borrow checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Caret,
    Comma,
    Plus,
    Star,
    Equals,
    Tilde,
    At,
    Ampersand,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    Newline,
    /// A run of decimal digits.
    Integer(&'a str),
    /// `[A-Za-z_][A-Za-z0-9_-]*`.
    Ident(&'a str),
    /// The raw, still-escaped text between (but not including) the quotes
    /// of a c-string. Unescaping happens in the line parser, since the
    /// escape alphabet is part of the grammar layer, not the lexer.
    CString(&'a str),
}

/// A lexical failure: the offending text and its 1-based column span,
/// exactly what a parse-error `Output` needs to report to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub token: String,
    pub start_col: usize,
    pub end_col: usize,
}

/// Recognizes a quoted c-string token and returns its still-escaped
/// content (without the surrounding quotes). Built the same way the
/// teacher's own MI string parser is: a literal run of non-quote,
/// non-backslash bytes, alternating with a backslash followed by exactly
/// one more character, repeated until the closing quote. Unescaping the
/// content is left to [`crate::parser`], since the escape alphabet is
/// part of the grammar, not the lexical layer.
fn cstring_token(input: &str) -> nom::IResult<&str, &str> {
    let fragment = alt((is_not("\"\\"), recognize(pair(nom_char('\\'), anychar))));
    delimited(nom_char('"'), recognize(many0(fragment)), nom_char('"')).parse(input)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Tokenizes `line`. `line` may include its trailing `\n`/`\r`/`\r\n`; the
/// terminator becomes a single [`TokenKind::Newline`] token. Stops (without
/// error) at the first unconsumed byte if nothing more matches, since a
/// well-formed line always ends in a newline token which the caller can
/// treat as EOF for grammar purposes.
pub fn lex(line: &str) -> Result<Vec<Token<'_>>, LexError> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let start_col = pos + 1;
        let b = bytes[pos];

        if b == b' ' || b == b'\t' {
            pos += 1;
            continue;
        }

        let single = match b {
            b'^' => Some(TokenKind::Caret),
            b',' => Some(TokenKind::Comma),
            b'+' => Some(TokenKind::Plus),
            b'*' => Some(TokenKind::Star),
            b'=' => Some(TokenKind::Equals),
            b'~' => Some(TokenKind::Tilde),
            b'@' => Some(TokenKind::At),
            b'&' => Some(TokenKind::Ampersand),
            b'[' => Some(TokenKind::OpenBracket),
            b']' => Some(TokenKind::CloseBracket),
            b'{' => Some(TokenKind::OpenBrace),
            b'}' => Some(TokenKind::CloseBrace),
            b'(' => Some(TokenKind::OpenParen),
            b')' => Some(TokenKind::CloseParen),
            _ => None,
        };
        if let Some(kind) = single {
            tokens.push(Token { kind, start_col, end_col: start_col });
            pos += 1;
            continue;
        }

        if b == b'\r' {
            if bytes.get(pos + 1) == Some(&b'\n') {
                tokens.push(Token { kind: TokenKind::Newline, start_col, end_col: start_col + 1 });
                pos += 2;
            } else {
                tokens.push(Token { kind: TokenKind::Newline, start_col, end_col: start_col });
                pos += 1;
            }
            continue;
        }
        if b == b'\n' {
            tokens.push(Token { kind: TokenKind::Newline, start_col, end_col: start_col });
            pos += 1;
            continue;
        }

        if b.is_ascii_digit() {
            let rest = &line[pos..];
            let len = rest.bytes().take_while(u8::is_ascii_digit).count();
            tokens.push(Token {
                kind: TokenKind::Integer(&rest[..len]),
                start_col,
                end_col: start_col + len - 1,
            });
            pos += len;
            continue;
        }

        if is_ident_start(b as char) {
            let rest = &line[pos..];
            let len = rest
                .char_indices()
                .take_while(|&(i, c)| if i == 0 { is_ident_start(c) } else { is_ident_continue(c) })
                .count();
            tokens.push(Token {
                kind: TokenKind::Ident(&rest[..len]),
                start_col,
                end_col: start_col + len - 1,
            });
            pos += len;
            continue;
        }

        if b == b'"' {
            match cstring_token(&line[pos..]) {
                Ok((rest, content)) => {
                    let total_len = line[pos..].len() - rest.len();
                    tokens.push(Token {
                        kind: TokenKind::CString(content),
                        start_col,
                        end_col: start_col + total_len - 1,
                    });
                    pos += total_len;
                    continue;
                }
                Err(_) => {
                    let unterminated = &line[pos..];
                    return Err(LexError {
                        token: unterminated.to_string(),
                        start_col,
                        end_col: start_col + unterminated.len() - 1,
                    });
                }
            }
        }

        return Err(LexError {
            token: b.to_string(),
            start_col,
            end_col: start_col,
        });
    }

    Ok(tokens)
}

/// Convenience wrapper turning a [`LexError`] into the crate's unified
/// error type, for call sites that don't need the structured position.
pub fn lex_checked(line: &str) -> GdbMiResult<Vec<Token<'_>>> {
    lex(line).map_err(|e| GdbMiError::Logic(format!("lex error at column {}: {}", e.start_col, e.token)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lexes_punctuation() {
        let tokens = lex("^,+*=~@&[]{}()").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Caret,
                TokenKind::Comma,
                TokenKind::Plus,
                TokenKind::Star,
                TokenKind::Equals,
                TokenKind::Tilde,
                TokenKind::At,
                TokenKind::Ampersand,
                TokenKind::OpenBracket,
                TokenKind::CloseBracket,
                TokenKind::OpenBrace,
                TokenKind::CloseBrace,
                TokenKind::OpenParen,
                TokenKind::CloseParen,
            ]
        );
    }

    #[test]
    fn newline_variants() {
        assert_eq!(lex("\n").unwrap()[0].kind, TokenKind::Newline);
        assert_eq!(lex("\r").unwrap()[0].kind, TokenKind::Newline);
        let crlf = lex("\r\n").unwrap();
        assert_eq!(crlf.len(), 1);
        assert_eq!(crlf[0].kind, TokenKind::Newline);
        assert_eq!(crlf[0].start_col, 1);
        assert_eq!(crlf[0].end_col, 2);
    }

    #[test]
    fn integer_and_ident() {
        let tokens = lex("0042 thread-group-added\n").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Integer("0042"));
        assert_eq!(tokens[1].kind, TokenKind::Ident("thread-group-added"));
    }

    #[test]
    fn single_char_token_has_equal_start_and_end() {
        let tokens = lex("^\n").unwrap();
        assert_eq!(tokens[0].start_col, 1);
        assert_eq!(tokens[0].end_col, 1);
    }

    #[test]
    fn k_byte_token_end_is_start_plus_k_minus_one() {
        let tokens = lex("12345\n").unwrap();
        assert_eq!(tokens[0].start_col, 1);
        assert_eq!(tokens[0].end_col, 5);
    }

    #[test]
    fn cstring_with_escapes() {
        let tokens = lex("\"hello\\n\\\"world\\\"\"\n").unwrap();
        match &tokens[0].kind {
            TokenKind::CString(s) => assert_eq!(*s, "hello\\n\\\"world\\\""),
            other => panic!("expected CString, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_cstring_is_lex_error() {
        let err = lex("\"hello").unwrap_err();
        assert_eq!(err.start_col, 1);
    }

    #[test]
    fn unrecognized_character_is_lex_error() {
        let err = lex("#\n").unwrap_err();
        assert_eq!(err.token, "#");
        assert_eq!(err.start_col, 1);
        assert_eq!(err.end_col, 1);
    }

    #[test]
    fn whitespace_is_skipped() {
        let tokens = lex("  ^done\n").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Caret);
        assert_eq!(tokens[0].start_col, 3);
    }
}
