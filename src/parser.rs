//! The line parser: a hand-written recursive-descent recognizer for the
//! MI grammar, including both deliberate relaxations.
//!
//! [`parse_line`] is handed the complete token stream for one line (lexed
//! by [`crate::lexer`]) and always returns exactly one [`Output`] — either
//! a well-formed record or a `ParseError` pinpointing where the grammar
//! failed. It never panics and never blocks.

use crate::lexer::{self, Token, TokenKind};
use crate::output::{
    AsyncClass, AsyncKind, MiResult, MiValue, Output, OutOfBandRecord, ResultClass, ResultRecord,
    StreamKind,
};

struct ParseErr {
    token: String,
    start_col: usize,
    end_col: usize,
}

type PResult<T> = Result<T, ParseErr>;

struct Cursor<'a, 'b> {
    tokens: &'b [Token<'a>],
    pos: usize,
    /// Column just past the last token, used to report "unexpected end of
    /// input" at a sensible position when the token stream runs dry.
    end_of_line_col: usize,
}

impl<'a, 'b> Cursor<'a, 'b> {
    fn new(tokens: &'b [Token<'a>]) -> Self {
        let end_of_line_col = tokens.last().map(|t| t.end_col + 1).unwrap_or(1);
        Self { tokens, pos: 0, end_of_line_col }
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token<'a>> {
        let t = self.tokens.get(self.pos).copied();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn unexpected_eof(&self) -> ParseErr {
        ParseErr {
            token: String::new(),
            start_col: self.end_of_line_col,
            end_col: self.end_of_line_col,
        }
    }

    fn unexpected(&self, token: Token<'a>) -> ParseErr {
        ParseErr { token: token_text(token.kind), start_col: token.start_col, end_col: token.end_col }
    }

    fn expect_newline_then_end(&mut self) -> PResult<()> {
        if let Some(t) = self.peek() {
            if t.kind == TokenKind::Newline {
                self.advance();
            }
        }
        if let Some(t) = self.peek() {
            return Err(self.unexpected(t));
        }
        Ok(())
    }
}

fn token_text(kind: TokenKind) -> String {
    match kind {
        TokenKind::Caret => "^".to_string(),
        TokenKind::Comma => ",".to_string(),
        TokenKind::Plus => "+".to_string(),
        TokenKind::Star => "*".to_string(),
        TokenKind::Equals => "=".to_string(),
        TokenKind::Tilde => "~".to_string(),
        TokenKind::At => "@".to_string(),
        TokenKind::Ampersand => "&".to_string(),
        TokenKind::OpenBracket => "[".to_string(),
        TokenKind::CloseBracket => "]".to_string(),
        TokenKind::OpenBrace => "{".to_string(),
        TokenKind::CloseBrace => "}".to_string(),
        TokenKind::OpenParen => "(".to_string(),
        TokenKind::CloseParen => ")".to_string(),
        TokenKind::Newline => "\\n".to_string(),
        TokenKind::Integer(s) => s.to_string(),
        TokenKind::Ident(s) => s.to_string(),
        TokenKind::CString(s) => format!("\"{s}\""),
    }
}

/// Undoes GDB/MI's c-string escaping: `\"`, `\\`, `\n`, `\r`, `\t`, `\b`,
/// `\f`, `\e`, `\a` map to their literal bytes; any other `\x` drops the
/// backslash and keeps `x`, matching `gdbwire_mi_unescape_cstring`'s
/// `default:` arm exactly (an intentional, documented quirk).
pub fn unescape_cstring(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{08}'),
            Some('f') => out.push('\u{0C}'),
            Some('e') => out.push('\u{1B}'),
            Some('a') => out.push('\u{07}'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn map_result_class(literal: &str) -> ResultClass {
    match literal {
        "done" => ResultClass::Done,
        "running" => ResultClass::Running,
        "connected" => ResultClass::Connected,
        "error" => ResultClass::Error,
        "exit" => ResultClass::Exit,
        other => ResultClass::Unsupported(other.to_string()),
    }
}

fn map_async_class(literal: &str) -> AsyncClass {
    match literal {
        "download" => AsyncClass::Download,
        "stopped" => AsyncClass::Stopped,
        "running" => AsyncClass::Running,
        "thread-group-added" => AsyncClass::ThreadGroupAdded,
        "thread-group-removed" => AsyncClass::ThreadGroupRemoved,
        "thread-group-started" => AsyncClass::ThreadGroupStarted,
        "thread-group-exited" => AsyncClass::ThreadGroupExited,
        "thread-created" => AsyncClass::ThreadCreated,
        "thread-exited" => AsyncClass::ThreadExited,
        "thread-selected" => AsyncClass::ThreadSelected,
        "library-loaded" => AsyncClass::LibraryLoaded,
        "library-unloaded" => AsyncClass::LibraryUnloaded,
        "traceframe-changed" => AsyncClass::TraceframeChanged,
        "tsv-created" => AsyncClass::TsvCreated,
        "tsv-modified" => AsyncClass::TsvModified,
        "tsv-deleted" => AsyncClass::TsvDeleted,
        "breakpoint-created" => AsyncClass::BreakpointCreated,
        "breakpoint-modified" => AsyncClass::BreakpointModified,
        "breakpoint-deleted" => AsyncClass::BreakpointDeleted,
        "record-started" => AsyncClass::RecordStarted,
        "record-stopped" => AsyncClass::RecordStopped,
        "cmd-param-changed" => AsyncClass::CmdParamChanged,
        "memory-changed" => AsyncClass::MemoryChanged,
        other => AsyncClass::Unsupported(other.to_string()),
    }
}

/// `opt-token := ε | INTEGER-LITERAL`
fn parse_opt_token(cur: &mut Cursor) -> Option<u64> {
    match cur.peek() {
        Some(Token { kind: TokenKind::Integer(digits), .. }) => {
            let value = digits.parse::<u64>().ok();
            cur.advance();
            value
        }
        _ => None,
    }
}

fn expect_ident<'a>(cur: &mut Cursor<'a, '_>) -> PResult<&'a str> {
    match cur.advance() {
        Some(t) => match t.kind {
            TokenKind::Ident(s) => Ok(s),
            _ => Err(cur.unexpected(t)),
        },
        None => Err(cur.unexpected_eof()),
    }
}

fn expect_cstring<'a>(cur: &mut Cursor<'a, '_>) -> PResult<&'a str> {
    match cur.advance() {
        Some(t) => match t.kind {
            TokenKind::CString(s) => Ok(s),
            _ => Err(cur.unexpected(t)),
        },
        None => Err(cur.unexpected_eof()),
    }
}

/// `result := opt-variable ( CSTRING | tuple | list )`
/// `opt-variable := ε | STRING-LITERAL "="`
fn parse_result(cur: &mut Cursor) -> PResult<MiResult> {
    let variable = match cur.peek() {
        Some(Token { kind: TokenKind::Ident(name), .. }) => {
            let save = cur.pos;
            cur.advance();
            if matches!(cur.peek().map(|t| t.kind), Some(TokenKind::Equals)) {
                cur.advance();
                Some(name.to_string())
            } else {
                cur.pos = save;
                None
            }
        }
        _ => None,
    };

    let value = match cur.peek() {
        Some(Token { kind: TokenKind::CString(raw), .. }) => {
            cur.advance();
            MiValue::CString(unescape_cstring(raw))
        }
        Some(Token { kind: TokenKind::OpenBrace, .. }) => parse_tuple(cur)?,
        Some(Token { kind: TokenKind::OpenBracket, .. }) => parse_list(cur)?,
        Some(t) => return Err(cur.unexpected(t)),
        None => return Err(cur.unexpected_eof()),
    };

    Ok(MiResult::new(variable, value))
}

/// `result-list := result ( "," result )*`
fn parse_result_list(cur: &mut Cursor) -> PResult<Vec<MiResult>> {
    let mut results = vec![parse_result(cur)?];
    while matches!(cur.peek().map(|t| t.kind), Some(TokenKind::Comma)) {
        cur.advance();
        results.push(parse_result(cur)?);
    }
    Ok(results)
}

/// `tuple := "{" "}" | "{" result-list "}"`
///
/// Relaxation R1: a tuple member may omit its key even though strict MI
/// requires one; since `parse_result` already treats the key as optional,
/// accepting that here requires no extra code, only this comment.
fn parse_tuple(cur: &mut Cursor) -> PResult<MiValue> {
    cur.advance(); // '{'
    if matches!(cur.peek().map(|t| t.kind), Some(TokenKind::CloseBrace)) {
        cur.advance();
        return Ok(MiValue::Tuple(Vec::new()));
    }
    let children = parse_result_list(cur)?;
    match cur.advance() {
        Some(Token { kind: TokenKind::CloseBrace, .. }) => Ok(MiValue::Tuple(children)),
        Some(t) => Err(cur.unexpected(t)),
        None => Err(cur.unexpected_eof()),
    }
}

/// `list := "[" "]" | "[" result-list "]"`
fn parse_list(cur: &mut Cursor) -> PResult<MiValue> {
    cur.advance(); // '['
    if matches!(cur.peek().map(|t| t.kind), Some(TokenKind::CloseBracket)) {
        cur.advance();
        return Ok(MiValue::List(Vec::new()));
    }
    let children = parse_result_list(cur)?;
    match cur.advance() {
        Some(Token { kind: TokenKind::CloseBracket, .. }) => Ok(MiValue::List(children)),
        Some(t) => Err(cur.unexpected(t)),
        None => Err(cur.unexpected_eof()),
    }
}

/// `opt-comma-result-list := ε | "," result-list`
fn parse_opt_comma_result_list(cur: &mut Cursor) -> PResult<Vec<MiResult>> {
    if matches!(cur.peek().map(|t| t.kind), Some(TokenKind::Comma)) {
        cur.advance();
        parse_result_list(cur)
    } else {
        Ok(Vec::new())
    }
}

/// `result-record := opt-token "^" STRING-LITERAL ( "," result-list )?`
fn parse_result_record(cur: &mut Cursor, token: Option<u64>) -> PResult<OutputKindBuilder> {
    cur.advance(); // '^'
    let class_literal = expect_ident(cur)?;
    let results = parse_opt_comma_result_list(cur)?;
    Ok(OutputKindBuilder::Result(ResultRecord { token, class: map_result_class(class_literal), results }))
}

/// `async-record := opt-token ( "*" | "+" | "=" ) STRING-LITERAL ( "," result-list )?`
fn parse_async_record(cur: &mut Cursor, token: Option<u64>, kind: AsyncKind) -> PResult<OutputKindBuilder> {
    cur.advance(); // '*' | '+' | '='
    let class_literal = expect_ident(cur)?;
    let results = parse_opt_comma_result_list(cur)?;
    Ok(OutputKindBuilder::OutOfBand(OutOfBandRecord::Async {
        token,
        kind,
        class: map_async_class(class_literal),
        results,
    }))
}

/// `stream-record := ( "~" | "@" | "&" ) CSTRING`
fn parse_stream_record(cur: &mut Cursor, kind: StreamKind) -> PResult<OutputKindBuilder> {
    cur.advance(); // '~' | '@' | '&'
    let raw = expect_cstring(cur)?;
    Ok(OutputKindBuilder::OutOfBand(OutOfBandRecord::Stream { kind, data: unescape_cstring(raw) }))
}

/// `prompt := "(" STRING-LITERAL ")"`, where STRING-LITERAL must equal "gdb".
fn parse_prompt(cur: &mut Cursor) -> PResult<OutputKindBuilder> {
    cur.advance(); // '('
    let ident_token = match cur.advance() {
        Some(t) => t,
        None => return Err(cur.unexpected_eof()),
    };
    match ident_token.kind {
        TokenKind::Ident("gdb") => {}
        _ => return Err(cur.unexpected(ident_token)),
    }
    match cur.advance() {
        Some(Token { kind: TokenKind::CloseParen, .. }) => Ok(OutputKindBuilder::Prompt),
        Some(t) => Err(cur.unexpected(t)),
        None => Err(cur.unexpected_eof()),
    }
}

enum OutputKindBuilder {
    OutOfBand(OutOfBandRecord),
    Result(ResultRecord),
    Prompt,
}

/// `record := oob-record | result-record | prompt`
fn parse_record(cur: &mut Cursor) -> PResult<OutputKindBuilder> {
    let lead = match cur.peek() {
        Some(t) => t,
        None => return Err(cur.unexpected_eof()),
    };
    match lead.kind {
        TokenKind::OpenParen => parse_prompt(cur),
        TokenKind::Tilde => parse_stream_record(cur, StreamKind::Console),
        TokenKind::At => parse_stream_record(cur, StreamKind::Target),
        TokenKind::Ampersand => parse_stream_record(cur, StreamKind::Log),
        TokenKind::Caret => parse_result_record(cur, None),
        TokenKind::Star => parse_async_record(cur, None, AsyncKind::Exec),
        TokenKind::Plus => parse_async_record(cur, None, AsyncKind::Status),
        TokenKind::Equals => parse_async_record(cur, None, AsyncKind::Notify),
        TokenKind::Integer(_) => {
            let token = parse_opt_token(cur);
            let next = match cur.peek() {
                Some(t) => t,
                None => return Err(cur.unexpected_eof()),
            };
            match next.kind {
                TokenKind::Caret => parse_result_record(cur, token),
                TokenKind::Star => parse_async_record(cur, token, AsyncKind::Exec),
                TokenKind::Plus => parse_async_record(cur, token, AsyncKind::Status),
                TokenKind::Equals => parse_async_record(cur, token, AsyncKind::Notify),
                _ => Err(cur.unexpected(next)),
            }
        }
        _ => Err(cur.unexpected(lead)),
    }
}

/// Parses exactly one MI line into an [`Output`]. Never panics; malformed
/// input yields `OutputKind::ParseError` rather than an `Err`, since a
/// parser failure must never poison the driver that owns it.
pub fn parse_line(line: &[u8]) -> Output {
    let line_str = match std::str::from_utf8(line) {
        Ok(s) => s,
        Err(_) => {
            return Output::parse_error(line.to_vec(), "<invalid utf-8>".to_string(), 1, 1);
        }
    };

    let tokens = match lexer::lex(line_str) {
        Ok(t) => t,
        Err(e) => return Output::parse_error(line.to_vec(), e.token, e.start_col, e.end_col),
    };

    let mut cur = Cursor::new(&tokens);
    let result = parse_record(&mut cur).and_then(|built| {
        cur.expect_newline_then_end()?;
        Ok(built)
    });

    match result {
        Ok(OutputKindBuilder::OutOfBand(r)) => Output::out_of_band(line.to_vec(), r),
        Ok(OutputKindBuilder::Result(r)) => Output::result(line.to_vec(), r),
        Ok(OutputKindBuilder::Prompt) => Output::prompt(line.to_vec()),
        Err(e) => Output::parse_error(line.to_vec(), e.token, e.start_col, e.end_col),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::output::OutputKind;

    #[test]
    fn prompt_line() {
        let out = parse_line(b"(gdb)\n");
        assert_eq!(out.kind, OutputKind::Prompt);
    }

    #[test]
    fn prompt_with_wrong_identifier_is_parse_error() {
        let out = parse_line(b"(foo)\n");
        assert!(matches!(out.kind, OutputKind::ParseError { .. }));
    }

    #[test]
    fn console_stream() {
        let out = parse_line(b"~\"hello\\n\"\n");
        match out.kind {
            OutputKind::OutOfBand(OutOfBandRecord::Stream { kind, data }) => {
                assert_eq!(kind, StreamKind::Console);
                assert_eq!(data, "hello\n");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn simple_done() {
        let out = parse_line(b"^done\n");
        match out.kind {
            OutputKind::Result(r) => {
                assert_eq!(r.token, None);
                assert_eq!(r.class, ResultClass::Done);
                assert!(r.results.is_empty());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn tokened_error() {
        let out = parse_line(b"0042^error,msg=\"oops\"\n");
        match out.kind {
            OutputKind::Result(r) => {
                assert_eq!(r.token, Some(42));
                assert_eq!(r.class, ResultClass::Error);
                assert_eq!(r.results.len(), 1);
                assert_eq!(r.results[0].variable.as_deref(), Some("msg"));
                assert_eq!(r.results[0].value, MiValue::CString("oops".to_string()));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn exec_stopped() {
        let out = parse_line(b"*stopped,reason=\"breakpoint-hit\",bkptno=\"1\"\n");
        match out.kind {
            OutputKind::OutOfBand(OutOfBandRecord::Async { kind, class, results, .. }) => {
                assert_eq!(kind, AsyncKind::Exec);
                assert_eq!(class, AsyncClass::Stopped);
                assert_eq!(results.len(), 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn keyless_tuple_member_accepted() {
        let out = parse_line(b"^done,bkpt={\"1\"}\n");
        match out.kind {
            OutputKind::Result(r) => {
                let bkpt = &r.results[0];
                let children = bkpt.value.as_tuple().unwrap();
                assert_eq!(children[0].variable, None);
                assert_eq!(children[0].value, MiValue::CString("1".to_string()));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn parse_error_reports_offending_token_position() {
        let out = parse_line(b"^done,=oops\n");
        match out.kind {
            OutputKind::ParseError { start_col, end_col, .. } => {
                assert_eq!(start_col, end_col);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unescape_drops_unknown_escape_backslash() {
        assert_eq!(unescape_cstring("a\\qb"), "aqb");
    }

    #[test]
    fn unescape_is_inverse_of_known_alphabet() {
        assert_eq!(
            unescape_cstring("\\n\\r\\t\\b\\f\\e\\a\\\"\\\\"),
            "\n\r\t\u{08}\u{0C}\u{1B}\u{07}\"\\"
        );
    }
}
