//! The stream driver: turns a byte stream into a sequence of [`Output`]s.
//!
//! This is the crate's entry point for a caller piping raw GDB/MI bytes
//! off a pipe or socket. It owns a [`StringBuffer`] the way the original
//! implementation's top-level parser context owns a `gdbwire_string` to
//! accumulate a partial line across calls, and it never blocks — pushing
//! fewer bytes than a full line simply leaves them buffered for the next
//! call.

use crate::diag::DiagSink;
use crate::output::{AsyncClass, AsyncKind, MiResult, OutOfBandRecord, Output, OutputKind, ResultRecord, StreamKind};
use crate::parser;
use crate::string_buffer::StringBuffer;

/// Receives callbacks as the driver recognizes complete lines.
///
/// Mirrors the original implementation's one-callback-pointer-per-event-kind
/// callback struct (spec §4.4): one method per `Output` kind — stream
/// record, async record, result record, prompt, parse error — each with a
/// no-op default, so a caller interested in only one kind of record can
/// override a single method instead of re-matching on `output.kind` itself.
///
/// [`Callbacks::on_output`] is the catch-all entry point the driver
/// actually calls; its default body dispatches to the five typed methods
/// below based on `output.kind`. Overriding `on_output` directly bypasses
/// that dispatch entirely, for callers who'd rather match on the whole
/// `Output` themselves.
pub trait Callbacks {
    fn on_output(&mut self, output: &Output) {
        match &output.kind {
            OutputKind::OutOfBand(OutOfBandRecord::Stream { kind, data }) => {
                self.on_stream_record(*kind, data, &output.line);
            }
            OutputKind::OutOfBand(OutOfBandRecord::Async { token, kind, class, results }) => {
                self.on_async_record(*token, *kind, class, results, &output.line);
            }
            OutputKind::Result(record) => self.on_result_record(record, &output.line),
            OutputKind::Prompt => self.on_prompt(&output.line),
            OutputKind::ParseError { token, start_col, end_col } => {
                self.on_parse_error(&output.line, token, *start_col, *end_col);
            }
        }
    }

    /// A `~`/`@`/`&` stream record: `data` is already unescaped.
    fn on_stream_record(&mut self, _kind: StreamKind, _data: &str, _line: &[u8]) {}

    /// A `*`/`+`/`=` async record.
    fn on_async_record(
        &mut self,
        _token: Option<u64>,
        _kind: AsyncKind,
        _class: &AsyncClass,
        _results: &[MiResult],
        _line: &[u8],
    ) {
    }

    /// A `^`-prefixed result record.
    fn on_result_record(&mut self, _record: &ResultRecord, _line: &[u8]) {}

    /// The literal `(gdb)` prompt line, passed through unparsed.
    fn on_prompt(&mut self, _line: &[u8]) {}

    /// A line that failed to parse: the raw line, the offending token text,
    /// and its 1-based, inclusive column span.
    fn on_parse_error(&mut self, _line: &[u8], _token: &str, _start_col: usize, _end_col: usize) {}
}

/// A `Callbacks` impl backed by a plain closure, for callers who don't
/// want to name a type just to observe output.
pub struct FnCallbacks<F>(pub F)
where
    F: FnMut(&Output);

impl<F> Callbacks for FnCallbacks<F>
where
    F: FnMut(&Output),
{
    fn on_output(&mut self, output: &Output) {
        (self.0)(output);
    }
}

/// Accumulates pushed bytes and emits one [`Output`] per complete line.
///
/// A line is terminated by `\n`, `\r`, or `\r\n`; the terminator itself is
/// consumed by the lexer as a single `Newline` token, so [`parser::parse_line`]
/// always sees it. Lines are dispatched in the order they complete, and a
/// malformed line yields `OutputKind::ParseError` rather than aborting the
/// stream — a parser failure on one line must never poison the lines that
/// follow.
pub struct Driver {
    buffer: StringBuffer,
    diag: DiagSink,
}

impl Driver {
    pub fn new() -> Self {
        Self { buffer: StringBuffer::new(), diag: DiagSink::from_env() }
    }

    /// Builds a driver with an explicit diagnostic sink, bypassing the
    /// environment — useful for tests that want deterministic stderr
    /// behavior.
    pub fn with_diag(diag: DiagSink) -> Self {
        Self { buffer: StringBuffer::new(), diag }
    }

    pub fn diag(&self) -> &DiagSink {
        &self.diag
    }

    /// Appends raw bytes, extracting and dispatching every complete line
    /// they complete. Bytes without a trailing terminator are retained in
    /// the internal buffer for the next call.
    pub fn push_bytes(&mut self, data: &[u8], callbacks: &mut dyn Callbacks) {
        if let Err(e) = self.buffer.append_bytes(data) {
            self.diag.error(format!("failed to buffer {} bytes: {e}", data.len()));
            return;
        }
        self.drain_complete_lines(callbacks);
    }

    /// Convenience wrapper over [`Driver::push_bytes`] for callers with a
    /// `&str` already in hand.
    pub fn push_str(&mut self, data: &str, callbacks: &mut dyn Callbacks) {
        self.push_bytes(data.as_bytes(), callbacks);
    }

    fn drain_complete_lines(&mut self, callbacks: &mut dyn Callbacks) {
        loop {
            let terminator_pos = self.buffer.find_first_of("\n\r");
            if terminator_pos >= self.buffer.size() {
                break;
            }

            let data = self.buffer.data();
            let consumed_len = if data[terminator_pos] == b'\r' && data.get(terminator_pos + 1) == Some(&b'\n') {
                terminator_pos + 2
            } else {
                terminator_pos + 1
            };

            let line: Vec<u8> = data[..consumed_len].to_vec();
            let output = parser::parse_line(&line);
            if let crate::output::OutputKind::ParseError { token, start_col, end_col } = &output.kind {
                self.diag.warn(format!(
                    "failed to parse line at column {start_col}-{end_col} near {token:?}: {}",
                    String::from_utf8_lossy(&output.line)
                ));
            }
            callbacks.on_output(&output);

            if let Err(e) = self.buffer.erase(0, consumed_len) {
                self.diag.error(format!("failed to advance buffer past consumed line: {e}"));
                break;
            }
        }
    }

    /// Bytes buffered but not yet forming a complete line.
    pub fn pending(&self) -> &[u8] {
        self.buffer.data()
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::output::OutputKind;

    #[derive(Default)]
    struct Collector {
        outputs: Vec<Output>,
    }

    impl Callbacks for Collector {
        fn on_output(&mut self, output: &Output) {
            self.outputs.push(output.clone());
        }
    }

    #[test]
    fn single_push_yields_one_output() {
        let mut driver = Driver::new();
        let mut collector = Collector::default();
        driver.push_str("^done\n", &mut collector);
        assert_eq!(collector.outputs.len(), 1);
        assert!(matches!(collector.outputs[0].kind, OutputKind::Result(_)));
    }

    #[test]
    fn chunked_newline_split_across_two_pushes() {
        let mut driver = Driver::new();
        let mut collector = Collector::default();
        driver.push_str("^do", &mut collector);
        assert!(collector.outputs.is_empty());
        driver.push_str("ne\n", &mut collector);
        assert_eq!(collector.outputs.len(), 1);
        assert!(matches!(collector.outputs[0].kind, OutputKind::Result(_)));
    }

    #[test]
    fn multiple_lines_in_one_push_dispatch_in_order() {
        let mut driver = Driver::new();
        let mut collector = Collector::default();
        driver.push_str("(gdb)\n~\"hi\\n\"\n^done\n", &mut collector);
        assert_eq!(collector.outputs.len(), 3);
        assert_eq!(collector.outputs[0].kind, OutputKind::Prompt);
        assert!(matches!(collector.outputs[1].kind, OutputKind::OutOfBand(_)));
        assert!(matches!(collector.outputs[2].kind, OutputKind::Result(_)));
    }

    #[test]
    fn bare_cr_terminates_a_line() {
        let mut driver = Driver::new();
        let mut collector = Collector::default();
        driver.push_str("^done\r", &mut collector);
        assert_eq!(collector.outputs.len(), 1);
    }

    #[test]
    fn parse_error_does_not_poison_subsequent_lines() {
        let mut driver = Driver::new();
        let mut collector = Collector::default();
        driver.push_str("###\n^done\n", &mut collector);
        assert_eq!(collector.outputs.len(), 2);
        assert!(matches!(collector.outputs[0].kind, OutputKind::ParseError { .. }));
        assert!(matches!(collector.outputs[1].kind, OutputKind::Result(_)));
    }

    #[test]
    fn pending_reflects_unterminated_trailing_bytes() {
        let mut driver = Driver::new();
        let mut collector = Collector::default();
        driver.push_str("^done\npartial", &mut collector);
        assert_eq!(driver.pending(), b"partial");
    }

    #[test]
    fn fn_callbacks_wraps_a_closure() {
        let mut driver = Driver::new();
        let mut seen = 0usize;
        let mut cb = FnCallbacks(|_output: &Output| seen += 1);
        driver.push_str("^done\n^done\n", &mut cb);
        assert_eq!(seen, 2);
    }

    #[derive(Default)]
    struct TypedCollector {
        streams: usize,
        asyncs: usize,
        results: usize,
        prompts: usize,
        parse_errors: usize,
    }

    impl Callbacks for TypedCollector {
        fn on_stream_record(&mut self, _kind: StreamKind, _data: &str, _line: &[u8]) {
            self.streams += 1;
        }
        fn on_async_record(
            &mut self,
            _token: Option<u64>,
            _kind: AsyncKind,
            _class: &AsyncClass,
            _results: &[MiResult],
            _line: &[u8],
        ) {
            self.asyncs += 1;
        }
        fn on_result_record(&mut self, _record: &ResultRecord, _line: &[u8]) {
            self.results += 1;
        }
        fn on_prompt(&mut self, _line: &[u8]) {
            self.prompts += 1;
        }
        fn on_parse_error(&mut self, _line: &[u8], _token: &str, _start_col: usize, _end_col: usize) {
            self.parse_errors += 1;
        }
    }

    #[test]
    fn default_on_output_dispatches_to_typed_methods() {
        let mut driver = Driver::new();
        let mut collector = TypedCollector::default();
        driver.push_str("(gdb)\n~\"hi\\n\"\n^done\n*stopped\n###\n", &mut collector);
        assert_eq!(collector.prompts, 1);
        assert_eq!(collector.streams, 1);
        assert_eq!(collector.results, 1);
        assert_eq!(collector.asyncs, 1);
        assert_eq!(collector.parse_errors, 1);
    }
}
