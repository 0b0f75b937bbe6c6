//! The generic MI syntax tree: the `Output` produced by parsing one line,
//! and the `Result`/`Tuple`/`List` value tree nested inside it.
//!
//! This is a tagged union in the sense spec §9 calls for — "the `kind`
//! field and the `variant` payload collapse into one discriminated type in
//! the target language" — realized here as ordinary Rust enums rather than
//! the original's `kind` tag plus `union variant`. Children are owned
//! `Vec<MiResult>` rather than an intrusive `next`-linked list: spec §9's
//! redesign note explicitly sanctions this ("prefer owned ordered
//! sequences for children... so long as iteration order is preserved"),
//! and `Vec` preserves insertion order by construction, which is why this
//! tree does not reach for `serde_json::Value` (whose `Object` variant,
//! without the `preserve_order` feature, does not).

/// A key/value node in the MI tree. The key (`variable`) may be absent:
/// strict MI requires tuple members to carry one, but real GDB output
/// sometimes omits it (see [`crate::parser`] relaxation R1), and list
/// members never carry one.
#[derive(Debug, Clone, PartialEq)]
pub struct MiResult {
    pub variable: Option<String>,
    pub value: MiValue,
}

impl MiResult {
    pub fn new(variable: Option<String>, value: MiValue) -> Self {
        Self { variable, value }
    }
}

/// The three shapes a [`MiResult`]'s value can take.
#[derive(Debug, Clone, PartialEq)]
pub enum MiValue {
    /// An already-unescaped string payload.
    CString(String),
    /// A keyed group delimited by `{}` whose children are themselves
    /// [`MiResult`]s (normally keyed, but see relaxation R1).
    Tuple(Vec<MiResult>),
    /// An ordered group delimited by `[]` whose children are typically
    /// unkeyed [`MiResult`]s.
    List(Vec<MiResult>),
}

impl MiValue {
    pub fn as_cstring(&self) -> Option<&str> {
        match self {
            MiValue::CString(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[MiResult]> {
        match self {
            MiValue::Tuple(children) => Some(children),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[MiResult]> {
        match self {
            MiValue::List(children) => Some(children),
            _ => None,
        }
    }
}

/// Looks up the first child in `results` with the given key. Used
/// throughout [`crate::project`] the way the original walks its
/// `next`-linked chain looking for a matching `variable`.
pub fn find<'a>(results: &'a [MiResult], key: &str) -> Option<&'a MiResult> {
    results.iter().find(|r| r.variable.as_deref() == Some(key))
}

/// The closed set of result-class literals a `^`-prefixed line can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultClass {
    Done,
    Running,
    Connected,
    Error,
    Exit,
    /// Forward-compatibility bucket for any literal GDB emits that this
    /// enumeration doesn't name; the literal is preserved.
    Unsupported(String),
}

/// The closed set of async-class literals an async out-of-band record can
/// carry, per spec §4.3. Unknown literals map to `Unsupported`, preserving
/// the original text, per spec §9's open question about forward
/// compatibility with future GDB versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncClass {
    Download,
    Stopped,
    Running,
    ThreadGroupAdded,
    ThreadGroupRemoved,
    ThreadGroupStarted,
    ThreadGroupExited,
    ThreadCreated,
    ThreadExited,
    ThreadSelected,
    LibraryLoaded,
    LibraryUnloaded,
    TraceframeChanged,
    TsvCreated,
    TsvModified,
    TsvDeleted,
    BreakpointCreated,
    BreakpointModified,
    BreakpointDeleted,
    RecordStarted,
    RecordStopped,
    CmdParamChanged,
    MemoryChanged,
    Unsupported(String),
}

/// Which punctuation introduced an async record: `*` (exec), `+`
/// (status), or `=` (notify).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncKind {
    Exec,
    Status,
    Notify,
}

/// Which punctuation introduced a stream record: `~` (console), `@`
/// (target), or `&` (log).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Console,
    Target,
    Log,
}

/// A line that begins with `^`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// The caller-supplied numeric token prefixed on the originating MI
    /// command, if any. Documented as reserved for async records and
    /// omitted by modern GDB, but always meaningful for result records.
    pub token: Option<u64>,
    pub class: ResultClass,
    pub results: Vec<MiResult>,
}

/// A line not directly answering a request: either an async state-change
/// notification or a console/target/log text stream.
#[derive(Debug, Clone, PartialEq)]
pub enum OutOfBandRecord {
    Async {
        token: Option<u64>,
        kind: AsyncKind,
        class: AsyncClass,
        results: Vec<MiResult>,
    },
    Stream { kind: StreamKind, data: String },
}

/// The top-level result of parsing one MI line.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    /// The original line bytes, kept for diagnostics regardless of kind.
    pub line: Vec<u8>,
    pub kind: OutputKind,
}

/// The variant payload of an [`Output`], one per recognized line shape.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputKind {
    OutOfBand(OutOfBandRecord),
    Result(ResultRecord),
    /// The literal `(gdb)` prompt line.
    Prompt,
    /// A line that failed to parse. Retains the offending token text and
    /// its 1-based, inclusive column span.
    ParseError { token: String, start_col: usize, end_col: usize },
}

impl Output {
    pub fn out_of_band(line: Vec<u8>, record: OutOfBandRecord) -> Self {
        Self { line, kind: OutputKind::OutOfBand(record) }
    }

    pub fn result(line: Vec<u8>, record: ResultRecord) -> Self {
        Self { line, kind: OutputKind::Result(record) }
    }

    pub fn prompt(line: Vec<u8>) -> Self {
        Self { line, kind: OutputKind::Prompt }
    }

    pub fn parse_error(line: Vec<u8>, token: String, start_col: usize, end_col: usize) -> Self {
        Self { line, kind: OutputKind::ParseError { token, start_col, end_col } }
    }
}
