//! Typed command projectors: turn a generic [`Output`]/[`MiResult`] tree
//! into the specific record shapes GDB's `-break-info`,
//! `-stack-info-frame`, `-file-list-exec-source-file`, and
//! `-file-list-exec-source-files` commands produce.
//!
//! Each function here is grounded line-for-line on a matching function in
//! the original implementation (`break_info_for_breakpoint`, `break_info`,
//! `stack_info_frame`, `file_list_exec_source_file`,
//! `file_list_exec_source_files`): same mandatory/optional field split,
//! same `<unavailable>` sentinel handling, same strict `"0"`/`"1"` check
//! on `macro-info`, same legacy-vs-modern multi-location breakpoint
//! handling. The non-owning parent/child breakpoint relationship is
//! realized here as an owned `String` copy of the parent's number rather
//! than a pointer — it must never be used to drive destruction, and a
//! plain `String` can't be used that way even by accident.

use crate::error::{mi_assert, mi_logic, GdbMiError, GdbMiResult};
use crate::output::{find, MiResult, Output, OutputKind};
use crate::parser;

/// Which typed command a line of output should be projected as, passed to
/// [`interpret`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    BreakInfo,
    StackInfoFrame,
    FileListExecSourceFile,
    FileListExecSourceFiles,
}

/// What happens to a breakpoint once its condition next triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointDisposition {
    Delete,
    DeleteNextStop,
    Disable,
    Keep,
    /// A disposition literal GDB emits that this enumeration doesn't name.
    Unknown,
}

fn map_disposition(literal: &str) -> BreakpointDisposition {
    match literal {
        "del" => BreakpointDisposition::Delete,
        "dstp" => BreakpointDisposition::DeleteNextStop,
        "dis" => BreakpointDisposition::Disable,
        "keep" => BreakpointDisposition::Keep,
        _ => BreakpointDisposition::Unknown,
    }
}

/// One breakpoint, watchpoint, or catchpoint as reported by `-break-info`.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoint {
    pub number: String,
    pub enabled: bool,
    pub address: Option<String>,
    /// Set when `addr` is the literal `<MULTIPLE>`: this breakpoint has
    /// per-location children reported separately (see `multi_breakpoints`).
    pub multi: bool,
    /// True when `addr` is the literal `<PENDING>`: the breakpoint's
    /// address is not yet known.
    pub pending: bool,
    pub catch_type: Option<String>,
    pub r#type: Option<String>,
    pub disposition: BreakpointDisposition,
    pub func_name: Option<String>,
    pub file: Option<String>,
    pub fullname: Option<String>,
    pub line: Option<u64>,
    pub times: Option<u64>,
    pub original_location: Option<String>,
    /// Per-location children of a multi-location breakpoint, present only
    /// when `multi` is set. Populated from the legacy shape where each
    /// location is its own sibling result tagged with the same dotted
    /// breakpoint number, and from the modern shape where each location is
    /// nested inside this breakpoint's own tuple under `locations` — both
    /// normalize to the same `Vec<Breakpoint>` here.
    pub multi_breakpoints: Vec<Breakpoint>,
    /// True if this breakpoint was itself a child entry produced by either
    /// multi-location format, as opposed to a top-level entry.
    pub from_multi_location: bool,
    /// The owning breakpoint's number, set only on a multi-location child.
    /// A plain owned copy, never a pointer: this crate has no destruction
    /// order to protect, so there is nothing for a dangling back-reference
    /// to corrupt.
    pub multi_breakpoint_number: Option<String>,
}

fn optional_string(result: Option<&MiResult>) -> GdbMiResult<Option<String>> {
    match result {
        None => Ok(None),
        Some(r) => Ok(Some(r.value.as_cstring().map(str::to_string).ok_or_else(|| {
            GdbMiError::Assert(format!("expected {:?} to be a c-string", r.variable))
        })?)),
    }
}

fn required_string(results: &[MiResult], key: &str) -> GdbMiResult<String> {
    let r = find(results, key);
    mi_assert!(r.is_some(), "missing mandatory field '{key}'");
    r.unwrap()
        .value
        .as_cstring()
        .map(str::to_string)
        .ok_or_else(|| GdbMiError::Assert(format!("field '{key}' is not a c-string")))
}

fn optional_u64(results: &[MiResult], key: &str) -> GdbMiResult<Option<u64>> {
    match find(results, key) {
        None => Ok(None),
        Some(r) => {
            let raw = r
                .value
                .as_cstring()
                .ok_or_else(|| GdbMiError::Assert(format!("field '{key}' is not a c-string")))?;
            let value = raw
                .parse::<u64>()
                .map_err(|_| GdbMiError::Logic(format!("field '{key}' is not a decimal integer: {raw:?}")))?;
            Ok(Some(value))
        }
    }
}

/// Projects a single breakpoint tuple's children, mirroring
/// `break_info_for_breakpoint`.
fn break_info_for_breakpoint(fields: &[MiResult]) -> GdbMiResult<Breakpoint> {
    let number = required_string(fields, "number")?;

    let enabled = find(fields, "enabled")
        .and_then(|r| r.value.as_cstring())
        .map(|s| s.starts_with('y'))
        .unwrap_or(false);

    let address = optional_string(find(fields, "addr"))?;
    let multi = address.as_deref() == Some("<MULTIPLE>");
    let pending = address.as_deref() == Some("<PENDING>");

    let catch_type = optional_string(find(fields, "catch-type"))?;
    let r#type = optional_string(find(fields, "type"))?;

    let disposition = match find(fields, "disp") {
        None => BreakpointDisposition::Keep,
        Some(r) => {
            let literal = r
                .value
                .as_cstring()
                .ok_or_else(|| GdbMiError::Assert("disp field is not a c-string".to_string()))?;
            map_disposition(literal)
        }
    };

    let func_name = optional_string(find(fields, "func"))?;
    let file = optional_string(find(fields, "file"))?;
    let fullname = optional_string(find(fields, "fullname"))?;
    let line = optional_u64(fields, "line")?;
    let times = optional_u64(fields, "times")?;
    let original_location = optional_string(find(fields, "original-location"))?;

    Ok(Breakpoint {
        number,
        enabled,
        address,
        multi,
        pending,
        catch_type,
        r#type,
        disposition,
        func_name,
        file,
        fullname,
        line,
        times,
        original_location,
        multi_breakpoints: Vec::new(),
        from_multi_location: false,
        multi_breakpoint_number: None,
    })
}

/// The `-break-info` / `-break-insert` typed result: a `BreakpointTable`
/// whose `body` list holds one tuple per breakpoint, mirroring
/// `break_info`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BreakInfo {
    pub breakpoints: Vec<Breakpoint>,
}

/// Projects a `^done,BreakpointTable={...}` result into [`BreakInfo`].
///
/// Per spec §4.5, the top-level result must be a tuple named
/// `BreakpointTable`; no alternate shape is accepted.
///
/// Two source formats are accepted for the `body` list's entries, per
/// spec §4.5: legacy GDBs report each location as its own sibling entry in
/// the `body` list, carrying the same `number` prefix (`"1.1"`, `"1.2"`,
/// ...) as its parent — and, per relaxation R2, those sibling entries are
/// often seen without their `bkpt=` label. Modern GDBs instead nest each
/// location inside the parent breakpoint's own tuple under a `locations`
/// list. Both shapes normalize to the same `multi_breakpoints` field here.
pub fn break_info(results: &[MiResult]) -> GdbMiResult<BreakInfo> {
    let table = find(results, "BreakpointTable");
    mi_assert!(table.is_some(), "expected a BreakpointTable result");
    let table_fields = table
        .unwrap()
        .value
        .as_tuple()
        .ok_or_else(|| GdbMiError::Assert("BreakpointTable is not a tuple".to_string()))?;
    let body = find(table_fields, "body").and_then(|b| b.value.as_list()).unwrap_or(&[]);

    let mut top_level = Vec::new();
    let mut children_by_parent: std::collections::HashMap<String, Vec<Breakpoint>> =
        std::collections::HashMap::new();

    for entry in body {
        let mut bp = project_bkpt_entry(entry)?;

        // Modern format: child locations are nested under this entry's own
        // `locations` list rather than appearing as siblings.
        if let Some(fields) = entry.value.as_tuple() {
            if let Some(locations) = find(fields, "locations").and_then(|l| l.value.as_list()) {
                for loc_entry in locations {
                    let loc_fields = loc_entry
                        .value
                        .as_tuple()
                        .ok_or_else(|| GdbMiError::Assert("location entry is not a tuple".to_string()))?;
                    let mut child = break_info_for_breakpoint(loc_fields)?;
                    child.from_multi_location = true;
                    child.multi_breakpoint_number = Some(bp.number.clone());
                    bp.multi_breakpoints.push(child);
                }
            }
        }

        if let Some(parent) = parent_number_of(&bp.number) {
            children_by_parent.entry(parent).or_default().push(bp);
        } else {
            top_level.push(bp);
        }
    }

    // Legacy format: attach siblings whose number is a dotted child of a
    // top-level breakpoint's number (e.g. parent "1", child "1.2").
    for bp in &mut top_level {
        if let Some(mut children) = children_by_parent.remove(&bp.number) {
            for child in &mut children {
                child.from_multi_location = true;
                child.multi_breakpoint_number = Some(bp.number.clone());
            }
            bp.multi = true;
            bp.multi_breakpoints.append(&mut children);
        }
    }

    Ok(BreakInfo { breakpoints: top_level })
}

fn project_bkpt_entry(entry: &MiResult) -> GdbMiResult<Breakpoint> {
    let fields = entry
        .value
        .as_tuple()
        .ok_or_else(|| GdbMiError::Assert("breakpoint entry is not a tuple".to_string()))?;
    break_info_for_breakpoint(fields)
}

/// Splits `"1.2"` into parent `"1"`; returns `None` for a bare `"1"`.
fn parent_number_of(number: &str) -> Option<String> {
    number.split_once('.').map(|(major, _)| major.to_string())
}

/// A single stack frame as reported by `-stack-info-frame` and related
/// commands, mirroring `stack_info_frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct StackFrame {
    pub level: u64,
    /// `None` when GDB reports the literal `<unavailable>` sentinel
    /// instead of a hex address.
    pub address: Option<String>,
    pub func: Option<String>,
    pub file: Option<String>,
    pub fullname: Option<String>,
    pub from: Option<String>,
    /// Zero when the field is absent, matching the original's "line" being
    /// read with `atoi` against a possibly-missing field.
    pub line: u64,
}

/// Projects a `^done,frame={...}` result into [`StackFrame`].
pub fn stack_info_frame(results: &[MiResult]) -> GdbMiResult<StackFrame> {
    let frame = find(results, "frame")
        .ok_or_else(|| GdbMiError::Logic("expected a frame result".to_string()))?;
    let fields = frame
        .value
        .as_tuple()
        .ok_or_else(|| GdbMiError::Assert("frame is not a tuple".to_string()))?;

    let level = required_string(fields, "level")?
        .parse::<u64>()
        .map_err(|_| GdbMiError::Logic("level field is not a decimal integer".to_string()))?;

    let address = match find(fields, "addr").and_then(|r| r.value.as_cstring()) {
        Some("<unavailable>") | None => None,
        Some(addr) => Some(addr.to_string()),
    };

    let func = optional_string(find(fields, "func"))?;
    let file = optional_string(find(fields, "file"))?;
    let fullname = optional_string(find(fields, "fullname"))?;
    let from = optional_string(find(fields, "from"))?;
    let line = optional_u64(fields, "line")?.unwrap_or(0);

    Ok(StackFrame { level, address, func, file, fullname, from, line })
}

/// A single source file entry within a `-file-list-exec-source-files`
/// response.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub file: String,
    pub fullname: Option<String>,
    /// `None` when GDB omits `debug-fully-read` rather than emitting
    /// `"true"`/`"false"`.
    pub debug_fully_read: Option<bool>,
}

/// Projects a `^done,file="...",fullname="...",line="..."[,macro-info="0"|"1"]`
/// result, mirroring `file_list_exec_source_file`. Only `file` and `line`
/// are mandatory; `fullname` and `macro-info` are both optional per spec
/// §4.5.
#[derive(Debug, Clone, PartialEq)]
pub struct FileListExecSourceFile {
    pub file: String,
    pub fullname: Option<String>,
    pub line: u64,
    /// The decoded `macro-info` value, meaningful only when
    /// `macro_info_exists` is set.
    pub macro_info: bool,
    /// Whether GDB included a `macro-info` field at all.
    pub macro_info_exists: bool,
}

pub fn file_list_exec_source_file(results: &[MiResult]) -> GdbMiResult<FileListExecSourceFile> {
    let file = required_string(results, "file")?;
    let fullname = optional_string(find(results, "fullname"))?;
    let line = required_string(results, "line")?
        .parse::<u64>()
        .map_err(|_| GdbMiError::Logic("line field is not a decimal integer".to_string()))?;

    let (macro_info, macro_info_exists) = match optional_string(find(results, "macro-info"))? {
        None => (false, false),
        Some(literal) => match literal.as_str() {
            "0" => (false, true),
            "1" => (true, true),
            other => mi_logic!("macro-info must be exactly \"0\" or \"1\", got {other:?}"),
        },
    };

    Ok(FileListExecSourceFile { file, fullname, line, macro_info, macro_info_exists })
}

/// Projects a `^done,files=[...]` result, mirroring
/// `file_list_exec_source_files`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileListExecSourceFiles {
    pub files: Vec<SourceFile>,
}

pub fn file_list_exec_source_files(results: &[MiResult]) -> GdbMiResult<FileListExecSourceFiles> {
    let files_list = find(results, "files")
        .and_then(|r| r.value.as_list())
        .ok_or_else(|| GdbMiError::Logic("expected a files list".to_string()))?;

    let mut files = Vec::with_capacity(files_list.len());
    for entry in files_list {
        let fields = entry
            .value
            .as_tuple()
            .ok_or_else(|| GdbMiError::Assert("files entry is not a tuple".to_string()))?;
        let file = required_string(fields, "file")?;
        let fullname = optional_string(find(fields, "fullname"))?;
        let debug_fully_read = match find(fields, "debug-fully-read").and_then(|r| r.value.as_cstring()) {
            None => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => mi_logic!("debug-fully-read must be \"true\" or \"false\", got {other:?}"),
        };
        files.push(SourceFile { file, fullname, debug_fully_read });
    }

    Ok(FileListExecSourceFiles { files })
}

/// The typed projection result for each [`CommandKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Projected {
    BreakInfo(BreakInfo),
    StackInfoFrame(StackFrame),
    FileListExecSourceFile(FileListExecSourceFile),
    FileListExecSourceFiles(FileListExecSourceFiles),
}

/// Parses `line` and projects its single result record as `kind` in one
/// call, for callers who already know which command they issued and just
/// want the typed answer back.
///
/// Fails with [`GdbMiError::Logic`] if `line` does not parse to exactly
/// one result record — an out-of-band record, a prompt, or a parse error
/// are all rejected here, since none of them carry the result-list a
/// projection needs.
pub fn interpret(line: &str, kind: CommandKind) -> GdbMiResult<Projected> {
    let output: Output = parser::parse_line(line.as_bytes());
    let results = match &output.kind {
        OutputKind::Result(r) => &r.results,
        OutputKind::ParseError { token, start_col, end_col } => {
            mi_logic!("line failed to parse at column {start_col}-{end_col} near {token:?}")
        }
        _ => mi_logic!("expected a result record, got {:?}", output.kind),
    };

    match kind {
        CommandKind::BreakInfo => break_info(results).map(Projected::BreakInfo),
        CommandKind::StackInfoFrame => stack_info_frame(results).map(Projected::StackInfoFrame),
        CommandKind::FileListExecSourceFile => {
            file_list_exec_source_file(results).map(Projected::FileListExecSourceFile)
        }
        CommandKind::FileListExecSourceFiles => {
            file_list_exec_source_files(results).map(Projected::FileListExecSourceFiles)
        }
    }
}
