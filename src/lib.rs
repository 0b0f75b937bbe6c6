//! A streaming parser and command projector for the GDB/MI protocol.
//!
//! The crate has three layers, used together or separately:
//!
//! - [`lexer`] and [`parser`] turn one already-isolated line of MI text
//!   into a generic [`output::Output`] tree.
//! - [`driver`] owns the byte accumulation and line-splitting needed to
//!   turn an arbitrary, possibly chunked byte stream into a sequence of
//!   those `Output`s, dispatched through a [`driver::Callbacks`] impl.
//! - [`project`] turns the generic tree produced by a specific GDB/MI
//!   command into a typed Rust record (breakpoints, stack frames, source
//!   file listings) for callers who already know what they asked GDB for.
//!
//! Generating the MI commands sent *to* GDB, and spawning or otherwise
//! managing a GDB subprocess, are both out of scope for this crate.

pub mod diag;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod project;
pub mod string_buffer;

pub use driver::{Callbacks, Driver, FnCallbacks};
pub use error::{GdbMiError, GdbMiResult};
pub use output::{
    AsyncClass, AsyncKind, MiResult, MiValue, OutOfBandRecord, Output, OutputKind, ResultClass, ResultRecord,
    StreamKind,
};
pub use parser::parse_line;
pub use project::{interpret, CommandKind, Projected};
