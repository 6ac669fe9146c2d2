//! Diagnostic system for the Human Plus compiler.
//!
//! Design principles:
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Primary span (where it went wrong)
//! - Secondary labels and notes (why it's wrong, related locations)
//!
//! Diagnostics batch into session-scoped [`Report`]s: the validator opens
//! a report per compilation unit, emits into it during traversal, and the
//! caller prints or inspects the closed report. Validation never throws —
//! failures surface only as collected diagnostics plus resigned nodes.

mod code;
mod diagnostic;
pub mod emitter;
mod engine;

pub use code::ErrorCode;
pub use diagnostic::{Diagnostic, Label, Severity};
pub use engine::{DiagnosticEngine, Report};
