//! Semantic validation for Human Plus compilation units.
//!
//! The entry point is [`validate_unit`]: a single tree walk that
//! resolves names, computes evaluation types, and checks every
//! declaration, statement, and expression against the type rules.
//! Validation is error tolerant. A failed check resigns the offending
//! node and keeps walking, so a single pass reports every independent
//! problem in the unit.
//!
//! Downstream passes consume the [`SemaOutput`] side tables rather than
//! re-deriving types; lowering refuses any tree whose root did not pass.

mod output;
mod resolver;
mod validate;

pub use output::{FnSig, SemaOutput, ValidationResult};
pub use resolver::SymbolResolver;
pub use validate::validate_unit;
