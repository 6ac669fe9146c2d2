//! Lowering pass: validated AST in, basic-block IR out.
//!
//! See [`lower_unit`] for the entry point and the structural rules the
//! produced IR obeys.

mod lower;

pub use lower::lower_unit;

#[cfg(test)]
mod tests;
