//! Type system for the Human Plus compiler.
//!
//! - [`Ty`]: 32-bit canonical type handles; handle equality is semantic
//!   equality for interned kinds
//! - [`TypeCtx`]: the arena-with-registry canonicalization context,
//!   passed explicitly to all type-construction call sites
//! - [`TypeData`] / [`TypeFormat`]: structural data and the coarse
//!   classification behind the conversion rules
//! - Cast/assignment compatibility with the boolean-context gate

mod compat;
mod ctx;
mod data;
mod ty;

pub use compat::TypeOptions;
pub use ctx::TypeCtx;
pub use data::{TypeData, TypeFormat};
pub use ty::Ty;
