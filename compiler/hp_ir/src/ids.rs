//! ID newtypes for IR entities.

use std::fmt;

macro_rules! ir_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an ID from a raw index.
            #[inline]
            pub fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw `u32` value.
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }

            /// Get the index as `usize` (for indexing into `Vec`s).
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

ir_id! {
    /// A value within one function. Values are allocated sequentially
    /// starting from 0 and index the function's value pool.
    ValueId, "v"
}

ir_id! {
    /// A basic block within one function.
    BlockId, "bb"
}

ir_id! {
    /// A function within one module.
    FuncId, "fn"
}

ir_id! {
    /// A mutable stack slot within one function.
    SlotId, "slot"
}

ir_id! {
    /// A mutable global within one module.
    GlobalId, "g"
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn debug_rendering_uses_prefixes() {
        assert_eq!(format!("{:?}", ValueId::new(3)), "v3");
        assert_eq!(format!("{:?}", BlockId::new(0)), "bb0");
        assert_eq!(format!("{:?}", FuncId::new(12)), "fn12");
        assert_eq!(format!("{:?}", SlotId::new(1)), "slot1");
    }
}
