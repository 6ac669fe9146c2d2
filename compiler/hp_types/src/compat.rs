//! Cast and assignment compatibility.
//!
//! The truthiness model is C-like: integer and boolean values always
//! convert to boolean; pointer and floating-point values do so only when
//! the boolean-context-conversion option is on.

use crate::{Ty, TypeCtx, TypeFormat};

/// Configuration consumed by the compatibility rules and the validator.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeOptions {
    /// Allow pointer and floating-point truthiness in boolean contexts.
    pub boolean_context_conversion: bool,
}

impl Default for TypeOptions {
    fn default() -> Self {
        TypeOptions {
            boolean_context_conversion: true,
        }
    }
}

impl TypeCtx {
    /// Check if a value of type `from` converts to `to` in a boolean
    /// context, honoring the boolean-context-conversion option.
    pub fn boolean_convertible(&self, from: Ty, options: &TypeOptions) -> bool {
        match self.format(from) {
            TypeFormat::Boolean
            | TypeFormat::SignedInt
            | TypeFormat::UnsignedInt
            | TypeFormat::GenericInt => true,
            TypeFormat::Pointer | TypeFormat::Float => options.boolean_context_conversion,
            TypeFormat::Void | TypeFormat::Class => false,
        }
    }

    /// Check if an implicit (or, with `explicit`, an explicit) conversion
    /// exists from `from` to `to`.
    pub fn can_cast_to(&self, from: Ty, to: Ty, explicit: bool, options: &TypeOptions) -> bool {
        let from = self.unqualified(from);
        let to = self.unqualified(to);

        // Same canonical instance: always convertible.
        if from == to {
            return true;
        }

        let from_format = self.format(from);
        let to_format = self.format(to);

        // Boolean destination: truthiness rules.
        if to == Ty::BOOL {
            return self.boolean_convertible(from, options);
        }

        match (from_format, to_format) {
            // Integer widths and signedness convert freely; float widening
            // is implicit, narrowing float to integer needs an explicit
            // cast.
            (f, t) if f.is_integer() && t.is_integer() => true,
            (f, TypeFormat::Float) if f.is_integer() => true,
            (TypeFormat::Float, TypeFormat::Float) => true,
            (TypeFormat::Float, t) if t.is_integer() => explicit,
            (TypeFormat::Boolean, t) if t.is_numeric() => explicit,

            // Pointer conversions: the null pointer converts to any
            // pointer implicitly; unrelated pointee types need an
            // explicit cast.
            (TypeFormat::Pointer, TypeFormat::Pointer) => {
                from == Ty::NULL || self.pointee(from) == self.pointee(to) || explicit
            }

            // Class compatibility is unresolved: conservatively
            // incompatible until a subtyping policy exists. Do not read
            // this as "classes are never convertible by design".
            (TypeFormat::Class, _) | (_, TypeFormat::Class) => false,

            _ => false,
        }
    }

    /// Check if assignment without an explicit cast is legal.
    ///
    /// Pointer-to-pointer assignment requires the source to be the null
    /// pointer or the pointee types to be the same canonical instance —
    /// there is no implicit pointer up/downcasting.
    pub fn can_assign_to(&self, from: Ty, to: Ty, options: &TypeOptions) -> bool {
        let from = self.unqualified(from);
        let to = self.unqualified(to);

        if from == to {
            return true;
        }

        if self.format(from) == TypeFormat::Pointer && self.format(to) == TypeFormat::Pointer {
            return from == Ty::NULL || self.pointee(from) == self.pointee(to);
        }

        self.can_cast_to(from, to, false, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> TypeOptions {
        TypeOptions {
            boolean_context_conversion: false,
        }
    }

    #[test]
    fn identity_is_always_compatible() {
        let ctx = TypeCtx::new();
        let opts = TypeOptions::default();
        assert!(ctx.can_cast_to(Ty::INT32, Ty::INT32, false, &opts));
        assert!(ctx.can_assign_to(Ty::FLOAT64, Ty::FLOAT64, &opts));
    }

    #[test]
    fn integer_and_bool_truthiness_is_unconditional() {
        let ctx = TypeCtx::new();
        for opts in [TypeOptions::default(), strict()] {
            assert!(ctx.can_cast_to(Ty::INT64, Ty::BOOL, false, &opts));
            assert!(ctx.can_cast_to(Ty::UINT8, Ty::BOOL, false, &opts));
            assert!(ctx.can_cast_to(Ty::INT, Ty::BOOL, false, &opts));
        }
    }

    #[test]
    fn pointer_and_float_truthiness_is_gated() {
        let ctx = TypeCtx::new();
        let ptr = ctx.pointer_to(Ty::INT32);

        let relaxed = TypeOptions::default();
        assert!(ctx.can_cast_to(ptr, Ty::BOOL, false, &relaxed));
        assert!(ctx.can_cast_to(Ty::FLOAT32, Ty::BOOL, false, &relaxed));

        let strict = strict();
        assert!(!ctx.can_cast_to(ptr, Ty::BOOL, false, &strict));
        assert!(!ctx.can_cast_to(Ty::FLOAT32, Ty::BOOL, false, &strict));
    }

    #[test]
    fn pointer_assignment_needs_null_or_equal_pointee() {
        let ctx = TypeCtx::new();
        let opts = TypeOptions::default();
        let p_int = ctx.pointer_to(Ty::INT32);
        let p_int2 = ctx.pointer_to(Ty::INT32);
        let p_long = ctx.pointer_to(Ty::INT64);

        assert!(ctx.can_assign_to(p_int, p_int2, &opts));
        assert!(ctx.can_assign_to(Ty::NULL, p_int, &opts));
        assert!(!ctx.can_assign_to(p_long, p_int, &opts));
        // Explicit cast may step around pointee equivalence.
        assert!(ctx.can_cast_to(p_long, p_int, true, &opts));
        assert!(!ctx.can_cast_to(p_long, p_int, false, &opts));
    }

    #[test]
    fn float_to_int_requires_explicit() {
        let ctx = TypeCtx::new();
        let opts = TypeOptions::default();
        assert!(!ctx.can_cast_to(Ty::FLOAT64, Ty::INT32, false, &opts));
        assert!(ctx.can_cast_to(Ty::FLOAT64, Ty::INT32, true, &opts));
        assert!(ctx.can_cast_to(Ty::INT32, Ty::FLOAT64, false, &opts));
    }

    #[test]
    fn class_compatibility_is_conservatively_false() {
        let ctx = TypeCtx::new();
        let interner = hp_ast::NameInterner::new();
        let opts = TypeOptions::default();
        let a = ctx.class_type(hp_ast::DeclId::from_raw(0), interner.intern("A"));
        let b = ctx.class_type(hp_ast::DeclId::from_raw(1), interner.intern("B"));

        assert!(!ctx.can_cast_to(a, b, true, &opts));
        assert!(!ctx.can_assign_to(a, b, &opts));
        // Identity still holds.
        assert!(ctx.can_assign_to(a, a, &opts));
    }

    #[test]
    fn qualifiers_are_transparent_to_compatibility() {
        let ctx = TypeCtx::new();
        let opts = TypeOptions::default();
        let const_int = ctx.qualified(hp_ast::TypeQualifiers::CONST, Ty::INT32);
        assert!(ctx.can_assign_to(const_int, Ty::INT32, &opts));
        assert!(ctx.can_assign_to(Ty::INT32, const_int, &opts));
    }
}
