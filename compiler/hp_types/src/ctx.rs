//! Type registry and canonicalization.
//!
//! `TypeCtx` owns every type in a compilation context: an append-only
//! arena of [`TypeData`] plus an intern map for canonicalized kinds.
//! There is no hidden global table — call sites receive the context
//! explicitly, and independent compilation contexts get independent
//! registries.
//!
//! # Interning rules
//!
//! - Builtins are pre-interned at the fixed [`Ty`] indices.
//! - `pointer_to(T)` returns the same handle for the same pointee `T`,
//!   unless `T` itself carries a qualifier: then every call allocates a
//!   fresh non-deduplicated entry, so qualifier state is never aliased
//!   through the intern map.
//! - Class types are canonical per declaration: one `Ty` per `DeclId`.
//!
//! # Thread safety
//!
//! The registry is the only shared mutable state across passes; a single
//! `RwLock` serializes writers, so one context can serve multiple units
//! if a future driver compiles them concurrently.

use hp_ast::{BuiltinTy, DeclId, Name, NameInterner, TypeQualifiers};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{Ty, TypeData, TypeFormat};

struct CtxInner {
    /// Map from canonicalized type data to its index.
    map: FxHashMap<TypeData, u32>,
    /// Storage for all type data, indexed by `Ty`.
    data: Vec<TypeData>,
}

/// Process-scoped type registry.
pub struct TypeCtx {
    inner: RwLock<CtxInner>,
}

impl TypeCtx {
    /// Create a registry with builtins pre-interned at fixed indices.
    pub fn new() -> Self {
        // Order must match the `Ty` constants.
        let builtins = [
            TypeData::Void,    // 0 = Ty::VOID
            TypeData::Bool,    // 1 = Ty::BOOL
            TypeData::Int8,    // 2
            TypeData::Int16,   // 3
            TypeData::Int32,   // 4
            TypeData::Int64,   // 5
            TypeData::UInt8,   // 6
            TypeData::UInt16,  // 7
            TypeData::UInt32,  // 8
            TypeData::UInt64,  // 9
            TypeData::Int,     // 10 = Ty::INT
            TypeData::Float32, // 11
            TypeData::Float64, // 12
            TypeData::Null,    // 13 = Ty::NULL
        ];

        let mut inner = CtxInner {
            map: FxHashMap::default(),
            data: Vec::with_capacity(64),
        };
        for (idx, data) in builtins.into_iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let idx = idx as u32;
            inner.map.insert(data.clone(), idx);
            inner.data.push(data);
        }

        TypeCtx {
            inner: RwLock::new(inner),
        }
    }

    /// Intern a type, returning its canonical handle.
    ///
    /// # Panics
    /// Panics if the registry exceeds `u32::MAX` types.
    pub fn intern(&self, data: TypeData) -> Ty {
        // Fast path: already interned.
        {
            let guard = self.inner.read();
            if let Some(&idx) = guard.map.get(&data) {
                return Ty::from_raw(idx);
            }
        }

        let mut guard = self.inner.write();
        if let Some(&idx) = guard.map.get(&data) {
            return Ty::from_raw(idx);
        }

        let idx = Self::push_raw(&mut guard, data.clone());
        guard.map.insert(data, idx.raw());
        tracing::trace!(ty = ?idx, "interned type");
        idx
    }

    /// Allocate a fresh, non-deduplicated entry.
    fn fresh(&self, data: TypeData) -> Ty {
        let mut guard = self.inner.write();
        Self::push_raw(&mut guard, data)
    }

    fn push_raw(inner: &mut CtxInner, data: TypeData) -> Ty {
        let Ok(idx) = u32::try_from(inner.data.len()) else {
            panic!("type registry exceeded u32::MAX types");
        };
        inner.data.push(data);
        Ty::from_raw(idx)
    }

    /// Look up the data behind a handle.
    ///
    /// # Panics
    /// Panics if the handle was not created by this registry.
    pub fn lookup(&self, ty: Ty) -> TypeData {
        self.inner.read().data[ty.raw() as usize].clone()
    }

    // ── Constructors ────────────────────────────────────────────────

    /// The canonical handle for a builtin keyword.
    pub fn builtin(&self, builtin: BuiltinTy) -> Ty {
        match builtin {
            BuiltinTy::Void => Ty::VOID,
            BuiltinTy::Bool => Ty::BOOL,
            BuiltinTy::Int8 => Ty::INT8,
            BuiltinTy::Int16 => Ty::INT16,
            BuiltinTy::Int32 => Ty::INT32,
            BuiltinTy::Int64 => Ty::INT64,
            BuiltinTy::UInt8 => Ty::UINT8,
            BuiltinTy::UInt16 => Ty::UINT16,
            BuiltinTy::UInt32 => Ty::UINT32,
            BuiltinTy::UInt64 => Ty::UINT64,
            BuiltinTy::Int => Ty::INT,
            BuiltinTy::Float32 => Ty::FLOAT32,
            BuiltinTy::Float64 => Ty::FLOAT64,
        }
    }

    /// Pointer to `pointee`.
    ///
    /// Interned per pointee, except when the pointee carries a qualifier:
    /// then a fresh instance is allocated on every call.
    pub fn pointer_to(&self, pointee: Ty) -> Ty {
        let pointee_is_qualified = matches!(self.lookup(pointee), TypeData::Qualified { .. });
        if pointee_is_qualified {
            tracing::trace!(?pointee, "fresh pointer type for qualified pointee");
            self.fresh(TypeData::Pointer { pointee })
        } else {
            self.intern(TypeData::Pointer { pointee })
        }
    }

    /// Qualified form of `inner`. Empty qualifier sets collapse to the
    /// inner type itself; stacked qualifiers merge into one wrapper.
    pub fn qualified(&self, quals: TypeQualifiers, inner: Ty) -> Ty {
        if quals.is_empty() {
            return inner;
        }
        if let TypeData::Qualified {
            quals: prior,
            inner: base,
        } = self.lookup(inner)
        {
            return self.intern(TypeData::Qualified {
                quals: quals | prior,
                inner: base,
            });
        }
        self.intern(TypeData::Qualified { quals, inner })
    }

    /// The canonical class type for a class declaration.
    pub fn class_type(&self, decl: DeclId, name: Name) -> Ty {
        self.intern(TypeData::Class { decl, name })
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Strip qualifier wrappers.
    pub fn unqualified(&self, ty: Ty) -> Ty {
        match self.lookup(ty) {
            TypeData::Qualified { inner, .. } => self.unqualified(inner),
            _ => ty,
        }
    }

    /// Format classification, looking through qualifiers.
    pub fn format(&self, ty: Ty) -> TypeFormat {
        let mut cursor = ty;
        loop {
            match self.lookup(cursor).shallow_format() {
                Some(format) => return format,
                None => cursor = self.unqualified(cursor),
            }
        }
    }

    /// Pointee of a pointer type, `None` for anything else (including
    /// the untyped null pointer).
    pub fn pointee(&self, ty: Ty) -> Option<Ty> {
        match self.lookup(self.unqualified(ty)) {
            TypeData::Pointer { pointee } => Some(pointee),
            _ => None,
        }
    }

    /// Display string for diagnostics.
    pub fn display(&self, ty: Ty, interner: &NameInterner) -> String {
        match self.lookup(ty) {
            TypeData::Pointer { pointee } => format!("*{}", self.display(pointee, interner)),
            TypeData::Class { name, .. } => interner.lookup(name).to_owned(),
            TypeData::Qualified { quals, inner } => {
                let mut out = String::new();
                if quals.contains(TypeQualifiers::CONST) {
                    out.push_str("const ");
                }
                if quals.contains(TypeQualifiers::VOLATILE) {
                    out.push_str("volatile ");
                }
                out.push_str(&self.display(inner, interner));
                out
            }
            _ => ty.builtin_name().unwrap_or("<type>").to_owned(),
        }
    }

    /// Number of registered types (builtins included).
    pub fn len(&self) -> usize {
        self.inner.read().data.len()
    }

    /// Check if only builtins are registered.
    pub fn is_empty(&self) -> bool {
        self.len() <= Ty::BUILTIN_COUNT as usize
    }
}

impl Default for TypeCtx {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtins_are_pre_interned_at_fixed_indices() {
        let ctx = TypeCtx::new();
        assert_eq!(ctx.intern(TypeData::Void), Ty::VOID);
        assert_eq!(ctx.intern(TypeData::Int32), Ty::INT32);
        assert_eq!(ctx.intern(TypeData::Null), Ty::NULL);
        assert!(ctx.is_empty());
    }

    #[test]
    fn pointer_interning_same_pointee_same_handle() {
        let ctx = TypeCtx::new();
        let a = ctx.pointer_to(Ty::INT32);
        let b = ctx.pointer_to(Ty::INT32);
        assert_eq!(a, b, "pointer to unqualified type is interned");

        let other = ctx.pointer_to(Ty::INT64);
        assert_ne!(a, other);
    }

    #[test]
    fn pointer_to_qualified_pointee_is_fresh_per_call() {
        let ctx = TypeCtx::new();
        let const_int = ctx.qualified(TypeQualifiers::CONST, Ty::INT32);
        let a = ctx.pointer_to(const_int);
        let b = ctx.pointer_to(const_int);
        assert_ne!(a, b, "qualifier-bearing pointees get fresh pointer instances");

        // Both still point at the same pointee.
        assert_eq!(ctx.pointee(a), Some(const_int));
        assert_eq!(ctx.pointee(b), Some(const_int));
    }

    #[test]
    fn empty_qualifier_collapses() {
        let ctx = TypeCtx::new();
        assert_eq!(ctx.qualified(TypeQualifiers::empty(), Ty::BOOL), Ty::BOOL);
    }

    #[test]
    fn stacked_qualifiers_merge() {
        let ctx = TypeCtx::new();
        let c = ctx.qualified(TypeQualifiers::CONST, Ty::INT32);
        let cv = ctx.qualified(TypeQualifiers::VOLATILE, c);
        let TypeData::Qualified { quals, inner } = ctx.lookup(cv) else {
            panic!("expected qualified type");
        };
        assert_eq!(quals, TypeQualifiers::CONST | TypeQualifiers::VOLATILE);
        assert_eq!(inner, Ty::INT32);
    }

    #[test]
    fn class_type_is_canonical_per_decl() {
        let ctx = TypeCtx::new();
        let interner = NameInterner::new();
        let name = interner.intern("Point");
        let decl = DeclId::from_raw(7);
        assert_eq!(ctx.class_type(decl, name), ctx.class_type(decl, name));
    }

    #[test]
    fn format_looks_through_qualifiers() {
        let ctx = TypeCtx::new();
        let const_float = ctx.qualified(TypeQualifiers::CONST, Ty::FLOAT64);
        assert_eq!(ctx.format(const_float), TypeFormat::Float);
        assert_eq!(ctx.format(Ty::NULL), TypeFormat::Pointer);
        assert_eq!(ctx.format(Ty::UINT8), TypeFormat::UnsignedInt);
        assert_eq!(ctx.format(Ty::INT), TypeFormat::GenericInt);
    }

    #[test]
    fn display_renders_nested_types() {
        let ctx = TypeCtx::new();
        let interner = NameInterner::new();
        let const_int = ctx.qualified(TypeQualifiers::CONST, Ty::INT32);
        let ptr = ctx.pointer_to(const_int);
        assert_eq!(ctx.display(ptr, &interner), "*const int32");
    }
}
