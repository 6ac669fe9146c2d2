//! Modules and the module builder.
//!
//! Functions are declared before they are defined, so call sites can
//! reference a `FuncId` for a callee whose body has not been lowered
//! yet. Finalization attaches the module identifier and refuses
//! declared-but-undefined functions.

use hp_ast::Name;
use rustc_hash::FxHashMap;

use crate::{Const, FuncBuilder, FuncId, Function, GlobalId, IrType};

/// A module-level mutable global. Zero-initialized unless `init` is
/// present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Global {
    pub name: Name,
    pub ty: IrType,
    pub init: Option<Const>,
}

/// A finished IR module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrModule {
    /// Module identifier carried into emitted artifacts.
    pub ident: String,
    pub globals: Vec<Global>,
    pub funcs: Vec<Function>,
}

impl IrModule {
    pub fn func(&self, id: FuncId) -> &Function {
        &self.funcs[id.index()]
    }

    pub fn func_count(&self) -> usize {
        self.funcs.len()
    }
}

/// Declared function signature, kept until the body arrives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: Name,
    pub params: Vec<IrType>,
    pub ret: IrType,
}

/// Builder for one module.
pub struct ModuleBuilder {
    decls: Vec<FuncDecl>,
    defs: Vec<Option<Function>>,
    by_name: FxHashMap<Name, FuncId>,
    globals: Vec<Global>,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        ModuleBuilder {
            decls: Vec::new(),
            defs: Vec::new(),
            by_name: FxHashMap::default(),
            globals: Vec::new(),
        }
    }

    /// Reserve a module-level global.
    pub fn declare_global(&mut self, name: Name, ty: IrType, init: Option<Const>) -> GlobalId {
        let Ok(raw) = u32::try_from(self.globals.len()) else {
            panic!("module exceeded u32::MAX globals");
        };
        self.globals.push(Global { name, ty, init });
        GlobalId::new(raw)
    }

    pub fn global_type(&self, id: GlobalId) -> IrType {
        self.globals[id.index()].ty
    }

    /// Declare a function, reserving its ID.
    ///
    /// # Panics
    /// Panics if the name was already declared.
    pub fn declare_func(&mut self, name: Name, params: Vec<IrType>, ret: IrType) -> FuncId {
        let Ok(raw) = u32::try_from(self.decls.len()) else {
            panic!("module exceeded u32::MAX functions");
        };
        let id = FuncId::new(raw);
        let prior = self.by_name.insert(name, id);
        assert!(prior.is_none(), "function declared twice");
        tracing::trace!(func = ?id, "declare function");
        self.decls.push(FuncDecl { name, params, ret });
        self.defs.push(None);
        id
    }

    /// Look up a previously declared function by name.
    pub fn lookup(&self, name: Name) -> Option<FuncId> {
        self.by_name.get(&name).copied()
    }

    pub fn decl(&self, id: FuncId) -> &FuncDecl {
        &self.decls[id.index()]
    }

    /// Start building the body for a declared function.
    pub fn body_builder(&self, id: FuncId) -> FuncBuilder {
        let decl = self.decl(id);
        FuncBuilder::new(decl.name, decl.params.clone(), decl.ret)
    }

    /// Install a finished body.
    ///
    /// # Panics
    /// Panics if the function already has a body.
    pub fn define_func(&mut self, id: FuncId, func: Function) {
        let slot = &mut self.defs[id.index()];
        assert!(slot.is_none(), "function {id:?} defined twice");
        *slot = Some(func);
    }

    pub fn is_defined(&self, id: FuncId) -> bool {
        self.defs[id.index()].is_some()
    }

    /// Seal the module under `ident`.
    ///
    /// # Panics
    /// Panics if any declared function has no body.
    pub fn finalize(self, ident: impl Into<String>) -> IrModule {
        let funcs: Vec<Function> = self
            .defs
            .into_iter()
            .enumerate()
            .map(|(idx, def)| match def {
                Some(func) => func,
                None => panic!("function fn{idx} declared but never defined"),
            })
            .collect();
        IrModule {
            ident: ident.into(),
            globals: self.globals,
            funcs,
        }
    }
}

impl Default for ModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Terminator;
    use hp_ast::NameInterner;
    use pretty_assertions::assert_eq;

    #[test]
    fn declare_then_define_round_trips() {
        let interner = NameInterner::new();
        let mut module = ModuleBuilder::new();
        let name = interner.intern("main");
        let id = module.declare_func(name, vec![], IrType::Void);
        assert_eq!(module.lookup(name), Some(id));
        assert!(!module.is_defined(id));

        let mut body = module.body_builder(id);
        let entry = body.new_block();
        body.set_insertion_point(entry);
        body.terminate(Terminator::Return { value: None });
        module.define_func(id, body.finish());
        assert!(module.is_defined(id));

        let ir = module.finalize("unit");
        assert_eq!(ir.ident, "unit");
        assert_eq!(ir.func_count(), 1);
        assert_eq!(ir.func(id).name, name);
    }

    #[test]
    #[should_panic(expected = "declared but never defined")]
    fn finalize_rejects_missing_bodies() {
        let interner = NameInterner::new();
        let mut module = ModuleBuilder::new();
        module.declare_func(interner.intern("ghost"), vec![], IrType::Void);
        let _ = module.finalize("unit");
    }
}
