//! Scope-aware symbol resolution.
//!
//! A `SymbolResolver` is bound to one AST for the duration of a
//! validation session. Declaration scopes (namespaces, classes,
//! protocols) form a stack driven by `switch_to`/`switch_to_container`;
//! lookups always reflect the innermost active scope. Scope switches must
//! be strictly paired — the validator checks the balance when the session
//! closes, including on early-exit error paths.
//!
//! Local (statement-level) bindings live in separate frames pushed per
//! block, so variable shadowing and same-scope redefinition detection
//! stay independent of the declaration-scope stack.

use hp_ast::{Ast, DeclId, Name, Symbol};
use rustc_hash::FxHashMap;

/// Scoped name resolver bound to an AST.
pub struct SymbolResolver<'a> {
    ast: &'a Ast,
    /// Declaration scope stack, innermost last. Index 0 is the root
    /// namespace.
    scopes: Vec<DeclId>,
    /// Local binding frames, innermost last.
    locals: Vec<FxHashMap<Name, DeclId>>,
}

impl<'a> SymbolResolver<'a> {
    /// Bind a resolver to an AST, rooted at the given namespace.
    pub fn new(ast: &'a Ast, root: DeclId) -> Self {
        SymbolResolver {
            ast,
            scopes: vec![root],
            locals: Vec::new(),
        }
    }

    // ── Scope management ────────────────────────────────────────────

    /// Enter a declaration scope. Must be paired with a later
    /// `switch_to_container`.
    pub fn switch_to(&mut self, scope: DeclId) {
        debug_assert!(
            self.ast.decl(scope).is_scope(),
            "switch_to on a non-scope declaration"
        );
        self.scopes.push(scope);
    }

    /// Leave the innermost declaration scope.
    ///
    /// # Panics
    /// Panics if only the root scope remains — an unbalanced pairing is
    /// a validator bug.
    pub fn switch_to_container(&mut self) {
        assert!(
            self.scopes.len() > 1,
            "switch_to_container would pop the root scope"
        );
        self.scopes.pop();
    }

    /// Current scope nesting depth (root = 1).
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// The innermost active scope.
    pub fn current_scope(&self) -> DeclId {
        *self
            .scopes
            .last()
            .unwrap_or_else(|| unreachable!("scope stack never empties below the root"))
    }

    // ── Local frames ────────────────────────────────────────────────

    /// Push a fresh local binding frame (entering a block or function).
    pub fn push_locals(&mut self) {
        self.locals.push(FxHashMap::default());
    }

    /// Pop the innermost local frame.
    ///
    /// # Panics
    /// Panics if no frame is open.
    pub fn pop_locals(&mut self) {
        let popped = self.locals.pop();
        assert!(popped.is_some(), "pop_locals with no open frame");
    }

    /// Number of open local frames.
    pub fn local_depth(&self) -> usize {
        self.locals.len()
    }

    /// Declare a local binding in the innermost frame. Returns the prior
    /// binding of the same name in that frame, if any (a redefinition).
    ///
    /// # Panics
    /// Panics if no frame is open.
    pub fn declare_local(&mut self, name: Name, decl: DeclId) -> Option<DeclId> {
        let Some(frame) = self.locals.last_mut() else {
            panic!("declare_local with no open frame");
        };
        frame.insert(name, decl)
    }

    // ── Lookup ──────────────────────────────────────────────────────

    /// Find a direct member of a container by name, in declaration order.
    pub fn find_member(&self, container: DeclId, name: Name) -> Option<DeclId> {
        self.ast
            .decl(container)
            .members()
            .iter()
            .copied()
            .find(|&m| self.ast.decl(m).name == name)
    }

    /// Resolve a qualified symbol against the active scopes.
    ///
    /// The outermost component is looked up in local frames
    /// innermost-first, then along the declaration scope stack from the
    /// innermost scope outward; remaining components descend through
    /// container members.
    pub fn resolve(&self, symbol: &Symbol) -> Option<DeclId> {
        let mut components = symbol.iter();
        let first = components.next()?;

        let mut current = self.resolve_unqualified(first.name)?;
        for component in components {
            current = self.find_member(current, component.name)?;
        }
        Some(current)
    }

    fn resolve_unqualified(&self, name: Name) -> Option<DeclId> {
        for frame in self.locals.iter().rev() {
            if let Some(&decl) = frame.get(&name) {
                return Some(decl);
            }
        }
        for &scope in self.scopes.iter().rev() {
            if let Some(decl) = self.find_member(scope, name) {
                return Some(decl);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_ast::{Decl, DeclKind, NameInterner, Span};
    use pretty_assertions::assert_eq;

    fn namespace(ast: &mut Ast, name: Name, container: Option<DeclId>) -> DeclId {
        ast.alloc_decl(Decl {
            kind: DeclKind::Namespace { members: vec![] },
            name,
            span: Span::DUMMY,
            name_span: Span::DUMMY,
            container,
        })
    }

    fn setup() -> (Ast, NameInterner, DeclId, DeclId, DeclId) {
        let interner = NameInterner::new();
        let mut ast = Ast::new();
        let root = namespace(&mut ast, Name::EMPTY, None);
        ast.set_root(root);
        let app = namespace(&mut ast, interner.intern("app"), Some(root));
        ast.add_member(root, app);
        let inner = namespace(&mut ast, interner.intern("inner"), Some(app));
        ast.add_member(app, inner);
        (ast, interner, root, app, inner)
    }

    #[test]
    fn resolves_through_scope_chain() {
        let (ast, interner, root, app, inner) = setup();
        let mut resolver = SymbolResolver::new(&ast, root);

        let sym = Symbol::new(interner.intern("app"), None);
        assert_eq!(resolver.resolve(&sym), Some(app));

        // From inside `app`, `inner` resolves unqualified.
        resolver.switch_to(app);
        let sym = Symbol::new(interner.intern("inner"), None);
        assert_eq!(resolver.resolve(&sym), Some(inner));
        resolver.switch_to_container();

        // From the root it needs qualification.
        assert_eq!(resolver.resolve(&sym), None);
        let mut qualified = Symbol::new(interner.intern("app"), None);
        qualified.append(interner.intern("inner"), None);
        assert_eq!(resolver.resolve(&qualified), Some(inner));
    }

    #[test]
    fn locals_shadow_declarations() {
        let (mut ast, interner, root, app, _) = setup();
        let name = interner.intern("app");
        let shadow = namespace(&mut ast, name, Some(root));

        let mut resolver = SymbolResolver::new(&ast, root);
        resolver.push_locals();
        assert_eq!(resolver.declare_local(name, shadow), None);
        assert_eq!(resolver.resolve(&Symbol::new(name, None)), Some(shadow));

        // Redeclaring in the same frame reports the prior binding.
        assert_eq!(resolver.declare_local(name, app), Some(shadow));
        resolver.pop_locals();
        assert_eq!(resolver.resolve(&Symbol::new(name, None)), Some(app));
    }

    #[test]
    #[should_panic(expected = "pop the root scope")]
    fn unbalanced_switch_is_a_hard_stop() {
        let (ast, _, root, _, _) = setup();
        let mut resolver = SymbolResolver::new(&ast, root);
        resolver.switch_to_container();
    }
}
