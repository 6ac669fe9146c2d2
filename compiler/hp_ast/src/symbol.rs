//! Qualified symbol paths.
//!
//! A `Symbol` is an ordered sequence of (name, optional span) components
//! locating a declaration, e.g. `app.Point.x`. Symbols are cheap value
//! types constructed fresh per resolution query.

use smallvec::SmallVec;

use crate::{Name, NameInterner, Span};

/// One component of a symbol path.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SymbolComponent {
    pub name: Name,
    /// Source location of this path component, when it came from source
    /// text (synthesized components have none).
    pub span: Option<Span>,
}

impl SymbolComponent {
    pub fn new(name: Name, span: Option<Span>) -> Self {
        SymbolComponent { name, span }
    }
}

/// A qualified name path.
///
/// Components are ordered outermost-first: for `app.Point.x` the first
/// component is `app` and the last is `x`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Symbol {
    components: SmallVec<[SymbolComponent; 4]>,
}

impl Symbol {
    /// Create a single-component symbol.
    pub fn new(name: Name, span: Option<Span>) -> Self {
        let mut components = SmallVec::new();
        components.push(SymbolComponent::new(name, span));
        Symbol { components }
    }

    /// Create an empty symbol path.
    pub fn empty() -> Self {
        Symbol {
            components: SmallVec::new(),
        }
    }

    /// Append a component as the new innermost (last) element.
    pub fn append(&mut self, name: Name, span: Option<Span>) {
        self.components.push(SymbolComponent::new(name, span));
    }

    /// Prepend a component as the new outermost (first) element.
    pub fn prepend(&mut self, name: Name, span: Option<Span>) {
        self.components.insert(0, SymbolComponent::new(name, span));
    }

    /// Remove and return the outermost (first) component.
    pub fn strip_outermost(&mut self) -> Option<SymbolComponent> {
        if self.components.is_empty() {
            None
        } else {
            Some(self.components.remove(0))
        }
    }

    /// Remove and return the innermost (last) component.
    pub fn strip_innermost(&mut self) -> Option<SymbolComponent> {
        self.components.pop()
    }

    /// The outermost component.
    pub fn outermost(&self) -> Option<&SymbolComponent> {
        self.components.first()
    }

    /// The innermost component.
    pub fn innermost(&self) -> Option<&SymbolComponent> {
        self.components.last()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if the path has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterate components outermost-first.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolComponent> {
        self.components.iter()
    }

    /// Render the path as dot-separated text for diagnostics.
    pub fn display(&self, interner: &NameInterner) -> String {
        let mut out = String::new();
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(interner.lookup(component.name));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sym(interner: &NameInterner, parts: &[&str]) -> Symbol {
        let mut s = Symbol::empty();
        for p in parts {
            s.append(interner.intern(p), None);
        }
        s
    }

    #[test]
    fn append_and_prepend() {
        let interner = NameInterner::new();
        let mut s = Symbol::new(interner.intern("Point"), None);
        s.append(interner.intern("x"), None);
        s.prepend(interner.intern("app"), None);
        assert_eq!(s.display(&interner), "app.Point.x");
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn strip_outermost_and_innermost() {
        let interner = NameInterner::new();
        let mut s = sym(&interner, &["app", "Point", "x"]);

        let outer = s.strip_outermost();
        assert_eq!(
            outer.map(|c| c.name),
            Some(interner.intern("app")),
            "outermost strips the first component"
        );
        assert_eq!(s.display(&interner), "Point.x");

        let inner = s.strip_innermost();
        assert_eq!(inner.map(|c| c.name), Some(interner.intern("x")));
        assert_eq!(s.display(&interner), "Point");
    }

    #[test]
    fn strip_on_empty_is_none() {
        let mut s = Symbol::empty();
        assert!(s.strip_outermost().is_none());
        assert!(s.strip_innermost().is_none());
    }
}
