//! Qualifier definitions: heads that bind variable names for some children.
//!
//! A qualifier head (e.g. `Summation(i, range, body)`) introduces the symbols
//! found at its *binder* positions as bound names, visible inside its *scope*
//! positions. Everything else about the head is ordinary.

use crate::expression::{Expr, Node};
use crate::symbol::{Builtin, Symbol};
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

/// Child positions a qualifier head binds and scopes over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifierDef {
    /// Children whose symbol leaves become bound names.
    pub binders: SmallVec<[usize; 2]>,
    /// Children in which the bound names are visible.
    pub scope: SmallVec<[usize; 2]>,
}

impl QualifierDef {
    pub fn new(binders: &[usize], scope: &[usize]) -> Self {
        Self {
            binders: SmallVec::from_slice(binders),
            scope: SmallVec::from_slice(scope),
        }
    }

    /// True if descending into `index` exposes the bound names.
    #[inline]
    pub fn exposes(&self, index: usize) -> bool {
        self.binders.contains(&index) || self.scope.contains(&index)
    }
}

/// Head symbol → qualifier definition.
#[derive(Debug, Clone, Default)]
pub struct QualifierTable {
    defs: FxHashMap<Symbol, QualifierDef>,
}

impl QualifierTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Summation(index, range, body)` and `Lambda(param, body)`.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.define(
            Builtin::Summation,
            QualifierDef {
                binders: smallvec![0],
                scope: smallvec![2],
            },
        );
        table.define(
            Builtin::Lambda,
            QualifierDef {
                binders: smallvec![0],
                scope: smallvec![1],
            },
        );
        table
    }

    /// Register (or replace) the definition for `head`.
    pub fn define(&mut self, head: impl Into<Symbol>, def: QualifierDef) -> Option<QualifierDef> {
        self.defs.insert(head.into(), def)
    }

    pub fn get(&self, head: &Symbol) -> Option<&QualifierDef> {
        self.defs.get(head)
    }

    pub fn is_qualifier(&self, head: &Symbol) -> bool {
        self.defs.contains_key(head)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Symbols bound by `node` if it is a qualifier branch, in binder order.
    ///
    /// Only symbol leaves at binder positions count; anything else there
    /// binds nothing.
    pub fn bound_names(&self, node: &Expr) -> SmallVec<[Symbol; 2]> {
        let Some(def) = node.head().and_then(|h| self.get(h)) else {
            return SmallVec::new();
        };
        let children = node.children();
        def.binders
            .iter()
            .filter_map(|&i| children.get(i))
            .filter_map(|c: &Node| c.as_symbol().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let table = QualifierTable::with_defaults();
        assert!(table.is_qualifier(&Builtin::Summation.symbol()));
        assert!(table.is_qualifier(&Builtin::Lambda.symbol()));
        assert!(!table.is_qualifier(&Builtin::Sum.symbol()));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_bound_names_of_summation() {
        let table = QualifierTable::with_defaults();
        let e = Expr::ternary(
            Builtin::Summation,
            Expr::sym("i"),
            Expr::sym("n"),
            Expr::sym("i"),
        );
        let names = table.bound_names(&e);
        assert_eq!(names.as_slice(), &[Symbol::new("i")]);
    }

    #[test]
    fn test_non_symbol_binder_binds_nothing() {
        let table = QualifierTable::with_defaults();
        let e = Expr::binary(Builtin::Lambda, Expr::num(1), Expr::sym("x"));
        assert!(table.bound_names(&e).is_empty());
    }

    #[test]
    fn test_exposes() {
        let def = QualifierDef::new(&[0], &[2]);
        assert!(def.exposes(0));
        assert!(!def.exposes(1));
        assert!(def.exposes(2));
    }
}
