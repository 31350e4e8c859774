use smallvec::SmallVec;
use std::fmt;
use sym_ast::{deep_equals, Node, Symbol};

/// Immutable reference name → node mapping produced by a match.
///
/// Every extension returns a new value. Binding an already-bound name only
/// succeeds when the new node is structurally equal to the existing one,
/// which is what makes a repeated reference denote the same subexpression.
/// Equality ignores insertion order.
#[derive(Clone, Default)]
pub struct Bindings {
    entries: SmallVec<[(Symbol, Node); 4]>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend with `name → node`.
    ///
    /// Returns `None` if `name` is bound to a structurally different node.
    pub fn with(&self, name: &Symbol, node: &Node) -> Option<Bindings> {
        match self.get(name) {
            Some(existing) if deep_equals(existing, node) => Some(self.clone()),
            Some(_) => None,
            None => {
                let mut entries = self.entries.clone();
                entries.push((name.clone(), node.clone()));
                Some(Bindings { entries })
            }
        }
    }

    pub fn get(&self, name: &Symbol) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// Convenience lookup by plain string name.
    pub fn get_str(&self, name: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, node)| node)
    }

    pub fn contains(&self, name: &Symbol) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Node)> {
        self.entries.iter().map(|(n, node)| (n, node))
    }
}

impl PartialEq for Bindings {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, node)| other.get(name).is_some_and(|o| deep_equals(o, node)))
    }
}

impl Eq for Bindings {}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(n, node)| (n.as_str(), node.to_string())))
            .finish()
    }
}
