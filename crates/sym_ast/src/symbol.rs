//! Symbol names and builtin head identifiers.
//!
//! A [`Symbol`] is a cheap-to-clone, totally ordered name used for symbol
//! leaves, opaque tags and branch heads. Cloning only bumps a reference count,
//! so symbols can be shared freely between nodes and across threads.
//!
//! # Reference symbols
//!
//! Pattern templates use designated symbol leaves as placeholders:
//!
//! - `$r`: a reference to a single matched subexpression named `r`
//! - `$$r`: a remainder reference, absorbing the children of an
//!   associative/commutative branch not claimed by any other child pattern

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Prefix marking a reference leaf symbol in pattern templates.
pub const REFERENCE_PREFIX: &str = "$";

/// Prefix marking a remainder reference leaf symbol in pattern templates.
pub const REST_REFERENCE_PREFIX: &str = "$$";

/// An immutable symbol name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Symbol(Arc::from(name))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for both `$r` and `$$r` placeholders.
    #[inline]
    pub fn is_reference(&self) -> bool {
        self.0.starts_with(REFERENCE_PREFIX) && self.0.len() > REFERENCE_PREFIX.len()
    }

    #[inline]
    pub fn is_rest_reference(&self) -> bool {
        self.0.starts_with(REST_REFERENCE_PREFIX) && self.0.len() > REST_REFERENCE_PREFIX.len()
    }

    /// The bare reference name of a placeholder (`$r` and `$$r` both give `r`).
    pub fn reference_name(&self) -> Option<Symbol> {
        if self.is_rest_reference() {
            Some(Symbol::new(&self.0[REST_REFERENCE_PREFIX.len()..]))
        } else if self.is_reference() {
            Some(Symbol::new(&self.0[REFERENCE_PREFIX.len()..]))
        } else {
            None
        }
    }

    /// Check whether this symbol names the given builtin.
    #[inline]
    pub fn is(&self, builtin: Builtin) -> bool {
        &*self.0 == builtin.name()
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Symbol(Arc::from(name))
    }
}

impl From<Builtin> for Symbol {
    fn from(builtin: Builtin) -> Self {
        builtin.symbol()
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Well-known heads, constants and tags used by the default rule content.
///
/// The core (matching, dispatch, rewriting) never depends on these; they
/// exist so rule modules and tests compare names through one spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Builtin {
    // Arithmetic heads
    Sum = 0,
    Product,
    Power,

    // Trigonometric
    Sin,
    Cos,
    Tan,

    // Constants
    Pi,
    E,
    I,

    // Opaque tags
    Undefined,

    // Qualifiers
    Summation,
    Lambda,
}

impl Builtin {
    pub const COUNT: usize = 12;

    pub const ALL: [Builtin; Builtin::COUNT] = [
        Builtin::Sum,
        Builtin::Product,
        Builtin::Power,
        Builtin::Sin,
        Builtin::Cos,
        Builtin::Tan,
        Builtin::Pi,
        Builtin::E,
        Builtin::I,
        Builtin::Undefined,
        Builtin::Summation,
        Builtin::Lambda,
    ];

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Builtin::Sum => "Sum",
            Builtin::Product => "Product",
            Builtin::Power => "Power",
            Builtin::Sin => "Sin",
            Builtin::Cos => "Cos",
            Builtin::Tan => "Tan",
            Builtin::Pi => "Pi",
            Builtin::E => "E",
            Builtin::I => "I",
            Builtin::Undefined => "Undefined",
            Builtin::Summation => "Summation",
            Builtin::Lambda => "Lambda",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.iter().copied().find(|b| b.name() == name)
    }

    #[inline]
    pub fn symbol(self) -> Symbol {
        Symbol::new(self.name())
    }
}
