//! The function item type.
//!
//! The evaluator has no inline-function syntax of its own; a function
//! item is a named reference into the built-in library, resolved at
//! call time.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

#[derive(Debug, Clone)]
pub struct XdmFunction<N> {
    pub name: String,
    pub arity: usize,
    _node: PhantomData<fn() -> N>,
}

impl<N> XdmFunction<N> {
    pub fn named(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
            _node: PhantomData,
        }
    }
}

impl<N> PartialEq for XdmFunction<N> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arity == other.arity
    }
}

impl<N> Eq for XdmFunction<N> {}

impl<N> Hash for XdmFunction<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.arity.hash(state);
    }
}

impl<N> fmt::Display for XdmFunction<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.arity)
    }
}
