//! Items and sequences.
//!
//! A sequence is a flat vector of items. Nothing in the data model can
//! represent a sequence inside a sequence, so flattening is enforced by
//! construction: whenever sub-results are combined their item vectors
//! are concatenated.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::{AtomicValue, XdmArray, XdmFunction, XdmMap};
use crate::datasource::DataSourceNode;

#[derive(Debug, Clone)]
pub enum XdmItem<N> {
    Node(N),
    Atomic(AtomicValue),
    Map(XdmMap<N>),
    Array(XdmArray<N>),
    Function(XdmFunction<N>),
}

impl<N: Clone> XdmItem<N> {
    pub fn is_node(&self) -> bool {
        matches!(self, XdmItem::Node(_))
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self, XdmItem::Atomic(_))
    }

    pub fn as_node(&self) -> Option<&N> {
        match self {
            XdmItem::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_atomic(&self) -> Option<&AtomicValue> {
        match self {
            XdmItem::Atomic(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&XdmMap<N>> {
        match self {
            XdmItem::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&XdmArray<N>> {
        match self {
            XdmItem::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            XdmItem::Node(_) => "node()",
            XdmItem::Atomic(a) => a.type_name(),
            XdmItem::Map(_) => "map(*)",
            XdmItem::Array(_) => "array(*)",
            XdmItem::Function(_) => "function(*)",
        }
    }
}

impl<N: DataSourceNode> XdmItem<N> {
    pub fn string_value(&self) -> String {
        match self {
            XdmItem::Node(n) => n.string_value(),
            XdmItem::Atomic(a) => a.serialize(),
            XdmItem::Map(m) => m.to_string(),
            XdmItem::Array(a) => a.to_string(),
            XdmItem::Function(f) => f.to_string(),
        }
    }
}

impl<N: PartialEq + Clone> PartialEq for XdmItem<N> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (XdmItem::Node(a), XdmItem::Node(b)) => a == b,
            (XdmItem::Atomic(a), XdmItem::Atomic(b)) => a == b,
            (XdmItem::Map(a), XdmItem::Map(b)) => a == b,
            (XdmItem::Array(a), XdmItem::Array(b)) => a == b,
            (XdmItem::Function(a), XdmItem::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl<N: Eq + Clone> Eq for XdmItem<N> {}

impl<N: Hash + Clone> Hash for XdmItem<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            XdmItem::Node(n) => n.hash(state),
            XdmItem::Atomic(a) => a.hash(state),
            XdmItem::Map(m) => m.hash(state),
            XdmItem::Array(a) => a.hash(state),
            XdmItem::Function(f) => f.hash(state),
        }
    }
}

/// A flat, immutable sequence of items.
#[derive(Debug, Clone)]
pub struct XdmValue<N> {
    items: Vec<XdmItem<N>>,
}

impl<N: Clone> XdmValue<N> {
    pub fn empty() -> Self {
        Self { items: vec![] }
    }

    pub fn from_item(item: XdmItem<N>) -> Self {
        Self { items: vec![item] }
    }

    pub fn from_items(items: Vec<XdmItem<N>>) -> Self {
        Self { items }
    }

    pub fn from_atomic(value: AtomicValue) -> Self {
        Self::from_item(XdmItem::Atomic(value))
    }

    pub fn from_node(node: N) -> Self {
        Self::from_item(XdmItem::Node(node))
    }

    pub fn from_nodes(nodes: Vec<N>) -> Self {
        Self::from_items(nodes.into_iter().map(XdmItem::Node).collect())
    }

    pub fn from_map(map: XdmMap<N>) -> Self {
        Self::from_item(XdmItem::Map(map))
    }

    pub fn from_array(array: XdmArray<N>) -> Self {
        Self::from_item(XdmItem::Array(array))
    }

    pub fn from_bool(b: bool) -> Self {
        Self::from_atomic(AtomicValue::Boolean(b))
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self::from_atomic(AtomicValue::String(s.into()))
    }

    pub fn from_integer(i: i64) -> Self {
        Self::from_atomic(AtomicValue::Integer(i))
    }

    pub fn from_double(d: f64) -> Self {
        Self::from_atomic(AtomicValue::Double(d))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[XdmItem<N>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<XdmItem<N>> {
        self.items
    }

    pub fn first(&self) -> Option<&XdmItem<N>> {
        self.items.first()
    }

    /// The only item, `None` unless the sequence is a singleton.
    pub fn single(&self) -> Option<&XdmItem<N>> {
        if self.items.len() == 1 {
            self.items.first()
        } else {
            None
        }
    }

    pub fn concat(self, other: XdmValue<N>) -> Self {
        let mut items = self.items;
        items.extend(other.items);
        Self { items }
    }

    /// The effective boolean value: empty is false, a sequence whose
    /// first item is a node is true, a singleton atomic follows its
    /// type, everything else is true.
    pub fn effective_boolean_value(&self) -> bool {
        if self.items.len() == 1 {
            match &self.items[0] {
                XdmItem::Atomic(a) => a.to_boolean(),
                _ => true,
            }
        } else {
            !self.items.is_empty()
        }
    }

    pub fn to_double(&self) -> f64 {
        match self.first() {
            Some(XdmItem::Atomic(a)) => a.to_double(),
            _ => f64::NAN,
        }
    }
}

impl<N: DataSourceNode> XdmValue<N> {
    /// The string value of the first item, empty string for `()`.
    pub fn to_string_value(&self) -> String {
        self.first().map(|i| i.string_value()).unwrap_or_default()
    }

    /// Replaces every item with its atomized form: nodes become
    /// untypedAtomic string values, arrays contribute their flattened
    /// atomized members, maps and functions are dropped.
    pub fn atomize(&self) -> Self {
        let mut atoms = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match item {
                XdmItem::Atomic(a) => atoms.push(XdmItem::Atomic(a.clone())),
                XdmItem::Node(n) => {
                    atoms.push(XdmItem::Atomic(AtomicValue::UntypedAtomic(n.string_value())))
                }
                XdmItem::Array(arr) => {
                    for member in arr.members() {
                        atoms.extend(member.atomize().into_items());
                    }
                }
                XdmItem::Map(_) | XdmItem::Function(_) => {}
            }
        }
        Self::from_items(atoms)
    }
}

impl<N: PartialEq + Clone> PartialEq for XdmValue<N> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<N: Eq + Clone> Eq for XdmValue<N> {}

impl<N: Hash + Clone> Hash for XdmValue<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items.len().hash(state);
        for item in &self.items {
            item.hash(state);
        }
    }
}

impl<N: fmt::Debug + Clone> fmt::Display for XdmValue<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.len() == 1 {
            return write!(f, "{:?}", self.items[0]);
        }
        write!(f, "(")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", item)?;
        }
        write!(f, ")")
    }
}
