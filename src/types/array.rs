//! The array item type: an immutable, 1-indexed vector of member
//! sequences. Unlike a sequence, an array is a single item, so members
//! keep their own cardinality.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::{XdmItem, XdmValue};

#[derive(Debug, Clone)]
pub struct XdmArray<N> {
    members: Vec<XdmValue<N>>,
}

impl<N: Clone> XdmArray<N> {
    pub fn new() -> Self {
        Self { members: Vec::new() }
    }

    pub fn from_members(members: Vec<XdmValue<N>>) -> Self {
        Self { members }
    }

    /// 1-based member access.
    pub fn get(&self, index: usize) -> Option<&XdmValue<N>> {
        if index == 0 {
            return None;
        }
        self.members.get(index - 1)
    }

    pub fn append(&self, value: XdmValue<N>) -> Self {
        let mut new_arr = self.clone();
        new_arr.members.push(value);
        new_arr
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[XdmValue<N>] {
        &self.members
    }

    /// All member items joined into one flat item vector, nested arrays
    /// included.
    pub fn flatten(&self) -> Vec<XdmItem<N>> {
        let mut items = Vec::new();
        for member in &self.members {
            for item in member.items() {
                match item {
                    XdmItem::Array(inner) => items.extend(inner.flatten()),
                    other => items.push(other.clone()),
                }
            }
        }
        items
    }
}

impl<N: Clone> Default for XdmArray<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: PartialEq + Clone> PartialEq for XdmArray<N> {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl<N: Eq + Clone> Eq for XdmArray<N> {}

impl<N: Hash + Clone> Hash for XdmArray<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.members.len().hash(state);
        for m in &self.members {
            m.hash(state);
        }
    }
}

impl<N: fmt::Debug + Clone> fmt::Display for XdmArray<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, m) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", m)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AtomicValue;

    #[test]
    fn one_based_access() {
        let arr: XdmArray<()> = XdmArray::from_members(vec![
            XdmValue::from_string("a"),
            XdmValue::from_string("b"),
        ]);
        assert!(arr.get(0).is_none());
        assert_eq!(arr.get(1).unwrap().items()[0].as_atomic().unwrap().serialize(), "a");
        assert_eq!(arr.get(2).unwrap().items()[0].as_atomic().unwrap().serialize(), "b");
        assert!(arr.get(3).is_none());
    }

    #[test]
    fn members_keep_their_cardinality() {
        let arr: XdmArray<()> = XdmArray::from_members(vec![
            XdmValue::empty(),
            XdmValue::from_items(vec![
                XdmItem::Atomic(AtomicValue::Integer(1)),
                XdmItem::Atomic(AtomicValue::Integer(2)),
            ]),
        ]);
        assert_eq!(arr.size(), 2);
        assert_eq!(arr.get(1).unwrap().len(), 0);
        assert_eq!(arr.get(2).unwrap().len(), 2);
    }

    #[test]
    fn flatten_recurses_into_nested_arrays() {
        let inner: XdmArray<()> = XdmArray::from_members(vec![XdmValue::from_integer(2)]);
        let outer: XdmArray<()> = XdmArray::from_members(vec![
            XdmValue::from_integer(1),
            XdmValue::from_array(inner),
        ]);
        assert_eq!(outer.flatten().len(), 2);
    }
}
