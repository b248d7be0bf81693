//! The contract between this core and the surrounding tree layer.
//!
//! The evaluator never owns a document tree; node items are opaque handles
//! supplied by the stylesheet engine through this trait.

use std::hash::Hash;

/// The type of a node in the data source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
}

/// The universal contract for a node in a read-only, hierarchical data
/// source. The evaluator and the sequence-type checker are written
/// exclusively against this trait.
///
/// `children` and `attributes` hand out a fresh iterator on every call, so
/// a node sequence can be walked from the start as often as needed.
pub trait DataSourceNode: std::fmt::Debug + Clone + PartialEq + Eq + Hash {
    /// The type of the node (Element, Text, Attribute, etc.).
    fn node_type(&self) -> NodeType;

    /// The qualified name of the node, `None` for unnamed node types
    /// (text, comments, the root). For a processing instruction this is
    /// its target.
    fn name(&self) -> Option<String>;

    /// The string value of the node as defined by `fn:string()`: text
    /// content for text nodes, concatenated descendant text for elements,
    /// the value for attributes.
    fn string_value(&self) -> String;

    /// An iterator over the child nodes, empty for leaf nodes.
    fn children(&self) -> Box<dyn Iterator<Item = Self> + '_>;

    /// The parent node, `None` for the root.
    fn parent(&self) -> Option<Self>;
}

// Test utilities, public so downstream crates can evaluate against an
// in-memory tree without a real document model.
pub mod tests {
    use super::*;
    use std::collections::HashMap;

    /// A placeholder node for tests that only exercise atomic values
    /// and never touch a tree.
    impl DataSourceNode for () {
        fn node_type(&self) -> NodeType {
            NodeType::Text
        }

        fn name(&self) -> Option<String> {
            None
        }

        fn string_value(&self) -> String {
            String::new()
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + '_> {
            Box::new(std::iter::empty())
        }

        fn parent(&self) -> Option<Self> {
            None
        }
    }

    #[derive(Debug, Clone)]
    struct MockNodeData {
        node_type: NodeType,
        name: Option<String>,
        value: String,
        children: Vec<usize>,
    }

    #[derive(Debug)]
    pub struct MockTree {
        nodes: HashMap<usize, MockNodeData>,
        parent_map: HashMap<usize, usize>,
    }

    /// An in-memory node that carries a reference to its tree so it can
    /// navigate itself.
    #[derive(Debug, Clone, Copy)]
    pub struct MockNode<'a> {
        pub id: usize,
        pub tree: &'a MockTree,
    }

    impl<'a> PartialEq for MockNode<'a> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl<'a> Eq for MockNode<'a> {}

    impl<'a> Hash for MockNode<'a> {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl<'a> DataSourceNode for MockNode<'a> {
        fn node_type(&self) -> NodeType {
            self.tree.nodes[&self.id].node_type
        }

        fn name(&self) -> Option<String> {
            self.tree.nodes[&self.id].name.clone()
        }

        fn string_value(&self) -> String {
            self.tree.nodes[&self.id].value.clone()
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + '_> {
            let tree = self.tree;
            let child_ids = tree.nodes[&self.id].children.clone();
            Box::new(child_ids.into_iter().map(move |id| MockNode { id, tree }))
        }

        fn parent(&self) -> Option<Self> {
            self.tree.parent_map.get(&self.id).map(|&pid| MockNode {
                id: pid,
                tree: self.tree,
            })
        }
    }

    impl MockTree {
        pub fn node(&self, id: usize) -> MockNode<'_> {
            MockNode { id, tree: self }
        }
    }

    /// A small fixed tree:
    /// <root>           id 0
    ///   <price>42</price>    id 1, text 2
    ///   <price>7.5</price>   id 3, text 4
    /// </root>
    pub fn create_test_tree() -> MockTree {
        let mut nodes = HashMap::new();
        let mut parent_map = HashMap::new();

        nodes.insert(
            0,
            MockNodeData {
                node_type: NodeType::Root,
                name: None,
                value: "427.5".to_string(),
                children: vec![1, 3],
            },
        );
        nodes.insert(
            1,
            MockNodeData {
                node_type: NodeType::Element,
                name: Some("price".to_string()),
                value: "42".to_string(),
                children: vec![2],
            },
        );
        parent_map.insert(1, 0);
        nodes.insert(
            2,
            MockNodeData {
                node_type: NodeType::Text,
                name: None,
                value: "42".to_string(),
                children: vec![],
            },
        );
        parent_map.insert(2, 1);
        nodes.insert(
            3,
            MockNodeData {
                node_type: NodeType::Element,
                name: Some("price".to_string()),
                value: "7.5".to_string(),
                children: vec![4],
            },
        );
        parent_map.insert(3, 0);
        nodes.insert(
            4,
            MockNodeData {
                node_type: NodeType::Text,
                name: None,
                value: "7.5".to_string(),
                children: vec![],
            },
        );
        parent_map.insert(4, 3);

        MockTree { nodes, parent_map }
    }
}
