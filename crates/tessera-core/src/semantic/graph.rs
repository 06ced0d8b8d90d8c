//! Arena of resolved nodes.
//!
//! [`NodeGraph`] owns every [`Node`] of a diagram in depth-first order. All
//! relations (parent, ancestors, children) are stored as [`NodeId`]s, which
//! keeps the graph cheap to clone and free of shared references.

use thiserror::Error;

use crate::semantic::node::{Node, NodeId};

/// Structural problems detected when building a [`NodeGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node graph is empty")]
    Empty,

    #[error("node at position {position} has id {id}")]
    MisplacedId { position: usize, id: NodeId },

    #[error("node {id} refers to unknown node {missing}")]
    DanglingReference { id: NodeId, missing: NodeId },

    #[error("the first node must be the root")]
    RootHasParent,
}

/// Index-addressed tree of nodes; the root is [`NodeId::ROOT`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGraph {
    nodes: Vec<Node>,
}

impl NodeGraph {
    /// Builds a graph from nodes already in arena order.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] when the list is empty, when an id does not
    /// match its position, when the first node has a parent, or when a
    /// relation points outside the arena.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, GraphError> {
        let Some(root) = nodes.first() else {
            return Err(GraphError::Empty);
        };
        if root.parent.is_some() {
            return Err(GraphError::RootHasParent);
        }

        for (position, node) in nodes.iter().enumerate() {
            if node.id.index() != position {
                return Err(GraphError::MisplacedId {
                    position,
                    id: node.id,
                });
            }
            let related = node
                .parent
                .iter()
                .chain(node.parents.iter())
                .chain(node.children.iter());
            for &other in related {
                if other.index() >= nodes.len() {
                    return Err(GraphError::DanglingReference {
                        id: node.id,
                        missing: other,
                    });
                }
            }
        }

        Ok(Self { nodes })
    }

    /// Returns the root node.
    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.index()]
    }

    /// Returns the node with the given id, if it exists.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    /// Panics if the id does not belong to this graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns a mutable reference to the node with the given id, if it exists.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Iterates over all nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The children of the parent of `id` (including `id` itself).
    ///
    /// The root has no siblings and returns an empty slice.
    pub fn siblings(&self, id: NodeId) -> &[NodeId] {
        match self.node(id).parent {
            Some(parent) => &self.node(parent).children,
            None => &[],
        }
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.node(node).parents.contains(&ancestor)
    }

    /// Returns `true` if one node is an ancestor of the other, or both are
    /// the same node.
    pub fn is_related(&self, a: NodeId, b: NodeId) -> bool {
        a == b || self.is_ancestor(a, b) || self.is_ancestor(b, a)
    }

    /// The ancestor `level` steps above `node`; level 0 is the node itself.
    ///
    /// Returns `None` when the level climbs past the root.
    pub fn ancestor_at(&self, node: NodeId, level: usize) -> Option<NodeId> {
        if level == 0 {
            return Some(node);
        }
        let parents = &self.node(node).parents;
        parents
            .len()
            .checked_sub(level)
            .map(|position| parents[position])
    }

    /// The deepest node that is an ancestor of both `a` and `b`.
    ///
    /// Only strict ancestors are considered, so related nodes share the
    /// ancestor of the upper one.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let chain_a = &self.node(a).parents;
        let chain_b = &self.node(b).parents;
        chain_a
            .iter()
            .rev()
            .find(|candidate| chain_b.contains(candidate))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::node::NodeKind;

    /// root -> [a -> [c], b]
    fn small_graph() -> NodeGraph {
        let mut root = Node::new(NodeId::new(0), NodeKind::Unit);
        root.children = vec![NodeId::new(1), NodeId::new(3)];

        let mut a = Node::new(NodeId::new(1), NodeKind::Unit);
        a.parent = Some(NodeId::ROOT);
        a.parents = vec![NodeId::ROOT];
        a.children = vec![NodeId::new(2)];

        let mut c = Node::new(NodeId::new(2), NodeKind::Cell);
        c.parent = Some(NodeId::new(1));
        c.parents = vec![NodeId::ROOT, NodeId::new(1)];

        let mut b = Node::new(NodeId::new(3), NodeKind::Cell);
        b.parent = Some(NodeId::ROOT);
        b.parents = vec![NodeId::ROOT];
        b.index = 1;

        NodeGraph::from_nodes(vec![root, a, c, b]).expect("valid graph")
    }

    #[test]
    fn test_from_nodes_rejects_bad_arenas() {
        assert_eq!(NodeGraph::from_nodes(Vec::new()), Err(GraphError::Empty));

        let misplaced = Node::new(NodeId::new(4), NodeKind::Unit);
        assert!(matches!(
            NodeGraph::from_nodes(vec![misplaced]),
            Err(GraphError::MisplacedId { position: 0, .. })
        ));

        let mut dangling = Node::new(NodeId::ROOT, NodeKind::Unit);
        dangling.children = vec![NodeId::new(7)];
        assert!(matches!(
            NodeGraph::from_nodes(vec![dangling]),
            Err(GraphError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_siblings() {
        let graph = small_graph();
        assert_eq!(
            graph.siblings(NodeId::new(3)),
            &[NodeId::new(1), NodeId::new(3)]
        );
        assert!(graph.siblings(NodeId::ROOT).is_empty());
    }

    #[test]
    fn test_ancestor_at() {
        let graph = small_graph();
        let c = NodeId::new(2);
        assert_eq!(graph.ancestor_at(c, 0), Some(c));
        assert_eq!(graph.ancestor_at(c, 1), Some(NodeId::new(1)));
        assert_eq!(graph.ancestor_at(c, 2), Some(NodeId::ROOT));
        assert_eq!(graph.ancestor_at(c, 3), None);
    }

    #[test]
    fn test_common_ancestor_and_relations() {
        let graph = small_graph();
        let c = NodeId::new(2);
        let b = NodeId::new(3);
        assert_eq!(graph.common_ancestor(c, b), Some(NodeId::ROOT));
        assert_eq!(graph.common_ancestor(c, NodeId::new(1)), Some(NodeId::ROOT));
        assert!(graph.is_related(NodeId::new(1), c));
        assert!(!graph.is_related(b, c));
        assert_eq!(graph.common_ancestor(NodeId::ROOT, b), None);
    }
}
