use serde::Serialize;

use crate::label::{Atom, AtomSet, Expr, LabelRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeState {
    Idle,
    Busy,
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeState::Idle => write!(f, "idle"),
            NodeState::Busy => write!(f, "busy"),
        }
    }
}

/// A worker capable of running one item at a time, described by its atom
/// set. The set always contains a synthetic self-atom equal to the node's
/// own name, so an expression can pin work to a single node.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    labels: AtomSet,
    state: NodeState,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn labels(&self) -> &AtomSet {
        &self.labels
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Would this node accept an item with the given expression?
    /// `None` means "any node".
    pub fn accepts(&self, expr: Option<&Expr>) -> bool {
        expr.map_or(true, |e| e.matches(&self.labels))
    }
}

/// Tracks nodes, their static label sets, and their idle/busy state.
///
/// Iteration order is registration order; the match pass relies on that as
/// its deterministic tie-break between equally eligible nodes.
#[derive(Debug, Default)]
pub struct NodePool {
    nodes: Vec<Node>,
}

impl NodePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node with its labels; the self-atom is added here.
    /// Returns false if the identity is already taken.
    pub fn register(
        &mut self,
        registry: &LabelRegistry,
        name: &str,
        labels: impl IntoIterator<Item = Atom>,
    ) -> bool {
        if self.get(name).is_some() {
            return false;
        }
        let mut labels: AtomSet = labels.into_iter().collect();
        labels.insert(registry.atom(name));
        self.nodes.push(Node {
            name: name.to_string(),
            labels,
            state: NodeState::Idle,
        });
        tracing::info!(node = name, "node registered");
        true
    }

    /// Decommission a node. Any item currently assigned to it stays with
    /// the external executor; the pool simply forgets the node.
    pub fn remove(&mut self, name: &str) -> Option<Node> {
        let idx = self.nodes.iter().position(|n| n.name == name)?;
        tracing::info!(node = name, "node removed");
        Some(self.nodes.remove(idx))
    }

    pub fn set_state(&mut self, name: &str, state: NodeState) -> bool {
        match self.nodes.iter_mut().find(|n| n.name == name) {
            Some(node) => {
                node.state = state;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// All nodes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Idle nodes in registration order.
    pub fn idle_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.state == NodeState::Idle)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
