//! View-side wrapper around a raw hierarchy.
//!
//! A [`ViewNode`] owns the materialized, currently displayed part of the tree
//! (`visible_children`) and keeps the raw children it could show
//! (`pending_children`) untouched for its whole lifetime. Only the root exists
//! right after [`build_view_tree`]; everything below it is materialized on demand
//! by the expansion engine.

use crate::error::GraphError;
use crate::geometry::Vec2;
use orgview_core::PersonNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Root-relative index path identifying a node within one tree.
///
/// The root is `0`; the second child of the root is `0.1`. Paths stay valid for
/// the lifetime of a tree because pending children never change order, and they
/// stay unique even when two people share a name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey(Vec<u32>);

impl NodeKey {
    pub fn root() -> Self {
        Self(vec![0])
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index as u32);
        Self(path)
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    pub fn depth(&self) -> u32 {
        (self.0.len() - 1) as u32
    }

    pub fn parent(&self) -> Option<NodeKey> {
        if self.is_root() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Child indices below the root.
    pub fn child_path(&self) -> &[u32] {
        &self.0[1..]
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for NodeKey {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s
            .trim()
            .split('.')
            .map(|segment| segment.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| GraphError::InvalidKey(s.to_string()))?;
        if path.first() != Some(&0) {
            return Err(GraphError::InvalidKey(s.to_string()));
        }
        Ok(Self(path))
    }
}

#[derive(Debug, Clone)]
pub struct ViewNode {
    record: Arc<PersonNode>,
    key: NodeKey,
    pub(crate) visible_children: Vec<ViewNode>,
    pending_children: Vec<Arc<PersonNode>>,
    pub(crate) is_expanded: bool,
    is_root: bool,
    depth: u32,
    pub(crate) position: Vec2,
}

impl ViewNode {
    fn new(record: Arc<PersonNode>, key: NodeKey, depth: u32, is_root: bool) -> Self {
        let pending_children = record.children.clone();
        Self {
            record,
            key,
            visible_children: Vec::new(),
            pending_children,
            is_expanded: false,
            is_root,
            depth,
            position: Vec2::ZERO,
        }
    }

    /// Materialize the child view node for `pending_children[index]`.
    pub(crate) fn materialize_child(&self, index: usize) -> ViewNode {
        ViewNode::new(
            Arc::clone(&self.pending_children[index]),
            self.key.child(index),
            self.depth + 1,
            false,
        )
    }

    pub fn record(&self) -> &PersonNode {
        &self.record
    }

    pub fn shared_record(&self) -> Arc<PersonNode> {
        Arc::clone(&self.record)
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn visible_children(&self) -> &[ViewNode] {
        &self.visible_children
    }

    pub fn pending_children(&self) -> &[Arc<PersonNode>] {
        &self.pending_children
    }

    /// Whether the node shows an expand/collapse affordance.
    pub fn has_pending_children(&self) -> bool {
        !self.pending_children.is_empty()
    }

    pub fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Pre-order walk over the visible forest rooted here.
    pub fn visible(&self) -> VisiblePreOrder<'_> {
        VisiblePreOrder { stack: vec![self] }
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    pub fn find(&self, key: &NodeKey) -> Option<&ViewNode> {
        if !key.0.starts_with(&self.key.0) {
            return None;
        }
        let mut node = self;
        for &index in &key.0[self.key.0.len()..] {
            node = node.visible_children.get(index as usize)?;
        }
        Some(node)
    }

    pub fn find_mut(&mut self, key: &NodeKey) -> Option<&mut ViewNode> {
        if !key.0.starts_with(&self.key.0) {
            return None;
        }
        let depth = self.key.0.len();
        let mut node = self;
        for &index in &key.0[depth..] {
            node = node.visible_children.get_mut(index as usize)?;
        }
        Some(node)
    }

    /// First visible node (pre-order) whose name matches, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&ViewNode> {
        let wanted = name.trim().to_lowercase();
        self.visible().find(|node| node.name().to_lowercase() == wanted)
    }

    /// Whether the expansion invariant holds for this node and every visible descendant.
    pub fn is_consistent(&self) -> bool {
        self.visible().all(|node| {
            if node.is_expanded {
                node.visible_children.len() == node.pending_children.len()
                    && node
                        .visible_children
                        .iter()
                        .zip(&node.pending_children)
                        .all(|(child, raw)| Arc::ptr_eq(&child.record, raw))
            } else {
                node.visible_children.is_empty()
            }
        })
    }
}

pub struct VisiblePreOrder<'a> {
    stack: Vec<&'a ViewNode>,
}

impl<'a> Iterator for VisiblePreOrder<'a> {
    type Item = &'a ViewNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.visible_children.iter().rev());
        Some(node)
    }
}

/// Wrap a raw hierarchy root. Only the root is visible afterwards.
pub fn build_view_tree(raw: Option<Arc<PersonNode>>) -> Result<ViewNode, GraphError> {
    let raw = raw.ok_or(GraphError::NoData)?;
    tracing::debug!(
        root = %raw.name,
        pending = raw.children.len(),
        "Built view tree"
    );
    Ok(ViewNode::new(raw, NodeKey::root(), 0, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_tree() -> Arc<PersonNode> {
        Arc::new(
            PersonNode::new("Alice")
                .with_child(PersonNode::new("Bob"))
                .with_child(PersonNode::new("Carol").with_child(PersonNode::new("Dave"))),
        )
    }

    #[test]
    fn test_build_shows_only_root() {
        let root = build_view_tree(Some(scenario_tree())).expect("tree");
        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert!(!root.is_expanded());
        assert!(root.visible_children().is_empty());
        assert_eq!(root.pending_children().len(), 2);
        assert_eq!(root.visible_count(), 1);
        assert!(root.is_consistent());
    }

    #[test]
    fn test_build_without_data_fails() {
        let err = build_view_tree(None).expect_err("no data");
        assert!(matches!(err, GraphError::NoData));
    }

    #[test]
    fn test_leaf_root_has_no_affordance() {
        let root = build_view_tree(Some(Arc::new(PersonNode::new("Solo")))).unwrap();
        assert!(!root.has_pending_children());
    }

    #[test]
    fn test_node_key_display_and_parse() {
        let key = NodeKey::root().child(1).child(0);
        assert_eq!(key.to_string(), "0.1.0");
        assert_eq!(key.depth(), 2);
        assert_eq!("0.1.0".parse::<NodeKey>().unwrap(), key);
        assert_eq!(key.parent(), Some(NodeKey::root().child(1)));
        assert_eq!(NodeKey::root().parent(), None);

        assert!("1.0".parse::<NodeKey>().is_err());
        assert!("0.x".parse::<NodeKey>().is_err());
        assert!("".parse::<NodeKey>().is_err());
    }

    #[test]
    fn test_find_follows_visible_children_only() {
        let mut root = build_view_tree(Some(scenario_tree())).unwrap();
        let carol = NodeKey::root().child(1);
        assert!(root.find(&carol).is_none());

        let child = root.materialize_child(1);
        root.visible_children = vec![root.materialize_child(0), child];
        root.is_expanded = true;

        assert_eq!(root.find(&carol).map(|n| n.name()), Some("Carol"));
        assert_eq!(root.find_by_name("carol").map(|n| n.key().clone()), Some(carol));
        assert!(root.find(&"0.1.0".parse().unwrap()).is_none());
        assert!(root.is_consistent());
    }
}
