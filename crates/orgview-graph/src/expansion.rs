//! Expand/collapse state machine over [`ViewNode`]s.
//!
//! Expanding materializes one child view node per pending raw child, in order.
//! Collapsing tears down every expanded descendant first (post-order), so a
//! re-collapsed ancestor never hides stale expansion state. None of these
//! functions touch siblings or ancestors, and none of them trigger layout or
//! rendering.

use crate::view_tree::ViewNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Children were materialized.
    Expanded { materialized: usize },
    /// The visible subtree was discarded.
    Collapsed { removed: usize },
    /// The node has nothing to expand; nothing changed.
    NoChildren,
}

pub fn toggle_expansion(node: &mut ViewNode) -> ToggleOutcome {
    if !node.has_pending_children() {
        tracing::debug!(node = %node.key(), "Ignoring toggle on node without reports");
        return ToggleOutcome::NoChildren;
    }

    if node.is_expanded() {
        ToggleOutcome::Collapsed {
            removed: collapse(node),
        }
    } else {
        ToggleOutcome::Expanded {
            materialized: expand(node),
        }
    }
}

/// Materialize the node's children. Returns the number of new view nodes.
pub fn expand(node: &mut ViewNode) -> usize {
    if node.is_expanded() || !node.has_pending_children() {
        return 0;
    }

    node.visible_children = (0..node.pending_children().len())
        .map(|index| node.materialize_child(index))
        .collect();
    node.is_expanded = true;

    tracing::debug!(
        node = %node.key(),
        children = node.visible_children.len(),
        "Expanded node"
    );
    node.visible_children.len()
}

/// Collapse the node and everything expanded below it.
/// Returns how many visible descendants were removed.
pub fn collapse(node: &mut ViewNode) -> usize {
    if !node.is_expanded() {
        return 0;
    }

    let mut removed = 0;
    for child in node.visible_children.iter_mut() {
        removed += collapse(child);
    }
    removed += node.visible_children.len();

    node.visible_children.clear();
    node.is_expanded = false;

    tracing::debug!(node = %node.key(), removed, "Collapsed node");
    removed
}

/// Materialize the whole subtree below `node`.
pub fn expand_all(node: &mut ViewNode) -> usize {
    let mut materialized = expand(node);
    for child in node.visible_children.iter_mut() {
        materialized += expand_all(child);
    }
    materialized
}

/// Leave exactly `levels` generations below `node` visible.
///
/// Deeper expanded nodes are collapsed, shallower ones are expanded.
pub fn expand_to_depth(node: &mut ViewNode, levels: u32) -> usize {
    if levels == 0 {
        collapse(node);
        return 0;
    }

    let mut materialized = expand(node);
    for child in node.visible_children.iter_mut() {
        materialized += expand_to_depth(child, levels - 1);
    }
    materialized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_tree::{NodeKey, build_view_tree};
    use orgview_core::PersonNode;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn scenario_root() -> ViewNode {
        let raw = PersonNode::new("Alice")
            .with_child(PersonNode::new("Bob"))
            .with_child(PersonNode::new("Carol").with_child(PersonNode::new("Dave")));
        build_view_tree(Some(Arc::new(raw))).unwrap()
    }

    fn visible_names(root: &ViewNode) -> Vec<String> {
        root.visible().map(|n| n.name().to_string()).collect()
    }

    #[test]
    fn test_expand_materializes_children_in_order() {
        let mut root = scenario_root();
        assert_eq!(
            toggle_expansion(&mut root),
            ToggleOutcome::Expanded { materialized: 2 }
        );
        assert_eq!(visible_names(&root), vec!["Alice", "Bob", "Carol"]);

        let carol = &root.visible_children()[1];
        assert_eq!(carol.depth(), 1);
        assert!(!carol.is_expanded());
        assert_eq!(carol.pending_children().len(), 1);
        assert_eq!(carol.key(), &NodeKey::root().child(1));
        assert!(root.is_consistent());
    }

    #[test]
    fn test_collapse_keeps_pending_children() {
        let mut root = scenario_root();
        expand(&mut root);
        let carol_key = NodeKey::root().child(1);
        let carol = root.find_mut(&carol_key).unwrap();
        expand(carol);
        assert_eq!(visible_names(&root), vec!["Alice", "Bob", "Carol", "Dave"]);

        let carol = root.find_mut(&carol_key).unwrap();
        assert_eq!(
            toggle_expansion(carol),
            ToggleOutcome::Collapsed { removed: 1 }
        );
        let carol = root.find(&carol_key).unwrap();
        assert!(!carol.is_expanded());
        assert_eq!(carol.pending_children()[0].name, "Dave");
        assert_eq!(visible_names(&root), vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn test_toggle_on_leaf_is_noop() {
        let mut root = scenario_root();
        expand(&mut root);
        let bob = root.find_mut(&NodeKey::root().child(0)).unwrap();
        assert_eq!(toggle_expansion(bob), ToggleOutcome::NoChildren);
        assert!(!bob.is_expanded());
        assert!(bob.visible_children().is_empty());
    }

    #[test]
    fn test_collapse_clears_nested_expansion() {
        let mut root = scenario_root();
        assert_eq!(expand_all(&mut root), 3);
        assert_eq!(root.visible_count(), 4);

        assert_eq!(collapse(&mut root), 3);
        assert_eq!(root.visible_count(), 1);

        // Re-expanding only shows one level again.
        expand(&mut root);
        assert_eq!(visible_names(&root), vec!["Alice", "Bob", "Carol"]);
        assert!(root.visible().all(|n| n.is_root() || !n.is_expanded()));
    }

    #[test]
    fn test_expand_to_depth() {
        let mut root = scenario_root();
        expand_to_depth(&mut root, 1);
        assert_eq!(root.visible_count(), 3);
        expand_to_depth(&mut root, 5);
        assert_eq!(root.visible_count(), 4);
        expand_to_depth(&mut root, 0);
        assert_eq!(root.visible_count(), 1);
    }

    fn arb_person(depth: u32) -> impl Strategy<Value = PersonNode> {
        let leaf = "[A-Z][a-z]{1,6}".prop_map(PersonNode::new);
        leaf.prop_recursive(depth, 64, 4, |inner| {
            ("[A-Z][a-z]{1,6}", prop::collection::vec(inner, 0..4)).prop_map(
                |(name, children)| {
                    children
                        .into_iter()
                        .fold(PersonNode::new(name), |node, child| node.with_child(child))
                },
            )
        })
    }

    proptest! {
        /// Collapsing right after expanding leaves the node exactly as built.
        #[test]
        fn prop_expand_then_collapse_restores_node(raw in arb_person(4)) {
            let mut root = build_view_tree(Some(Arc::new(raw))).unwrap();
            prop_assume!(root.has_pending_children());

            toggle_expansion(&mut root);
            expand_all(&mut root);
            toggle_expansion(&mut root);

            prop_assert!(!root.is_expanded());
            prop_assert!(root.visible_children().is_empty());
            prop_assert_eq!(root.visible_count(), 1);
            prop_assert!(root.is_consistent());
        }

        /// After a collapse nothing below the collapsed node stays expanded.
        #[test]
        fn prop_collapse_is_total(raw in arb_person(5), pick in 0usize..64) {
            let mut root = build_view_tree(Some(Arc::new(raw))).unwrap();
            expand_all(&mut root);
            let keys: Vec<NodeKey> = root.visible().map(|n| n.key().clone()).collect();
            let key = keys[pick % keys.len()].clone();

            let node = root.find_mut(&key).unwrap();
            collapse(node);

            let node = root.find(&key).unwrap();
            prop_assert!(node.visible().all(|n| !n.is_expanded()));
            prop_assert!(root.is_consistent());
        }

        /// A freshly built tree only shows its root.
        #[test]
        fn prop_build_is_lazy(raw in arb_person(5)) {
            let root = build_view_tree(Some(Arc::new(raw))).unwrap();
            prop_assert_eq!(root.visible_count(), 1);
            prop_assert!(root.visible().all(|n| n.visible_children().is_empty()));
        }
    }
}
