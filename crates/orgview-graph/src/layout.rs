use crate::geometry::Vec2;
use crate::view_tree::ViewNode;
use serde::{Deserialize, Serialize};

/// Result of a layout pass, used to size the diagram surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    pub width: f32,
    pub height: f32,
    /// Cursor position after the last placed node.
    pub content_bottom: f32,
    pub node_count: usize,
}

pub trait Layouter {
    /// Assign a position to every node reachable through `visible_children`.
    fn compute_layout(&self, root: &mut ViewNode, container_width: f32) -> LayoutMetrics;
}

/// Single-column layout: every visible node centred horizontally, stacked in
/// pre-order so an expanded subtree sits directly under its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackLayouter {
    /// Y of the root card.
    pub top_margin: f32,
    /// Vertical distance between consecutive cards.
    pub sibling_spacing: f32,
    /// Extra gap inserted before and after each expanded child group.
    pub group_padding: f32,
    pub min_height: f32,
    pub bottom_padding: f32,
}

impl StackLayouter {
    pub const DEFAULT_TOP_MARGIN: f32 = 80.0;
    pub const DEFAULT_SIBLING_SPACING: f32 = 120.0;
    pub const DEFAULT_GROUP_PADDING: f32 = 10.0;
    pub const DEFAULT_MIN_HEIGHT: f32 = 800.0;
    pub const DEFAULT_BOTTOM_PADDING: f32 = 80.0;

    fn place(&self, node: &mut ViewNode, x: f32, cursor: &mut f32, count: &mut usize) {
        node.position = Vec2::new(x, *cursor);
        *cursor += self.sibling_spacing;
        *count += 1;

        if node.is_expanded() && !node.visible_children.is_empty() {
            *cursor += self.group_padding;
            for child in node.visible_children.iter_mut() {
                self.place(child, x, cursor, count);
            }
            *cursor += self.group_padding;
        }
    }
}

impl Default for StackLayouter {
    fn default() -> Self {
        Self {
            top_margin: Self::DEFAULT_TOP_MARGIN,
            sibling_spacing: Self::DEFAULT_SIBLING_SPACING,
            group_padding: Self::DEFAULT_GROUP_PADDING,
            min_height: Self::DEFAULT_MIN_HEIGHT,
            bottom_padding: Self::DEFAULT_BOTTOM_PADDING,
        }
    }
}

impl Layouter for StackLayouter {
    fn compute_layout(&self, root: &mut ViewNode, container_width: f32) -> LayoutMetrics {
        let x = container_width / 2.0;
        let mut cursor = self.top_margin;
        let mut count = 0;
        self.place(root, x, &mut cursor, &mut count);

        let metrics = LayoutMetrics {
            width: container_width,
            height: self.min_height.max(cursor + self.bottom_padding),
            content_bottom: cursor,
            node_count: count,
        };
        tracing::debug!(
            nodes = metrics.node_count,
            height = metrics.height,
            "Computed stack layout"
        );
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::{expand, expand_all};
    use crate::view_tree::{NodeKey, build_view_tree};
    use orgview_core::PersonNode;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn scenario_root() -> ViewNode {
        let raw = PersonNode::new("Alice")
            .with_child(PersonNode::new("Bob"))
            .with_child(PersonNode::new("Carol").with_child(PersonNode::new("Dave")))
            .with_child(PersonNode::new("Erin"));
        build_view_tree(Some(Arc::new(raw))).unwrap()
    }

    fn y_of(root: &ViewNode, name: &str) -> f32 {
        root.find_by_name(name).unwrap().position().y
    }

    #[test]
    fn test_root_only_layout() {
        let mut root = scenario_root();
        let layouter = StackLayouter::default();
        let metrics = layouter.compute_layout(&mut root, 1000.0);

        assert_eq!(root.position(), Vec2::new(500.0, 80.0));
        assert_eq!(metrics.node_count, 1);
        assert_eq!(metrics.height, StackLayouter::DEFAULT_MIN_HEIGHT);
    }

    #[test]
    fn test_expanded_subtree_is_contiguous() {
        let mut root = scenario_root();
        expand(&mut root);
        expand(root.find_mut(&NodeKey::root().child(1)).unwrap());

        let layouter = StackLayouter::default();
        layouter.compute_layout(&mut root, 800.0);

        let carol = y_of(&root, "Carol");
        let dave = y_of(&root, "Dave");
        let erin = y_of(&root, "Erin");
        assert!(carol < dave && dave < erin);
        assert_eq!(dave - carol, layouter.sibling_spacing + layouter.group_padding);
        assert!(root.visible().all(|n| n.position().x == 400.0));
    }

    #[test]
    fn test_height_grows_with_content() {
        let mut root = scenario_root();
        expand_all(&mut root);
        let layouter = StackLayouter {
            min_height: 100.0,
            ..StackLayouter::default()
        };
        let metrics = layouter.compute_layout(&mut root, 600.0);
        assert_eq!(metrics.node_count, 5);
        assert_eq!(metrics.height, metrics.content_bottom + layouter.bottom_padding);
    }

    fn arb_person() -> impl Strategy<Value = PersonNode> {
        let leaf = "[a-z]{1,5}".prop_map(PersonNode::new);
        leaf.prop_recursive(4, 48, 3, |inner| {
            ("[a-z]{1,5}", prop::collection::vec(inner, 0..3)).prop_map(|(name, children)| {
                children
                    .into_iter()
                    .fold(PersonNode::new(name), |node, child| node.with_child(child))
            })
        })
    }

    proptest! {
        /// Laying out an unchanged tree twice gives identical positions.
        #[test]
        fn prop_layout_is_deterministic(raw in arb_person(), width in 200.0f32..2000.0) {
            let mut root = build_view_tree(Some(Arc::new(raw))).unwrap();
            expand_all(&mut root);
            let layouter = StackLayouter::default();

            let first_metrics = layouter.compute_layout(&mut root, width);
            let first: Vec<Vec2> = root.visible().map(|n| n.position()).collect();
            let second_metrics = layouter.compute_layout(&mut root, width);
            let second: Vec<Vec2> = root.visible().map(|n| n.position()).collect();

            prop_assert_eq!(first, second);
            prop_assert_eq!(first_metrics, second_metrics);
        }

        /// Pre-order positions strictly increase, so children follow their parent
        /// before any later sibling of that parent.
        #[test]
        fn prop_layout_is_depth_first(raw in arb_person()) {
            let mut root = build_view_tree(Some(Arc::new(raw))).unwrap();
            expand_all(&mut root);
            StackLayouter::default().compute_layout(&mut root, 800.0);

            let ys: Vec<f32> = root.visible().map(|n| n.position().y).collect();
            prop_assert!(ys.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }
}
