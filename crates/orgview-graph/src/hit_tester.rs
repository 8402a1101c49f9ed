use crate::card::{AFFORDANCE_RADIUS, affordance_center, card_rect};
use crate::geometry::{Rect, Vec2};
use crate::render::VisibleNode;
use crate::view_tree::NodeKey;

/// Result of a hit test at a given position.
///
/// Priority order: Affordance > Card > None
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitResult {
    None,
    Card(NodeKey),
    /// The expand/collapse circle of a node with reports.
    Affordance(NodeKey),
}

/// Spatial index over the cards of the last layout.
#[derive(Debug, Clone)]
pub struct HitTester {
    cards: Vec<(NodeKey, Rect)>,
    affordances: Vec<(NodeKey, Vec2)>,
    affordance_tolerance: f32,
}

impl Default for HitTester {
    fn default() -> Self {
        Self::new()
    }
}

impl HitTester {
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            affordances: Vec::new(),
            affordance_tolerance: 0.0,
        }
    }

    /// Extra slack around the affordance circle, for coarse pointers.
    pub fn with_tolerance(tolerance: f32) -> Self {
        Self {
            affordance_tolerance: tolerance,
            ..Self::new()
        }
    }

    /// Refresh hit regions. Call after every layout change.
    pub fn update(&mut self, nodes: &[VisibleNode]) {
        self.cards.clear();
        self.affordances.clear();
        for node in nodes {
            self.cards.push((node.key.clone(), card_rect(node.position)));
            if node.has_affordance {
                self.affordances
                    .push((node.key.clone(), affordance_center(node.position)));
            }
        }
    }

    pub fn hit_test(&self, pos: Vec2) -> HitResult {
        let radius = AFFORDANCE_RADIUS + self.affordance_tolerance;
        if let Some((key, _)) = self
            .affordances
            .iter()
            .find(|(_, center)| center.distance(pos) <= radius)
        {
            return HitResult::Affordance(key.clone());
        }

        if let Some((key, _)) = self.cards.iter().find(|(_, rect)| rect.contains(pos)) {
            return HitResult::Card(key.clone());
        }

        HitResult::None
    }

    /// Centre of a node's affordance, if it has one.
    pub fn affordance_of(&self, key: &NodeKey) -> Option<Vec2> {
        self.affordances
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, center)| *center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::expand;
    use crate::layout::{Layouter, StackLayouter};
    use crate::render::flatten;
    use crate::view_tree::build_view_tree;
    use orgview_core::PersonNode;
    use std::sync::Arc;

    fn tester() -> HitTester {
        let raw = PersonNode::new("Alice")
            .with_child(PersonNode::new("Bob"))
            .with_child(PersonNode::new("Carol").with_child(PersonNode::new("Dave")));
        let mut root = build_view_tree(Some(Arc::new(raw))).unwrap();
        expand(&mut root);
        StackLayouter::default().compute_layout(&mut root, 800.0);

        let (nodes, _) = flatten(&root, None);
        let mut tester = HitTester::new();
        tester.update(&nodes);
        tester
    }

    #[test]
    fn test_affordance_only_for_nodes_with_reports() {
        let tester = tester();
        assert!(tester.affordance_of(&NodeKey::root()).is_some());
        assert!(tester.affordance_of(&NodeKey::root().child(0)).is_none());
        assert!(tester.affordance_of(&NodeKey::root().child(1)).is_some());
    }

    #[test]
    fn test_hit_priorities() {
        let tester = tester();
        let carol = NodeKey::root().child(1);
        let center = tester.affordance_of(&carol).unwrap();
        assert_eq!(tester.hit_test(center), HitResult::Affordance(carol.clone()));

        // Card body of Bob at y = 210
        assert_eq!(
            tester.hit_test(Vec2::new(300.0, 210.0)),
            HitResult::Card(NodeKey::root().child(0))
        );
        assert_eq!(tester.hit_test(Vec2::new(10.0, 10.0)), HitResult::None);
    }

    #[test]
    fn test_tolerance_widens_affordance() {
        let raw = PersonNode::new("Alice").with_child(PersonNode::new("Bob"));
        let mut root = build_view_tree(Some(Arc::new(raw))).unwrap();
        StackLayouter::default().compute_layout(&mut root, 800.0);
        let (nodes, _) = flatten(&root, None);

        let near_miss = Vec2::new(400.0 + AFFORDANCE_RADIUS + 3.0, 140.0);
        let mut strict = HitTester::new();
        strict.update(&nodes);
        assert_eq!(strict.hit_test(near_miss), HitResult::None);

        let mut loose = HitTester::with_tolerance(5.0);
        loose.update(&nodes);
        assert_eq!(loose.hit_test(near_miss), HitResult::Affordance(NodeKey::root()));
    }
}
