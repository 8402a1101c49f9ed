//! Keyed diffing of the visible tree into enter/update/exit changes.
//!
//! Each pass flattens the visible part of a [`ViewNode`] tree into snapshots,
//! matches them against the previous pass by [`NodeKey`], and hands the
//! resulting [`RenderPass`] to a [`DiagramSurface`]. The renderer never looks
//! at hidden nodes, so collapsed subtrees simply show up as exits.

use crate::card::CardContent;
use crate::edge_router::LinkRoute;
use crate::geometry::{Interpolate, Vec2};
use crate::surface::DiagramSurface;
use crate::view_tree::{NodeKey, ViewNode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_TRANSITION_MS: u32 = 750;

/// Snapshot of one visible card for a single render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleNode {
    pub key: NodeKey,
    pub card: CardContent,
    pub position: Vec2,
    pub depth: u32,
    pub is_root: bool,
    pub has_affordance: bool,
    pub is_expanded: bool,
    pub highlighted: bool,
}

impl VisibleNode {
    /// Whether anything other than the position differs.
    fn content_differs(&self, other: &VisibleNode) -> bool {
        self.card != other.card
            || self.depth != other.depth
            || self.is_root != other.is_root
            || self.has_affordance != other.has_affordance
            || self.is_expanded != other.is_expanded
            || self.highlighted != other.highlighted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: NodeKey,
    pub target: NodeKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleEdge {
    pub key: EdgeKey,
    pub route: LinkRoute,
}

/// Flatten the visible tree in pre-order.
///
/// With a champion name, cards whose representative is that champion are marked.
pub fn flatten(root: &ViewNode, champion: Option<&str>) -> (Vec<VisibleNode>, Vec<VisibleEdge>) {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for node in root.visible() {
        let record = node.record();
        let highlighted = champion.is_some_and(|name| {
            record.representative_from_qt.as_deref() == Some(name)
        });
        nodes.push(VisibleNode {
            key: node.key().clone(),
            card: CardContent::from_person(record),
            position: node.position(),
            depth: node.depth(),
            is_root: node.is_root(),
            has_affordance: node.has_pending_children(),
            is_expanded: node.is_expanded(),
            highlighted,
        });
        for child in node.visible_children() {
            edges.push(VisibleEdge {
                key: EdgeKey {
                    source: node.key().clone(),
                    target: child.key().clone(),
                },
                route: LinkRoute::between(node.position(), child.position()),
            });
        }
    }

    (nodes, edges)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Enter,
    Update,
    Exit,
}

/// Tween between two states of one element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition<T> {
    pub from: T,
    pub to: T,
    pub from_opacity: f32,
    pub to_opacity: f32,
    pub duration_ms: u32,
}

impl<T: Interpolate + PartialEq> Transition<T> {
    pub fn new(from: T, to: T, from_opacity: f32, to_opacity: f32, duration_ms: u32) -> Self {
        Self {
            from,
            to,
            from_opacity,
            to_opacity,
            duration_ms,
        }
    }

    /// Value and opacity after `elapsed_ms`.
    pub fn sample(&self, elapsed_ms: f32) -> (T, f32) {
        let t = if self.duration_ms == 0 {
            1.0
        } else {
            (elapsed_ms / self.duration_ms as f32).clamp(0.0, 1.0)
        };
        (
            self.from.lerp(&self.to, t),
            self.from_opacity.lerp(&self.to_opacity, t),
        )
    }

    pub fn is_stationary(&self) -> bool {
        self.from == self.to && self.from_opacity == self.to_opacity
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeChange {
    pub phase: Phase,
    pub node: VisibleNode,
    pub transition: Transition<Vec2>,
    pub content_changed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeChange {
    pub phase: Phase,
    pub edge: VisibleEdge,
    pub transition: Transition<LinkRoute>,
}

/// Everything a surface needs to move from the previous pass to this one.
///
/// Node and edge changes for entering and updated elements come in pre-order;
/// exits follow, ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPass {
    pub nodes: Vec<NodeChange>,
    pub edges: Vec<EdgeChange>,
}

impl RenderPass {
    pub fn entered(&self) -> impl Iterator<Item = &NodeChange> {
        self.nodes.iter().filter(|c| c.phase == Phase::Enter)
    }

    pub fn updated(&self) -> impl Iterator<Item = &NodeChange> {
        self.nodes.iter().filter(|c| c.phase == Phase::Update)
    }

    pub fn exited(&self) -> impl Iterator<Item = &NodeChange> {
        self.nodes.iter().filter(|c| c.phase == Phase::Exit)
    }

    /// True when the pass changes nothing on screen.
    pub fn is_noop(&self) -> bool {
        let nodes_idle = self.nodes.iter().all(|change| {
            change.phase == Phase::Update && !change.content_changed && change.transition.is_stationary()
        });
        let edges_idle = self
            .edges
            .iter()
            .all(|change| change.phase == Phase::Update && change.transition.is_stationary());
        nodes_idle && edges_idle
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiagramRenderer {
    previous_nodes: HashMap<NodeKey, VisibleNode>,
    previous_edges: HashMap<EdgeKey, VisibleEdge>,
    transition_ms: u32,
}

impl DiagramRenderer {
    pub fn new(transition_ms: u32) -> Self {
        Self {
            previous_nodes: HashMap::new(),
            previous_edges: HashMap::new(),
            transition_ms,
        }
    }

    pub fn transition_ms(&self) -> u32 {
        self.transition_ms
    }

    /// Number of cards drawn by the last pass.
    pub fn rendered_count(&self) -> usize {
        self.previous_nodes.len()
    }

    /// Forget the previous pass so the next one enters every element.
    pub fn forget(&mut self) {
        self.previous_nodes.clear();
        self.previous_edges.clear();
    }

    pub fn render<S>(&mut self, root: &ViewNode, champion: Option<&str>, surface: &mut S) -> RenderPass
    where
        S: DiagramSurface + ?Sized,
    {
        let (nodes, edges) = flatten(root, champion);
        self.render_visible(nodes, edges, surface)
    }

    /// Draw an already flattened tree, as returned by [`flatten`].
    pub fn render_visible<S>(
        &mut self,
        nodes: Vec<VisibleNode>,
        edges: Vec<VisibleEdge>,
        surface: &mut S,
    ) -> RenderPass
    where
        S: DiagramSurface + ?Sized,
    {
        let pass = self.diff(nodes, edges);
        surface.apply(&pass);

        tracing::debug!(
            entered = pass.entered().count(),
            exited = pass.exited().count(),
            visible = self.previous_nodes.len(),
            "Rendered diagram"
        );
        pass
    }

    fn diff(&mut self, nodes: Vec<VisibleNode>, edges: Vec<VisibleEdge>) -> RenderPass {
        let duration = self.transition_ms;
        let mut pass = RenderPass::default();
        let mut previous_nodes = std::mem::take(&mut self.previous_nodes);
        let mut previous_edges = std::mem::take(&mut self.previous_edges);

        for node in nodes {
            let change = match previous_nodes.remove(&node.key) {
                Some(old) => NodeChange {
                    phase: Phase::Update,
                    transition: Transition::new(old.position, node.position, 1.0, 1.0, duration),
                    content_changed: node.content_differs(&old),
                    node: node.clone(),
                },
                None => NodeChange {
                    phase: Phase::Enter,
                    transition: Transition::new(Vec2::ZERO, node.position, 0.0, 1.0, duration),
                    content_changed: true,
                    node: node.clone(),
                },
            };
            pass.nodes.push(change);
            self.previous_nodes.insert(node.key.clone(), node);
        }

        let mut exited: Vec<VisibleNode> = previous_nodes.into_values().collect();
        exited.sort_by(|a, b| a.key.cmp(&b.key));
        pass.nodes.extend(exited.into_iter().map(|node| NodeChange {
            phase: Phase::Exit,
            transition: Transition::new(node.position, node.position, 1.0, 0.0, duration),
            content_changed: false,
            node,
        }));

        for edge in edges {
            let change = match previous_edges.remove(&edge.key) {
                Some(old) => EdgeChange {
                    phase: Phase::Update,
                    transition: Transition::new(old.route, edge.route, 1.0, 1.0, duration),
                    edge: edge.clone(),
                },
                None => EdgeChange {
                    phase: Phase::Enter,
                    transition: Transition::new(
                        LinkRoute::collapsed_at(Vec2::ZERO),
                        edge.route,
                        0.0,
                        1.0,
                        duration,
                    ),
                    edge: edge.clone(),
                },
            };
            pass.edges.push(change);
            self.previous_edges.insert(edge.key.clone(), edge);
        }

        let mut exited: Vec<VisibleEdge> = previous_edges.into_values().collect();
        exited.sort_by(|a, b| a.key.cmp(&b.key));
        pass.edges.extend(exited.into_iter().map(|edge| EdgeChange {
            phase: Phase::Exit,
            transition: Transition::new(edge.route, edge.route, 1.0, 0.0, duration),
            edge,
        }));

        pass
    }
}
