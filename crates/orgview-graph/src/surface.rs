use crate::edge_router::LinkRoute;
use crate::geometry::Vec2;
use crate::render::{
    EdgeChange, EdgeKey, NodeChange, Phase, RenderPass, Transition, VisibleEdge, VisibleNode,
};
use crate::style::{CardStyle, get_card_style};
use crate::view_tree::NodeKey;
use std::collections::HashMap;
use std::fmt::Write as _;

/// Drawing target for render passes.
pub trait DiagramSurface {
    fn resize(&mut self, width: f32, height: f32);
    fn apply(&mut self, pass: &RenderPass);
    /// Drop every element without animating.
    fn clear(&mut self);
}

#[derive(Debug, Clone)]
pub struct NodeElement {
    pub node: VisibleNode,
    pub style: CardStyle,
    pub transition: Transition<Vec2>,
    pub elapsed_ms: f32,
    pub exiting: bool,
}

impl NodeElement {
    pub fn current(&self) -> (Vec2, f32) {
        self.transition.sample(self.elapsed_ms)
    }
}

#[derive(Debug, Clone)]
pub struct EdgeElement {
    pub edge: VisibleEdge,
    pub transition: Transition<LinkRoute>,
    pub elapsed_ms: f32,
    pub exiting: bool,
}

impl EdgeElement {
    pub fn current(&self) -> (LinkRoute, f32) {
        self.transition.sample(self.elapsed_ms)
    }
}

/// In-memory retained-mode surface.
///
/// Elements keep running transitions between passes; a change that arrives
/// mid-animation restarts from the currently sampled state instead of jumping.
#[derive(Debug, Clone, Default)]
pub struct RetainedSurface {
    width: f32,
    height: f32,
    nodes: HashMap<NodeKey, NodeElement>,
    edges: HashMap<EdgeKey, EdgeElement>,
    order: Vec<NodeKey>,
}

impl RetainedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn node(&self, key: &NodeKey) -> Option<&NodeElement> {
        self.nodes.get(key)
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&EdgeElement> {
        self.edges.get(key)
    }

    /// Elements still on screen, including ones fading out.
    pub fn element_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Cards that are not on their way out, in drawing order.
    pub fn live_nodes(&self) -> impl Iterator<Item = &NodeElement> {
        self.order
            .iter()
            .filter_map(|key| self.nodes.get(key))
            .filter(|element| !element.exiting)
    }

    pub fn is_animating(&self) -> bool {
        self.nodes
            .values()
            .any(|e| e.elapsed_ms < e.transition.duration_ms as f32 && !e.transition.is_stationary())
            || self
                .edges
                .values()
                .any(|e| e.elapsed_ms < e.transition.duration_ms as f32 && !e.transition.is_stationary())
    }

    /// Advance every transition and drop elements whose exit has finished.
    pub fn advance(&mut self, dt_ms: f32) {
        for element in self.nodes.values_mut() {
            element.elapsed_ms += dt_ms;
        }
        for element in self.edges.values_mut() {
            element.elapsed_ms += dt_ms;
        }
        self.drop_finished_exits();
    }

    /// Jump every transition to its end state.
    pub fn finish(&mut self) {
        for element in self.nodes.values_mut() {
            element.elapsed_ms = element.transition.duration_ms as f32;
        }
        for element in self.edges.values_mut() {
            element.elapsed_ms = element.transition.duration_ms as f32;
        }
        self.drop_finished_exits();
    }

    fn drop_finished_exits(&mut self) {
        self.nodes
            .retain(|_, e| !(e.exiting && e.elapsed_ms >= e.transition.duration_ms as f32));
        self.edges
            .retain(|_, e| !(e.exiting && e.elapsed_ms >= e.transition.duration_ms as f32));
        let nodes = &self.nodes;
        self.order.retain(|key| nodes.contains_key(key));
    }

    fn apply_node(&mut self, change: &NodeChange) {
        let mut transition = change.transition;
        if let Some(existing) = self.nodes.get(&change.node.key) {
            let (position, opacity) = existing.current();
            transition.from = position;
            transition.from_opacity = opacity;
        }
        self.nodes.insert(
            change.node.key.clone(),
            NodeElement {
                style: get_card_style(change.node.is_root, change.node.highlighted),
                node: change.node.clone(),
                transition,
                elapsed_ms: 0.0,
                exiting: change.phase == Phase::Exit,
            },
        );
    }

    fn apply_edge(&mut self, change: &EdgeChange) {
        let mut transition = change.transition;
        if let Some(existing) = self.edges.get(&change.edge.key) {
            let (route, opacity) = existing.current();
            transition.from = route;
            transition.from_opacity = opacity;
        }
        self.edges.insert(
            change.edge.key.clone(),
            EdgeElement {
                edge: change.edge.clone(),
                transition,
                elapsed_ms: 0.0,
                exiting: change.phase == Phase::Exit,
            },
        );
    }

    /// Indented outline of the live cards, one per line.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for element in self.live_nodes() {
            let node = &element.node;
            let marker = match (node.has_affordance, node.is_expanded) {
                (false, _) => "   ",
                (true, true) => "[-]",
                (true, false) => "[+]",
            };
            let star = if element.style.is_highlighted() { " *" } else { "" };
            let _ = write!(
                out,
                "{indent}{marker} {title}",
                indent = "  ".repeat(node.depth as usize),
                title = node.card.title,
            );
            if !node.card.subtitle.is_empty() {
                let _ = write!(out, " - {}", node.card.subtitle);
            }
            if !node.card.detail.is_empty() {
                let _ = write!(out, " ({})", node.card.detail);
            }
            let _ = writeln!(out, " [{}] <{}>{star}", node.card.relationship, node.key);
        }
        out
    }
}

impl DiagramSurface for RetainedSurface {
    fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn apply(&mut self, pass: &RenderPass) {
        for change in &pass.nodes {
            self.apply_node(change);
        }
        for change in &pass.edges {
            self.apply_edge(change);
        }

        let mut order: Vec<NodeKey> = pass
            .nodes
            .iter()
            .filter(|c| c.phase != Phase::Exit)
            .map(|c| c.node.key.clone())
            .collect();
        // Elements still fading out from earlier passes keep drawing after live ones.
        let lingering: Vec<NodeKey> = self
            .order
            .iter()
            .filter(|key| self.nodes.get(*key).is_some_and(|e| e.exiting))
            .filter(|key| !order.contains(key))
            .cloned()
            .collect();
        order.extend(lingering);
        for change in pass.exited() {
            if !order.contains(&change.node.key) {
                order.push(change.node.key.clone());
            }
        }
        self.order = order;
        self.drop_finished_exits();
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.order.clear();
    }
}
