//! The interactive diagram: one raw hierarchy, its expansion state, and the
//! render bookkeeping needed to animate between states.

use crate::error::GraphError;
use crate::expansion::{self, ToggleOutcome};
use crate::geometry::Vec2;
use crate::hit_tester::{HitResult, HitTester};
use crate::layout::{LayoutMetrics, Layouter, StackLayouter};
use crate::render::{DEFAULT_TRANSITION_MS, DiagramRenderer, RenderPass, flatten};
use crate::surface::DiagramSurface;
use crate::view_tree::{NodeKey, ViewNode, build_view_tree};
use orgview_core::{Champion, PersonNode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a container resize does to expansion state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizePolicy {
    /// Rebuild from the raw root at the initial expansion depth.
    #[default]
    Rebuild,
    /// Keep what is expanded and only lay out again.
    Preserve,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub layout: StackLayouter,
    pub container_width: f32,
    /// Generations below the root that start out visible.
    pub initial_depth: u32,
    pub transition_ms: u32,
    pub resize_policy: ResizePolicy,
    /// Extra radius around expand/collapse affordances accepted as a click.
    pub click_tolerance: f32,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            layout: StackLayouter::default(),
            container_width: 1200.0,
            initial_depth: 0,
            transition_ms: DEFAULT_TRANSITION_MS,
            resize_policy: ResizePolicy::default(),
            click_tolerance: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    Missed,
    /// A card body was clicked; nothing changes.
    Card(NodeKey),
    Toggled {
        key: NodeKey,
        outcome: ToggleOutcome,
        pass: Option<RenderPass>,
    },
}

#[derive(Debug)]
pub struct DiagramState {
    raw: Arc<PersonNode>,
    root: ViewNode,
    config: DiagramConfig,
    renderer: DiagramRenderer,
    hit_tester: HitTester,
    metrics: LayoutMetrics,
    highlight: Option<String>,
}

impl DiagramState {
    /// Wrap a fetched hierarchy. Nothing is drawn until [`DiagramState::refresh`].
    pub fn new(raw: Option<Arc<PersonNode>>, config: DiagramConfig) -> Result<Self, GraphError> {
        let raw = raw.ok_or(GraphError::NoData)?;
        let root = Self::initial_tree(&raw, config.initial_depth)?;
        Ok(Self {
            raw,
            root,
            renderer: DiagramRenderer::new(config.transition_ms),
            hit_tester: HitTester::with_tolerance(config.click_tolerance),
            metrics: LayoutMetrics::default(),
            highlight: None,
            config,
        })
    }

    fn initial_tree(raw: &Arc<PersonNode>, depth: u32) -> Result<ViewNode, GraphError> {
        let mut root = build_view_tree(Some(Arc::clone(raw)))?;
        expansion::expand_to_depth(&mut root, depth);
        Ok(root)
    }

    /// Lay out the current tree and draw it.
    pub fn refresh<S: DiagramSurface + ?Sized>(&mut self, surface: &mut S) -> RenderPass {
        self.metrics = self
            .config
            .layout
            .compute_layout(&mut self.root, self.config.container_width);
        surface.resize(self.metrics.width, self.metrics.height);

        let (nodes, edges) = flatten(&self.root, self.highlight.as_deref());
        self.hit_tester.update(&nodes);
        self.renderer.render_visible(nodes, edges, surface)
    }

    /// Toggle one visible node. Leaves without reports are a no-op and skip drawing.
    pub fn toggle<S: DiagramSurface + ?Sized>(
        &mut self,
        key: &NodeKey,
        surface: &mut S,
    ) -> Result<(ToggleOutcome, Option<RenderPass>), GraphError> {
        let node = self
            .root
            .find_mut(key)
            .ok_or_else(|| GraphError::NodeNotVisible(key.to_string()))?;
        let outcome = expansion::toggle_expansion(node);
        if outcome == ToggleOutcome::NoChildren {
            return Ok((outcome, None));
        }
        Ok((outcome, Some(self.refresh(surface))))
    }

    pub fn click<S: DiagramSurface + ?Sized>(&mut self, point: Vec2, surface: &mut S) -> ClickOutcome {
        match self.hit_tester.hit_test(point) {
            HitResult::None => ClickOutcome::Missed,
            HitResult::Card(key) => ClickOutcome::Card(key),
            HitResult::Affordance(key) => match self.toggle(&key, surface) {
                Ok((outcome, pass)) => ClickOutcome::Toggled { key, outcome, pass },
                Err(err) => {
                    // Hit regions are refreshed with every layout, so this means a stale click.
                    tracing::warn!(error = %err, "Ignoring click on stale hit region");
                    ClickOutcome::Missed
                }
            },
        }
    }

    /// Rebuild from the raw root, animating from the current picture.
    pub fn reset<S: DiagramSurface + ?Sized>(&mut self, surface: &mut S) -> Result<RenderPass, GraphError> {
        self.root = Self::initial_tree(&self.raw, self.config.initial_depth)?;
        Ok(self.refresh(surface))
    }

    pub fn expand_all<S: DiagramSurface + ?Sized>(&mut self, surface: &mut S) -> RenderPass {
        let materialized = expansion::expand_all(&mut self.root);
        tracing::debug!(materialized, "Expanded whole hierarchy");
        self.refresh(surface)
    }

    /// Collapse everything, the root included.
    pub fn collapse_all<S: DiagramSurface + ?Sized>(&mut self, surface: &mut S) -> RenderPass {
        let removed = expansion::collapse(&mut self.root);
        tracing::debug!(removed, "Collapsed whole hierarchy");
        self.refresh(surface)
    }

    pub fn resize<S: DiagramSurface + ?Sized>(
        &mut self,
        width: f32,
        surface: &mut S,
    ) -> Result<RenderPass, GraphError> {
        self.config.container_width = width;
        match self.config.resize_policy {
            ResizePolicy::Rebuild => self.reset(surface),
            ResizePolicy::Preserve => Ok(self.refresh(surface)),
        }
    }

    pub fn highlight<S: DiagramSurface + ?Sized>(&mut self, champion: &Champion, surface: &mut S) -> RenderPass {
        self.highlight = Some(champion.name.clone());
        self.refresh(surface)
    }

    pub fn clear_highlight<S: DiagramSurface + ?Sized>(&mut self, surface: &mut S) -> RenderPass {
        self.highlight = None;
        self.refresh(surface)
    }

    pub fn raw(&self) -> &Arc<PersonNode> {
        &self.raw
    }

    pub fn root(&self) -> &ViewNode {
        &self.root
    }

    pub fn metrics(&self) -> LayoutMetrics {
        self.metrics
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn highlighted_champion(&self) -> Option<&str> {
        self.highlight.as_deref()
    }

    pub fn affordance_of(&self, key: &NodeKey) -> Option<Vec2> {
        self.hit_tester.affordance_of(key)
    }
}
