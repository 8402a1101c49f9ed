use crate::error::DataSourceError;
use crate::map::MapView;
use crate::selection::{SelectionTicket, SelectionTracker};
use crate::source::OrgDataSource;
use orgview_api::{AddConnectionRequest, AddConnectionResponse};
use orgview_core::{
    BusinessOpportunityStats, Champion, LocationBucket, PersonNode, Relationship,
    analyze_business_opportunities, analyze_representatives,
};
use orgview_events::{Event, EventBus, SelectionOrigin};
use orgview_graph::{
    ClickOutcome, DiagramConfig, DiagramState, DiagramSurface, GraphError, NodeKey, Phase,
    RenderPass, ToggleOutcome, Vec2,
};
use orgview_search::SearchEngine;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Loaded { root: String, people: usize },
    /// A newer selection started before this response arrived.
    Stale,
    /// Nothing was drawn; the error was reported to the user.
    HierarchyFailed(String),
    /// Search found nobody for the query.
    NoMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSummary {
    pub cards: usize,
    pub markers: usize,
}

fn rendered_event(diagram: &DiagramState, pass: &RenderPass) -> Event {
    Event::DiagramRendered {
        visible: diagram.root().visible_count(),
        entered: pass.entered().count(),
        exited: pass.exited().count(),
    }
}

/// Drives one diagram from user intents.
///
/// Owns the view state explicitly: the current diagram, the derived analytics,
/// the map, and the selection generation used to drop stale fetches.
pub struct ExplorerController<S: DiagramSurface> {
    config: DiagramConfig,
    surface: S,
    diagram: Option<DiagramState>,
    selection: SelectionTracker,
    opportunities: Option<BusinessOpportunityStats>,
    champions: Vec<Champion>,
    map: Option<MapView>,
    events: EventBus,
}

impl<S: DiagramSurface> ExplorerController<S> {
    pub fn new(surface: S, config: DiagramConfig) -> Self {
        Self {
            config,
            surface,
            diagram: None,
            selection: SelectionTracker::new(),
            opportunities: None,
            champions: Vec::new(),
            map: None,
            events: EventBus::new(),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn diagram(&self) -> Option<&DiagramState> {
        self.diagram.as_ref()
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn opportunities(&self) -> Option<&BusinessOpportunityStats> {
        self.opportunities.as_ref()
    }

    pub fn champions(&self) -> &[Champion] {
        &self.champions
    }

    pub fn map(&self) -> Option<&MapView> {
        self.map.as_ref()
    }

    /// Name at the root of the current diagram.
    pub fn current_person(&self) -> Option<&str> {
        self.diagram.as_ref().map(|d| d.raw().name.as_str())
    }

    pub fn begin_selection(&mut self, name: &str, origin: SelectionOrigin) -> SelectionTicket {
        let ticket = self.selection.begin(name);
        tracing::info!(person = name, generation = ticket.generation(), "Person selected");
        self.events.publish(Event::PersonSelected {
            name: name.to_string(),
            origin,
            generation: ticket.generation(),
        });
        self.events.publish(Event::StatusUpdate {
            message: format!("Loading hierarchy for {name}..."),
        });
        ticket
    }

    fn is_stale(&self, ticket: &SelectionTicket) -> bool {
        if self.selection.is_current(ticket) {
            return false;
        }
        tracing::warn!(
            person = ticket.name(),
            generation = ticket.generation(),
            current = self.selection.current(),
            "Dropping response for superseded selection"
        );
        self.events.publish(Event::StaleResponseDropped {
            generation: ticket.generation(),
            current: self.selection.current(),
        });
        true
    }

    /// Apply a hierarchy fetched under `ticket`. Replaces the whole picture.
    pub fn complete_selection(
        &mut self,
        ticket: &SelectionTicket,
        result: Result<PersonNode, DataSourceError>,
    ) -> SelectionOutcome {
        if self.is_stale(ticket) {
            return SelectionOutcome::Stale;
        }

        let raw = match result {
            Ok(raw) => Arc::new(raw),
            Err(err) => return self.fail_selection(ticket, err.to_string()),
        };
        let mut diagram = match DiagramState::new(Some(Arc::clone(&raw)), self.config.clone()) {
            Ok(diagram) => diagram,
            Err(err) => return self.fail_selection(ticket, err.to_string()),
        };

        self.surface.clear();
        let pass = diagram.refresh(&mut self.surface);

        let opportunities = analyze_business_opportunities(&raw);
        self.champions = analyze_representatives(&raw);
        self.map = None;

        let people = opportunities.total;
        self.events.publish(Event::HierarchyLoaded {
            root: raw.name.clone(),
            people,
            generation: ticket.generation(),
        });
        self.events.publish(rendered_event(&diagram, &pass));
        if let Some(banner) = opportunities.banner() {
            self.events.publish(Event::ShowInfo {
                message: banner.message(),
            });
        }
        tracing::debug!(
            root = %raw.name,
            people,
            champions = self.champions.len(),
            "Hierarchy loaded"
        );

        self.opportunities = Some(opportunities);
        self.diagram = Some(diagram);
        SelectionOutcome::Loaded {
            root: raw.name.clone(),
            people,
        }
    }

    fn fail_selection(&mut self, ticket: &SelectionTicket, error: String) -> SelectionOutcome {
        tracing::error!(person = ticket.name(), %error, "Failed to load hierarchy");
        self.diagram = None;
        self.opportunities = None;
        self.champions.clear();
        self.map = None;
        self.surface.clear();
        self.events.publish(Event::HierarchyFailed {
            name: ticket.name().to_string(),
            error: error.clone(),
        });
        self.events.publish(Event::ShowError {
            message: format!("Error loading organization chart: {error}"),
        });
        SelectionOutcome::HierarchyFailed(error)
    }

    /// Apply map data fetched under `ticket`. Failures never touch the diagram.
    pub fn complete_map(
        &mut self,
        ticket: &SelectionTicket,
        result: Result<Vec<LocationBucket>, DataSourceError>,
    ) -> bool {
        if self.is_stale(ticket) {
            return false;
        }

        match result {
            Ok(buckets) => {
                let mut view = MapView::from_buckets(&buckets);
                if let Some(champion) = self.highlighted_champion() {
                    view.highlight(&champion);
                }
                self.events.publish(Event::MapDataLoaded {
                    locations: buckets.len(),
                    markers: view.markers().len(),
                });
                self.map = Some(view);
                true
            }
            Err(err) => {
                tracing::warn!(person = ticket.name(), error = %err, "Map data unavailable");
                self.map = None;
                self.events.publish(Event::MapDataFailed {
                    error: err.to_string(),
                });
                self.events.publish(Event::ShowWarning {
                    message: format!("Could not load map data: {err}"),
                });
                false
            }
        }
    }

    /// Fetch and show the hierarchy for `name`, then its map.
    pub async fn select_person<D: OrgDataSource + ?Sized>(
        &mut self,
        source: &D,
        name: &str,
        origin: SelectionOrigin,
    ) -> SelectionOutcome {
        let ticket = self.begin_selection(name, origin);
        let hierarchy = source.hierarchy(name).await;
        let outcome = self.complete_selection(&ticket, hierarchy);
        if matches!(outcome, SelectionOutcome::Loaded { .. }) {
            let map = source.map_data(name).await;
            self.complete_map(&ticket, map);
        }
        outcome
    }

    /// Search, then select the best match: an exact name wins over the first hit.
    pub async fn search_and_select<D: OrgDataSource + ?Sized>(
        &mut self,
        source: &D,
        query: &str,
    ) -> SelectionOutcome {
        let results = match source.search(query).await {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(query, error = %err, "Search failed");
                self.events.publish(Event::ShowError {
                    message: format!("Search failed: {err}"),
                });
                return SelectionOutcome::NoMatch;
            }
        };
        let Some(person) = SearchEngine::best_match(query, &results) else {
            self.events.publish(Event::ShowWarning {
                message: format!("No one found for \"{query}\""),
            });
            return SelectionOutcome::NoMatch;
        };
        let name = person.name.clone();
        self.select_person(source, &name, SelectionOrigin::Search).await
    }

    pub fn on_node_toggled(&mut self, key: &NodeKey) -> Result<ToggleOutcome, GraphError> {
        let diagram = self.diagram.as_mut().ok_or(GraphError::NoData)?;
        let (outcome, pass) = diagram.toggle(key, &mut self.surface)?;
        if let Some(pass) = pass {
            let name = diagram
                .root()
                .find(key)
                .map(|node| node.name().to_string())
                .unwrap_or_default();
            self.events.publish(Event::NodeToggled {
                key: key.to_string(),
                name,
                expanded: matches!(outcome, ToggleOutcome::Expanded { .. }),
            });
            self.events.publish(rendered_event(diagram, &pass));
        }
        Ok(outcome)
    }

    /// Pointer click at a diagram position.
    pub fn on_click(&mut self, point: Vec2) -> ClickOutcome {
        let Some(diagram) = self.diagram.as_mut() else {
            return ClickOutcome::Missed;
        };
        let outcome = diagram.click(point, &mut self.surface);
        if let ClickOutcome::Toggled {
            key,
            outcome: toggle,
            pass: Some(pass),
        } = &outcome
        {
            let name = diagram
                .root()
                .find(key)
                .map(|node| node.name().to_string())
                .unwrap_or_default();
            self.events.publish(Event::NodeToggled {
                key: key.to_string(),
                name,
                expanded: matches!(toggle, ToggleOutcome::Expanded { .. }),
            });
            self.events.publish(rendered_event(diagram, pass));
        }
        outcome
    }

    pub fn on_reset(&mut self) -> Result<RenderPass, GraphError> {
        self.events.publish(Event::ResetRequested);
        let diagram = self.diagram.as_mut().ok_or(GraphError::NoData)?;
        let pass = diagram.reset(&mut self.surface)?;
        self.events.publish(rendered_event(diagram, &pass));
        Ok(pass)
    }

    pub fn on_expand_all_requested(&mut self) -> Result<RenderPass, GraphError> {
        self.events.publish(Event::ExpandAllRequested);
        let diagram = self.diagram.as_mut().ok_or(GraphError::NoData)?;
        let pass = diagram.expand_all(&mut self.surface);
        self.events.publish(rendered_event(diagram, &pass));
        Ok(pass)
    }

    pub fn on_collapse_all_requested(&mut self) -> Result<RenderPass, GraphError> {
        self.events.publish(Event::CollapseAllRequested);
        let diagram = self.diagram.as_mut().ok_or(GraphError::NoData)?;
        let pass = diagram.collapse_all(&mut self.surface);
        self.events.publish(rendered_event(diagram, &pass));
        Ok(pass)
    }

    /// New container width. Without a diagram the width is kept for the next one.
    pub fn on_resize(&mut self, width: f32) -> Result<Option<RenderPass>, GraphError> {
        self.config.container_width = width;
        self.events.publish(Event::Resized { width });
        let Some(diagram) = self.diagram.as_mut() else {
            return Ok(None);
        };
        let pass = diagram.resize(width, &mut self.surface)?;
        self.events.publish(rendered_event(diagram, &pass));
        Ok(Some(pass))
    }

    fn find_champion(&self, name: &str) -> Option<Champion> {
        let wanted = name.trim().to_lowercase();
        self.champions
            .iter()
            .find(|c| c.name.to_lowercase() == wanted)
            .cloned()
    }

    fn highlighted_champion(&self) -> Option<Champion> {
        let name = self.diagram.as_ref()?.highlighted_champion()?;
        self.find_champion(name)
    }

    /// Mark a champion's people on the diagram and the map.
    ///
    /// Returns `None` when the current hierarchy has no such champion.
    pub fn highlight_champion(&mut self, name: &str) -> Option<HighlightSummary> {
        let Some(champion) = self.find_champion(name) else {
            self.events.publish(Event::ShowWarning {
                message: format!("{name} is not a champion in this hierarchy"),
            });
            return None;
        };
        let diagram = self.diagram.as_mut()?;

        let pass = diagram.highlight(&champion, &mut self.surface);
        let cards = pass
            .nodes
            .iter()
            .filter(|c| c.phase != Phase::Exit && c.node.highlighted)
            .count();
        let markers = self
            .map
            .as_mut()
            .map_or(0, |map| map.highlight(&champion));

        tracing::debug!(champion = %champion.name, cards, markers, "Highlighted champion");
        self.events.publish(rendered_event(diagram, &pass));
        self.events.publish(Event::ChampionHighlighted {
            name: champion.name.clone(),
            cards,
            markers,
        });
        Some(HighlightSummary { cards, markers })
    }

    pub fn clear_highlights(&mut self) {
        if let Some(diagram) = self.diagram.as_mut() {
            let pass = diagram.clear_highlight(&mut self.surface);
            self.events.publish(rendered_event(diagram, &pass));
        }
        if let Some(map) = self.map.as_mut() {
            map.clear_highlight();
        }
        self.events.publish(Event::HighlightsCleared);
    }

    /// Record a connection and, when it touches the shown hierarchy, reload it.
    pub async fn add_connection<D: OrgDataSource + ?Sized>(
        &mut self,
        source: &D,
        req: AddConnectionRequest,
    ) -> Result<AddConnectionResponse, DataSourceError> {
        let relationship = req
            .relationship
            .map(Relationship::from)
            .unwrap_or(Relationship::Direct);
        let response = match source.add_connection(req).await {
            Ok(response) => response,
            Err(err) => {
                self.events.publish(Event::ShowError {
                    message: format!("Failed to add connection: {err}"),
                });
                return Err(err);
            }
        };

        self.events.publish(Event::ConnectionUpdated {
            name: response.data.name.clone(),
            relationship,
        });
        self.events.publish(Event::ShowInfo {
            message: response.message.clone(),
        });

        let wanted = response.data.name.trim().to_lowercase();
        let shown = self
            .diagram
            .as_ref()
            .is_some_and(|d| d.raw().walk().any(|p| p.name.to_lowercase() == wanted));
        if response.data.matched_employee && shown {
            if let Some(root) = self.current_person().map(str::to_string) {
                self.select_person(source, &root, SelectionOrigin::Cli).await;
            }
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::DirectoryService;
    use crate::source::LocalDataSource;
    use async_trait::async_trait;
    use orgview_api::SuggestionDto;
    use orgview_core::EmployeeRecord;
    use orgview_graph::RetainedSurface;

    fn controller() -> ExplorerController<RetainedSurface> {
        ExplorerController::new(RetainedSurface::new(), DiagramConfig::default())
    }

    fn source() -> LocalDataSource {
        LocalDataSource::new(DirectoryService::sample().unwrap())
    }

    fn small_tree() -> PersonNode {
        PersonNode::new("Alice")
            .with_representative("Mike")
            .with_child(PersonNode::new("Bob").with_representative("Mike"))
            .with_child(PersonNode::new("Carol").with_child(PersonNode::new("Dave")))
    }

    /// Source whose map endpoint always fails.
    struct NoMapSource;

    #[async_trait]
    impl OrgDataSource for NoMapSource {
        async fn search(&self, _query: &str) -> Result<Vec<EmployeeRecord>, DataSourceError> {
            Ok(Vec::new())
        }

        async fn autocomplete(
            &self,
            _query: &str,
            _limit: usize,
        ) -> Result<Vec<SuggestionDto>, DataSourceError> {
            Ok(Vec::new())
        }

        async fn hierarchy(&self, _name: &str) -> Result<PersonNode, DataSourceError> {
            Ok(small_tree())
        }

        async fn map_data(&self, _name: &str) -> Result<Vec<LocationBucket>, DataSourceError> {
            Err(DataSourceError::Status {
                status: 503,
                message: "Service Unavailable".to_string(),
            })
        }

        async fn add_connection(
            &self,
            _req: AddConnectionRequest,
        ) -> Result<AddConnectionResponse, DataSourceError> {
            Err(DataSourceError::NotFound("add-connection".to_string()))
        }
    }

    #[tokio::test]
    async fn test_select_person_draws_root_and_map() {
        let mut controller = controller();
        let outcome = controller
            .select_person(&source(), "Sarah Williams", SelectionOrigin::Cli)
            .await;

        assert_eq!(
            outcome,
            SelectionOutcome::Loaded {
                root: "Sarah Williams".to_string(),
                people: 26
            }
        );
        assert_eq!(controller.surface().live_nodes().count(), 1);
        assert!(controller.map().is_some_and(|m| !m.markers().is_empty()));
        assert!(!controller.champions().is_empty());

        let events = controller.events().drain();
        assert!(events.iter().any(|e| matches!(e, Event::HierarchyLoaded { people: 26, .. })));
        assert!(events.iter().any(|e| matches!(e, Event::ShowInfo { .. })));
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut controller = controller();
        let first = controller.begin_selection("Alice", SelectionOrigin::Search);
        let second = controller.begin_selection("Zed", SelectionOrigin::Search);

        assert_eq!(
            controller.complete_selection(&first, Ok(small_tree())),
            SelectionOutcome::Stale
        );
        assert!(controller.diagram().is_none());
        assert!(!controller.complete_map(&first, Ok(Vec::new())));

        let outcome = controller.complete_selection(&second, Ok(PersonNode::new("Zed")));
        assert!(matches!(outcome, SelectionOutcome::Loaded { .. }));
        assert_eq!(controller.current_person(), Some("Zed"));

        let events = controller.events().drain();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::StaleResponseDropped {
                generation: 1,
                current: 2
            }
        )));
    }

    #[test]
    fn test_hierarchy_failure_reports_error_and_draws_nothing() {
        let mut controller = controller();
        let ticket = controller.begin_selection("Ghost", SelectionOrigin::Cli);
        let outcome = controller.complete_selection(
            &ticket,
            Err(DataSourceError::NotFound("Ghost".to_string())),
        );

        assert!(matches!(outcome, SelectionOutcome::HierarchyFailed(_)));
        assert!(controller.diagram().is_none());
        assert_eq!(controller.surface().element_count(), 0);
        assert!(
            controller
                .events()
                .drain()
                .iter()
                .any(|e| matches!(e, Event::ShowError { .. }))
        );
    }

    #[tokio::test]
    async fn test_map_failure_keeps_diagram() {
        let mut controller = controller();
        let outcome = controller
            .select_person(&NoMapSource, "Alice", SelectionOrigin::Cli)
            .await;

        assert!(matches!(outcome, SelectionOutcome::Loaded { .. }));
        assert!(controller.diagram().is_some());
        assert!(controller.map().is_none());
        let events = controller.events().drain();
        assert!(events.iter().any(|e| matches!(e, Event::MapDataFailed { .. })));
        assert!(events.iter().any(|e| matches!(e, Event::ShowWarning { .. })));
        assert!(!events.iter().any(|e| matches!(e, Event::ShowError { .. })));
    }

    #[test]
    fn test_toggle_expand_and_collapse() {
        let mut controller = controller();
        let ticket = controller.begin_selection("Alice", SelectionOrigin::Cli);
        controller.complete_selection(&ticket, Ok(small_tree()));

        let root = NodeKey::root();
        assert_eq!(
            controller.on_node_toggled(&root).unwrap(),
            ToggleOutcome::Expanded { materialized: 2 }
        );
        assert_eq!(controller.surface().live_nodes().count(), 3);

        let bob = root.child(0);
        assert_eq!(
            controller.on_node_toggled(&bob).unwrap(),
            ToggleOutcome::NoChildren
        );

        assert!(matches!(
            controller.on_node_toggled(&root).unwrap(),
            ToggleOutcome::Collapsed { removed: 2 }
        ));
        assert!(controller.on_node_toggled(&bob).is_err());
    }

    #[test]
    fn test_bulk_commands_and_resize() {
        let mut controller = controller();
        assert!(matches!(
            controller.on_expand_all_requested(),
            Err(GraphError::NoData)
        ));
        assert!(controller.on_resize(900.0).unwrap().is_none());
        assert_eq!(controller.config().container_width, 900.0);

        let ticket = controller.begin_selection("Alice", SelectionOrigin::Cli);
        controller.complete_selection(&ticket, Ok(small_tree()));

        controller.on_expand_all_requested().unwrap();
        assert_eq!(controller.diagram().unwrap().root().visible_count(), 4);

        controller.on_collapse_all_requested().unwrap();
        assert_eq!(controller.diagram().unwrap().root().visible_count(), 1);

        controller.on_expand_all_requested().unwrap();
        controller.on_reset().unwrap();
        assert_eq!(controller.diagram().unwrap().root().visible_count(), 1);

        controller.on_expand_all_requested().unwrap();
        controller.on_resize(700.0).unwrap();
        assert_eq!(controller.diagram().unwrap().root().visible_count(), 1);
    }

    #[test]
    fn test_champion_highlight_marks_cards() {
        let mut controller = controller();
        let ticket = controller.begin_selection("Alice", SelectionOrigin::Cli);
        controller.complete_selection(&ticket, Ok(small_tree()));
        controller.on_expand_all_requested().unwrap();

        let summary = controller.highlight_champion("mike").unwrap();
        assert_eq!(summary, HighlightSummary { cards: 2, markers: 0 });
        assert_eq!(
            controller.diagram().unwrap().highlighted_champion(),
            Some("Mike")
        );

        assert!(controller.highlight_champion("Nobody").is_none());

        controller.clear_highlights();
        assert!(controller.diagram().unwrap().highlighted_champion().is_none());
    }

    #[tokio::test]
    async fn test_search_and_select_prefers_exact_name() {
        let mut controller = controller();
        let outcome = controller.search_and_select(&source(), "james thompson").await;
        assert!(matches!(
            outcome,
            SelectionOutcome::Loaded { ref root, .. } if root == "James Thompson"
        ));

        let outcome = controller.search_and_select(&source(), "zzzz").await;
        assert_eq!(outcome, SelectionOutcome::NoMatch);
    }

    #[tokio::test]
    async fn test_add_connection_reloads_shown_hierarchy() {
        let source = source();
        let mut controller = controller();
        controller
            .select_person(&source, "James Thompson", SelectionOrigin::Cli)
            .await;
        controller.events().drain();

        let response = controller
            .add_connection(
                &source,
                AddConnectionRequest {
                    name: "Oliver Davis".to_string(),
                    connection_champion: "Dennis".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(response.data.matched_employee);

        let oliver = controller
            .diagram()
            .unwrap()
            .raw()
            .walk()
            .find(|p| p.name == "Oliver Davis")
            .cloned()
            .unwrap();
        assert_eq!(oliver.representative_from_qt.as_deref(), Some("Dennis"));
        assert_eq!(oliver.relationship_with_qt, Relationship::Direct);

        let events = controller.events().drain();
        assert!(events.iter().any(|e| matches!(e, Event::ConnectionUpdated { .. })));
        assert!(events.iter().any(|e| matches!(e, Event::HierarchyLoaded { .. })));
    }
}
