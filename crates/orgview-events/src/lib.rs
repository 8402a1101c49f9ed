use crossbeam_channel::{Receiver, Sender, unbounded};
use orgview_core::Relationship;
use serde::{Deserialize, Serialize};

/// Where a person selection came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SelectionOrigin {
    Search,
    Autocomplete,
    Cli,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    // Selection
    PersonSelected {
        name: String,
        origin: SelectionOrigin,
        generation: u64,
    },
    HierarchyLoaded {
        root: String,
        people: usize,
        generation: u64,
    },
    HierarchyFailed {
        name: String,
        error: String,
    },
    /// A response arrived for a selection that is no longer current.
    StaleResponseDropped {
        generation: u64,
        current: u64,
    },

    // Map
    MapDataLoaded {
        locations: usize,
        markers: usize,
    },
    MapDataFailed {
        error: String,
    },

    // Diagram
    NodeToggled {
        key: String,
        name: String,
        expanded: bool,
    },
    ResetRequested,
    ExpandAllRequested,
    CollapseAllRequested,
    Resized {
        width: f32,
    },
    DiagramRendered {
        visible: usize,
        entered: usize,
        exited: usize,
    },

    // Champions
    ChampionHighlighted {
        name: String,
        cards: usize,
        markers: usize,
    },
    HighlightsCleared,

    // Directory
    ConnectionUpdated {
        name: String,
        relationship: Relationship,
    },

    // Notifications
    ShowInfo {
        message: String,
    },
    ShowWarning {
        message: String,
    },
    ShowError {
        message: String,
    },
    StatusUpdate {
        message: String,
    },
}

impl Event {
    /// Whether the event is a user-facing notification.
    pub fn is_notification(&self) -> bool {
        matches!(
            self,
            Event::ShowInfo { .. } | Event::ShowWarning { .. } | Event::ShowError { .. }
        )
    }
}

pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        tracing::trace!(?event, "Publishing event");
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }

    /// Take every pending event without a listener.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }
}

/// Implement this to receive events from the [`EventBus`].
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}
