pub mod controller;
pub mod error;
pub mod map;
pub mod selection;
pub mod service;
pub mod settings;
pub mod source;

pub use controller::{ExplorerController, HighlightSummary, SelectionOutcome};
pub use error::DataSourceError;
pub use map::{GeoPoint, MapBounds, MapMarker, MapView};
pub use selection::{SelectionTicket, SelectionTracker};
pub use service::{DirectoryService, VERSION};
pub use settings::ExplorerSettings;
pub use source::{HttpDataSource, LocalDataSource, OrgDataSource};
