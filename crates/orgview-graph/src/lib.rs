pub mod card;
pub mod diagram;
pub mod edge_router;
pub mod error;
pub mod expansion;
pub mod geometry;
pub mod hit_tester;
pub mod layout;
pub mod render;
pub mod style;
pub mod surface;
pub mod view_tree;

pub use card::{CARD_HEIGHT, CARD_WIDTH, CardContent};
pub use diagram::{ClickOutcome, DiagramConfig, DiagramState, ResizePolicy};
pub use edge_router::LinkRoute;
pub use error::GraphError;
pub use expansion::{ToggleOutcome, collapse, expand, expand_all, expand_to_depth, toggle_expansion};
pub use geometry::{Interpolate, Rect, Vec2};
pub use hit_tester::{HitResult, HitTester};
pub use layout::{LayoutMetrics, Layouter, StackLayouter};
pub use render::{
    DiagramRenderer, EdgeChange, EdgeKey, NodeChange, Phase, RenderPass, Transition, VisibleEdge,
    VisibleNode, flatten,
};
pub use style::{CardStyle, Color, get_card_style, marker_colors, status_color};
pub use surface::{DiagramSurface, RetainedSurface};
pub use view_tree::{NodeKey, ViewNode, build_view_tree};
