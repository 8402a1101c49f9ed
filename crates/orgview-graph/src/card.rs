//! What a single person card shows, independent of where it is drawn.

use crate::geometry::{Rect, Vec2};
use crate::style::{Color, avatar_color, status_color};
use orgview_core::{PersonNode, Relationship, initials};
use serde::{Deserialize, Serialize};

pub const CARD_WIDTH: f32 = 280.0;
pub const CARD_HEIGHT: f32 = 85.0;

/// The expand/collapse circle sits this far below the card centre.
pub const AFFORDANCE_OFFSET_Y: f32 = 60.0;
pub const AFFORDANCE_RADIUS: f32 = 10.0;

/// Relationship dot, relative to the card centre.
pub const STATUS_OFFSET: Vec2 = Vec2 { x: 115.0, y: -25.0 };
pub const STATUS_RADIUS: f32 = 6.0;

const TITLE_LIMIT: usize = 20;
const SUBTITLE_LIMIT: usize = 24;
const DETAIL_LIMIT: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardContent {
    pub initials: String,
    pub title: String,
    pub subtitle: String,
    pub detail: String,
    pub avatar_index: usize,
    pub relationship: Relationship,
}

impl CardContent {
    pub fn from_person(person: &PersonNode) -> Self {
        let detail = if person.location.is_empty() {
            &person.country
        } else {
            &person.location
        };
        Self {
            initials: initials(&person.name, 2),
            title: truncate(&person.name, TITLE_LIMIT),
            subtitle: truncate(&person.position, SUBTITLE_LIMIT),
            detail: truncate(detail, DETAIL_LIMIT),
            avatar_index: person.name.len() % 8,
            relationship: person.relationship_with_qt,
        }
    }

    pub fn avatar_color(&self) -> Color {
        avatar_color(self.avatar_index)
    }

    pub fn status_color(&self) -> Color {
        status_color(self.relationship)
    }
}

/// Cut text longer than `limit` characters down to `limit - 2` plus an ellipsis.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit.saturating_sub(2)).collect();
    out.push_str("...");
    out
}

pub fn card_rect(center: Vec2) -> Rect {
    Rect::from_center_size(center, CARD_WIDTH, CARD_HEIGHT)
}

pub fn affordance_center(center: Vec2) -> Vec2 {
    Vec2::new(center.x, center.y + AFFORDANCE_OFFSET_Y)
}
