use crate::card::CARD_HEIGHT;
use crate::geometry::{Interpolate, Vec2};
use serde::{Deserialize, Serialize};

/// Straight connector from the bottom edge of a parent card to the top edge of a child card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkRoute {
    pub start: Vec2,
    pub end: Vec2,
}

impl LinkRoute {
    pub fn between(parent: Vec2, child: Vec2) -> Self {
        let half = CARD_HEIGHT / 2.0;
        Self {
            start: Vec2::new(parent.x, parent.y + half),
            end: Vec2::new(child.x, child.y - half),
        }
    }

    /// Degenerate route used as the enter/exit anchor for links.
    pub fn collapsed_at(point: Vec2) -> Self {
        Self {
            start: point,
            end: point,
        }
    }
}

impl Interpolate for LinkRoute {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        Self {
            start: self.start.lerp(&to.start, t),
            end: self.end.lerp(&to.end, t),
        }
    }
}
