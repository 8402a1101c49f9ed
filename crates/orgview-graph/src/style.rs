//! Diagram style system.
//!
//! Maps relationships, roots and highlight state onto the colours and stroke
//! widths the organisation chart and the location map use.

use orgview_core::Relationship;
use serde::{Deserialize, Serialize};
use std::fmt;

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `#RRGGBB`, alpha is dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Relationship status dots on cards
pub const COLOR_STATUS_DIRECT: Color = Color::rgb(0x10, 0xB9, 0x81);
pub const COLOR_STATUS_INDIRECT: Color = Color::rgb(0xF5, 0x9E, 0x0B);
pub const COLOR_STATUS_NONE: Color = Color::rgb(0xD1, 0xD5, 0xDB);

// Map markers
pub const COLOR_MARKER_DIRECT: Color = Color::rgb(0x00, 0xC8, 0x53);
pub const COLOR_MARKER_DIRECT_BORDER: Color = Color::rgb(0x00, 0xA8, 0x47);
pub const COLOR_MARKER_INDIRECT: Color = Color::rgb(0xFF, 0x98, 0x00);
pub const COLOR_MARKER_INDIRECT_BORDER: Color = Color::rgb(0xE6, 0x89, 0x00);
pub const COLOR_MARKER_NONE: Color = Color::rgb(0x75, 0x75, 0x75);
pub const COLOR_MARKER_NONE_BORDER: Color = Color::rgb(0x61, 0x61, 0x61);

// Cards
pub const COLOR_CARD_FILL: Color = Color::rgb(0xFF, 0xFF, 0xFF);
pub const COLOR_CARD_BORDER: Color = Color::rgb(0xE5, 0xE7, 0xEB);
pub const COLOR_ROOT_BORDER: Color = Color::rgb(0x0E, 0x33, 0x86);
pub const COLOR_HIGHLIGHT_BORDER: Color = Color::rgb(0xFF, 0xD7, 0x00);

/// Avatar circle colours, picked by name length.
pub const AVATAR_PALETTE: [Color; 8] = [
    Color::rgb(0x3B, 0x82, 0xF6),
    Color::rgb(0x10, 0xB9, 0x81),
    Color::rgb(0xF5, 0x9E, 0x0B),
    Color::rgb(0xEF, 0x44, 0x44),
    Color::rgb(0x8B, 0x5C, 0xF6),
    Color::rgb(0x06, 0xB6, 0xD4),
    Color::rgb(0xF9, 0x73, 0x16),
    Color::rgb(0x84, 0xCC, 0x16),
];

pub fn status_color(relationship: Relationship) -> Color {
    match relationship {
        Relationship::Direct => COLOR_STATUS_DIRECT,
        Relationship::Indirect => COLOR_STATUS_INDIRECT,
        Relationship::None => COLOR_STATUS_NONE,
    }
}

/// Fill and border for a location marker.
pub fn marker_colors(relationship: Relationship) -> (Color, Color) {
    match relationship {
        Relationship::Direct => (COLOR_MARKER_DIRECT, COLOR_MARKER_DIRECT_BORDER),
        Relationship::Indirect => (COLOR_MARKER_INDIRECT, COLOR_MARKER_INDIRECT_BORDER),
        Relationship::None => (COLOR_MARKER_NONE, COLOR_MARKER_NONE_BORDER),
    }
}

pub fn avatar_color(index: usize) -> Color {
    AVATAR_PALETTE[index % AVATAR_PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardStyle {
    pub fill: Color,
    pub border: Color,
    pub border_width: f32,
}

impl CardStyle {
    pub fn is_highlighted(&self) -> bool {
        self.border == COLOR_HIGHLIGHT_BORDER
    }

    pub fn new() -> Self {
        Self {
            fill: COLOR_CARD_FILL,
            border: COLOR_CARD_BORDER,
            border_width: 1.0,
        }
    }

    pub fn with_root(mut self, is_root: bool) -> Self {
        if is_root {
            self.border = COLOR_ROOT_BORDER;
            self.border_width = 2.0;
        }
        self
    }

    /// Highlight wins over the root border.
    pub fn with_highlight(mut self, highlighted: bool) -> Self {
        if highlighted {
            self.border = COLOR_HIGHLIGHT_BORDER;
            self.border_width = 3.0;
        }
        self
    }
}

impl Default for CardStyle {
    fn default() -> Self {
        Self::new()
    }
}

pub fn get_card_style(is_root: bool, highlighted: bool) -> CardStyle {
    CardStyle::new().with_root(is_root).with_highlight(highlighted)
}
