//! Page grid, spacing scale, palette and type scale shared by every composer.
//! All lengths are PDF points; y grows downward from the top edge.

use crate::fonts::FontWeight;

pub type Rgb = [u8; 3];

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 48.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Space kept free above content for the running header stamped later.
pub const HEADER_RESERVED: f32 = 92.0;
/// Lowest y content may reach before the footer zone.
pub const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - 64.0;

pub const SPACE_XS: f32 = 4.0;
pub const SPACE_SM: f32 = 8.0;
pub const SPACE_MD: f32 = 12.0;
pub const SPACE_LG: f32 = 18.0;
pub const SPACE_XL: f32 = 28.0;

pub const COLUMN_GUTTER: f32 = 24.0;
pub const CARD_PADDING: f32 = 14.0;
pub const CARD_RADIUS: f32 = 6.0;
pub const RULE_WIDTH: f32 = 0.6;

pub const INK: Rgb = [17, 24, 39];
pub const MUTED: Rgb = [107, 114, 128];
pub const RULE: Rgb = [222, 224, 228];
pub const SURFACE: Rgb = [247, 246, 243];
pub const ACCENT: Rgb = [196, 145, 62];
pub const PAPER: Rgb = [245, 242, 236];
pub const BAND: Rgb = [20, 20, 22];
pub const WHITE: Rgb = [255, 255, 255];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
    pub color: Rgb,
}

impl TextStyle {
    pub const fn new(size: f32, weight: FontWeight, color: Rgb) -> Self {
        Self {
            size,
            weight,
            color,
        }
    }

    pub const fn with_color(self, color: Rgb) -> Self {
        Self { color, ..self }
    }

    pub const fn bold(self) -> Self {
        Self {
            weight: FontWeight::Bold,
            ..self
        }
    }

    pub const fn sized(self, size: f32) -> Self {
        Self { size, ..self }
    }

    /// Baseline-to-baseline distance used for wrapped text in this style.
    pub fn line_height(&self) -> f32 {
        self.size * LINE_HEIGHT_FACTOR
    }
}

pub const LINE_HEIGHT_FACTOR: f32 = 1.4;

pub const META: TextStyle = TextStyle::new(7.5, FontWeight::Bold, MUTED);
pub const BODY: TextStyle = TextStyle::new(9.5, FontWeight::Regular, INK);
pub const SMALL: TextStyle = TextStyle::new(8.0, FontWeight::Regular, MUTED);
pub const H3: TextStyle = TextStyle::new(11.0, FontWeight::Bold, INK);
pub const H2: TextStyle = TextStyle::new(16.0, FontWeight::Bold, INK);
pub const HERO_AMOUNT: TextStyle = TextStyle::new(30.0, FontWeight::Bold, INK);
pub const DISPLAY: TextStyle = TextStyle::new(54.0, FontWeight::Bold, WHITE);
