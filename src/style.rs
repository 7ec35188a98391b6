//! Presentation attributes shared by cells and paragraphs: colours, fonts,
//! alignment, borders, and the immutable [`StyleConfig`] handed to every
//! composer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Horizontal alignment of text or images inside their box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Horizontal offset of content `content_width` wide inside `box_width`.
    pub fn offset(self, box_width: f32, content_width: f32) -> f32 {
        let slack = (box_width - content_width).max(0.0);
        match self {
            TextAlign::Left => 0.0,
            TextAlign::Center => slack / 2.0,
            TextAlign::Right => slack,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// Cell border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    None,
    #[default]
    Box,
}

/// Stroke width used for [`Border::Box`], in points.
pub const BORDER_WIDTH_PT: f32 = 0.5;

/// Builtin PDF font families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Helvetica,
    TimesRoman,
    Courier,
}

impl FontFamily {
    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Helvetica => "Helvetica",
            FontFamily::TimesRoman => "Times-Roman",
            FontFamily::Courier => "Courier",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "Times-Roman" | "Times" => FontFamily::TimesRoman,
            "Courier" => FontFamily::Courier,
            _ => FontFamily::Helvetica,
        }
    }
}

/// RGBA colour (0.0 – 1.0).
///
/// Serialised as a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const LIGHT_GRAY: Self = Self::rgb(0.75, 0.75, 0.75);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
        match hex.len() {
            6 => Some(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => Some(Self::rgb(
                channel(&hex[0..1].repeat(2))?,
                channel(&hex[1..2].repeat(2))?,
                channel(&hex[2..3].repeat(2))?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid hex colour {value:?}"))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// A font specification. Never mutated once built; share it through
/// [`FontRef`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: FontFamily,
    pub bold: bool,
    pub size: f32,
    pub color: Color,
}

pub type FontRef = Arc<Font>;

impl Font {
    pub fn new(family: FontFamily, bold: bool, size: f32, color: Color) -> Self {
        Self {
            family,
            bold,
            size,
            color,
        }
    }

    pub fn helvetica(size: f32) -> Self {
        Self::new(FontFamily::Helvetica, false, size, Color::BLACK)
    }

    pub fn helvetica_bold(size: f32) -> Self {
        Self::new(FontFamily::Helvetica, true, size, Color::BLACK)
    }

    pub fn shared(self) -> FontRef {
        Arc::new(self)
    }
}

/// Fonts used by the page composer.
///
/// Built once and passed by reference to every composition call; cloning
/// only bumps reference counts.
#[derive(Debug, Clone)]
pub struct StyleConfig {
    /// Regular body text (Helvetica 12).
    pub body: FontRef,
    /// Bold body text (Helvetica Bold 12), used by the detail header.
    pub bold: FontRef,
    /// Right-hand text of the header band (Helvetica Bold 14).
    pub header_band: FontRef,
    /// Page title (Helvetica Bold 22).
    pub title: FontRef,
    /// Caption row of the line-items table (Times-Roman 12, white).
    pub caption: FontRef,
    /// Background of the caption row.
    pub caption_background: Color,
    /// Background of column-header rows.
    pub column_header_background: Color,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            body: Font::helvetica(12.0).shared(),
            bold: Font::helvetica_bold(12.0).shared(),
            header_band: Font::helvetica_bold(14.0).shared(),
            title: Font::helvetica_bold(22.0).shared(),
            caption: Font::new(FontFamily::TimesRoman, false, 12.0, Color::WHITE).shared(),
            caption_background: Color::BLACK,
            column_header_background: Color::LIGHT_GRAY,
        }
    }
}
