//! Character formatting model
//!
//! Run formatting is a fixed record of optional fields. `None` means the
//! field is unset on the run and inherits from the paragraph or style
//! hierarchy; `Some(false)` is an explicit "off".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Formatting attributes carried by a run or a style span
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleAttributes {
    /// Bold weight
    pub bold: Option<bool>,
    /// Italic posture
    pub italic: Option<bool>,
    /// Underline style
    pub underline: Option<Underline>,
    /// Latin font family name
    pub font_family: Option<String>,
    /// Font size
    pub font_size: Option<FontSize>,
    /// Foreground colour
    pub color: Option<RgbColor>,
}

impl StyleAttributes {
    /// Attributes with every field unset (paragraph default)
    pub fn plain() -> Self {
        Self::default()
    }

    /// Returns true when no field is set
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    /// Builder: set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    /// Builder: set underline
    pub fn with_underline(mut self, underline: Underline) -> Self {
        self.underline = Some(underline);
        self
    }

    /// Builder: set font family
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Builder: set font size
    pub fn with_font_size(mut self, size: FontSize) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Builder: set colour
    pub fn with_color(mut self, color: RgbColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Whether the run is visibly emphasised (bold, italic or underlined)
    pub fn is_emphasis(&self) -> bool {
        self.bold == Some(true)
            || self.italic == Some(true)
            || matches!(self.underline, Some(ref u) if *u != Underline::None)
    }
}

/// Underline styles shared by WordprocessingML and DrawingML
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Underline {
    /// Explicitly no underline
    None,
    /// Single line
    Single,
    /// Double line
    Double,
    /// Thick line
    Thick,
    /// Dotted line
    Dotted,
    /// Dashed line
    Dashed,
    /// Wavy line
    Wavy,
    /// Underline words only, not spaces
    Words,
    /// Any other value, kept verbatim in the dialect it was read from
    Other(String),
}

impl Underline {
    /// Parse a WordprocessingML `w:u/@w:val` value
    pub fn from_wordml(val: &str) -> Self {
        match val {
            "none" => Self::None,
            "single" => Self::Single,
            "double" => Self::Double,
            "thick" => Self::Thick,
            "dotted" => Self::Dotted,
            "dash" => Self::Dashed,
            "wave" => Self::Wavy,
            "words" => Self::Words,
            other => Self::Other(other.to_string()),
        }
    }

    /// WordprocessingML value for this underline
    pub fn to_wordml(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Single => "single",
            Self::Double => "double",
            Self::Thick => "thick",
            Self::Dotted => "dotted",
            Self::Dashed => "dash",
            Self::Wavy => "wave",
            Self::Words => "words",
            Self::Other(v) => v,
        }
    }

    /// Parse a DrawingML `a:rPr/@u` value
    pub fn from_drawingml(val: &str) -> Self {
        match val {
            "none" => Self::None,
            "sng" => Self::Single,
            "dbl" => Self::Double,
            "heavy" => Self::Thick,
            "dotted" => Self::Dotted,
            "dash" => Self::Dashed,
            "wavy" => Self::Wavy,
            "words" => Self::Words,
            other => Self::Other(other.to_string()),
        }
    }

    /// DrawingML value for this underline
    pub fn to_drawingml(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Single => "sng",
            Self::Double => "dbl",
            Self::Thick => "heavy",
            Self::Dotted => "dotted",
            Self::Dashed => "dash",
            Self::Wavy => "wavy",
            Self::Words => "words",
            Self::Other(v) => v,
        }
    }
}

/// Font size in hundredths of a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontSize(u32);

impl FontSize {
    /// From hundredths of a point (DrawingML `sz`)
    pub fn from_hundredths(value: u32) -> Self {
        Self(value)
    }

    /// From half-points (WordprocessingML `w:sz`)
    pub fn from_half_points(value: u32) -> Self {
        Self(value * 50)
    }

    /// From whole points
    pub fn from_points(points: f32) -> Self {
        Self((points * 100.0).round().max(0.0) as u32)
    }

    /// Hundredths of a point
    pub fn hundredths(self) -> u32 {
        self.0
    }

    /// Half-points, rounded to nearest
    pub fn half_points(self) -> u32 {
        (self.0 + 25) / 50
    }

    /// Points as float
    pub fn points(self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}pt", self.points())
    }
}

/// 24-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor(pub [u8; 3]);

impl RgbColor {
    /// Parse a six-digit hex string such as `FF0000`; `auto` and malformed
    /// values yield `None`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self([channel(0)?, channel(2)?, channel(4)?]))
    }

    /// Upper-case six-digit hex representation
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0[0], self.0[1], self.0[2])
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A run as exchanged with the host document: text plus formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    /// Run text
    pub text: String,
    /// Run formatting
    pub attributes: StyleAttributes,
}

impl StyledRun {
    /// Create a run
    pub fn new(text: impl Into<String>, attributes: StyleAttributes) -> Self {
        Self {
            text: text.into(),
            attributes,
        }
    }

    /// Create an unformatted run
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, StyleAttributes::plain())
    }

    /// Length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_attributes() {
        assert!(StyleAttributes::plain().is_plain());
        assert!(!StyleAttributes::plain().with_bold(false).is_plain());
    }

    #[test]
    fn test_explicit_off_differs_from_unset() {
        let unset = StyleAttributes::plain();
        let off = StyleAttributes::plain().with_bold(false);
        assert_ne!(unset, off);
    }

    #[test]
    fn test_font_size_conversions() {
        let size = FontSize::from_half_points(24);
        assert_eq!(size.hundredths(), 1200);
        assert_eq!(size.half_points(), 24);
        assert_eq!(size.points(), 12.0);
        assert_eq!(FontSize::from_points(10.5).half_points(), 21);
        assert_eq!(size.to_string(), "12pt");
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(RgbColor::from_hex("FF0080"), Some(RgbColor([255, 0, 128])));
        assert_eq!(
            RgbColor::from_hex("#00ff00").map(|c| c.to_hex()),
            Some("00FF00".to_string())
        );
        assert_eq!(RgbColor::from_hex("auto"), None);
        assert_eq!(RgbColor::from_hex("12345"), None);
    }

    #[test]
    fn test_underline_dialects() {
        assert_eq!(Underline::from_wordml("single"), Underline::Single);
        assert_eq!(Underline::from_drawingml("sng"), Underline::Single);
        assert_eq!(Underline::Single.to_drawingml(), "sng");
        assert_eq!(Underline::Wavy.to_wordml(), "wave");
        assert_eq!(
            Underline::from_wordml("dashDotHeavy"),
            Underline::Other("dashDotHeavy".to_string())
        );
    }

    #[test]
    fn test_emphasis() {
        assert!(StyleAttributes::plain().with_italic(true).is_emphasis());
        let no_underline = StyleAttributes::plain().with_underline(Underline::None);
        assert!(!no_underline.is_emphasis());
        let arial = StyleAttributes::plain().with_font_family("Arial");
        assert!(!arial.is_emphasis());
    }

    #[test]
    fn test_run_char_len_counts_characters() {
        assert_eq!(StyledRun::plain("été").char_len(), 3);
    }
}
