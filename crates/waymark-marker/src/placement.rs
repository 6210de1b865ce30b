#![forbid(unsafe_code)]

//! Attachment strategies and compass positions.

use std::fmt;
use std::str::FromStr;

use crate::error::MarkerError;

/// How a marker element attaches to the document relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    /// Appended inside the anchor.
    Inline,
    /// Placed next to the anchor inside a synthesized wrapper.
    #[default]
    Sibling,
    /// Absolutely positioned on the guide's overlay layer.
    Overlay,
}

impl Placement {
    pub const ALL: [Self; 3] = [Self::Inline, Self::Sibling, Self::Overlay];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Sibling => "sibling",
            Self::Overlay => "overlay",
        }
    }
}

impl FromStr for Placement {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "inline" => Ok(Self::Inline),
            "sibling" => Ok(Self::Sibling),
            "overlay" => Ok(Self::Overlay),
            other => Err(MarkerError::BadPlacement(other.to_owned())),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side or corner of the anchor the marker occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Position {
    TopLeft,
    Top,
    TopRight,
    #[default]
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl Position {
    /// Clockwise from the top-left corner.
    pub const ALL: [Self; 8] = [
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Right,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::Left,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "topleft",
            Self::Top => "top",
            Self::TopRight => "topright",
            Self::Right => "right",
            Self::BottomRight => "bottomright",
            Self::Bottom => "bottom",
            Self::BottomLeft => "bottomleft",
            Self::Left => "left",
        }
    }

    /// `topright`, `right`, `bottomright`.
    #[must_use]
    pub const fn is_right_side(self) -> bool {
        matches!(self, Self::TopRight | Self::Right | Self::BottomRight)
    }

    /// `topleft`, `left`, `bottomleft`.
    #[must_use]
    pub const fn is_left_side(self) -> bool {
        matches!(self, Self::TopLeft | Self::Left | Self::BottomLeft)
    }

    /// `top` or `bottom`: centered horizontally.
    #[must_use]
    pub const fn is_horizontal_edge(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// `left` or `right`: centered vertically.
    #[must_use]
    pub const fn is_vertical_edge(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

impl FromStr for Position {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| MarkerError::BadPosition(s.trim().to_owned()))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
