//! Bar placement and fill geometry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which screen edge the bar is docked to.
///
/// # Examples
///
/// ```rust
/// use xbattbar_rs_core::ScreenEdge;
///
/// let edge: ScreenEdge = "l".parse().unwrap();
/// assert_eq!(edge, ScreenEdge::Left);
/// assert!(!edge.is_horizontal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenEdge {
    Left,
    Top,
    Right,
    #[default]
    Bottom,
}

impl ScreenEdge {
    /// Top and bottom bars run along the x axis.
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    #[must_use]
    pub fn orientation(self) -> Orientation {
        if self.is_horizontal() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

impl fmt::Display for ScreenEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ScreenEdge {
    type Err = ScreenEdgeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "top" | "t" => Ok(Self::Top),
            "right" | "r" => Ok(Self::Right),
            "bottom" | "b" => Ok(Self::Bottom),
            _ => Err(ScreenEdgeParseError {
                input: s.to_owned(),
                valid_options: &["l", "r", "t", "b", "left", "right", "top", "bottom"],
            }),
        }
    }
}

/// Error type for parsing [`ScreenEdge`] from string.
#[derive(Debug, thiserror::Error)]
#[error("Invalid side '{input}'. Valid sides: {}", valid_options.join(","))]
pub struct ScreenEdgeParseError {
    input: String,
    valid_options: &'static [&'static str],
}

/// Direction of the bar's long axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Axis-aligned rectangle in window or screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i16, y: i16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Size and placement of the bar on a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarGeometry {
    pub edge: ScreenEdge,
    pub thickness: u16,
    pub screen_width: u16,
    pub screen_height: u16,
}

impl BarGeometry {
    #[must_use]
    pub fn new(edge: ScreenEdge, thickness: u16, screen_width: u16, screen_height: u16) -> Self {
        Self {
            edge,
            thickness,
            screen_width,
            screen_height,
        }
    }

    /// Length of the long axis: the full screen width or height.
    #[must_use]
    pub fn length(&self) -> u16 {
        match self.edge.orientation() {
            Orientation::Horizontal => self.screen_width,
            Orientation::Vertical => self.screen_height,
        }
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.edge.orientation()
    }

    /// Where the bar window sits on the screen.
    #[must_use]
    pub fn window_rect(&self) -> Rect {
        let thickness = self.thickness;
        match self.edge {
            ScreenEdge::Top => Rect::new(0, 0, self.screen_width, thickness),
            ScreenEdge::Bottom => Rect::new(
                0,
                self.screen_height.saturating_sub(thickness) as i16,
                self.screen_width,
                thickness,
            ),
            ScreenEdge::Left => Rect::new(0, 0, thickness, self.screen_height),
            ScreenEdge::Right => Rect::new(
                self.screen_width.saturating_sub(thickness) as i16,
                0,
                thickness,
                self.screen_height,
            ),
        }
    }

    /// The whole bar in window coordinates.
    #[must_use]
    pub fn full_rect(&self) -> Rect {
        let rect = self.window_rect();
        Rect::new(0, 0, rect.width, rect.height)
    }

    /// Split the bar at `draw_amount` along the long axis.
    ///
    /// Returns `(filled, remainder)`. Horizontal bars fill from the left,
    /// vertical bars from the bottom.
    #[must_use]
    pub fn split(&self, draw_amount: u16) -> (Rect, Rect) {
        let length = self.length();
        let amount = draw_amount.min(length);
        let rest = length - amount;
        match self.orientation() {
            Orientation::Horizontal => (
                Rect::new(0, 0, amount, self.thickness),
                Rect::new(amount as i16, 0, rest, self.thickness),
            ),
            Orientation::Vertical => (
                Rect::new(0, rest as i16, self.thickness, amount),
                Rect::new(0, 0, self.thickness, rest),
            ),
        }
    }

    /// Center a box of the given size on the screen.
    #[must_use]
    pub fn centered(&self, width: u16, height: u16) -> Rect {
        Rect::new(
            (self.screen_width.saturating_sub(width) / 2) as i16,
            (self.screen_height.saturating_sub(height) / 2) as i16,
            width,
            height,
        )
    }
}
