//! Status-to-pixels rendering.
//!
//! [`BarRenderer`] turns a [`PowerStatus`] into fill colors and a fill extent
//! and issues the matching commands against a [`Surface`]. It holds no state
//! of its own; the caller passes in the last status and popup visibility on
//! every pass.

use crate::color::{Oklab, PackedColor};
use crate::error::Result;
use crate::layout::{BarGeometry, Rect};
use crate::popup::PopupState;
use crate::status::PowerStatus;
use serde::{Deserialize, Serialize};

/// Padding between the popup border and its text, in pixels.
pub const POPUP_MARGIN: u16 = 5;

/// Windows the renderer draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Bar,
    Popup,
}

/// Rendered size of a text string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextExtents {
    pub width: u16,
    pub ascent: u16,
    pub descent: u16,
}

/// Drawing operations provided by the windowing system.
///
/// Implementations are free to buffer requests until [`Surface::flush`].
pub trait Surface {
    /// Fill `rect` of `target` with a solid color.
    fn fill_rectangle(&mut self, target: Target, color: PackedColor, rect: Rect) -> Result<()>;

    /// Set the colors used by subsequent [`Surface::draw_text`] calls.
    fn set_text_colors(&mut self, foreground: PackedColor, background: PackedColor) -> Result<()>;

    /// Measure `text` in the surface font.
    fn measure_text(&mut self, text: &str) -> Result<TextExtents>;

    /// Draw `text` with its baseline origin at `(x, y)`.
    fn draw_text(&mut self, target: Target, x: i16, y: i16, text: &str) -> Result<()>;

    /// Move and resize a window, in screen coordinates.
    fn resize_window(&mut self, target: Target, rect: Rect) -> Result<()>;

    fn show_window(&mut self, target: Target) -> Result<()>;

    fn hide_window(&mut self, target: Target) -> Result<()>;

    /// Push buffered requests to the display.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Colors used by the bar and popup.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Palette {
    /// Filled part of the bar while charging
    pub charging_fg: PackedColor,
    /// Unfilled part of the bar while charging
    pub charging_bg: PackedColor,
    /// Ramp color at 0% charge
    pub empty: PackedColor,
    /// Optional ramp color at 50% charge
    pub mid: Option<PackedColor>,
    /// Ramp color at 100% charge
    pub full: PackedColor,
    /// Whole bar when no status is known
    pub placeholder: PackedColor,
    pub popup_text: PackedColor,
    pub popup_background: PackedColor,
    /// Oklab lightness factor applied to the ramp color for the unfilled part
    pub background_lightness: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            charging_fg: PackedColor::from_argb(0xFF00_88FF),
            charging_bg: PackedColor::from_argb(0xFF00_4488),
            empty: PackedColor::new(255, 0, 0, 255),
            mid: None,
            full: PackedColor::new(0, 255, 0, 255),
            placeholder: PackedColor::new(128, 128, 128, 255),
            popup_text: PackedColor::BLACK,
            popup_background: PackedColor::WHITE,
            background_lightness: 0.7,
        }
    }
}

/// Foreground/background pair for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarColors {
    pub foreground: PackedColor,
    pub background: PackedColor,
}

/// Oklab stops of the discharging ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColorRamp {
    empty: Oklab,
    mid: Option<Oklab>,
    full: Oklab,
}

impl ColorRamp {
    fn from_palette(palette: &Palette) -> Self {
        Self {
            empty: palette.empty.to_srgb().to_oklab(),
            mid: palette.mid.map(|c| c.to_srgb().to_oklab()),
            full: palette.full.to_srgb().to_oklab(),
        }
    }

    fn at(&self, t: f32) -> Oklab {
        match self.mid {
            None => self.empty.lerp(self.full, t),
            Some(mid) if t < 0.5 => self.empty.lerp(mid, t * 2.0),
            Some(mid) => mid.lerp(self.full, (t - 0.5) * 2.0),
        }
    }
}

/// Maps battery status to drawing commands.
#[derive(Debug, Clone)]
pub struct BarRenderer {
    geometry: BarGeometry,
    palette: Palette,
    ramp: ColorRamp,
}

impl BarRenderer {
    #[must_use]
    pub fn new(geometry: BarGeometry, palette: Palette) -> Self {
        let ramp = ColorRamp::from_palette(&palette);
        Self {
            geometry,
            palette,
            ramp,
        }
    }

    /// Length of the filled part for a charge level.
    #[must_use]
    pub fn fill_extent(&self, charge_level: f32) -> u16 {
        let level = PowerStatus::without_estimate(charge_level, false).clamped_level();
        (f32::from(self.geometry.length()) * level).round() as u16
    }

    /// Fill colors for a status.
    ///
    /// Charging uses the fixed charging pair. Otherwise the foreground walks
    /// the Oklab ramp from `empty` to `full` and the background is the same
    /// color with its lightness scaled down.
    #[must_use]
    pub fn colors_for(&self, status: &PowerStatus) -> BarColors {
        if status.charging {
            return BarColors {
                foreground: self.palette.charging_fg,
                background: self.palette.charging_bg,
            };
        }

        let foreground = self.ramp.at(status.clamped_level());
        let background = foreground.with_lightness_scaled(self.palette.background_lightness);
        BarColors {
            foreground: foreground.to_srgb().to_packed(255),
            background: background.to_srgb().to_packed(255),
        }
    }

    /// Draw the bar, and the popup if it is visible.
    ///
    /// With no status the whole bar is filled with the placeholder color and
    /// nothing else is drawn.
    ///
    /// # Errors
    ///
    /// Returns the first surface error; the rest of the pass is skipped.
    pub fn render<S>(&self, surface: &mut S, status: Option<&PowerStatus>, popup: PopupState) -> Result<()>
    where
        S: Surface + ?Sized,
    {
        let Some(status) = status else {
            return surface.fill_rectangle(Target::Bar, self.palette.placeholder, self.geometry.full_rect());
        };

        let draw_amount = self.fill_extent(status.charge_level);
        let colors = self.colors_for(status);
        let (filled, rest) = self.geometry.split(draw_amount);

        surface.fill_rectangle(Target::Bar, colors.foreground, filled)?;
        surface.fill_rectangle(Target::Bar, colors.background, rest)?;

        if popup.is_visible() {
            self.render_popup(surface, status)?;
        }
        Ok(())
    }

    fn render_popup<S>(&self, surface: &mut S, status: &PowerStatus) -> Result<()>
    where
        S: Surface + ?Sized,
    {
        surface.set_text_colors(self.palette.popup_text, self.palette.popup_background)?;

        let label = popup_label(status);
        let extents = surface.measure_text(&label)?;
        surface.resize_window(Target::Popup, self.popup_rect(extents))?;

        let margin = POPUP_MARGIN as i16;
        surface.draw_text(Target::Popup, margin, margin + extents.ascent as i16, &label)
    }

    /// Popup window placement for text of the given size.
    #[must_use]
    pub fn popup_rect(&self, extents: TextExtents) -> Rect {
        let width = extents.width.saturating_add(2 * POPUP_MARGIN);
        let height = extents
            .ascent
            .saturating_add(extents.descent)
            .saturating_add(2 * POPUP_MARGIN);
        self.geometry.centered(width, height)
    }
}

/// Text shown in the hover popup.
#[must_use]
pub fn popup_label(status: &PowerStatus) -> String {
    format!("Charge level: {}%", status.percentage())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ScreenEdge;

    fn renderer(edge: ScreenEdge) -> BarRenderer {
        BarRenderer::new(BarGeometry::new(edge, 3, 1000, 600), Palette::default())
    }

    #[test]
    fn test_fill_extent_boundaries() {
        let bar = renderer(ScreenEdge::Bottom);
        assert_eq!(bar.fill_extent(0.0), 0);
        assert_eq!(bar.fill_extent(1.0), 1000);
        assert_eq!(bar.fill_extent(-0.3), 0);
        assert_eq!(bar.fill_extent(1.7), 1000);
        assert_eq!(bar.fill_extent(0.3333), 333);
        assert_eq!(bar.fill_extent(0.6667), 667);
    }

    #[test]
    fn test_fill_extent_uses_long_axis() {
        let bar = renderer(ScreenEdge::Left);
        assert_eq!(bar.fill_extent(1.0), 600);
        assert_eq!(bar.fill_extent(0.5), 300);
    }

    #[test]
    fn test_discharging_colors_follow_oklab_ramp() {
        let bar = renderer(ScreenEdge::Bottom);
        let status = PowerStatus::without_estimate(0.5, false);

        let red = crate::color::LinearRgb::new(1.0, 0.0, 0.0).to_oklab();
        let green = crate::color::LinearRgb::new(0.0, 1.0, 0.0).to_oklab();
        let mid = red.lerp(green, 0.5);
        let mut dark = mid;
        dark.l *= 0.7;

        let colors = bar.colors_for(&status);
        assert_eq!(colors.foreground, mid.to_srgb().to_packed(255));
        assert_eq!(colors.background, dark.to_srgb().to_packed(255));
        assert_ne!(colors.foreground, colors.background);
    }

    #[test]
    fn test_ramp_endpoints() {
        let bar = renderer(ScreenEdge::Bottom);
        let empty = bar.colors_for(&PowerStatus::without_estimate(0.0, false));
        let full = bar.colors_for(&PowerStatus::without_estimate(1.0, false));
        assert_eq!(empty.foreground, PackedColor::new(255, 0, 0, 255));
        assert_eq!(full.foreground, PackedColor::new(0, 255, 0, 255));

        // Out-of-range levels clamp to the endpoints
        let below = bar.colors_for(&PowerStatus::without_estimate(-0.3, false));
        assert_eq!(below, empty);
    }

    #[test]
    fn test_charging_uses_fixed_pair() {
        let bar = renderer(ScreenEdge::Bottom);
        let colors = bar.colors_for(&PowerStatus::without_estimate(0.2, true));
        assert_eq!(colors.foreground, PackedColor::from_argb(0xFF00_88FF));
        assert_eq!(colors.background, PackedColor::from_argb(0xFF00_4488));
    }

    #[test]
    fn test_three_stop_ramp_hits_mid() {
        let palette = Palette {
            mid: Some(PackedColor::new(255, 255, 0, 255)),
            ..Palette::default()
        };
        let bar = BarRenderer::new(BarGeometry::new(ScreenEdge::Top, 3, 100, 100), palette);
        let colors = bar.colors_for(&PowerStatus::without_estimate(0.5, false));
        assert_eq!(colors.foreground, PackedColor::new(255, 255, 0, 255));
    }

    #[test]
    fn test_popup_label() {
        assert_eq!(popup_label(&PowerStatus::without_estimate(0.755, false)), "Charge level: 76%");
        assert_eq!(popup_label(&PowerStatus::without_estimate(1.2, true)), "Charge level: 100%");
    }

    #[test]
    fn test_popup_rect_adds_margins() {
        let bar = renderer(ScreenEdge::Bottom);
        let rect = bar.popup_rect(TextExtents {
            width: 180,
            ascent: 16,
            descent: 4,
        });
        assert_eq!(rect, Rect::new(405, 285, 190, 30));
    }
}
