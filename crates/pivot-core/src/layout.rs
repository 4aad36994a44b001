use serde::Serialize;
use ts_rs::TS;

use crate::config::WidgetPosition;

pub const MIN_PANEL_WIDTH: i32 = 200;
pub const MIN_PANEL_HEIGHT: i32 = 410;
pub const DEFAULT_PANEL_WIDTH: i32 = 340;
pub const DEFAULT_PANEL_HEIGHT: i32 = 520;
/// Pixels added or removed per grow/shrink press, on both axes.
pub const SIZE_STEP: i32 = 10;
/// The panel never grows closer than this to the viewport's width or height.
pub const VIEWPORT_GUTTER: i32 = 10;
const DOCK_MARGIN: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
        }
    }

    fn max_width(self) -> i32 {
        (self.width - VIEWPORT_GUTTER).max(MIN_PANEL_WIDTH)
    }

    fn max_height(self) -> i32 {
        (self.height - VIEWPORT_GUTTER).max(MIN_PANEL_HEIGHT)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}

/// Panel geometry in viewport pixels.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct PanelRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl PanelRect {
    pub fn right(self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(self) -> i32 {
        self.top + self.height
    }

    /// Default-sized panel in the configured corner.
    pub fn docked(position: WidgetPosition, viewport: Viewport) -> Self {
        let width = DEFAULT_PANEL_WIDTH.min(viewport.max_width());
        let height = DEFAULT_PANEL_HEIGHT.min(viewport.max_height());
        let left = match position {
            WidgetPosition::BottomRight | WidgetPosition::TopRight => {
                viewport.width - DOCK_MARGIN - width
            }
            WidgetPosition::BottomLeft | WidgetPosition::TopLeft => DOCK_MARGIN,
        };
        let top = match position {
            WidgetPosition::BottomRight | WidgetPosition::BottomLeft => {
                viewport.height - DOCK_MARGIN - height
            }
            WidgetPosition::TopRight | WidgetPosition::TopLeft => DOCK_MARGIN,
        };
        Self {
            left,
            top,
            width,
            height,
        }
        .fit(viewport)
    }

    /// One grow or shrink step. The bottom-right corner stays put unless the
    /// result would leave the viewport.
    pub fn stepped(self, grow: bool, viewport: Viewport) -> Self {
        let step = if grow { SIZE_STEP } else { -SIZE_STEP };
        let width = (self.width + step).clamp(MIN_PANEL_WIDTH, viewport.max_width());
        let height = (self.height + step).clamp(MIN_PANEL_HEIGHT, viewport.max_height());
        Self {
            left: self.right() - width,
            top: self.bottom() - height,
            width,
            height,
        }
        .fit(viewport)
    }

    /// Move by a pointer delta, stopping at the viewport edges.
    pub fn dragged(self, dx: i32, dy: i32, viewport: Viewport) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..self
        }
        .fit(viewport)
    }

    /// Resize from the top-left handle. The right and bottom edges stay put
    /// and the top-left corner cannot leave the viewport.
    pub fn resized_from_top_left(self, dx: i32, dy: i32, viewport: Viewport) -> Self {
        let (right, bottom) = (self.right(), self.bottom());
        let left = (self.left + dx).max(0);
        let top = (self.top + dy).max(0);
        let width = (right - left).clamp(MIN_PANEL_WIDTH, viewport.max_width());
        let height = (bottom - top).clamp(MIN_PANEL_HEIGHT, viewport.max_height());
        Self {
            left: right - width,
            top: bottom - height,
            width,
            height,
        }
        .fit(viewport)
    }

    /// Shrink into the viewport's bounds and pull the panel back on screen.
    pub fn fit(self, viewport: Viewport) -> Self {
        let width = self.width.clamp(MIN_PANEL_WIDTH, viewport.max_width());
        let height = self.height.clamp(MIN_PANEL_HEIGHT, viewport.max_height());
        Self {
            left: self.left.clamp(0, (viewport.width - width).max(0)),
            top: self.top.clamp(0, (viewport.height - height).max(0)),
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 1280,
        height: 800,
    };

    fn rect(left: i32, top: i32, width: i32, height: i32) -> PanelRect {
        PanelRect {
            left,
            top,
            width,
            height,
        }
    }

    #[test]
    fn docked_panel_sits_in_the_configured_corner() {
        let panel = PanelRect::docked(WidgetPosition::BottomRight, VIEWPORT);
        assert_eq!(panel, rect(920, 260, 340, 520));
        assert_eq!(panel.right(), 1260);
        assert_eq!(panel.bottom(), 780);

        let panel = PanelRect::docked(WidgetPosition::TopLeft, VIEWPORT);
        assert_eq!(panel, rect(20, 20, 340, 520));
    }

    #[test]
    fn docked_panel_fits_a_small_viewport() {
        let phone = Viewport::new(320, 480);
        let panel = PanelRect::docked(WidgetPosition::BottomRight, phone);
        assert_eq!(panel.width, 310);
        assert_eq!(panel.height, 470);
        assert!(panel.left >= 0 && panel.right() <= 320);
        assert!(panel.top >= 0 && panel.bottom() <= 480);
    }

    #[test]
    fn growing_and_shrinking_step_both_axes_around_the_bottom_right_corner() {
        let panel = rect(500, 200, 340, 520);

        let grown = panel.stepped(true, VIEWPORT);
        assert_eq!(grown, rect(490, 190, 350, 530));

        let shrunk = panel.stepped(false, VIEWPORT);
        assert_eq!(shrunk, rect(510, 210, 330, 510));
    }

    #[test]
    fn size_steps_stop_at_the_bounds() {
        let mut panel = rect(500, 200, 340, 520);
        for _ in 0..100 {
            panel = panel.stepped(false, VIEWPORT);
        }
        assert_eq!((panel.width, panel.height), (MIN_PANEL_WIDTH, MIN_PANEL_HEIGHT));

        for _ in 0..200 {
            panel = panel.stepped(true, VIEWPORT);
        }
        assert_eq!((panel.width, panel.height), (1270, 790));
        assert_eq!((panel.left, panel.top), (0, 0));
    }

    #[test]
    fn dragging_stops_at_every_viewport_edge() {
        let panel = rect(500, 200, 340, 520);
        assert_eq!(panel.dragged(-40, 25, VIEWPORT), rect(460, 225, 340, 520));
        assert_eq!(panel.dragged(-900, -900, VIEWPORT), rect(0, 0, 340, 520));
        assert_eq!(panel.dragged(900, 900, VIEWPORT), rect(940, 280, 340, 520));
    }

    #[test]
    fn top_left_resize_keeps_the_opposite_edges() {
        let panel = rect(500, 200, 340, 520);

        let larger = panel.resized_from_top_left(-30, -20, VIEWPORT);
        assert_eq!(larger, rect(470, 180, 370, 540));
        assert_eq!((larger.right(), larger.bottom()), (840, 720));

        let smaller = panel.resized_from_top_left(500, 500, VIEWPORT);
        assert_eq!((smaller.width, smaller.height), (MIN_PANEL_WIDTH, MIN_PANEL_HEIGHT));
        assert_eq!((smaller.right(), smaller.bottom()), (840, 720));
    }

    #[test]
    fn top_left_resize_cannot_pass_the_viewport_corner() {
        let panel = rect(50, 40, 340, 520);
        let resized = panel.resized_from_top_left(-200, -200, VIEWPORT);
        assert_eq!(resized, rect(0, 0, 390, 560));
    }

    #[test]
    fn viewport_shrink_pulls_the_panel_back_on_screen() {
        let panel = rect(900, 250, 360, 540);
        let fitted = panel.fit(Viewport::new(800, 600));
        assert_eq!(fitted, rect(440, 60, 360, 540));

        let fitted = panel.fit(Viewport::new(300, 400));
        assert_eq!(fitted, rect(10, 0, 290, MIN_PANEL_HEIGHT));
    }
}
