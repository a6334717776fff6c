use std::time::Duration;

use crate::shared::signal::ViewportSize;

#[derive(Debug, Clone)]
pub struct MapConfig {
    /// How long viewport reports are ignored after a fly-to starts.
    pub zoom_grace: Duration,
    /// A click selects a stop when both axes match to this many decimals.
    pub selection_decimals: u32,
    pub sidebar_expanded_width: u32,
    pub sidebar_collapsed_width: u32,
    /// Lowest zoom at which individual stops are drawn.
    pub draw_stops_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom_grace: Duration::from_millis(200),
            selection_decimals: 3,
            sidebar_expanded_width: 130,
            sidebar_collapsed_width: 50,
            draw_stops_zoom: 14,
        }
    }
}

impl MapConfig {
    /// Half a unit of the last kept decimal, in degrees.
    pub fn selection_tolerance(&self) -> f64 {
        0.5 * 10f64.powi(-(self.selection_decimals as i32))
    }

    pub fn map_width(&self, viewport: ViewportSize, offset: u32, sidebar_expanded: bool) -> u32 {
        let sidebar = if sidebar_expanded {
            self.sidebar_expanded_width
        } else {
            self.sidebar_collapsed_width
        };
        viewport.width.saturating_sub(offset + sidebar)
    }
}
