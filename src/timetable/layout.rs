use crate::shared::signal::ViewportSize;

pub const HEADER_HEIGHT: u32 = 118;
pub const BOTTOM_MARGIN: u32 = 50;

pub const CHOOSE_PATTERN: &str = "Choose a trip pattern.";
pub const CHOOSE_CALENDAR: &str = "Choose a calendar to edit timetables or create a new one";

/// What the timetable panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimetableView {
    /// The grid, with its height in pixels.
    Grid { height: u32 },
    ChoosePattern,
    ChooseCalendar,
}

impl TimetableView {
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            TimetableView::Grid { .. } => None,
            TimetableView::ChoosePattern => Some(CHOOSE_PATTERN),
            TimetableView::ChooseCalendar => Some(CHOOSE_CALENDAR),
        }
    }
}

pub fn grid_height(size: ViewportSize) -> u32 {
    size.height.saturating_sub(HEADER_HEIGHT + BOTTOM_MARGIN)
}

#[test]
fn grid_height_leaves_room_for_header() {
    let size = ViewportSize {
        width: 1200,
        height: 800,
    };
    assert_eq!(grid_height(size), 632);
    assert_eq!(
        grid_height(ViewportSize {
            width: 0,
            height: 100
        }),
        0
    );
}
