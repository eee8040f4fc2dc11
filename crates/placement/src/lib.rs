pub mod engine;
pub mod geometry;

pub use engine::{place_action_control, place_panel, ACTION_CONTROL_OFFSET, PANEL_OFFSET};
pub use geometry::{Point, Rect, Size};
