//! Placement of the floating overlays relative to a text selection.
//!
//! Both functions are pure: they take the already-measured box of the
//! element being placed and return its clamped top-left corner. Callers
//! must attach and measure content first, then position in a second pass.

use crate::geometry::{Point, Rect, Size};

/// Gap between the action control and the selection edge, in pixels.
pub const ACTION_CONTROL_OFFSET: f32 = 2.0;

/// Gap between the panel and the selection edge, also used as the minimum
/// margin kept against the viewport sides.
pub const PANEL_OFFSET: f32 = 6.0;

/// Computes where the floating action control goes.
///
/// Horizontally the control centers on the pointer while the pointer sits
/// inside the selection span; a pointer released outside the span anchors
/// the control to the nearer selection edge instead. Vertically the control
/// sits fully above the selection when the pointer is above its midpoint
/// and below it otherwise. The result is clamped so the control stays
/// entirely inside the viewport.
pub fn place_action_control(
    selection: Rect,
    pointer: Point,
    control: Size,
    viewport: Size,
    offset: f32,
) -> Point {
    let x = if selection.contains_x(pointer.x) {
        pointer.x - control.width / 2.0
    } else if pointer.x < selection.left {
        selection.left - control.width / 2.0
    } else {
        selection.right - control.width / 2.0
    };

    let y = if pointer.y < selection.center_y() {
        selection.top - control.height - offset
    } else {
        selection.bottom + offset
    };

    // min-then-max so an element wider than the viewport ends up at 0
    Point::new(
        x.min(viewport.width - control.width).max(0.0),
        y.min(viewport.height - control.height).max(0.0),
    )
}

/// Computes where the translation panel goes.
///
/// The panel centers on the selection's horizontal midpoint and is shifted
/// back inside the viewport with `offset` as margin when it would overflow
/// either side. Vertically it prefers the space below the selection, then
/// the space above, and finally falls back to below even when that
/// overflows; the fallback is deliberately left unclamped.
pub fn place_panel(selection: Rect, panel: Size, viewport: Size, offset: f32) -> Point {
    let mut x = selection.center_x() - panel.width / 2.0;
    if x < 0.0 {
        x = offset;
    } else if x + panel.width > viewport.width {
        x = viewport.width - panel.width - offset;
    }

    let space_below = viewport.height - selection.bottom;
    let space_above = selection.top;

    let y = if space_below >= panel.height + offset {
        selection.bottom + offset
    } else if space_above >= panel.height + offset {
        selection.top - panel.height - offset
    } else {
        selection.bottom + offset
    };

    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size {
        width: 1280.0,
        height: 720.0,
    };

    fn selection() -> Rect {
        Rect::new(100.0, 50.0, 200.0, 70.0)
    }

    #[test]
    fn control_centers_on_pointer_inside_span_and_goes_above() {
        let pos = place_action_control(
            selection(),
            Point::new(150.0, 40.0),
            Size::new(20.0, 20.0),
            VIEWPORT,
            ACTION_CONTROL_OFFSET,
        );
        assert_eq!(pos, Point::new(140.0, 28.0));
    }

    #[test]
    fn control_goes_below_when_pointer_under_midpoint() {
        let pos = place_action_control(
            selection(),
            Point::new(150.0, 65.0),
            Size::new(20.0, 20.0),
            VIEWPORT,
            ACTION_CONTROL_OFFSET,
        );
        assert_eq!(pos.y, 72.0);
    }

    #[test]
    fn control_anchors_to_left_edge_when_pointer_is_left_of_selection() {
        let pos = place_action_control(
            selection(),
            Point::new(40.0, 40.0),
            Size::new(20.0, 20.0),
            VIEWPORT,
            ACTION_CONTROL_OFFSET,
        );
        assert_eq!(pos.x, 90.0);
    }

    #[test]
    fn control_anchors_to_right_edge_when_pointer_is_right_of_selection() {
        let pos = place_action_control(
            selection(),
            Point::new(400.0, 40.0),
            Size::new(20.0, 20.0),
            VIEWPORT,
            ACTION_CONTROL_OFFSET,
        );
        assert_eq!(pos.x, 190.0);
    }

    #[test]
    fn control_is_clamped_into_the_viewport() {
        // selection hugging the top-left corner pushes the control out both ways
        let cramped = Rect::new(0.0, 0.0, 10.0, 10.0);
        let pos = place_action_control(
            cramped,
            Point::new(2.0, 1.0),
            Size::new(20.0, 20.0),
            VIEWPORT,
            ACTION_CONTROL_OFFSET,
        );
        assert_eq!(pos, Point::new(0.0, 0.0));

        let near_right = Rect::new(1270.0, 50.0, 1280.0, 70.0);
        let pos = place_action_control(
            near_right,
            Point::new(1279.0, 65.0),
            Size::new(20.0, 20.0),
            VIEWPORT,
            ACTION_CONTROL_OFFSET,
        );
        assert!(pos.x <= VIEWPORT.width - 20.0);
        assert!(pos.x >= 0.0);
    }

    #[test]
    fn panel_centers_on_selection_midpoint() {
        let pos = place_panel(selection(), Size::new(100.0, 80.0), VIEWPORT, PANEL_OFFSET);
        assert_eq!(pos.x, 100.0);
        assert_eq!(pos.y, 76.0);
    }

    #[test]
    fn panel_shifts_right_when_overflowing_left() {
        let sel = Rect::new(0.0, 50.0, 40.0, 70.0);
        let pos = place_panel(sel, Size::new(200.0, 80.0), VIEWPORT, PANEL_OFFSET);
        assert_eq!(pos.x, PANEL_OFFSET);
    }

    #[test]
    fn panel_shifts_left_when_overflowing_right() {
        let sel = Rect::new(1200.0, 50.0, 1280.0, 70.0);
        let pos = place_panel(sel, Size::new(200.0, 80.0), VIEWPORT, PANEL_OFFSET);
        assert_eq!(pos.x, VIEWPORT.width - 200.0 - PANEL_OFFSET);
    }

    #[test]
    fn panel_prefers_above_when_below_is_tight() {
        let sel = Rect::new(100.0, 600.0, 200.0, 700.0);
        let pos = place_panel(sel, Size::new(100.0, 80.0), VIEWPORT, PANEL_OFFSET);
        assert_eq!(pos.y, 600.0 - 80.0 - PANEL_OFFSET);
    }

    #[test]
    fn panel_falls_back_below_and_accepts_overflow() {
        // no room on either side of a selection spanning most of the screen
        let sel = Rect::new(100.0, 30.0, 200.0, 700.0);
        let pos = place_panel(sel, Size::new(100.0, 120.0), VIEWPORT, PANEL_OFFSET);
        assert_eq!(pos.y, 700.0 + PANEL_OFFSET);
        assert!(pos.y + 120.0 > VIEWPORT.height);
    }
}
