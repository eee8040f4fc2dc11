use quicklingo_placement::{
    place_action_control, Point, Rect, Size, ACTION_CONTROL_OFFSET,
};
use quicklingo_selection::SelectionSnapshot;

use crate::lifecycle::DismissalRegistry;

/// One shown action control, anchored to the selection that produced it.
pub struct ActionControl {
    snapshot: SelectionSnapshot,
    position: Option<Point>,
    size: Option<Size>,
    registry: DismissalRegistry,
}

impl ActionControl {
    pub fn snapshot(&self) -> &SelectionSnapshot {
        &self.snapshot
    }

    /// Placed position, once the second placement pass has run.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// On-screen rectangle; `None` until placed.
    pub fn rect(&self) -> Option<Rect> {
        let position = self.position?;
        let size = self.size?;
        Some(Rect::new(
            position.x,
            position.y,
            position.x + size.width,
            position.y + size.height,
        ))
    }
}

/// Show/replace/dismiss lifecycle of the floating action control.
#[derive(Default)]
pub struct ActionControlController {
    current: Option<ActionControl>,
}

impl ActionControlController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&ActionControl> {
        self.current.as_ref()
    }

    /// Shows a control for a fresh selection, replacing any control that
    /// is still on screen. The new instance is unplaced until the host
    /// has measured it and called [`place`](Self::place).
    pub fn show(&mut self, snapshot: SelectionSnapshot) {
        self.dismiss();
        self.current = Some(ActionControl {
            snapshot,
            position: None,
            size: None,
            registry: DismissalRegistry::default(),
        });
    }

    /// Registers extra teardown work for the shown instance, e.g. host
    /// resources tied to it.
    pub fn register_disposer(&mut self, disposer: impl FnOnce() + Send + 'static) {
        if let Some(control) = self.current.as_mut() {
            control.registry.register(disposer);
        }
    }

    /// Second placement pass: anchors the measured control to the
    /// selection rectangle and pointer, clamped to the viewport.
    pub fn place(&mut self, measured: Size, viewport: Size) -> Option<Point> {
        let control = self.current.as_mut()?;
        let position = place_action_control(
            control.snapshot.rect,
            control.snapshot.pointer,
            measured,
            viewport,
            ACTION_CONTROL_OFFSET,
        );
        control.size = Some(measured);
        control.position = Some(position);
        Some(position)
    }

    /// Outside-press dismissal trigger. Presses inside the control (or
    /// before it has been placed) leave it alone.
    pub fn handle_pointer_down(&mut self, at: Point) {
        let Some(rect) = self.current.as_ref().and_then(ActionControl::rect) else {
            return;
        };
        if !rect.contains(at) {
            self.dismiss();
        }
    }

    /// Activation: tears the control down and hands the selection back so
    /// the host can open the panel for it.
    pub fn activate(&mut self) -> Option<SelectionSnapshot> {
        let mut control = self.current.take()?;
        control.registry.dispose_all();
        Some(control.snapshot)
    }

    pub fn dismiss(&mut self) {
        if let Some(mut control) = self.current.take() {
            control.registry.dispose_all();
        }
    }
}
