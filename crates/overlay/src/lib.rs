//! Lifecycle controllers for the two floating overlays.
//!
//! Each controller is an explicit object owning the state of at most one
//! live instance. Showing while visible always tears the previous
//! instance down first (replace, not stack); teardown runs every disposer
//! the instance registered and revokes its live token, so completions
//! that arrive afterwards become no-ops. The controllers hold plain data
//! only; the host renders it and routes input events back in.

pub mod action_control;
mod lifecycle;
pub mod panel;

pub use action_control::{ActionControl, ActionControlController};
pub use lifecycle::{DismissalRegistry, LiveGuard, LiveToken};
pub use panel::{
    PickerState, TranslationPanel, TranslationPanelController, TranslationState,
    PICKER_ERROR_ROW, TRANSLATION_PLACEHOLDER,
};
