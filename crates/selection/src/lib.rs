//! Captured text selections and the validity gate that decides whether a
//! gesture is worth showing any UI for.
//!
//! A selection is snapshotted once per pointer-release gesture: the flat
//! text, the bounding rectangle of the selected region, the pointer point
//! at release time, and a detached clone of the selected content. The
//! clone is what the validator walks, so checking a selection never touches
//! the live document view.

use std::time::Duration;

use quicklingo_placement::{Point, Rect};

/// How long the host waits after a pointer release before reading the
/// selection, so the native selection state has settled.
pub const SELECTION_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// One node in the detached clone of the selected content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentNode {
    /// A run of plain text.
    Text(String),
    /// A styled or structural span wrapping further nodes. May be empty,
    /// e.g. a decorative element with no text content.
    Element {
        name: String,
        children: Vec<FragmentNode>,
    },
}

impl FragmentNode {
    pub fn text(content: impl Into<String>) -> Self {
        FragmentNode::Text(content.into())
    }

    pub fn element(name: impl Into<String>, children: Vec<FragmentNode>) -> Self {
        FragmentNode::Element {
            name: name.into(),
            children,
        }
    }

    /// True iff this node or any descendant is a text node whose trimmed
    /// content is non-empty.
    fn has_visible_text(&self) -> bool {
        match self {
            FragmentNode::Text(content) => !content.trim().is_empty(),
            FragmentNode::Element { children, .. } => {
                children.iter().any(FragmentNode::has_visible_text)
            }
        }
    }
}

/// Ephemeral record of one selection gesture. Rebuilt on every
/// pointer-release event, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSnapshot {
    /// Flat text of the selection.
    pub text: String,
    /// Bounding rectangle of the selected region in viewport coordinates.
    /// Spans multiple lines when the selection does.
    pub rect: Rect,
    /// Pointer position at the time of release.
    pub pointer: Point,
    /// Detached clone of the selected content.
    pub fragment: Vec<FragmentNode>,
}

impl SelectionSnapshot {
    pub fn new(
        text: impl Into<String>,
        rect: Rect,
        pointer: Point,
        fragment: Vec<FragmentNode>,
    ) -> Self {
        Self {
            text: text.into(),
            rect,
            pointer,
            fragment,
        }
    }
}

/// Sole admission gate before any overlay is shown.
///
/// Fails closed: no selection, or a selection whose cloned content is
/// empty, is invalid. Otherwise the clone is walked recursively and the
/// selection is valid iff any text node at any depth has non-blank
/// content. A selection covering only whitespace or only non-text nodes
/// (an empty styled span, say) is rejected.
pub fn is_selection_valid(selection: Option<&SelectionSnapshot>) -> bool {
    let Some(selection) = selection else {
        return false;
    };
    selection.fragment.iter().any(FragmentNode::has_visible_text)
}
