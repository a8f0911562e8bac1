//! Pointer-drag region selection on the overlay.
//!
//! A [`SelectionSession`] exists only while the overlay is up. It starts
//! `Armed`, moves to `Dragging` on pointer-down and ends in exactly one
//! [`SelectionOutcome`] when the pointer is released or the user cancels.
//! Pointer positions arrive in overlay-local device pixels and are only
//! converted to screen coordinates once the drag ends.

use snaptext_types::{Point, ScreenRect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Armed,
    Dragging { start: Point, current: Point },
}

/// Live outline to draw, overlay-local and not normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outline {
    pub start: Point,
    pub current: Point,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelReason {
    TooSmall,
    UserCancelled,
    /// Released without a preceding press
    NoDrag,
    OverlayFailed(String),
}

impl CancelReason {
    pub fn status(&self) -> &'static str {
        match self {
            CancelReason::TooSmall => "Selection too small, please try again.",
            CancelReason::UserCancelled | CancelReason::NoDrag => "Selection cancelled.",
            CancelReason::OverlayFailed(_) => "Could not create selection overlay.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Completed(ScreenRect),
    Cancelled(CancelReason),
}

#[derive(Debug)]
pub struct SelectionSession {
    /// Screen position of the overlay's top-left corner
    origin: Point,
    min_size: u32,
    state: SelectionState,
}

impl SelectionSession {
    pub fn new(origin: Point, min_size: u32) -> Self {
        Self {
            origin,
            min_size,
            state: SelectionState::Armed,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn pointer_down(&mut self, local: Point) -> Outline {
        self.state = SelectionState::Dragging {
            start: local,
            current: local,
        };
        Outline {
            start: local,
            current: local,
        }
    }

    /// Returns the outline to redraw, or `None` when no button is held.
    pub fn pointer_move(&mut self, local: Point) -> Option<Outline> {
        match &mut self.state {
            SelectionState::Dragging { start, current } => {
                *current = local;
                Some(Outline {
                    start: *start,
                    current: local,
                })
            }
            SelectionState::Armed => None,
        }
    }

    pub fn pointer_up(self, local: Point) -> SelectionOutcome {
        let SelectionState::Dragging { start, .. } = self.state else {
            return SelectionOutcome::Cancelled(CancelReason::NoDrag);
        };

        let rect = ScreenRect::from_corners(start.offset(self.origin), local.offset(self.origin));

        if rect.width() < self.min_size || rect.height() < self.min_size {
            tracing::debug!(?rect, "selection below minimum size");
            return SelectionOutcome::Cancelled(CancelReason::TooSmall);
        }

        SelectionOutcome::Completed(rect)
    }

    pub fn cancel(self) -> SelectionOutcome {
        SelectionOutcome::Cancelled(CancelReason::UserCancelled)
    }
}
