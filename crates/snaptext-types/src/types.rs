use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Rectangle chosen on the overlay, overlay already torn down
    TriggerOcr(ScreenRect),
    /// Stage progress while a cycle runs
    OcrStatusUpdate { status: String },
    /// Terminal result of one capture-recognize cycle
    CycleFinished(CycleReport),
    BackendReady,
}

/// A point in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, origin: Point) -> Self {
        Self {
            x: self.x + origin.x,
            y: self.y + origin.y,
        }
    }
}

/// Screen-absolute rectangle, edges in device pixels.
///
/// `right` and `bottom` are exclusive, so a rectangle from `(10, 10)` to
/// `(15, 12)` is five pixels wide and two tall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRect {
    /// Builds the rectangle spanned by two corners, whichever way they were dragged.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> u32 {
        self.right.abs_diff(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.abs_diff(self.top)
    }

    pub fn intersect(&self, other: &ScreenRect) -> Option<ScreenRect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);

        (left < right && top < bottom).then_some(ScreenRect {
            left,
            top,
            right,
            bottom,
        })
    }
}

/// Modal error shown to the user at the end of a failed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDialog {
    pub title: String,
    pub message: String,
}

/// What the UI renders once a cycle ends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleReport {
    /// Replaces the text display when set; failures leave it untouched
    pub text: Option<String>,
    pub status: String,
    pub dialog: Option<ErrorDialog>,
    pub copied: bool,
}
