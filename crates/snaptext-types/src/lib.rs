pub mod types;

pub use types::{AppEvent, CycleReport, ErrorDialog, Point, ScreenRect};
