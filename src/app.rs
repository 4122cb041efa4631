//! Application module: exposes the view model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the visible track list,
//! the selection, the active view and UI-only flags. Playback state is not
//! here; it belongs to the player controller.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
