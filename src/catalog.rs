//! Catalog entities as the backend returns them.
//!
//! Tracks are fetched with their artist and album eagerly joined, so the
//! player never has to go back to the backend to render "now playing".

mod display;
mod model;

pub use display::make_display;
pub use model::*;
