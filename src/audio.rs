//! Audio output: the sink abstraction the player drives, and its rodio
//! implementation.
//!
//! A sink is bound to exactly one track. Switching tracks means dropping
//! the old sink and opening a new one; sinks are never re-pointed.

mod fetch;
mod sink;
mod types;

pub use sink::{RodioSink, RodioSinkFactory};
pub use types::*;

#[cfg(test)]
mod tests;
