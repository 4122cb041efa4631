//! Settings: backend endpoint, credentials, audio, UI, logging and update
//! checks, read from `config.toml` and `MELODEX__*` environment variables.

mod load;
mod schema;

pub use load::default_state_dir;
pub use schema::*;

#[cfg(test)]
mod tests;
