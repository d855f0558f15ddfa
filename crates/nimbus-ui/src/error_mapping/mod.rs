//! Maps provider and storage errors to nimbus_core::AppError for consistent
//! user-facing messages. One module per backend keeps each mapping small.

mod favorites;
mod weather;

pub use favorites::from_store;
pub use weather::from_fetch;
pub(crate) use weather::not_found_text;
