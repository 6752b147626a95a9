//! Read-only HTTP query API for the display layer.
//!
//! Exposes the latest snapshot per stop, grouped the same way as alerts.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
