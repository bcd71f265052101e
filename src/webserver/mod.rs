//! HTTP surface: holders, assign, world, assignments, reset, health

pub mod routes;
pub mod server;
pub mod state;
pub mod utils;

pub use server::{build_app, start_server};
pub use state::AppState;
