//! Web surface: HTML form pages and the JSON API

pub mod api;
pub mod pages;

pub use api::{router, run_server, AppState};
