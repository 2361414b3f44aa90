pub mod config;
pub mod feed;
pub mod models;
pub mod notice;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod views;

pub use state::AppState;
