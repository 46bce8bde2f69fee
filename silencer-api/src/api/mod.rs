//! HTTP API handlers for silencer-api

pub mod health;
pub mod process_audio;
pub mod status;

pub use health::health_routes;
pub use process_audio::process_routes;
pub use status::status_routes;
