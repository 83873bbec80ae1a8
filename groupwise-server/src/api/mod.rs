//! HTTP API handlers for groupwise-server

pub mod groups;
pub mod health;

pub use groups::groups_routes;
pub use health::health_routes;
