pub mod admin;
pub mod cloak;
pub mod health;

pub use admin::admin_routes;
pub use cloak::{CloakService, cloak_routes};
pub use health::{AppStartTime, HealthService, health_routes};
