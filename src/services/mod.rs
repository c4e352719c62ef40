//! Service layer
//!
//! Wires the cloaking, stats, domain and screenshot services together so the
//! HTTP layer and the tests share one assembly path.

mod app;

pub use app::{AppServices, Collaborators};
