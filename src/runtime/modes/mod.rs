pub mod server;

pub use server::{configure_app, run_server};
