//! 系统级模块：日志初始化与 panic 钩子

pub mod logging;
pub mod panic_handler;

pub use logging::init_logging;
pub use panic_handler::{DEFAULT_CRASH_LOG, install_panic_hook};
