//! 落地页截图

pub mod orchestrator;
pub mod service;

pub use orchestrator::{PairedCaptureResult, ScreenshotOrchestrator};
pub use service::{CaptureRequest, CaptureResult, CaptureService, HttpCaptureService};
