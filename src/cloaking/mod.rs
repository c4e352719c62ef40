//! 落地页伪装：决策引擎及其周边
//!
//! 请求路径：`classifier` 给出机器人信号 → `engine` 选出动作
//! → `executor` 执行并上报计数。

pub mod classifier;
pub mod engine;
pub mod executor;
pub mod models;
pub mod templates;
pub mod validation;

pub use classifier::{BotClassifier, DisabledClassifier, HttpClassifier, classify_or_fail_open};
pub use engine::{DEFAULT_TEMPLATE_ID, Decision, decide, evaluate, human_target};
pub use executor::ActionExecutor;
pub use models::{
    Action, BotAction, BotSignal, CloakingConfig, DeviceClass, FakePage, VisitorRequest,
};
pub use templates::{BuiltinTemplates, FakePageRenderer};
pub use validation::{MAX_FAKE_PAGE_HTML_BYTES, validate_config};
