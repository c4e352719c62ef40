//! 根据 User-Agent 判断访客设备类型

use woothee::parser::Parser;

use crate::cloaking::DeviceClass;

/// woothee 把手机归为 smartphone / mobilephone，其余一律按桌面处理
pub fn device_class_from_user_agent(user_agent: &str) -> DeviceClass {
    if user_agent.is_empty() {
        return DeviceClass::Desktop;
    }

    let parser = Parser::new();
    match parser.parse(user_agent) {
        Some(result) if matches!(result.category, "smartphone" | "mobilephone") => {
            DeviceClass::Mobile
        }
        _ => DeviceClass::Desktop,
    }
}
