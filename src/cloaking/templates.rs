//! 伪装页面渲染
//!
//! HTML 模板本身由外部提供，这里只定义边界和一组内置的占位页面。

use super::engine::DEFAULT_TEMPLATE_ID;
use super::models::FakePage;

pub trait FakePageRenderer: Send + Sync {
    /// 模板编号是否存在（保存配置时校验）
    fn has_template(&self, id: u32) -> bool;

    /// 渲染页面；未知编号回退到默认模板
    fn render(&self, page: &FakePage) -> String;
}

struct BuiltinTemplate {
    id: u32,
    title: &'static str,
    body: &'static str,
}

const BUILTIN_TEMPLATES: &[BuiltinTemplate] = &[
    BuiltinTemplate {
        id: 1,
        title: "Notes",
        body: "<h1>Notes</h1><p>Short articles about everyday things. New posts every week.</p>",
    },
    BuiltinTemplate {
        id: 2,
        title: "Local News",
        body: "<h1>Local News</h1><p>There are no new stories right now. Check back later.</p>",
    },
    BuiltinTemplate {
        id: 3,
        title: "Recipes",
        body: "<h1>Recipes</h1><p>Simple dishes with five ingredients or fewer.</p>",
    },
    BuiltinTemplate {
        id: 4,
        title: "Coming Soon",
        body: "<h1>Coming Soon</h1><p>This site is under construction.</p>",
    },
];

/// 内置占位模板（编号 1..=4）
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinTemplates;

impl BuiltinTemplates {
    fn find(id: u32) -> Option<&'static BuiltinTemplate> {
        BUILTIN_TEMPLATES.iter().find(|t| t.id == id)
    }

    fn render_template(template: &BuiltinTemplate) -> String {
        format!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
             <title>{}</title></head><body>{}</body></html>",
            template.title, template.body
        )
    }
}

impl FakePageRenderer for BuiltinTemplates {
    fn has_template(&self, id: u32) -> bool {
        Self::find(id).is_some()
    }

    fn render(&self, page: &FakePage) -> String {
        match page {
            FakePage::Html(html) => html.clone(),
            FakePage::Template(id) => {
                let template = Self::find(*id)
                    .or_else(|| Self::find(DEFAULT_TEMPLATE_ID))
                    .unwrap_or(&BUILTIN_TEMPLATES[0]);
                Self::render_template(template)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_templates() {
        let renderer = BuiltinTemplates;
        assert!(renderer.has_template(1));
        assert!(renderer.has_template(4));
        assert!(!renderer.has_template(0));
        assert!(!renderer.has_template(99));
    }

    #[test]
    fn test_render_html_verbatim() {
        let html = "<p>custom</p>".to_string();
        assert_eq!(BuiltinTemplates.render(&FakePage::Html(html.clone())), html);
    }

    #[test]
    fn test_unknown_template_uses_default() {
        let rendered = BuiltinTemplates.render(&FakePage::Template(42));
        assert_eq!(rendered, BuiltinTemplates.render(&FakePage::Template(DEFAULT_TEMPLATE_ID)));
        assert!(rendered.contains("<title>Notes</title>"));
    }
}
