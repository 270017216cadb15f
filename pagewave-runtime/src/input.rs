//! # Input 模块
//!
//! 定义 Host 向 Runtime 传递的输入事件。
//!
//! ## 设计说明
//!
//! - Runtime 不直接接触 DOM 事件，只处理语义化的输入
//! - 点击事件由 Host 提炼为 [`ClickInfo`]
//! - 计时器到期以 [`PageInput::TimerFired`] 回传，Runtime 不感知真实时间

use serde::{Deserialize, Serialize};

use crate::timer::TimerId;

/// 点击目标的摘要
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickInfo {
    /// 目标元素标签名（大写，如 `A`）
    pub tag_name: String,
    /// 链接目标（解析后的绝对地址）
    #[serde(default)]
    pub href: Option<String>,
    /// 目标元素的 class 列表
    #[serde(default)]
    pub classes: Vec<String>,
}

impl ClickInfo {
    /// 创建链接点击
    pub fn link(href: impl Into<String>) -> Self {
        Self {
            tag_name: "A".to_string(),
            href: Some(href.into()),
            classes: Vec::new(),
        }
    }

    /// 创建非链接元素的点击
    pub fn element(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            href: None,
            classes: Vec::new(),
        }
    }

    /// 追加 class
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// 目标是否为超链接
    pub fn is_anchor(&self) -> bool {
        self.tag_name.eq_ignore_ascii_case("A")
    }

    /// 是否带有指定 class
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Host 向 Runtime 传递的输入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageInput {
    /// 页面上的点击（需 Host 已挂载点击监听）
    Click(ClickInfo),

    /// document-ready 事件触发
    DocumentReady,

    /// 计时器到期
    TimerFired(TimerId),
}

impl PageInput {
    /// 创建点击输入
    pub fn click(info: ClickInfo) -> Self {
        Self::Click(info)
    }

    /// 创建计时器到期输入
    pub fn timer(id: TimerId) -> Self {
        Self::TimerFired(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_info() {
        let click = ClickInfo::link("https://example.com/next").with_class("a-overlay");
        assert!(click.is_anchor());
        assert!(click.has_class("a-overlay"));
        assert!(!click.has_class("a-animation"));

        let click = ClickInfo::element("button");
        assert!(!click.is_anchor());
        assert_eq!(click.href, None);

        assert!(ClickInfo::element("a").is_anchor());
    }

    #[test]
    fn test_input_serialization() {
        let input = PageInput::click(ClickInfo::link("/about"));
        let json = serde_json::to_string(&input).unwrap();
        let deserialized: PageInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input, deserialized);
    }
}
