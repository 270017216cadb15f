//! # Backend 模块
//!
//! 页面后端抽象：PageCommand 需要的全部 DOM 操作。
//!
//! 计时器、一次性事件监听和点击监听不在这里，
//! 它们需要把输入回传给会话，由驱动层负责。

use pagewave_runtime::{ElementAction, ElementRef, HookDetail, LifecycleHook};

use crate::error::HostResult;

/// 页面后端
pub trait PageBackend {
    /// 向 `<head>` 追加样式表链接
    fn inject_stylesheet(&mut self, href: &str) -> HostResult<()>;

    /// 注册缓存 worker（不等待结果）
    fn register_cache_worker(&mut self, script: &str) -> HostResult<()>;

    /// 设置内联 style 属性
    fn set_style(&mut self, target: &ElementRef, property: &str, value: &str) -> HostResult<()>;

    /// 设置 `hidden`
    fn set_hidden(&mut self, target: &ElementRef, hidden: bool) -> HostResult<()>;

    /// 设置根元素的 CSS 自定义属性
    fn set_root_property(&mut self, name: &str, value: &str) -> HostResult<()>;

    /// 在父元素下追加 overlay 面板
    fn append_panel(
        &mut self,
        parent: &ElementRef,
        class_name: &str,
        animation: &str,
        remove_on_end: Option<&str>,
    ) -> HostResult<()>;

    /// 在指定动画结束时冻结首帧样式并清除 `animation`
    fn freeze_on_animation_end(&mut self, target: &ElementRef, animation_name: &str)
    -> HostResult<()>;

    /// 在 body 末尾插入遮挡面板
    fn insert_blocker(&mut self, id: &str, css_text: &str) -> HostResult<()>;

    /// 元素存在则立即执行，否则等它出现后执行一次
    fn when_present(&mut self, id: &str, action: ElementAction) -> HostResult<()>;

    /// 派发生命周期通知
    fn dispatch_hook(&mut self, hook: LifecycleHook, detail: &HookDetail) -> HostResult<()>;

    /// 阻止当前点击的默认行为
    fn prevent_default(&mut self) -> HostResult<()>;

    /// 离开页面
    fn navigate(&mut self, href: &str) -> HostResult<()>;
}

/// 遮挡面板的内联样式
pub fn blocker_css_text(color: &str) -> String {
    format!(
        "position: absolute; width: 100%; height: 100%; z-index: 100; top: 0; background-color: {color}"
    )
}

/// 冻结首帧时跳过的非样式键
pub const KEYFRAME_META_KEYS: [&str; 4] = ["offset", "easing", "composite", "computedOffset"];

/// 把 camelCase 属性名转换为 CSS 属性名
///
/// 自定义属性（`--x`）与已是连字符形式的名称原样返回。
pub fn css_property_name(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    // `float` 是保留字，keyframe 对象里写作 `cssFloat`
    if name == "cssFloat" {
        return "float".to_string();
    }
    let mut css = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            css.push('-');
            css.push(ch.to_ascii_lowercase());
        } else {
            css.push(ch);
        }
    }
    css
}

/// animationend 是否属于监听者自己的指定动画
///
/// 子元素的 animationend 会冒泡上来，`on_owner` 为事件目标是否为监听者本身。
pub fn ends_own_animation(event_animation: &str, expected: &str, on_owner: bool) -> bool {
    on_owner && event_animation == expected
}

/// 钩子详情中要换成活对象的字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveField<'a> {
    /// `ele`：解析出的元素
    Element(&'a ElementRef),
    /// `clickEvent`：触发离场的点击事件
    ClickEvent,
}

impl LiveField<'_> {
    /// 详情对象上的键名
    pub fn key(&self) -> &'static str {
        match self {
            Self::Element(_) => "ele",
            Self::ClickEvent => "clickEvent",
        }
    }
}

/// 列出详情中可以换成活对象的字段
///
/// 浏览器后端据此覆盖 JSON 里的纯数据；内存后端保留 JSON。
pub fn live_fields(detail: &HookDetail) -> Vec<LiveField<'_>> {
    let mut fields = Vec::new();
    if let Some(ele) = &detail.ele {
        fields.push(LiveField::Element(ele));
    }
    if detail.click_event.is_some() {
        fields.push(LiveField::ClickEvent);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocker_css_text() {
        assert_eq!(
            blocker_css_text("#000"),
            "position: absolute; width: 100%; height: 100%; z-index: 100; top: 0; background-color: #000"
        );
    }

    #[test]
    fn test_css_property_name() {
        assert_eq!(css_property_name("backgroundColor"), "background-color");
        assert_eq!(css_property_name("opacity"), "opacity");
        assert_eq!(css_property_name("z-index"), "z-index");
        assert_eq!(css_property_name("--div-color"), "--div-color");
        assert_eq!(css_property_name("cssFloat"), "float");
        assert_eq!(css_property_name("cssOffset"), "css-offset");
    }

    #[test]
    fn test_ends_own_animation() {
        assert!(ends_own_animation("fade", "fade", true));
        // 子元素同名动画冒泡上来
        assert!(!ends_own_animation("fade", "fade", false));
        assert!(!ends_own_animation("slideIn", "fade", true));
    }

    #[test]
    fn test_live_fields() {
        use pagewave_runtime::{ClickInfo, Variant};

        let keyframe = Variant::keyframe("fade", 300);
        let detail = HookDetail::with_element(keyframe.clone(), ElementRef::id("main-content"));
        let fields = live_fields(&detail);
        assert_eq!(fields, vec![LiveField::Element(&ElementRef::id("main-content"))]);
        assert_eq!(fields[0].key(), "ele");

        let detail = HookDetail::with_candidates(
            keyframe.clone(),
            keyframe.clone(),
            keyframe.clone(),
            ClickInfo::link("https://example.com/b"),
        );
        let keys: Vec<_> = live_fields(&detail).iter().map(LiveField::key).collect();
        assert_eq!(keys, vec!["clickEvent"]);

        assert!(live_fields(&HookDetail::style(keyframe)).is_empty());
    }
}
