//! # Variant 模块
//!
//! 动画变体：一次页面过渡具体使用的动画手法。
//!
//! ## 变体种类
//!
//! - **Style**: 单个 style 属性的 CSS transition
//! - **Keyframe**: 主内容元素上的 keyframe 动画
//! - **MultiElement**: 按选择器对多组元素施加 keyframe 动画
//! - **Overlay**: 全屏覆盖面板动画
//! - **KeyframePreset / OverlayPreset**: 预设，展开为对应的自定义变体
//!
//! 变体是不可变的值对象，引擎只读取，从不修改。

mod preset;

pub use preset::{KeyframePreset, KeyframePresetKind, OverlayPreset, OverlayPresetKind};

use serde::{Deserialize, Serialize};

use crate::error::VariantError;

/// 动画播放方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// 正向（离场）
    Forward,
    /// 反向（入场）
    Reverse,
}

impl Direction {
    /// CSS `animation-direction` 关键字
    pub fn css_keyword(self) -> &'static str {
        match self {
            Self::Forward => "normal",
            Self::Reverse => "reverse",
        }
    }
}

/// 过渡类别
///
/// 跨越导航边界的唯一事实：入场页面需要在 DOM 构建完成前
/// 决定是遮挡整个页面还是隐藏主内容。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionCategory {
    /// 覆盖面板类
    Overlay,
    /// 主内容类
    Content,
}

impl TransitionCategory {
    /// 是否为覆盖面板类
    pub fn is_overlay(self) -> bool {
        matches!(self, Self::Overlay)
    }
}

fn default_timing() -> String {
    "linear".to_string()
}

/// style 属性过渡
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleTransition {
    /// style 属性名（如 `opacity`）
    pub property: String,
    /// 时长（毫秒）
    pub duration_ms: u32,
    /// 起始值
    pub start: String,
    /// 结束值
    pub end: String,
    /// 缓动函数
    #[serde(default = "default_timing")]
    pub timing: String,
}

/// 单元素 keyframe 动画
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyframeAnimation {
    /// `@keyframes` 名称
    pub name: String,
    /// 时长（毫秒）
    pub duration_ms: u32,
    /// 缓动函数
    #[serde(default = "default_timing")]
    pub timing: String,
}

/// 选择器与其 keyframe 名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorAnimation {
    /// CSS 选择器
    pub selector: String,
    /// `@keyframes` 名称
    pub animation: String,
}

/// 多元素 keyframe 动画
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiElementAnimation {
    /// 选择器到 keyframe 的映射（保持声明顺序）
    pub targets: Vec<SelectorAnimation>,
    /// 时长（毫秒）
    pub duration_ms: u32,
    /// 缓动函数
    #[serde(default = "default_timing")]
    pub timing: String,
    /// 主内容元素的 keyframe（可选）
    #[serde(default)]
    pub main_animation: Option<String>,
}

/// overlay 面板：class 名与其 keyframe 名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPanel {
    /// 面板 class
    pub class_name: String,
    /// `@keyframes` 名称
    pub animation: String,
}

impl OverlayPanel {
    /// 创建面板描述
    pub fn new(class_name: impl Into<String>, animation: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            animation: animation.into(),
        }
    }
}

/// 自定义 overlay 动画
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayAnimation {
    /// 面板列表
    pub panels: Vec<OverlayPanel>,
    /// 时长（毫秒）
    pub duration_ms: u32,
    /// 面板颜色（写入 `--div-color`）
    pub color: String,
    /// 缓动函数
    #[serde(default = "default_timing")]
    pub timing: String,
    /// 主内容元素的 keyframe（可选）
    #[serde(default)]
    pub main_animation: Option<String>,
}

/// 动画变体
///
/// 封闭集合，引擎对其做穷尽匹配。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Variant {
    /// style 属性过渡
    Style(StyleTransition),
    /// 单元素 keyframe
    Keyframe(KeyframeAnimation),
    /// 多元素 keyframe
    MultiElement(MultiElementAnimation),
    /// 自定义 overlay
    Overlay(OverlayAnimation),
    /// keyframe 预设
    KeyframePreset(KeyframePreset),
    /// overlay 预设
    OverlayPreset(OverlayPreset),
}

impl Variant {
    /// 创建 style 过渡变体
    pub fn style(
        property: impl Into<String>,
        duration_ms: u32,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self::Style(StyleTransition {
            property: property.into(),
            duration_ms,
            start: start.into(),
            end: end.into(),
            timing: default_timing(),
        })
    }

    /// 创建单元素 keyframe 变体
    pub fn keyframe(name: impl Into<String>, duration_ms: u32) -> Self {
        Self::Keyframe(KeyframeAnimation {
            name: name.into(),
            duration_ms,
            timing: default_timing(),
        })
    }

    /// 创建多元素 keyframe 变体
    pub fn multi_element<S, A>(targets: impl IntoIterator<Item = (S, A)>, duration_ms: u32) -> Self
    where
        S: Into<String>,
        A: Into<String>,
    {
        Self::MultiElement(MultiElementAnimation {
            targets: targets
                .into_iter()
                .map(|(selector, animation)| SelectorAnimation {
                    selector: selector.into(),
                    animation: animation.into(),
                })
                .collect(),
            duration_ms,
            timing: default_timing(),
            main_animation: None,
        })
    }

    /// 创建自定义 overlay 变体
    pub fn overlay(panels: Vec<OverlayPanel>, duration_ms: u32, color: impl Into<String>) -> Self {
        Self::Overlay(OverlayAnimation {
            panels,
            duration_ms,
            color: color.into(),
            timing: default_timing(),
            main_animation: None,
        })
    }

    /// 创建 keyframe 预设变体
    pub fn keyframe_preset(kind: KeyframePresetKind, duration_ms: u32) -> Self {
        Self::KeyframePreset(KeyframePreset::new(kind, duration_ms))
    }

    /// 创建 overlay 预设变体
    pub fn overlay_preset(kind: OverlayPresetKind, duration_ms: u32, color: impl Into<String>) -> Self {
        Self::OverlayPreset(OverlayPreset::new(kind, duration_ms, color))
    }

    /// 替换缓动函数
    pub fn with_timing(mut self, timing: impl Into<String>) -> Self {
        let timing = timing.into();
        match &mut self {
            Self::Style(v) => v.timing = timing,
            Self::Keyframe(v) => v.timing = timing,
            Self::MultiElement(v) => v.timing = timing,
            Self::Overlay(v) => v.timing = timing,
            Self::KeyframePreset(v) => v.timing = timing,
            Self::OverlayPreset(v) => v.timing = timing,
        }
        self
    }

    /// 设置主内容元素的 keyframe（仅 MultiElement / Overlay 有效）
    pub fn with_main_animation(mut self, animation: impl Into<String>) -> Self {
        match &mut self {
            Self::MultiElement(v) => v.main_animation = Some(animation.into()),
            Self::Overlay(v) => v.main_animation = Some(animation.into()),
            _ => {}
        }
        self
    }

    /// 从 JSON 解析变体
    pub fn from_json(json: &str) -> Result<Self, VariantError> {
        serde_json::from_str(json).map_err(|e| VariantError::InvalidJson {
            message: e.to_string(),
        })
    }

    /// 时长（毫秒）
    pub fn duration_ms(&self) -> u32 {
        match self {
            Self::Style(v) => v.duration_ms,
            Self::Keyframe(v) => v.duration_ms,
            Self::MultiElement(v) => v.duration_ms,
            Self::Overlay(v) => v.duration_ms,
            Self::KeyframePreset(v) => v.duration_ms,
            Self::OverlayPreset(v) => v.duration_ms,
        }
    }

    /// 缓动函数
    pub fn timing(&self) -> &str {
        match self {
            Self::Style(v) => &v.timing,
            Self::Keyframe(v) => &v.timing,
            Self::MultiElement(v) => &v.timing,
            Self::Overlay(v) => &v.timing,
            Self::KeyframePreset(v) => &v.timing,
            Self::OverlayPreset(v) => &v.timing,
        }
    }

    /// overlay 颜色（仅 overlay 类别）
    pub fn color(&self) -> Option<&str> {
        match self {
            Self::Overlay(v) => Some(&v.color),
            Self::OverlayPreset(v) => Some(&v.color),
            _ => None,
        }
    }

    /// 过渡类别，只取决于变体种类
    pub fn category(&self) -> TransitionCategory {
        match self {
            Self::Overlay(_) | Self::OverlayPreset(_) => TransitionCategory::Overlay,
            Self::Style(_) | Self::Keyframe(_) | Self::MultiElement(_) | Self::KeyframePreset(_) => {
                TransitionCategory::Content
            }
        }
    }

    /// 是否为预设
    pub fn is_preset(&self) -> bool {
        matches!(self, Self::KeyframePreset(_) | Self::OverlayPreset(_))
    }

    /// 将预设展开为自定义变体
    ///
    /// 非预设返回 `None`；未知预设名同样返回 `None`。
    pub fn expand_preset(&self) -> Option<Variant> {
        match self {
            Self::KeyframePreset(p) => p.expand().map(Self::Keyframe),
            Self::OverlayPreset(p) => p.expand().map(Self::Overlay),
            _ => None,
        }
    }
}

/// 一组候选变体
///
/// `base` 为默认变体，`overlay` / `animation` 分别对应带有
/// overlay class / animation class 的链接，未给出时回退到 `base`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionSet {
    /// 默认变体
    pub base: Variant,
    /// overlay 候选
    #[serde(default)]
    pub overlay: Option<Variant>,
    /// animation 候选
    #[serde(default)]
    pub animation: Option<Variant>,
}

impl TransitionSet {
    /// 只有一个变体的集合
    pub fn single(base: Variant) -> Self {
        Self {
            base,
            overlay: None,
            animation: None,
        }
    }

    /// 完整的三候选集合
    pub fn new(base: Variant, overlay: Option<Variant>, animation: Option<Variant>) -> Self {
        Self {
            base,
            overlay,
            animation,
        }
    }

    /// overlay 候选（缺省回退到 base）
    pub fn overlay_or_base(&self) -> &Variant {
        self.overlay.as_ref().unwrap_or(&self.base)
    }

    /// animation 候选（缺省回退到 base）
    pub fn animation_or_base(&self) -> &Variant {
        self.animation.as_ref().unwrap_or(&self.base)
    }

    /// 是否给出了不同于 base 的候选
    pub fn has_alternatives(&self) -> bool {
        self.overlay_or_base() != &self.base || self.animation_or_base() != &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_is_total() {
        let variants = [
            Variant::style("opacity", 300, "0", "1"),
            Variant::keyframe("fade", 300),
            Variant::multi_element([(".card", "rise")], 300),
            Variant::overlay(vec![OverlayPanel::new("p", "slide")], 300, "#000"),
            Variant::keyframe_preset(KeyframePresetKind::Fade, 300),
            Variant::overlay_preset(OverlayPresetKind::Curtain, 300, "#000"),
        ];
        let categories: Vec<_> = variants.iter().map(Variant::category).collect();
        assert_eq!(
            categories,
            vec![
                TransitionCategory::Content,
                TransitionCategory::Content,
                TransitionCategory::Content,
                TransitionCategory::Overlay,
                TransitionCategory::Content,
                TransitionCategory::Overlay,
            ]
        );
    }

    #[test]
    fn test_category_invariant_under_preset_wrapping() {
        let presets = [
            Variant::keyframe_preset(KeyframePresetKind::FadeAway, 500),
            Variant::overlay_preset(OverlayPresetKind::Bubble, 500, "red"),
        ];
        for preset in presets {
            let custom = preset.expand_preset().unwrap();
            assert_eq!(preset.category(), custom.category());
            assert_eq!(preset.duration_ms(), custom.duration_ms());
        }
    }

    #[test]
    fn test_with_timing_and_main_animation() {
        let v = Variant::overlay(vec![], 400, "#fff")
            .with_timing("ease-in")
            .with_main_animation("shrink");
        assert_eq!(v.timing(), "ease-in");
        match v {
            Variant::Overlay(o) => assert_eq!(o.main_animation.as_deref(), Some("shrink")),
            other => panic!("unexpected variant: {other:?}"),
        }

        // 对 style 变体无效果
        let v = Variant::style("opacity", 1, "0", "1").with_main_animation("x");
        assert_eq!(v, Variant::style("opacity", 1, "0", "1"));
    }

    #[test]
    fn test_variant_from_json() {
        let v = Variant::from_json(
            r#"{"kind": "style", "property": "opacity", "durationMs": 300, "start": "0", "end": "1"}"#,
        )
        .unwrap();
        assert_eq!(v, Variant::style("opacity", 300, "0", "1"));

        let v = Variant::from_json(
            r##"{"kind": "overlayPreset", "preset": "curtain", "durationMs": 800, "color": "#000"}"##,
        )
        .unwrap();
        assert_eq!(v.category(), TransitionCategory::Overlay);
        assert_eq!(v.color(), Some("#000"));

        assert!(Variant::from_json(r#"{"kind": "teleport"}"#).is_err());
    }

    #[test]
    fn test_transition_set_fallbacks() {
        let base = Variant::keyframe("fade", 300);
        let set = TransitionSet::single(base.clone());
        assert_eq!(set.overlay_or_base(), &base);
        assert_eq!(set.animation_or_base(), &base);
        assert!(!set.has_alternatives());

        // 与 base 相同的候选不算作不同
        let set = TransitionSet::new(base.clone(), Some(base.clone()), None);
        assert!(!set.has_alternatives());

        let overlay = Variant::overlay_preset(OverlayPresetKind::Slide, 300, "#000");
        let set = TransitionSet::new(base, Some(overlay.clone()), None);
        assert!(set.has_alternatives());
        assert_eq!(set.overlay_or_base(), &overlay);
    }

    #[test]
    fn test_direction_keyword() {
        assert_eq!(Direction::Forward.css_keyword(), "normal");
        assert_eq!(Direction::Reverse.css_keyword(), "reverse");
    }
}
