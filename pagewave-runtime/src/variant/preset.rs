//! 预设变体
//!
//! 预设只是自定义变体的语法糖：按名称查表展开为
//! [`KeyframeAnimation`] 或 [`OverlayAnimation`]，由引擎委托执行。
//! 预设名以字符串保存，未知名称展开为空。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{KeyframeAnimation, OverlayAnimation, OverlayPanel, default_timing};

/// keyframe 预设种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyframePresetKind {
    /// 淡入淡出
    Fade,
    /// 淡出并远离
    FadeAway,
}

impl KeyframePresetKind {
    /// 预设名
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::FadeAway => "fadeaway",
        }
    }

    /// 对应的 `@keyframes` 名称
    pub fn keyframe_name(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::FadeAway => "fadeaway",
        }
    }
}

impl FromStr for KeyframePresetKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fade" => Ok(Self::Fade),
            "fadeaway" => Ok(Self::FadeAway),
            _ => Err(()),
        }
    }
}

impl fmt::Display for KeyframePresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// overlay 预设种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayPresetKind {
    /// 滑入
    Slide,
    /// 反向滑入
    InverseSlide,
    /// 左右幕布
    Curtain,
    /// 上升
    Rise,
    /// 下落
    Fall,
    /// 气泡扩散
    Bubble,
}

impl OverlayPresetKind {
    /// 预设名
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slide => "slide",
            Self::InverseSlide => "inverseSlide",
            Self::Curtain => "curtain",
            Self::Rise => "rise",
            Self::Fall => "fall",
            Self::Bubble => "bubble",
        }
    }

    /// 面板 class 到 `@keyframes` 的映射
    pub fn panels(self) -> Vec<OverlayPanel> {
        const FIRST: &str = "firstOverlayElement";
        const SECOND: &str = "secondOverlayElement";

        match self {
            Self::Curtain => vec![
                OverlayPanel::new(FIRST, "rightcurtain"),
                OverlayPanel::new(SECOND, "leftcurtain"),
            ],
            single => vec![OverlayPanel::new(FIRST, single.as_str())],
        }
    }
}

impl FromStr for OverlayPresetKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slide" => Ok(Self::Slide),
            "inverseSlide" => Ok(Self::InverseSlide),
            "curtain" => Ok(Self::Curtain),
            "rise" => Ok(Self::Rise),
            "fall" => Ok(Self::Fall),
            "bubble" => Ok(Self::Bubble),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OverlayPresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// keyframe 预设
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyframePreset {
    /// 预设名
    pub preset: String,
    /// 时长（毫秒）
    pub duration_ms: u32,
    /// 缓动函数
    #[serde(default = "default_timing")]
    pub timing: String,
}

impl KeyframePreset {
    /// 创建 keyframe 预设
    pub fn new(kind: KeyframePresetKind, duration_ms: u32) -> Self {
        Self {
            preset: kind.as_str().to_string(),
            duration_ms,
            timing: default_timing(),
        }
    }

    /// 预设种类（未知名称返回 `None`）
    pub fn kind(&self) -> Option<KeyframePresetKind> {
        self.preset.parse().ok()
    }

    /// 展开为自定义 keyframe 变体
    pub fn expand(&self) -> Option<KeyframeAnimation> {
        self.kind().map(|kind| KeyframeAnimation {
            name: kind.keyframe_name().to_string(),
            duration_ms: self.duration_ms,
            timing: self.timing.clone(),
        })
    }
}

/// overlay 预设
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPreset {
    /// 预设名
    pub preset: String,
    /// 时长（毫秒）
    pub duration_ms: u32,
    /// 面板颜色
    pub color: String,
    /// 缓动函数
    #[serde(default = "default_timing")]
    pub timing: String,
}

impl OverlayPreset {
    /// 创建 overlay 预设
    pub fn new(kind: OverlayPresetKind, duration_ms: u32, color: impl Into<String>) -> Self {
        Self {
            preset: kind.as_str().to_string(),
            duration_ms,
            color: color.into(),
            timing: default_timing(),
        }
    }

    /// 预设种类（未知名称返回 `None`）
    pub fn kind(&self) -> Option<OverlayPresetKind> {
        self.preset.parse().ok()
    }

    /// 展开为自定义 overlay 变体
    pub fn expand(&self) -> Option<OverlayAnimation> {
        self.kind().map(|kind| OverlayAnimation {
            panels: kind.panels(),
            duration_ms: self.duration_ms,
            color: self.color.clone(),
            timing: self.timing.clone(),
            main_animation: None,
        })
    }
}
