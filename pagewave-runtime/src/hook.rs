//! # Hook 模块
//!
//! 生命周期通知。Host 以 `window` 上的 `CustomEvent` 派发，
//! 事件名沿用既有的对外约定，宿主页面代码据此观察过渡进度。

use serde::{Deserialize, Serialize};

use crate::command::ElementRef;
use crate::input::ClickInfo;
use crate::variant::{Direction, Variant};

/// 生命周期通知
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleHook {
    /// 离场动画开始前
    PreDeparture,
    /// 离场动画结束、导航之前
    PostDeparture,
    /// 入场动画序列开始
    PreEntrySequence,
    /// 入场动画结束、显示页面之前
    PostEntryAnimation,
    /// 缓存 worker 未就绪，直接显示页面
    EntryWithoutCache,
    /// 策略不允许入场动画，直接显示页面
    EntryWithoutAnimation,
    /// 正向动画开始
    ForwardStart,
    /// 正向动画结束
    ForwardEnd,
    /// 反向动画开始
    ReverseStart,
    /// 反向动画结束
    ReverseEnd,
}

impl LifecycleHook {
    /// `CustomEvent` 事件名
    pub fn event_name(self) -> &'static str {
        match self {
            Self::PreDeparture => "animateSSP",
            Self::PostDeparture => "animateESP",
            Self::PreEntrySequence => "animateSEP",
            Self::PostEntryAnimation => "animateEEP",
            Self::EntryWithoutCache => "animateEPNSW",
            Self::EntryWithoutAnimation => "animateEPNA",
            Self::ForwardStart => "animateSF",
            Self::ForwardEnd => "animateEF",
            Self::ReverseStart => "animateSR",
            Self::ReverseEnd => "animateER",
        }
    }

    /// 动画开始通知
    pub fn start_of(direction: Direction) -> Self {
        match direction {
            Direction::Forward => Self::ForwardStart,
            Direction::Reverse => Self::ReverseStart,
        }
    }

    /// 动画结束通知
    pub fn end_of(direction: Direction) -> Self {
        match direction {
            Direction::Forward => Self::ForwardEnd,
            Direction::Reverse => Self::ReverseEnd,
        }
    }
}

/// 通知携带的数据
///
/// 序列化后作为 `CustomEvent.detail`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookDetail {
    /// 当前变体
    pub style: Variant,
    /// overlay 候选
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_style: Option<Variant>,
    /// animation 候选
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_style: Option<Variant>,
    /// 作用的元素
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ele: Option<ElementRef>,
    /// 触发的点击
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_event: Option<ClickInfo>,
}

impl HookDetail {
    /// 只带变体
    pub fn style(style: Variant) -> Self {
        Self {
            style,
            overlay_style: None,
            animation_style: None,
            ele: None,
            click_event: None,
        }
    }

    /// 变体与作用元素
    pub fn with_element(style: Variant, ele: ElementRef) -> Self {
        Self {
            ele: Some(ele),
            ..Self::style(style)
        }
    }

    /// 全部候选与点击
    pub fn with_candidates(
        style: Variant,
        overlay_style: Variant,
        animation_style: Variant,
        click_event: ClickInfo,
    ) -> Self {
        Self {
            style,
            overlay_style: Some(overlay_style),
            animation_style: Some(animation_style),
            ele: None,
            click_event: Some(click_event),
        }
    }

    /// 序列化为 JSON
    pub fn to_json(&self) -> String {
        // 所有字段都是可序列化的普通数据
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
