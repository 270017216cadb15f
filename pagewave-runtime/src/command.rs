//! # Command 模块
//!
//! 定义 Runtime 向 Host 发出的所有指令。
//! Command 是 Runtime 与 Host 之间的**唯一通信方式**。
//!
//! ## 设计原则
//!
//! - **声明式**：Command 描述"做什么"，不描述"怎么做"
//! - **无副作用**：Command 本身不执行任何操作
//! - **DOM 无关**：不包含任何 `web-sys` 类型，可在原生环境测试

use serde::{Deserialize, Serialize};

use crate::hook::{HookDetail, LifecycleHook};
use crate::state::NavigationState;
use crate::timer::TimerId;

/// 元素引用
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementRef {
    /// 按 id 定位的单个元素
    Id(String),
    /// 匹配选择器的所有元素
    Selector(String),
}

impl ElementRef {
    /// 按 id 引用
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// 按选择器引用
    pub fn selector(selector: impl Into<String>) -> Self {
        Self::Selector(selector.into())
    }
}

/// 元素出现后执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementAction {
    /// 从 DOM 移除
    Remove,
    /// 设置 `hidden`
    SetHidden(bool),
}

/// Runtime 向 Host 发出的指令
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageCommand {
    /// 向 `<head>` 注入样式表
    InjectStylesheet { href: String },

    /// 注册缓存 worker（不等待结果）
    RegisterCacheWorker { script: String },

    /// 设置内联 style 属性
    SetStyle {
        target: ElementRef,
        property: String,
        value: String,
    },

    /// 设置元素 `hidden`
    SetHidden { target: ElementRef, hidden: bool },

    /// 设置根元素上的 CSS 自定义属性
    SetRootProperty { name: String, value: String },

    /// 在父元素下追加带动画的 overlay 面板
    AppendPanel {
        parent: ElementRef,
        class_name: String,
        /// `animation` 简写值
        animation: String,
        /// 动画名为此值的 animationend 到来时移除面板
        remove_on_end: Option<String>,
    },

    /// 监听一次指定名称的 animationend，
    /// 到达后把 keyframe 起始值冻结为内联样式并清除 `animation`
    FreezeOnAnimationEnd {
        target: ElementRef,
        animation_name: String,
    },

    /// 在 body 末尾插入全屏遮挡面板
    InsertBlocker { id: String, color: String },

    /// 元素已存在则立即执行动作，否则挂载一次性出现监听
    WhenPresent { id: String, action: ElementAction },

    /// 派发生命周期通知
    DispatchHook {
        hook: LifecycleHook,
        detail: Box<HookDetail>,
    },

    /// 写入导航状态槽位
    PersistNavigationState(NavigationState),

    /// 启动计时器
    StartTimer { id: TimerId, delay_ms: u32 },

    /// 监听一次事件，触发后回传 `DocumentReady`
    ListenOnce {
        event: String,
        stop_propagation: bool,
    },

    /// 挂载页面点击监听
    AttachClickListener,

    /// 移除页面点击监听
    DetachClickListener,

    /// 阻止当前点击的默认导航
    PreventDefault,

    /// 通过导航函数离开页面
    Navigate { href: String },
}

impl PageCommand {
    /// 派发通知的便捷构造
    pub fn hook(hook: LifecycleHook, detail: HookDetail) -> Self {
        Self::DispatchHook {
            hook,
            detail: Box::new(detail),
        }
    }

    /// 设置内联样式的便捷构造
    pub fn set_style(
        target: ElementRef,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::SetStyle {
            target,
            property: property.into(),
            value: value.into(),
        }
    }

    /// 指令的简短标签，用于日志与测试轨迹
    pub fn label(&self) -> String {
        match self {
            Self::InjectStylesheet { href } => format!("inject {href}"),
            Self::RegisterCacheWorker { script } => format!("register {script}"),
            Self::SetStyle {
                target,
                property,
                value,
            } => format!("style {} {property}={value}", describe(target)),
            Self::SetHidden { target, hidden } => {
                format!("hidden {}={hidden}", describe(target))
            }
            Self::SetRootProperty { name, value } => format!("root {name}={value}"),
            Self::AppendPanel {
                class_name,
                animation,
                ..
            } => format!("panel .{class_name} {animation}"),
            Self::FreezeOnAnimationEnd {
                target,
                animation_name,
            } => format!("freeze {} on {animation_name}", describe(target)),
            Self::InsertBlocker { id, color } => format!("blocker #{id} {color}"),
            Self::WhenPresent { id, action } => match action {
                ElementAction::Remove => format!("remove #{id}"),
                ElementAction::SetHidden(hidden) => format!("hidden #{id}={hidden}"),
            },
            Self::DispatchHook { hook, .. } => format!("hook {}", hook.event_name()),
            Self::PersistNavigationState(state) => format!("persist {}", state.as_str()),
            Self::StartTimer { delay_ms, .. } => format!("timer {delay_ms}ms"),
            Self::ListenOnce { event, .. } => format!("listen {event}"),
            Self::AttachClickListener => "attach click".to_string(),
            Self::DetachClickListener => "detach click".to_string(),
            Self::PreventDefault => "prevent default".to_string(),
            Self::Navigate { href } => format!("navigate {href}"),
        }
    }
}

fn describe(target: &ElementRef) -> String {
    match target {
        ElementRef::Id(id) => format!("#{id}"),
        ElementRef::Selector(selector) => selector.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Variant;

    #[test]
    fn test_command_labels() {
        let cmd = PageCommand::set_style(ElementRef::id("main"), "opacity", "0");
        assert_eq!(cmd.label(), "style #main opacity=0");

        let cmd = PageCommand::WhenPresent {
            id: "pageBlocker".to_string(),
            action: ElementAction::Remove,
        };
        assert_eq!(cmd.label(), "remove #pageBlocker");

        let cmd = PageCommand::hook(
            LifecycleHook::ReverseEnd,
            HookDetail::style(Variant::keyframe("fade", 1)),
        );
        assert_eq!(cmd.label(), "hook animateER");
    }

    #[test]
    fn test_command_serialization() {
        let cmd = PageCommand::AppendPanel {
            parent: ElementRef::id("main-content"),
            class_name: "firstOverlayElement".to_string(),
            animation: "slide 300ms linear both normal".to_string(),
            remove_on_end: Some("slide".to_string()),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let deserialized: PageCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, deserialized);
    }
}
