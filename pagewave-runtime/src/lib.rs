//! # PageWave Runtime
//!
//! 跨整页导航的页面过渡核心库。
//!
//! ## 架构概述
//!
//! `pagewave-runtime` 是纯逻辑核心，不依赖 DOM 或任何 IO。
//! 它通过 **命令驱动模式** 与宿主层（Host）通信：
//!
//! ```text
//! Host                                   Runtime
//!   │                                       │
//!   │──── PageInput ───────────────────────►│
//!   │                                       │ handle()
//!   │◄─── Vec<PageCommand> ─────────────────│
//!   │                                       │
//! ```
//!
//! 离场页与入场页是两个独立的页面生命周期，
//! 二者只通过一个 [`NavigationState`] 槽位通信。
//!
//! ## 核心类型
//!
//! - [`PageCommand`]：Runtime 向 Host 发出的指令
//! - [`PageInput`]：Host 向 Runtime 传递的输入
//! - [`Variant`]：动画变体
//! - [`PageSession`]：一个页面上的过渡会话
//! - [`NavigationState`]：跨导航的状态
//!
//! ## 使用示例
//!
//! ```ignore
//! use pagewave_runtime::{PageSession, PageInput};
//!
//! let state = store.consume();
//! let mut session = PageSession::listen_for_change(config, env, transitions, state);
//!
//! for cmd in session.start() {
//!     host.execute(cmd);
//! }
//!
//! // 事件循环：点击、document-ready、计时器到期
//! while let Some(input) = host.next_input() {
//!     for cmd in session.handle(input) {
//!         host.execute(cmd);
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`command`]：PageCommand 定义
//! - [`input`]：PageInput 定义
//! - [`config`]：配置
//! - [`variant`]：动画变体与预设
//! - [`state`]：导航状态与页面环境
//! - [`hook`]：生命周期通知
//! - [`timer`]：计时器表
//! - [`error`]：错误类型定义
//! - [`runtime`]：过渡引擎与控制器

pub mod command;
pub mod config;
pub mod error;
pub mod hook;
pub mod input;
pub mod runtime;
pub mod state;
pub mod timer;
pub mod variant;

// 重导出核心类型
pub use command::{ElementAction, ElementRef, PageCommand};
pub use config::PageWaveConfig;
pub use error::{ConfigError, PageWaveError, PageWaveResult, VariantError};
pub use hook::{HookDetail, LifecycleHook};
pub use input::{ClickInfo, PageInput};
pub use runtime::{
    ArrivalController, DepartureController, EntryVerdict, PageSession, TransitionEngine,
    setup_commands,
};
pub use state::{
    MemoryNavigationStore, NAVIGATION_STATE_KEY, NavigationKind, NavigationState,
    NavigationStore, PageEnvironment,
};
pub use timer::{Task, TimerId, Timers};
pub use variant::{Direction, TransitionCategory, TransitionSet, Variant};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // 验证所有公共类型都可以正常使用
        let _cmd = PageCommand::PreventDefault;

        let _input = PageInput::DocumentReady;

        let _state = NavigationState::Ignore;

        let _session = PageSession::send_point(
            PageWaveConfig::default(),
            PageEnvironment::new("https://example.com/"),
            TransitionSet::single(Variant::keyframe("fade", 300)),
        );
    }
}
