//! # Arrival 模块
//!
//! 入场控制器（EndPoint）：新页面在入场动画（或立即显示）完成前保持隐藏。
//!
//! ## 时序
//!
//! ```text
//! start:          隐藏目标 ─► 监听 document-ready（一次）
//! DocumentReady:  ├─ 无缓存  ─► animateEPNSW ─► 显示
//!                 ├─ 策略跳过 ─► animateEPNA  ─► 显示
//!                 └─ 重放    ─► animateSEP ─► 延迟 ─► 反向动画 ─► 延迟 ─► animateEEP ─► 显示
//! ```
//!
//! 显示永远不会早于隐藏。

use tracing::debug;

use crate::command::{ElementAction, PageCommand};
use crate::config::PageWaveConfig;
use crate::hook::{HookDetail, LifecycleHook};
use crate::runtime::engine::TransitionEngine;
use crate::state::{NavigationState, PageEnvironment};
use crate::timer::{Task, Timers};
use crate::variant::{Direction, TransitionSet, Variant};

/// 入场决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryVerdict {
    /// 重放入场动画
    Replay,
    /// 缓存 worker 未就绪，直接显示
    SkipNoCache,
    /// 策略不允许动画，直接显示
    SkipByPolicy,
}

/// 入场阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalPhase {
    /// 尚未启动
    Idle,
    /// 已隐藏，等待 document-ready
    WaitingForReady,
    /// 入场序列进行中
    Entering,
    /// 已显示
    Revealed,
}

/// 入场控制器
#[derive(Debug)]
pub struct ArrivalController {
    config: PageWaveConfig,
    variant: Variant,
    state: Option<NavigationState>,
    verdict: EntryVerdict,
    phase: ArrivalPhase,
}

impl ArrivalController {
    /// 创建入场控制器
    ///
    /// `state` 为已从槽位取出的导航状态。
    pub fn new(
        config: PageWaveConfig,
        transitions: &TransitionSet,
        state: Option<NavigationState>,
    ) -> Self {
        let variant = Self::resolve(transitions, state).clone();
        debug!(?state, category = ?variant.category(), "入场变体");
        Self {
            config,
            variant,
            state,
            verdict: EntryVerdict::SkipByPolicy,
            phase: ArrivalPhase::Idle,
        }
    }

    /// 根据导航状态选出入场变体
    ///
    /// 只有给出了不同于 base 的候选时才参考导航状态。
    pub fn resolve(transitions: &TransitionSet, state: Option<NavigationState>) -> &Variant {
        if !transitions.has_alternatives() {
            return &transitions.base;
        }
        match state {
            Some(NavigationState::Overlay) => transitions.overlay_or_base(),
            Some(NavigationState::Content) => transitions.animation_or_base(),
            _ => &transitions.base,
        }
    }

    /// 决定是否重放入场动画
    pub fn decide(
        config: &PageWaveConfig,
        state: Option<NavigationState>,
        env: &PageEnvironment,
    ) -> EntryVerdict {
        if config.use_persistent_cache && !env.cache_controlled {
            return EntryVerdict::SkipNoCache;
        }

        // 两个开关都打开才在忽略的链接之后重放
        let ignored = state == Some(NavigationState::Ignore)
            && !(config.animate_ignored_links && config.animate_self_links);
        let reload_blocked = env.is_reload() && !config.replay_on_reload;
        let cross_site_blocked = !env.is_same_site() && !config.replay_on_cross_site_entry;

        if ignored || reload_blocked || cross_site_blocked {
            EntryVerdict::SkipByPolicy
        } else {
            EntryVerdict::Replay
        }
    }

    /// 实际使用的变体
    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    /// 入场决策（`start` 之后有效）
    pub fn verdict(&self) -> EntryVerdict {
        self.verdict
    }

    /// 当前阶段
    pub fn phase(&self) -> ArrivalPhase {
        self.phase
    }

    /// 启动：立即隐藏目标，然后监听 document-ready
    pub fn start(&mut self, env: &PageEnvironment) -> Vec<PageCommand> {
        if self.phase != ArrivalPhase::Idle {
            return Vec::new();
        }
        self.verdict = Self::decide(&self.config, self.state, env);
        debug!(verdict = ?self.verdict, reload = env.is_reload(), same_site = env.is_same_site(), "入场决策");

        let mut commands = self.reveal(true);
        if self.variant.category().is_overlay() {
            commands.push(PageCommand::InsertBlocker {
                id: self.config.page_blocker_id.clone(),
                color: self.variant.color().unwrap_or_default().to_string(),
            });
        } else {
            commands.push(PageCommand::WhenPresent {
                id: self.config.main_content_id.clone(),
                action: ElementAction::SetHidden(true),
            });
        }

        commands.push(PageCommand::ListenOnce {
            event: self.config.dom_ready_event.clone(),
            stop_propagation: self.verdict != EntryVerdict::SkipNoCache,
        });
        self.phase = ArrivalPhase::WaitingForReady;
        commands
    }

    /// document-ready 到达
    pub fn on_document_ready(&mut self, timers: &mut Timers) -> Vec<PageCommand> {
        if self.phase != ArrivalPhase::WaitingForReady {
            return Vec::new();
        }

        match self.verdict {
            EntryVerdict::SkipNoCache => self.reveal_now(LifecycleHook::EntryWithoutCache),
            EntryVerdict::SkipByPolicy => self.reveal_now(LifecycleHook::EntryWithoutAnimation),
            EntryVerdict::Replay => {
                self.phase = ArrivalPhase::Entering;
                vec![
                    PageCommand::hook(LifecycleHook::PreEntrySequence, self.detail()),
                    timers.schedule(Task::PlayEntry, self.config.entry_animation_delay_ms),
                ]
            }
        }
    }

    /// 入场延迟结束：反向播放
    ///
    /// 显示延迟从发出反向动画开始计时，不等待动画结束。
    pub fn play_entry(&mut self, timers: &mut Timers) -> Vec<PageCommand> {
        if self.phase != ArrivalPhase::Entering {
            return Vec::new();
        }
        let engine = TransitionEngine::new(&self.config);
        let mut commands = engine.apply(&self.variant, Direction::Reverse, timers);
        commands.push(timers.schedule(Task::RevealEntry, self.config.reveal_delay_ms));
        commands
    }

    /// 显示延迟结束
    pub fn finish_entry(&mut self) -> Vec<PageCommand> {
        if self.phase != ArrivalPhase::Entering {
            return Vec::new();
        }
        self.reveal_now(LifecycleHook::PostEntryAnimation)
    }

    fn reveal_now(&mut self, hook: LifecycleHook) -> Vec<PageCommand> {
        self.phase = ArrivalPhase::Revealed;
        let mut commands = vec![PageCommand::hook(hook, self.detail())];
        commands.extend(self.reveal(false));
        commands
    }

    /// 隐藏与显示共用的切换
    ///
    /// overlay 类别与 `opposite` 异或为真时移除遮挡面板，否则显示主内容。
    fn reveal(&self, opposite: bool) -> Vec<PageCommand> {
        let command = if self.variant.category().is_overlay() ^ opposite {
            PageCommand::WhenPresent {
                id: self.config.page_blocker_id.clone(),
                action: ElementAction::Remove,
            }
        } else {
            PageCommand::WhenPresent {
                id: self.config.main_content_id.clone(),
                action: ElementAction::SetHidden(false),
            }
        };
        vec![command]
    }

    fn detail(&self) -> HookDetail {
        let engine = TransitionEngine::new(&self.config);
        HookDetail::with_element(self.variant.clone(), engine.main_element())
    }
}
