//! # Departure 模块
//!
//! 离场控制器（SendPoint）：把页内链接点击转换为
//! "播放离场动画，然后导航"。
//!
//! ## 状态转换
//!
//! ```text
//! Idle ──start──► WaitingForReady ──DocumentReady──► Listening
//!   └──start (缓存已就绪/已禁用)────────────────────► Listening
//! Listening ──合格点击──► Departing ──FinishDeparture──► Departed
//! ```
//!
//! 点击监听在第一次合格点击后移除，每个页面最多一次离场动画。

use tracing::debug;

use crate::command::PageCommand;
use crate::config::PageWaveConfig;
use crate::hook::{HookDetail, LifecycleHook};
use crate::input::ClickInfo;
use crate::runtime::engine::TransitionEngine;
use crate::state::{NavigationState, PageEnvironment};
use crate::timer::{Task, Timers};
use crate::variant::{Direction, TransitionSet, Variant};

/// 离场阶段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeparturePhase {
    /// 尚未启动
    Idle,
    /// 等待 document-ready 后再挂载点击监听
    WaitingForReady,
    /// 正在监听点击
    Listening,
    /// 离场动画播放中
    Departing {
        /// 触发离场的点击
        click: ClickInfo,
    },
    /// 已完成（监听已移除）
    Departed,
}

/// 点击的分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickVerdict {
    /// 播放离场动画
    Animate,
    /// 被忽略的链接（忽略 class 或不动画的自链接）
    Ignored,
    /// 与过渡无关
    Unrelated,
}

/// 离场控制器
#[derive(Debug)]
pub struct DepartureController {
    config: PageWaveConfig,
    transitions: TransitionSet,
    location_href: String,
    phase: DeparturePhase,
}

impl DepartureController {
    /// 创建离场控制器
    pub fn new(config: PageWaveConfig, transitions: TransitionSet) -> Self {
        Self {
            config,
            transitions,
            location_href: String::new(),
            phase: DeparturePhase::Idle,
        }
    }

    /// 当前阶段
    pub fn phase(&self) -> &DeparturePhase {
        &self.phase
    }

    /// 启动：决定立即监听还是等待 document-ready
    ///
    /// 缓存 worker 尚未控制页面时，预设样式可能还没缓存，
    /// 此时提前播放会闪出无样式内容。
    pub fn start(&mut self, env: &PageEnvironment) -> Vec<PageCommand> {
        if self.phase != DeparturePhase::Idle {
            return Vec::new();
        }
        self.location_href = env.location_href.clone();

        if !self.config.use_persistent_cache || env.cache_controlled {
            self.phase = DeparturePhase::Listening;
            vec![PageCommand::AttachClickListener]
        } else {
            debug!("缓存 worker 未就绪，等待 document-ready 后再监听点击");
            self.phase = DeparturePhase::WaitingForReady;
            vec![PageCommand::ListenOnce {
                event: self.config.dom_ready_event.clone(),
                stop_propagation: false,
            }]
        }
    }

    /// document-ready 到达
    pub fn on_document_ready(&mut self) -> Vec<PageCommand> {
        if self.phase != DeparturePhase::WaitingForReady {
            return Vec::new();
        }
        self.phase = DeparturePhase::Listening;
        vec![PageCommand::AttachClickListener]
    }

    /// 分类点击
    pub fn classify(&self, click: &ClickInfo) -> ClickVerdict {
        if !click.is_anchor() {
            return ClickVerdict::Unrelated;
        }

        let ignored = click.has_class(&self.config.link_ignore_class);
        let unanimated_self_link =
            !self.config.animate_self_links && click.href.as_deref() == Some(&self.location_href);

        if ignored || unanimated_self_link {
            ClickVerdict::Ignored
        } else {
            ClickVerdict::Animate
        }
    }

    /// 按链接的标记 class 选择候选变体
    pub fn select(&self, click: &ClickInfo) -> &Variant {
        if click.has_class(&self.config.overlay_class) {
            self.transitions.overlay_or_base()
        } else if click.has_class(&self.config.animation_class) {
            self.transitions.animation_or_base()
        } else {
            &self.transitions.base
        }
    }

    /// 点击到达
    pub fn on_click(&mut self, click: ClickInfo, timers: &mut Timers) -> Vec<PageCommand> {
        if self.phase != DeparturePhase::Listening {
            return Vec::new();
        }

        match self.classify(&click) {
            ClickVerdict::Unrelated => Vec::new(),
            ClickVerdict::Ignored => {
                // 不阻止默认导航，只告诉下一页跳过入场动画
                debug!(href = ?click.href, "忽略的链接");
                vec![PageCommand::PersistNavigationState(NavigationState::Ignore)]
            }
            ClickVerdict::Animate => self.depart(click, timers),
        }
    }

    fn depart(&mut self, click: ClickInfo, timers: &mut Timers) -> Vec<PageCommand> {
        let selected = self.select(&click).clone();
        debug!(href = ?click.href, category = ?selected.category(), "开始离场");

        let mut commands = vec![
            PageCommand::PreventDefault,
            PageCommand::hook(LifecycleHook::PreDeparture, self.detail(&click)),
            PageCommand::PersistNavigationState(NavigationState::from_category(
                selected.category(),
            )),
        ];

        let engine = TransitionEngine::new(&self.config);
        commands.extend(engine.apply(&selected, Direction::Forward, timers));
        commands.push(timers.schedule(Task::FinishDeparture, selected.duration_ms()));

        self.phase = DeparturePhase::Departing { click };
        commands
    }

    /// 离场动画时长到期
    pub fn finish(&mut self) -> Vec<PageCommand> {
        let DeparturePhase::Departing { click } =
            std::mem::replace(&mut self.phase, DeparturePhase::Departed)
        else {
            return Vec::new();
        };

        let mut commands = vec![
            PageCommand::hook(LifecycleHook::PostDeparture, self.detail(&click)),
            PageCommand::DetachClickListener,
        ];

        if self.config.navigate_on_animation_end
            && let Some(href) = click.href
        {
            commands.push(PageCommand::Navigate { href });
        }
        commands
    }

    fn detail(&self, click: &ClickInfo) -> HookDetail {
        HookDetail::with_candidates(
            self.transitions.base.clone(),
            self.transitions.overlay_or_base().clone(),
            self.transitions.animation_or_base().clone(),
            click.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{OverlayPresetKind, TransitionCategory};

    const HERE: &str = "https://example.com/";

    fn transitions() -> TransitionSet {
        TransitionSet::new(
            Variant::style("opacity", 300, "1", "0"),
            Some(Variant::overlay_preset(OverlayPresetKind::Slide, 500, "#000")),
            Some(Variant::keyframe("fade", 700)),
        )
    }

    fn listening(config: PageWaveConfig) -> DepartureController {
        let mut controller = DepartureController::new(config, transitions());
        let commands = controller.start(&PageEnvironment::new(HERE).with_cache_controlled(true));
        assert_eq!(commands, vec![PageCommand::AttachClickListener]);
        controller
    }

    fn persisted(commands: &[PageCommand]) -> Vec<NavigationState> {
        commands
            .iter()
            .filter_map(|c| match c {
                PageCommand::PersistNavigationState(state) => Some(*state),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_waits_for_ready_without_cache() {
        let mut controller = DepartureController::new(PageWaveConfig::default(), transitions());
        let commands = controller.start(&PageEnvironment::new(HERE));
        assert_eq!(
            commands,
            vec![PageCommand::ListenOnce {
                event: "DOMContentLoaded".to_string(),
                stop_propagation: false,
            }]
        );
        assert_eq!(controller.phase(), &DeparturePhase::WaitingForReady);

        // 等待期间的点击不处理
        let mut timers = Timers::new();
        assert!(controller.on_click(ClickInfo::link("/a"), &mut timers).is_empty());

        assert_eq!(
            controller.on_document_ready(),
            vec![PageCommand::AttachClickListener]
        );
        // ready 只响应一次
        assert!(controller.on_document_ready().is_empty());
    }

    #[test]
    fn test_listens_immediately_when_cache_disabled() {
        let config = PageWaveConfig {
            use_persistent_cache: false,
            ..PageWaveConfig::default()
        };
        let mut controller = DepartureController::new(config, transitions());
        assert_eq!(
            controller.start(&PageEnvironment::new(HERE)),
            vec![PageCommand::AttachClickListener]
        );
    }

    #[test]
    fn test_selection_follows_marker_class() {
        let controller = listening(PageWaveConfig::default());

        let plain = ClickInfo::link("/a");
        assert_eq!(controller.select(&plain), &transitions().base);

        let overlay = ClickInfo::link("/a").with_class("a-overlay");
        assert_eq!(controller.select(&overlay).category(), TransitionCategory::Overlay);

        let animation = ClickInfo::link("/a").with_class("a-animation");
        assert_eq!(controller.select(&animation), &Variant::keyframe("fade", 700));
    }

    #[test]
    fn test_persists_category_of_selected_variant() {
        for (click, expected, duration) in [
            (ClickInfo::link("/a"), NavigationState::Content, 300),
            (
                ClickInfo::link("/a").with_class("a-overlay"),
                NavigationState::Overlay,
                500,
            ),
            (
                ClickInfo::link("/a").with_class("a-animation"),
                NavigationState::Content,
                700,
            ),
        ] {
            let mut controller = listening(PageWaveConfig::default());
            let mut timers = Timers::new();
            let commands = controller.on_click(click, &mut timers);

            assert_eq!(commands[0], PageCommand::PreventDefault);
            assert_eq!(persisted(&commands), vec![expected]);
            // 最后一条是按所选变体时长登记的离场计时器
            assert!(matches!(
                commands.last(),
                Some(PageCommand::StartTimer { delay_ms, .. }) if *delay_ms == duration
            ));
        }
    }

    #[test]
    fn test_ignored_link_writes_ignore_only() {
        let mut controller = listening(PageWaveConfig::default());
        let mut timers = Timers::new();
        let commands =
            controller.on_click(ClickInfo::link("/a").with_class("ignore-click"), &mut timers);

        assert_eq!(
            commands,
            vec![PageCommand::PersistNavigationState(NavigationState::Ignore)]
        );
        assert_eq!(timers.pending_count(), 0);
        // 仍在监听
        assert_eq!(controller.phase(), &DeparturePhase::Listening);
    }

    #[test]
    fn test_self_link_ignored_only_when_disabled() {
        let mut controller = listening(PageWaveConfig::default());
        assert_eq!(controller.classify(&ClickInfo::link(HERE)), ClickVerdict::Animate);

        controller = listening(PageWaveConfig {
            animate_self_links: false,
            ..PageWaveConfig::default()
        });
        assert_eq!(controller.classify(&ClickInfo::link(HERE)), ClickVerdict::Ignored);
        assert_eq!(
            controller.classify(&ClickInfo::link("https://example.com/other")),
            ClickVerdict::Animate
        );
    }

    #[test]
    fn test_non_anchor_clicks_are_unrelated() {
        let mut controller = listening(PageWaveConfig::default());
        let mut timers = Timers::new();
        let click = ClickInfo::element("BUTTON").with_class("ignore-click");
        assert!(controller.on_click(click, &mut timers).is_empty());
    }

    #[test]
    fn test_finish_navigates_once() {
        let mut controller = listening(PageWaveConfig::default());
        let mut timers = Timers::new();
        controller.on_click(ClickInfo::link("https://example.com/next"), &mut timers);

        let commands = controller.finish();
        let labels: Vec<_> = commands.iter().map(PageCommand::label).collect();
        assert_eq!(
            labels,
            vec![
                "hook animateESP",
                "detach click",
                "navigate https://example.com/next",
            ]
        );
        assert_eq!(controller.phase(), &DeparturePhase::Departed);

        // 单次：之后的点击和到期都不再响应
        assert!(controller.finish().is_empty());
        assert!(controller.on_click(ClickInfo::link("/b"), &mut timers).is_empty());
    }

    #[test]
    fn test_finish_without_navigation() {
        let mut controller = listening(PageWaveConfig {
            navigate_on_animation_end: false,
            ..PageWaveConfig::default()
        });
        let mut timers = Timers::new();
        controller.on_click(ClickInfo::link("/next"), &mut timers);

        let commands = controller.finish();
        assert!(!commands.iter().any(|c| matches!(c, PageCommand::Navigate { .. })));
        assert!(commands.contains(&PageCommand::DetachClickListener));
    }
}
