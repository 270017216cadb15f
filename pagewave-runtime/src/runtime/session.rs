//! # Session 模块
//!
//! 一个页面上的过渡会话：一份配置、可选的离场/入场控制器和共享的计时器表。
//!
//! 三个入口对应页面的三种用法：
//!
//! - [`PageSession::listen_for_change`]：同时负责入场与离场
//! - [`PageSession::send_point`]：只负责离场
//! - [`PageSession::end_point`]：只负责入场

use tracing::{debug, info};

use crate::command::PageCommand;
use crate::config::PageWaveConfig;
use crate::input::PageInput;
use crate::runtime::arrival::ArrivalController;
use crate::runtime::departure::DepartureController;
use crate::state::{NavigationState, PageEnvironment};
use crate::timer::{Task, Timers};
use crate::variant::TransitionSet;

/// setup 阶段的指令：启用预设时注入预设样式表
pub fn setup_commands(config: &PageWaveConfig) -> Vec<PageCommand> {
    if !config.use_bundled_presets {
        return Vec::new();
    }
    config
        .preset_stylesheets
        .iter()
        .map(|href| PageCommand::InjectStylesheet { href: href.clone() })
        .collect()
}

/// 页面过渡会话
#[derive(Debug)]
pub struct PageSession {
    config: PageWaveConfig,
    env: PageEnvironment,
    departure: Option<DepartureController>,
    arrival: Option<ArrivalController>,
    timers: Timers,
    started: bool,
}

impl PageSession {
    fn new(
        config: PageWaveConfig,
        env: PageEnvironment,
        departure: Option<DepartureController>,
        arrival: Option<ArrivalController>,
    ) -> Self {
        Self {
            config,
            env,
            departure,
            arrival,
            timers: Timers::new(),
            started: false,
        }
    }

    /// 同时负责入场与离场
    ///
    /// `state` 为 Host 从槽位取出（读取并清除）的导航状态。
    pub fn listen_for_change(
        config: PageWaveConfig,
        env: PageEnvironment,
        transitions: TransitionSet,
        state: Option<NavigationState>,
    ) -> Self {
        let arrival = ArrivalController::new(config.clone(), &transitions, state);
        let departure = DepartureController::new(config.clone(), transitions);
        Self::new(config, env, Some(departure), Some(arrival))
    }

    /// 只负责离场
    pub fn send_point(
        config: PageWaveConfig,
        env: PageEnvironment,
        transitions: TransitionSet,
    ) -> Self {
        let departure = DepartureController::new(config.clone(), transitions);
        Self::new(config, env, Some(departure), None)
    }

    /// 只负责入场
    pub fn end_point(
        config: PageWaveConfig,
        env: PageEnvironment,
        transitions: TransitionSet,
        state: Option<NavigationState>,
    ) -> Self {
        let arrival = ArrivalController::new(config.clone(), &transitions, state);
        Self::new(config, env, None, Some(arrival))
    }

    /// 当前配置
    pub fn config(&self) -> &PageWaveConfig {
        &self.config
    }

    /// 离场控制器
    pub fn departure(&self) -> Option<&DepartureController> {
        self.departure.as_ref()
    }

    /// 入场控制器
    pub fn arrival(&self) -> Option<&ArrivalController> {
        self.arrival.as_ref()
    }

    /// 尚未到期的计时器数量
    pub fn pending_timers(&self) -> usize {
        self.timers.pending_count()
    }

    /// 启动会话
    ///
    /// 顺序：样式表注入、缓存 worker 注册、入场隐藏、离场监听。
    /// 重复调用返回空。
    pub fn start(&mut self) -> Vec<PageCommand> {
        if self.started {
            return Vec::new();
        }
        self.started = true;
        info!(
            location = %self.env.location_href,
            departure = self.departure.is_some(),
            arrival = self.arrival.is_some(),
            "页面过渡会话启动"
        );

        let mut commands = setup_commands(&self.config);
        if self.config.use_persistent_cache {
            commands.push(PageCommand::RegisterCacheWorker {
                script: self.config.cache_worker_script.clone(),
            });
        }
        if let Some(arrival) = &mut self.arrival {
            commands.extend(arrival.start(&self.env));
        }
        if let Some(departure) = &mut self.departure {
            commands.extend(departure.start(&self.env));
        }
        commands
    }

    /// 处理一个输入
    pub fn handle(&mut self, input: PageInput) -> Vec<PageCommand> {
        match input {
            PageInput::Click(click) => match &mut self.departure {
                Some(departure) => departure.on_click(click, &mut self.timers),
                None => Vec::new(),
            },
            PageInput::DocumentReady => {
                let mut commands = Vec::new();
                if let Some(arrival) = &mut self.arrival {
                    commands.extend(arrival.on_document_ready(&mut self.timers));
                }
                if let Some(departure) = &mut self.departure {
                    commands.extend(departure.on_document_ready());
                }
                commands
            }
            PageInput::TimerFired(id) => match self.timers.take(id) {
                Some(task) => self.run_task(task),
                None => {
                    debug!(?id, "未知或已处理的计时器");
                    Vec::new()
                }
            },
        }
    }

    fn run_task(&mut self, task: Task) -> Vec<PageCommand> {
        match task {
            Task::DispatchHook { hook, detail } => vec![PageCommand::DispatchHook { hook, detail }],
            Task::RestoreStyle {
                target,
                property,
                value,
            } => vec![PageCommand::set_style(target, property, value)],
            Task::FinishDeparture => self
                .departure
                .as_mut()
                .map(DepartureController::finish)
                .unwrap_or_default(),
            Task::PlayEntry => match &mut self.arrival {
                Some(arrival) => arrival.play_entry(&mut self.timers),
                None => Vec::new(),
            },
            Task::RevealEntry => self
                .arrival
                .as_mut()
                .map(ArrivalController::finish_entry)
                .unwrap_or_default(),
        }
    }
}
