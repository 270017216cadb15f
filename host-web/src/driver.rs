//! # Driver 模块
//!
//! 页面驱动：把会话、执行器、后端和虚拟时钟连在一起。
//!
//! ## 事件循环
//!
//! ```text
//! start() ─► 执行启动指令
//! document_ready() / click() / advance(ms)
//!     └─► PageInput ─► session.handle() ─► executor ─► backend
//! ```
//!
//! 计时器按到期时间排序，同一时刻按登记顺序触发。

use std::collections::BTreeMap;

use pagewave_runtime::{
    ClickInfo, NavigationStore, PageCommand, PageEnvironment, PageInput, PageSession,
    PageWaveConfig, TimerId, TransitionSet,
};
use tracing::debug;

use crate::backend::PageBackend;
use crate::executor::{CommandExecutor, CommandOutput};

/// 会话入口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// 入场与离场
    ListenForChange,
    /// 只有离场
    SendPoint,
    /// 只有入场
    EndPoint,
}

impl EntryPoint {
    /// 是否包含入场控制器
    pub fn has_arrival(self) -> bool {
        matches!(self, Self::ListenForChange | Self::EndPoint)
    }
}

/// 按入场方式创建会话
///
/// 包含入场控制器时从存储中取出（读取并清除）导航状态。
pub fn build_session(
    entry: EntryPoint,
    config: PageWaveConfig,
    env: PageEnvironment,
    transitions: TransitionSet,
    store: &mut dyn NavigationStore,
) -> PageSession {
    let state = if entry.has_arrival() {
        store.consume()
    } else {
        None
    };
    debug!(?entry, ?state, "创建会话");

    match entry {
        EntryPoint::ListenForChange => {
            PageSession::listen_for_change(config, env, transitions, state)
        }
        EntryPoint::SendPoint => PageSession::send_point(config, env, transitions),
        EntryPoint::EndPoint => PageSession::end_point(config, env, transitions, state),
    }
}

/// 页面驱动
pub struct PageDriver<B: PageBackend, S: NavigationStore> {
    session: PageSession,
    executor: CommandExecutor,
    backend: B,
    store: S,
    now_ms: u64,
    /// (到期时间, 登记序号) -> 计时器
    timers: BTreeMap<(u64, u64), TimerId>,
    timer_seq: u64,
    ready_listeners: Vec<String>,
    click_attached: bool,
}

impl<B: PageBackend, S: NavigationStore> PageDriver<B, S> {
    /// 创建驱动
    pub fn new(session: PageSession, backend: B, store: S) -> Self {
        Self {
            session,
            executor: CommandExecutor::new(),
            backend,
            store,
            now_ms: 0,
            timers: BTreeMap::new(),
            timer_seq: 0,
            ready_listeners: Vec::new(),
            click_attached: false,
        }
    }

    /// 按入场方式创建会话并驱动
    pub fn open(
        entry: EntryPoint,
        config: PageWaveConfig,
        env: PageEnvironment,
        transitions: TransitionSet,
        backend: B,
        mut store: S,
    ) -> Self {
        let session = build_session(entry, config, env, transitions, &mut store);
        Self::new(session, backend, store)
    }

    /// 启动会话
    pub fn start(&mut self) -> CommandOutput {
        let commands = self.session.start();
        self.run(&commands)
    }

    /// 触发 document-ready
    ///
    /// 没有监听者时返回 `None`。
    pub fn document_ready(&mut self) -> Option<CommandOutput> {
        if self.ready_listeners.is_empty() {
            return None;
        }
        // 一次性监听：触发后全部移除
        self.ready_listeners.clear();
        Some(self.feed(PageInput::DocumentReady))
    }

    /// 页面点击
    ///
    /// 点击监听未挂载时返回 `None`。
    pub fn click(&mut self, click: ClickInfo) -> Option<CommandOutput> {
        if !self.click_attached {
            return None;
        }
        Some(self.feed(PageInput::Click(click)))
    }

    /// 推进虚拟时钟，按到期顺序触发计时器
    pub fn advance(&mut self, ms: u64) {
        let target = self.now_ms + ms;
        while let Some((&(deadline, seq), _)) = self.timers.first_key_value() {
            if deadline > target {
                break;
            }
            let Some(id) = self.timers.remove(&(deadline, seq)) else {
                break;
            };
            self.now_ms = deadline;
            self.feed(PageInput::TimerFired(id));
        }
        self.now_ms = target;
    }

    /// 推进到没有待触发的计时器
    pub fn run_until_idle(&mut self) {
        while let Some((&(deadline, _), _)) = self.timers.first_key_value() {
            let remaining = deadline.saturating_sub(self.now_ms);
            self.advance(remaining);
        }
    }

    fn feed(&mut self, input: PageInput) -> CommandOutput {
        let commands = self.session.handle(input);
        self.run(&commands)
    }

    fn run(&mut self, commands: &[PageCommand]) -> CommandOutput {
        let output = self
            .executor
            .execute_batch(commands, &mut self.backend, &mut self.store);

        for &(id, delay_ms) in &output.timers {
            self.timers
                .insert((self.now_ms + u64::from(delay_ms), self.timer_seq), id);
            self.timer_seq += 1;
        }
        self.ready_listeners
            .extend(output.listen_once.iter().map(|(event, _)| event.clone()));
        if let Some(attached) = output.click_listener {
            self.click_attached = attached;
        }
        output
    }

    /// 当前虚拟时间（毫秒）
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// 待触发的计时器数量
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// 是否在等待 document-ready
    pub fn awaiting_ready(&self) -> bool {
        !self.ready_listeners.is_empty()
    }

    /// 点击监听是否已挂载
    pub fn click_attached(&self) -> bool {
        self.click_attached
    }

    /// 会话
    pub fn session(&self) -> &PageSession {
        &self.session
    }

    /// 后端
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 可变后端（模拟元素加入、动画结束等）
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// 导航状态存储
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 拆出后端和存储（模拟导航到下一页）
    pub fn into_parts(self) -> (B, S) {
        (self.backend, self.store)
    }
}
