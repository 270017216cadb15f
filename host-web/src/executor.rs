//! # Command Executor 模块
//!
//! Command 执行器，负责将 Runtime 发出的 PageCommand 转换为实际操作。
//!
//! ## 设计说明
//!
//! - DOM 操作交给 [`PageBackend`]，导航状态写入 [`NavigationStore`]
//! - 计时器与监听器不在这里安装，以 [`ExecuteResult`] 报告给驱动层
//! - 单条指令失败只记录警告并继续，页面最终总会被显示

use pagewave_runtime::{NavigationStore, PageCommand, TimerId};
use tracing::{debug, warn};

use crate::backend::{PageBackend, blocker_css_text};
use crate::error::HostResult;

/// 单条指令的执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteResult {
    /// 已完成
    Ok,
    /// 需要启动计时器
    StartTimer { id: TimerId, delay_ms: u32 },
    /// 需要监听一次事件
    ListenOnce {
        event: String,
        stop_propagation: bool,
    },
    /// 需要挂载点击监听
    AttachClickListener,
    /// 需要移除点击监听
    DetachClickListener,
    /// 执行失败
    Error(String),
}

/// 一批指令的汇总输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// 待启动的计时器
    pub timers: Vec<(TimerId, u32)>,
    /// 待监听的一次性事件（事件名，是否阻止传播）
    pub listen_once: Vec<(String, bool)>,
    /// 点击监听的最终变化：`Some(true)` 挂载，`Some(false)` 移除
    pub click_listener: Option<bool>,
    /// 失败的指令数量
    pub errors: usize,
}

/// Command 执行器
#[derive(Debug, Default)]
pub struct CommandExecutor {
    /// 累计执行的指令数量
    executed: usize,
}

impl CommandExecutor {
    /// 创建新的 Command 执行器
    pub fn new() -> Self {
        Self::default()
    }

    /// 累计执行的指令数量
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// 执行单个 PageCommand
    pub fn execute(
        &mut self,
        command: &PageCommand,
        backend: &mut dyn PageBackend,
        store: &mut dyn NavigationStore,
    ) -> ExecuteResult {
        self.executed += 1;
        debug!(command = %command.label(), "执行指令");

        match self.apply(command, backend, store) {
            Ok(result) => result,
            Err(e) => {
                warn!(command = %command.label(), error = %e, "指令执行失败");
                ExecuteResult::Error(e.to_string())
            }
        }
    }

    fn apply(
        &mut self,
        command: &PageCommand,
        backend: &mut dyn PageBackend,
        store: &mut dyn NavigationStore,
    ) -> HostResult<ExecuteResult> {
        match command {
            PageCommand::InjectStylesheet { href } => backend.inject_stylesheet(href)?,
            PageCommand::RegisterCacheWorker { script } => backend.register_cache_worker(script)?,
            PageCommand::SetStyle {
                target,
                property,
                value,
            } => backend.set_style(target, property, value)?,
            PageCommand::SetHidden { target, hidden } => backend.set_hidden(target, *hidden)?,
            PageCommand::SetRootProperty { name, value } => backend.set_root_property(name, value)?,
            PageCommand::AppendPanel {
                parent,
                class_name,
                animation,
                remove_on_end,
            } => backend.append_panel(parent, class_name, animation, remove_on_end.as_deref())?,
            PageCommand::FreezeOnAnimationEnd {
                target,
                animation_name,
            } => backend.freeze_on_animation_end(target, animation_name)?,
            PageCommand::InsertBlocker { id, color } => {
                backend.insert_blocker(id, &blocker_css_text(color))?
            }
            PageCommand::WhenPresent { id, action } => backend.when_present(id, *action)?,
            PageCommand::DispatchHook { hook, detail } => backend.dispatch_hook(*hook, detail)?,
            PageCommand::PersistNavigationState(state) => store.persist(*state),
            PageCommand::PreventDefault => backend.prevent_default()?,
            PageCommand::Navigate { href } => backend.navigate(href)?,
            PageCommand::StartTimer { id, delay_ms } => {
                return Ok(ExecuteResult::StartTimer {
                    id: *id,
                    delay_ms: *delay_ms,
                });
            }
            PageCommand::ListenOnce {
                event,
                stop_propagation,
            } => {
                return Ok(ExecuteResult::ListenOnce {
                    event: event.clone(),
                    stop_propagation: *stop_propagation,
                });
            }
            PageCommand::AttachClickListener => return Ok(ExecuteResult::AttachClickListener),
            PageCommand::DetachClickListener => return Ok(ExecuteResult::DetachClickListener),
        }
        Ok(ExecuteResult::Ok)
    }

    /// 批量执行 PageCommands
    ///
    /// 按顺序执行全部指令，失败的指令不会中断后续指令。
    pub fn execute_batch(
        &mut self,
        commands: &[PageCommand],
        backend: &mut dyn PageBackend,
        store: &mut dyn NavigationStore,
    ) -> CommandOutput {
        let mut output = CommandOutput::default();

        for command in commands {
            match self.execute(command, backend, store) {
                ExecuteResult::Ok => {}
                ExecuteResult::StartTimer { id, delay_ms } => output.timers.push((id, delay_ms)),
                ExecuteResult::ListenOnce {
                    event,
                    stop_propagation,
                } => output.listen_once.push((event, stop_propagation)),
                ExecuteResult::AttachClickListener => output.click_listener = Some(true),
                ExecuteResult::DetachClickListener => output.click_listener = Some(false),
                ExecuteResult::Error(_) => output.errors += 1,
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPage;
    use pagewave_runtime::{
        ElementAction, ElementRef, MemoryNavigationStore, NavigationState,
    };

    #[test]
    fn test_executor_creation() {
        let executor = CommandExecutor::new();
        assert_eq!(executor.executed(), 0);
    }

    #[test]
    fn test_execute_persist() {
        let mut executor = CommandExecutor::new();
        let mut page = MemoryPage::new();
        let mut store = MemoryNavigationStore::new();

        let result = executor.execute(
            &PageCommand::PersistNavigationState(NavigationState::Overlay),
            &mut page,
            &mut store,
        );
        assert_eq!(result, ExecuteResult::Ok);
        assert_eq!(store.read().as_deref(), Some("true"));
    }

    #[test]
    fn test_execute_reports_timers_and_listeners() {
        let mut executor = CommandExecutor::new();
        let mut page = MemoryPage::new();
        let mut store = MemoryNavigationStore::new();

        let output = executor.execute_batch(
            &[
                PageCommand::StartTimer {
                    id: TimerId(3),
                    delay_ms: 200,
                },
                PageCommand::ListenOnce {
                    event: "DOMContentLoaded".to_string(),
                    stop_propagation: true,
                },
                PageCommand::AttachClickListener,
            ],
            &mut page,
            &mut store,
        );
        assert_eq!(output.timers, vec![(TimerId(3), 200)]);
        assert_eq!(
            output.listen_once,
            vec![("DOMContentLoaded".to_string(), true)]
        );
        assert_eq!(output.click_listener, Some(true));
        assert_eq!(executor.executed(), 3);
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let mut executor = CommandExecutor::new();
        let mut page = MemoryPage::new();
        let mut store = MemoryNavigationStore::new();

        // 主内容元素不存在时 SetStyle 失败，后续指令照常执行
        let output = executor.execute_batch(
            &[
                PageCommand::set_style(ElementRef::id("missing"), "opacity", "0"),
                PageCommand::InsertBlocker {
                    id: "pageBlocker".to_string(),
                    color: "#000".to_string(),
                },
                PageCommand::WhenPresent {
                    id: "pageBlocker".to_string(),
                    action: ElementAction::Remove,
                },
            ],
            &mut page,
            &mut store,
        );
        assert_eq!(output.errors, 1);
        assert!(!page.has_element("pageBlocker"));
    }

    #[test]
    fn test_blocker_gets_css_text() {
        let mut executor = CommandExecutor::new();
        let mut page = MemoryPage::new();
        let mut store = MemoryNavigationStore::new();

        executor.execute(
            &PageCommand::InsertBlocker {
                id: "pageBlocker".to_string(),
                color: "#123".to_string(),
            },
            &mut page,
            &mut store,
        );
        assert_eq!(page.style("pageBlocker", "background-color"), Some("#123"));
        assert_eq!(page.style("pageBlocker", "z-index"), Some("100"));
    }
}
