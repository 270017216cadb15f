//! # Timer 模块
//!
//! 计时器表：Runtime 不感知真实时间，所有延迟都以
//! [`PageCommand::StartTimer`] 交给 Host，到期后以
//! [`PageInput::TimerFired`](crate::input::PageInput::TimerFired) 回传。
//! 表中记录每个计时器到期时要执行的任务。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::command::{ElementRef, PageCommand};
use crate::hook::{HookDetail, LifecycleHook};

/// 计时器标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// 计时器到期后执行的任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// 派发生命周期通知（引擎的 end 通知）
    DispatchHook {
        hook: LifecycleHook,
        detail: Box<HookDetail>,
    },
    /// 反向 style 过渡在宽限期后把属性写回起始值
    RestoreStyle {
        target: ElementRef,
        property: String,
        value: String,
    },
    /// 离场动画结束
    FinishDeparture,
    /// 入场延迟结束，开始反向动画
    PlayEntry,
    /// 显示延迟结束，显示页面
    RevealEntry,
}

/// 计时器表
#[derive(Debug, Default)]
pub struct Timers {
    next_id: u64,
    pending: HashMap<TimerId, Task>,
}

impl Timers {
    /// 创建空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记任务，返回交给 Host 的启动指令
    pub fn schedule(&mut self, task: Task, delay_ms: u32) -> PageCommand {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, task);
        PageCommand::StartTimer { id, delay_ms }
    }

    /// 取出到期任务；未知或已取出的计时器返回 `None`
    pub fn take(&mut self, id: TimerId) -> Option<Task> {
        self.pending.remove(&id)
    }

    /// 尚未到期的计时器数量
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
