//! # Runtime 模块
//!
//! 过渡执行核心，负责变体播放和两个控制器的状态机。
//!
//! ## 模块结构
//!
//! - [`engine`]：变体到 PageCommand 的转换
//! - [`departure`]：离场控制器（SendPoint）
//! - [`arrival`]：入场控制器（EndPoint）
//! - [`session`]：组合控制器与计时器的页面会话

pub mod arrival;
pub mod departure;
pub mod engine;
pub mod session;

pub use arrival::{ArrivalController, ArrivalPhase, EntryVerdict};
pub use departure::{ClickVerdict, DepartureController, DeparturePhase};
pub use engine::TransitionEngine;
pub use session::{PageSession, setup_commands};
