//! # Host 层
//!
//! PageWave 的宿主层实现。
//!
//! ## 架构说明
//!
//! Host 层负责：
//! - 采集页面环境（地址、来源、导航类型、worker 控制状态）
//! - 执行 Runtime 发出的 PageCommand
//! - 安装计时器与事件监听，把到期/触发回传给会话
//! - 读写跨页的导航状态
//!
//! Host 层不包含过渡逻辑，只负责执行 Runtime 发出的指令。
//!
//! ## 后端
//!
//! - [`MemoryPage`]：内存中的页面，供无界面宿主和测试使用
//! - `web::WebPage`：浏览器页面（`web` feature）

pub mod backend;
pub mod cache;
pub mod driver;
pub mod error;
pub mod executor;
pub mod logging;
pub mod memory;

#[cfg(feature = "web")]
pub mod web;

pub use backend::{
    LiveField, PageBackend, blocker_css_text, css_property_name, ends_own_animation, live_fields,
};
pub use cache::{AssetCachePlan, CACHE_NAME, CacheError, FetchSource, is_controlled_by};
pub use driver::{EntryPoint, PageDriver, build_session};
pub use error::{HostError, HostResult};
pub use executor::{CommandExecutor, CommandOutput, ExecuteResult};
pub use logging::{init_logging, parse_level};
pub use memory::{MemoryElement, MemoryPage, MemoryPanel};
