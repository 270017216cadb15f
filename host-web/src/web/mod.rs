//! 浏览器宿主（`web` feature）
//!
//! - `page`：`web-sys` 页面后端
//! - `bind`：`wasm-bindgen` 导出的页面入口
//! - `worker`：缓存 worker 入口
//! - `storage`：`sessionStorage` 导航状态
//! - `console`：控制台日志

mod bind;
mod console;
mod page;
mod storage;
mod worker;

pub use bind::{cache_asset, end_point, is_overlay, listen_for_change, send_point, setup};
pub use console::{MakeConsoleWriter, init_console_logging};
pub use page::{WebPage, click_info};
pub use storage::SessionStore;
pub use worker::install_asset_cache;
