//! `sessionStorage` 上的导航状态存储

use pagewave_runtime::{NAVIGATION_STATE_KEY, NavigationStore};
use tracing::warn;
use web_sys::Storage;

/// 每标签页的导航状态存储
///
/// 存储不可用（隐私模式、沙箱 iframe）时退化为始终为空。
pub struct SessionStore {
    storage: Option<Storage>,
}

impl SessionStore {
    /// 打开当前窗口的 `sessionStorage`
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.session_storage().ok().flatten());
        if storage.is_none() {
            warn!("sessionStorage 不可用，导航状态不会跨页保存");
        }
        Self { storage }
    }
}

impl NavigationStore for SessionStore {
    fn read(&self) -> Option<String> {
        self.storage
            .as_ref()?
            .get_item(NAVIGATION_STATE_KEY)
            .ok()
            .flatten()
    }

    fn write(&mut self, value: &str) {
        if let Some(storage) = &self.storage
            && storage.set_item(NAVIGATION_STATE_KEY, value).is_err()
        {
            warn!(value, "写入导航状态失败");
        }
    }

    fn clear(&mut self) {
        if let Some(storage) = &self.storage
            && storage.remove_item(NAVIGATION_STATE_KEY).is_err()
        {
            warn!("清除导航状态失败");
        }
    }
}
