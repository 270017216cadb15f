//! # State 模块
//!
//! 跨导航边界的状态与页面环境。
//!
//! ## 设计原则
//!
//! - 两个控制器运行在完全独立的页面生命周期中，
//!   唯一的通信手段是每个标签页存储中的一个字符串槽位
//! - 槽位是单写单读的邮箱：离场页写入，入场页 [`NavigationStore::consume`] 读取并清除
//! - 页面环境（导航类型、referrer、缓存状态）由 Host 在启动时一次性采集

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

use crate::variant::TransitionCategory;

/// 存储槽位的键名
pub const NAVIGATION_STATE_KEY: &str = "animationType";

/// 持久化的导航状态
///
/// 存储值依次为 `"true"`、`"false"`、`"ignore"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationState {
    /// 离场使用了 overlay 类变体
    Overlay,
    /// 离场使用了 content 类变体
    Content,
    /// 离场链接被忽略，入场不播放动画
    Ignore,
}

impl NavigationState {
    /// 由过渡类别得到导航状态
    pub fn from_category(category: TransitionCategory) -> Self {
        match category {
            TransitionCategory::Overlay => Self::Overlay,
            TransitionCategory::Content => Self::Content,
        }
    }

    /// 存储值
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overlay => "true",
            Self::Content => "false",
            Self::Ignore => "ignore",
        }
    }

    /// 从存储值解析，未知值返回 `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "true" => Some(Self::Overlay),
            "false" => Some(Self::Content),
            "ignore" => Some(Self::Ignore),
            _ => None,
        }
    }
}

/// 导航状态存储
///
/// Host 以每个标签页的持久存储实现（浏览器中为 `sessionStorage`）。
pub trait NavigationStore {
    /// 读取原始值
    fn read(&self) -> Option<String>;

    /// 写入原始值
    fn write(&mut self, value: &str);

    /// 清除槽位
    fn clear(&mut self);

    /// 写入导航状态
    fn persist(&mut self, state: NavigationState) {
        self.write(state.as_str());
    }

    /// 读取并清除导航状态
    ///
    /// 读取后槽位即失效，后退导航不会读到过期的类别。
    fn consume(&mut self) -> Option<NavigationState> {
        let value = self.read();
        self.clear();
        value.as_deref().and_then(NavigationState::parse)
    }
}

/// 内存中的导航状态存储
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryNavigationStore {
    slot: Option<String>,
}

impl MemoryNavigationStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建已写入值的存储
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            slot: Some(value.into()),
        }
    }
}

impl NavigationStore for MemoryNavigationStore {
    fn read(&self) -> Option<String> {
        self.slot.clone()
    }

    fn write(&mut self, value: &str) {
        self.slot = Some(value.to_string());
    }

    fn clear(&mut self) {
        self.slot = None;
    }
}

/// 本次页面加载的导航类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationKind {
    /// 普通导航
    #[default]
    Navigate,
    /// 刷新
    Reload,
    /// 前进/后退
    BackForward,
    /// 预渲染
    Prerender,
}

impl FromStr for NavigationKind {
    type Err = ();

    /// 解析 `PerformanceNavigationTiming.type` 的取值
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "navigate" => Ok(Self::Navigate),
            "reload" => Ok(Self::Reload),
            "back_forward" => Ok(Self::BackForward),
            "prerender" => Ok(Self::Prerender),
            _ => Err(()),
        }
    }
}

/// 页面环境
///
/// Host 在启动时采集，控制器据此决定监听时机和是否重放入场动画。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageEnvironment {
    /// 当前页面地址
    pub location_href: String,
    /// `document.referrer`，空字符串视为没有
    pub referrer: Option<String>,
    /// 导航类型
    pub navigation: NavigationKind,
    /// 页面是否已被缓存 worker 控制
    pub cache_controlled: bool,
}

impl PageEnvironment {
    /// 创建页面环境
    pub fn new(location_href: impl Into<String>) -> Self {
        Self {
            location_href: location_href.into(),
            ..Self::default()
        }
    }

    /// 设置 referrer
    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        let referrer = referrer.into();
        self.referrer = (!referrer.is_empty()).then_some(referrer);
        self
    }

    /// 设置导航类型
    pub fn with_navigation(mut self, navigation: NavigationKind) -> Self {
        self.navigation = navigation;
        self
    }

    /// 设置缓存 worker 控制状态
    pub fn with_cache_controlled(mut self, controlled: bool) -> Self {
        self.cache_controlled = controlled;
        self
    }

    /// 是否为刷新
    pub fn is_reload(&self) -> bool {
        self.navigation == NavigationKind::Reload
    }

    /// 是否从同一站点导航而来
    ///
    /// 比较 referrer 与当前页面的主机名；没有 referrer 或无法解析时返回 false。
    pub fn is_same_site(&self) -> bool {
        let Some(referrer) = self.referrer.as_deref() else {
            return false;
        };

        match (Url::parse(referrer), Url::parse(&self.location_href)) {
            (Ok(from), Ok(current)) => from.host_str().is_some() && from.host_str() == current.host_str(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_state_storage_values() {
        assert_eq!(NavigationState::Overlay.as_str(), "true");
        assert_eq!(NavigationState::Content.as_str(), "false");
        assert_eq!(NavigationState::Ignore.as_str(), "ignore");

        assert_eq!(NavigationState::parse("true"), Some(NavigationState::Overlay));
        assert_eq!(NavigationState::parse("ignore"), Some(NavigationState::Ignore));
        assert_eq!(NavigationState::parse("TRUE"), None);
    }

    #[test]
    fn test_from_category() {
        assert_eq!(
            NavigationState::from_category(TransitionCategory::Overlay),
            NavigationState::Overlay
        );
        assert_eq!(
            NavigationState::from_category(TransitionCategory::Content),
            NavigationState::Content
        );
    }

    #[test]
    fn test_consume_reads_then_clears() {
        let mut store = MemoryNavigationStore::new();
        store.persist(NavigationState::Overlay);
        assert_eq!(store.read().as_deref(), Some("true"));

        assert_eq!(store.consume(), Some(NavigationState::Overlay));
        assert_eq!(store.read(), None);
        assert_eq!(store.consume(), None);
    }

    #[test]
    fn test_consume_clears_unknown_values() {
        let mut store = MemoryNavigationStore::with_value("garbage");
        assert_eq!(store.consume(), None);
        assert_eq!(store.read(), None);
    }

    #[test]
    fn test_navigation_kind_from_str() {
        assert_eq!("reload".parse::<NavigationKind>(), Ok(NavigationKind::Reload));
        assert_eq!("back_forward".parse::<NavigationKind>(), Ok(NavigationKind::BackForward));
        assert_eq!("teleport".parse::<NavigationKind>(), Err(()));
    }

    #[test]
    fn test_same_site() {
        let env = PageEnvironment::new("https://example.com/about")
            .with_referrer("https://example.com/");
        assert!(env.is_same_site());

        let env = PageEnvironment::new("https://example.com/about")
            .with_referrer("https://other.org/page");
        assert!(!env.is_same_site());

        // 空 referrer 视为跨站
        let env = PageEnvironment::new("https://example.com/about").with_referrer("");
        assert_eq!(env.referrer, None);
        assert!(!env.is_same_site());

        // 端口不同但主机相同，仍视为同站
        let env = PageEnvironment::new("http://localhost:8080/b")
            .with_referrer("http://localhost:3000/a");
        assert!(env.is_same_site());
    }

    #[test]
    fn test_environment_serialization() {
        let env = PageEnvironment::new("https://example.com/")
            .with_navigation(NavigationKind::Reload)
            .with_cache_controlled(true);
        let json = serde_json::to_string(&env).unwrap();
        let loaded: PageEnvironment = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, env);
        assert!(loaded.is_reload());
    }
}
