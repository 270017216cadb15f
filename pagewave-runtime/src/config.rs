//! # Config 模块
//!
//! 页面过渡配置，集中管理所有配置项。
//!
//! ## 配置合并
//!
//! 1. 用户传入的覆盖项（最高）
//! 2. 默认值（最低）
//!
//! 合并只在 setup 时发生一次，之后配置不可变，
//! 以值的形式交给各个控制器，不存在全局可变配置。

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 页面过渡配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWaveConfig {
    /// 主内容元素 id
    #[serde(default = "default_main_content_id")]
    pub main_content_id: String,

    /// 选择 overlay 候选变体的链接 class
    #[serde(default = "default_overlay_class")]
    pub overlay_class: String,

    /// 选择 animation 候选变体的链接 class
    #[serde(default = "default_animation_class")]
    pub animation_class: String,

    /// document-ready 之后到播放入场动画之间的延迟（毫秒）
    ///
    /// 默认 200ms，用来掩盖过早或不可信的 ready 事件。
    #[serde(default = "default_entry_animation_delay_ms")]
    pub entry_animation_delay_ms: u32,

    /// 是否依赖持久缓存 worker 决定动画时机
    #[serde(default = "default_true")]
    pub use_persistent_cache: bool,

    /// 页面刷新时是否重放入场动画
    #[serde(default)]
    pub replay_on_reload: bool,

    /// 跨站进入时是否重放入场动画
    #[serde(default)]
    pub replay_on_cross_site_entry: bool,

    /// 开始反向动画到显示内容之间的延迟（毫秒）
    #[serde(default)]
    pub reveal_delay_ms: u32,

    /// 离场动画结束后是否调用导航函数
    #[serde(default = "default_true")]
    pub navigate_on_animation_end: bool,

    /// 全屏遮挡面板 id
    #[serde(default = "default_page_blocker_id")]
    pub page_blocker_id: String,

    /// 忽略链接的 class
    #[serde(default = "default_link_ignore_class")]
    pub link_ignore_class: String,

    /// 经由忽略链接进入时仍播放入场动画
    #[serde(default)]
    pub animate_ignored_links: bool,

    /// 指向当前页面的链接也播放动画
    #[serde(default = "default_true")]
    pub animate_self_links: bool,

    /// 视为 document-ready 的事件名
    #[serde(default = "default_dom_ready_event")]
    pub dom_ready_event: String,

    /// setup 时是否注入预设样式表
    #[serde(default = "default_true")]
    pub use_bundled_presets: bool,

    /// overlay 面板在动画结束后是否自行移除
    #[serde(default)]
    pub clean_up_panels: bool,

    /// 反向 style transition 重置属性前的等待（毫秒）
    ///
    /// 给浏览器一次样式重算的时间，数值依赖具体浏览器。
    #[serde(default = "default_style_reset_grace_ms")]
    pub style_reset_grace_ms: u32,

    /// 启用预设时注入的样式表
    #[serde(default = "default_preset_stylesheets")]
    pub preset_stylesheets: Vec<String>,

    /// 缓存 worker 脚本路径
    #[serde(default = "default_cache_worker_script")]
    pub cache_worker_script: String,
}

// 默认值函数
fn default_main_content_id() -> String {
    "main-content".to_string()
}

fn default_overlay_class() -> String {
    "a-overlay".to_string()
}

fn default_animation_class() -> String {
    "a-animation".to_string()
}

fn default_entry_animation_delay_ms() -> u32 {
    200
}

fn default_true() -> bool {
    true
}

fn default_page_blocker_id() -> String {
    "pageBlocker".to_string()
}

fn default_link_ignore_class() -> String {
    "ignore-click".to_string()
}

fn default_dom_ready_event() -> String {
    "DOMContentLoaded".to_string()
}

fn default_style_reset_grace_ms() -> u32 {
    40
}

fn default_preset_stylesheets() -> Vec<String> {
    vec![
        "OverlayPreset.css".to_string(),
        "KeyFramePreset.css".to_string(),
    ]
}

fn default_cache_worker_script() -> String {
    "sw.js".to_string()
}

impl Default for PageWaveConfig {
    fn default() -> Self {
        Self {
            main_content_id: default_main_content_id(),
            overlay_class: default_overlay_class(),
            animation_class: default_animation_class(),
            entry_animation_delay_ms: default_entry_animation_delay_ms(),
            use_persistent_cache: true,
            replay_on_reload: false,
            replay_on_cross_site_entry: false,
            reveal_delay_ms: 0,
            navigate_on_animation_end: true,
            page_blocker_id: default_page_blocker_id(),
            link_ignore_class: default_link_ignore_class(),
            animate_ignored_links: false,
            animate_self_links: true,
            dom_ready_event: default_dom_ready_event(),
            use_bundled_presets: true,
            clean_up_panels: false,
            style_reset_grace_ms: default_style_reset_grace_ms(),
            preset_stylesheets: default_preset_stylesheets(),
            cache_worker_script: default_cache_worker_script(),
        }
    }
}

impl PageWaveConfig {
    /// 从用户覆盖项合并出最终配置
    ///
    /// 未给出的键取默认值，未知键被忽略。
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::InvalidJson {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    ///
    /// 只检查运行时依赖的取值，不做完整的结构校验。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("mainContentId", &self.main_content_id),
            ("overlayClass", &self.overlay_class),
            ("animationClass", &self.animation_class),
            ("pageBlockerId", &self.page_blocker_id),
            ("linkIgnoreClass", &self.link_ignore_class),
            ("domReadyEvent", &self.dom_ready_event),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "不能为空".to_string(),
                });
            }
        }

        if self.use_persistent_cache && self.cache_worker_script.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cacheWorkerScript".to_string(),
                message: "启用持久缓存时必须配置 worker 脚本".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PageWaveConfig::default();
        assert_eq!(config.main_content_id, "main-content");
        assert_eq!(config.entry_animation_delay_ms, 200);
        assert_eq!(config.style_reset_grace_ms, 40);
        assert!(config.use_persistent_cache);
        assert!(config.animate_self_links);
        assert!(!config.replay_on_reload);
    }

    #[test]
    fn test_overrides_merge_onto_defaults() {
        let config =
            PageWaveConfig::from_json(r#"{"mainContentId": "app", "replayOnReload": true}"#)
                .unwrap();
        assert_eq!(config.main_content_id, "app");
        assert!(config.replay_on_reload);
        // 其余字段保持默认
        assert_eq!(config.overlay_class, "a-overlay");
        assert_eq!(config.page_blocker_id, "pageBlocker");
    }

    #[test]
    fn test_empty_object_equals_default() {
        let config = PageWaveConfig::from_json("{}").unwrap();
        assert_eq!(config, PageWaveConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = PageWaveConfig::from_json(r#"{"somethingElse": 1}"#).unwrap();
        assert_eq!(config, PageWaveConfig::default());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let err = PageWaveConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson { .. }));
    }

    #[test]
    fn test_config_validation() {
        let mut config = PageWaveConfig::default();
        assert!(config.validate().is_ok());

        config.main_content_id = "  ".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "mainContentId".to_string(),
                message: "不能为空".to_string(),
            })
        );

        // 关闭持久缓存后 worker 脚本可以为空
        let mut config = PageWaveConfig::default();
        config.cache_worker_script.clear();
        assert!(config.validate().is_err());
        config.use_persistent_cache = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = PageWaveConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let loaded: PageWaveConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, config);
    }
}
