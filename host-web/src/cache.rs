//! # Asset Cache 模块
//!
//! 缓存 worker 的协议与决策，不含任何浏览器 API：
//!
//! - install：打开缓存并预取固定的资源列表
//! - fetch：缓存命中则直接返回，否则走网络
//! - message：收到一个 URL，取回后放入缓存；状态码非 2xx 视为错误
//!
//! 浏览器侧的实现见 `web::worker`。

use pagewave_runtime::PageWaveConfig;
use thiserror::Error;

/// 缓存名
pub const CACHE_NAME: &str = "Page Transition SW";

/// 随 wasm 包一起分发的脚本
const PACKAGE_ASSETS: [&str; 2] = ["./pkg/host_web.js", "./pkg/host_web_bg.wasm"];

/// 缓存 worker 错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// 按需缓存时响应状态不是成功
    #[error("Bad response status: {url} -> {status}")]
    BadResponseStatus {
        /// 请求地址
        url: String,
        /// HTTP 状态码
        status: u16,
    },

    /// message 事件的数据不是 URL 字符串
    #[error("缓存请求无效: {message}")]
    InvalidMessage {
        /// 错误消息
        message: String,
    },

    /// 浏览器 API 抛出异常
    #[error("缓存操作失败: {message}")]
    Js {
        /// 异常信息
        message: String,
    },
}

/// fetch 的响应来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// 缓存命中
    Cache,
    /// 透传到网络
    Network,
}

impl FetchSource {
    /// 根据缓存查询结果选择来源
    pub fn route(cached: bool) -> Self {
        if cached { Self::Cache } else { Self::Network }
    }
}

/// 缓存计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCachePlan {
    /// 缓存名
    pub cache_name: String,
    /// install 时预取的资源
    pub precache: Vec<String>,
}

impl AssetCachePlan {
    /// 由配置得到缓存计划：wasm 包 + 预设样式表
    pub fn for_config(config: &PageWaveConfig) -> Self {
        let mut precache: Vec<String> = PACKAGE_ASSETS.iter().map(|s| s.to_string()).collect();
        precache.extend(
            config
                .preset_stylesheets
                .iter()
                .map(|sheet| format!("./{}", sheet.trim_start_matches("./"))),
        );
        Self {
            cache_name: CACHE_NAME.to_string(),
            precache,
        }
    }

    /// 检查按需缓存的响应
    pub fn check_response(url: &str, status: u16) -> Result<(), CacheError> {
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(CacheError::BadResponseStatus {
                url: url.to_string(),
                status,
            })
        }
    }

    /// 解析 message 事件携带的 URL
    pub fn parse_message(data: Option<String>) -> Result<String, CacheError> {
        match data {
            Some(url) if !url.trim().is_empty() => Ok(url),
            Some(_) => Err(CacheError::InvalidMessage {
                message: "URL 为空".to_string(),
            }),
            None => Err(CacheError::InvalidMessage {
                message: "数据不是字符串".to_string(),
            }),
        }
    }
}

impl Default for AssetCachePlan {
    fn default() -> Self {
        Self::for_config(&PageWaveConfig::default())
    }
}

/// 页面是否已被指定脚本的 worker 控制
///
/// 比较 controller 脚本地址的结尾，与注册时的相对路径无关。
pub fn is_controlled_by(controller_script_url: Option<&str>, worker_script: &str) -> bool {
    let script = worker_script.trim_start_matches("./");
    match controller_script_url {
        Some(url) => !script.is_empty() && url.ends_with(script),
        None => false,
    }
}
