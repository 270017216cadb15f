//! # Host Error 模块
//!
//! 定义宿主层的错误类型。

use thiserror::Error;

/// 宿主层错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// 运行环境中没有 `window` / `document`
    #[error("运行环境不可用: {what}")]
    EnvironmentUnavailable {
        /// 缺失的全局对象
        what: String,
    },

    /// 按 id 查找元素失败
    #[error("元素不存在: #{id}")]
    ElementNotFound {
        /// 元素 id
        id: String,
    },

    /// 执行 DOM 操作时 JS 抛出异常
    #[error("DOM 操作失败: {operation} - {message}")]
    Dom {
        /// 操作名
        operation: String,
        /// 异常信息
        message: String,
    },

    /// 每标签页存储不可用
    #[error("会话存储不可用: {message}")]
    StorageUnavailable {
        /// 错误消息
        message: String,
    },

    /// 入口参数无法解析
    #[error("参数无效: {message}")]
    InvalidArgument {
        /// 错误消息
        message: String,
    },
}

impl HostError {
    /// DOM 操作失败的便捷构造
    pub fn dom(operation: &str, message: impl Into<String>) -> Self {
        Self::Dom {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}

impl From<pagewave_runtime::PageWaveError> for HostError {
    fn from(err: pagewave_runtime::PageWaveError) -> Self {
        Self::InvalidArgument {
            message: err.to_string(),
        }
    }
}

/// Result 类型别名
pub type HostResult<T> = Result<T, HostError>;
