//! # Error 模块
//!
//! 定义 pagewave-runtime 中使用的错误类型。

use thiserror::Error;

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 配置 JSON 无法解析
    #[error("配置解析失败: {message}")]
    InvalidJson { message: String },

    /// 配置项取值无效
    #[error("配置项 '{field}' 无效 - {message}")]
    InvalidValue { field: String, message: String },
}

/// 动画变体错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VariantError {
    /// 变体 JSON 无法解析
    #[error("动画变体解析失败: {message}")]
    InvalidJson { message: String },
}

/// pagewave-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageWaveError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 动画变体错误
    #[error("动画变体错误: {0}")]
    Variant(#[from] VariantError),
}

/// Result 类型别名
pub type PageWaveResult<T> = Result<T, PageWaveError>;
