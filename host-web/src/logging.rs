//! # Logging 模块
//!
//! tracing 订阅器初始化。浏览器中的控制台输出见 `web::console`。

use tracing::Level;

/// 解析日志级别，无法识别时取 `INFO`
pub fn parse_level(level: Option<&str>) -> Level {
    level
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(Level::INFO)
}

/// 初始化输出到 stderr 的日志
///
/// 已经初始化过时返回 false。
pub fn init_logging(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
