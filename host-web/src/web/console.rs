//! 浏览器控制台日志
//!
//! 每个 tracing 事件格式化完成后作为一行写入 `console.log`。
//! 浏览器自带时间戳，这里不再输出时间。

use std::io;

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// 单个事件的缓冲，释放时写入控制台
pub struct ConsoleWriter {
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buf);
        web_sys::console::log_1(&line.trim_end().into());
    }
}

/// 控制台 writer 工厂
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter { buf: Vec::new() }
    }
}

/// 初始化控制台日志；已经初始化过时返回 false
pub fn init_console_logging(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .without_time()
        .with_writer(MakeConsoleWriter)
        .try_init()
        .is_ok()
}
