//! 浏览器侧的杂项工具。

use std::io;

use wasm_bindgen::JsValue;

/// 让 panic 信息输出到浏览器控制台。
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Buffers one formatted event and writes it to the console when dropped.
#[derive(Default)]
pub struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buffer);
        let line = line.trim_end();
        if !line.is_empty() {
            log(line);
        }
    }
}

/// Routes `tracing` events to the browser console. The wasm clock is
/// unavailable, so events carry no timestamp.
pub fn init_tracing() {
    let level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleWriter::default)
        .with_max_level(level)
        .with_ansi(false)
        .without_time()
        .try_init();
    if installed.is_err() {
        log("tracing subscriber already installed");
    }
}
