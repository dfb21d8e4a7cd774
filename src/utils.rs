use log::Level;

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
pub fn set_panic_hook() {}

/// 把 `log` 记录转发到浏览器控制台，重复调用时只保留第一次的设置。
pub fn init_logging() {
    let level = if cfg!(debug_assertions) {
        Level::Debug
    } else {
        Level::Info
    };
    if console_log::init_with_level(level).is_err() {
        web_sys::console::warn_1(&"nim_core: logger already initialised".into());
    }
}
