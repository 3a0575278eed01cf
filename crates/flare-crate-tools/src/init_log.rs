use std::io::Write;

/// 初始化全局 logger，整个进程只能调用一次
///
/// 默认级别是 Info，可以通过 RUST_LOG 环境变量覆盖
pub fn init_log() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let level_style = match record.level() {
                log::Level::Info => buf
                    .default_level_style(log::Level::Info)
                    .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
                log::Level::Warn => buf
                    .default_level_style(log::Level::Warn)
                    .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
                log::Level::Error => buf
                    .default_level_style(log::Level::Error)
                    .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
                _ => buf.default_level_style(record.level()),
            };

            let time = chrono::Local::now().format("%H:%M:%S%.3f");
            let module = record.module_path().unwrap_or("");

            writeln!(
                buf,
                "{level_style}[{time}] {:5} {}{level_style:#} ({})",
                record.level(),
                record.args(),
                module,
            )
        })
        .init();
}
