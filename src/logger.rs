use std::io::Write;

use env_logger::{Builder, Env};

/// 初始化日志，级别由 RUST_LOG 控制，默认只输出 warn 及以上
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}
