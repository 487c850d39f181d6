use std::{env, path::PathBuf};

use log::warn;

pub const DEFAULT_SERVER: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3333;
pub const DEFAULT_IMAGE: &str = "jbod.img";
pub const HISTORY_FILE: &str = ".minijbod_history";

/// 运行时配置，从环境变量读取，缺省时使用默认值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: String,               // JBOD_SERVER
    pub port: u16,                    // JBOD_PORT
    pub cache_entries: Option<usize>, // JBOD_CACHE_ENTRIES，未设置则不启用缓存
    pub image: PathBuf,               // JBOD_IMAGE，本地镜像路径
    pub history: PathBuf,             // JBOD_HISTORY，shell 历史文件
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            port: DEFAULT_PORT,
            cache_entries: None,
            image: PathBuf::from(DEFAULT_IMAGE),
            history: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(HISTORY_FILE),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 无法解析的值会被忽略并保留默认值
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(server) = lookup("JBOD_SERVER") {
            config.server = server;
        }
        if let Some(port) = lookup("JBOD_PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!("ignoring invalid JBOD_PORT={}", port),
            }
        }
        if let Some(entries) = lookup("JBOD_CACHE_ENTRIES") {
            match entries.parse() {
                Ok(n) => config.cache_entries = Some(n),
                Err(_) => warn!("ignoring invalid JBOD_CACHE_ENTRIES={}", entries),
            }
        }
        if let Some(image) = lookup("JBOD_IMAGE") {
            config.image = PathBuf::from(image);
        }
        if let Some(history) = lookup("JBOD_HISTORY") {
            config.history = PathBuf::from(history);
        }

        config
    }
}
