//! mini-jbod：把 16 块小磁盘拼成一个 1MB 的线性地址空间
//!
//! 分层（自底向上）：
//! - `disk`：几何参数、地址换算、设备抽象与本地镜像
//! - `net`：操作码、帧格式、远程服务器客户端
//! - `cache`：全相联 LRU 块缓存
//! - `mdadm`：挂载状态与线性读写引擎

pub mod cache;
pub mod config;
pub mod disk;
pub mod error;
pub mod logger;
pub mod mdadm;
pub mod net;

pub use cache::{Cache, CacheStats};
pub use config::Config;
pub use disk::{FileDisk, JbodDevice};
pub use error::{JbodError, Result};
pub use mdadm::Mdadm;
pub use net::JbodClient;
