use std::fmt;

/// JBOD 阵列操作错误类型
#[derive(Debug)]
pub enum JbodError {
    Io(std::io::Error), // 底层 I/O 错误（含短读/短写）

    /** 参数校验错误 */
    InvalidLength(usize),                    // 单次传输长度超过上限
    OutOfRange { addr: u32, len: usize },    // 线性地址越界
    InvalidLocation { disk: u32, block: u32 }, // 磁盘号/块号不在几何范围内
    NotMounted,                              // 阵列未挂载
    AlreadyMounted,                          // 阵列已挂载

    /** 缓存生命周期错误 */
    InvalidCapacity(usize), // 缓存容量不在 [2, 4096]
    CacheExists,            // 重复创建缓存
    CacheMissing,           // 缓存不存在
    DuplicateEntry { disk: u32, block: u32 }, // 重复插入同一个块

    /** 传输层错误 */
    NotConnected,                       // 没有活动连接
    InvalidAddress(String),             // IP 地址解析失败
    Connect(std::io::Error),            // 建立连接失败
    Malformed(String),                  // 响应格式错误
    Rejected { opcode: u32, status: u16 }, // 对端返回失败状态

    /** 本地镜像错误 */
    Encoding(bincode::Error), // 超级块序列化失败
    InvalidImage(String),     // 镜像与几何参数不匹配
}

impl From<std::io::Error> for JbodError {
    fn from(e: std::io::Error) -> Self {
        JbodError::Io(e)
    }
}

impl From<bincode::Error> for JbodError {
    fn from(e: bincode::Error) -> Self {
        JbodError::Encoding(e)
    }
}

impl fmt::Display for JbodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::InvalidLength(len) => write!(f, "Transfer length {} exceeds limit", len),
            Self::OutOfRange { addr, len } => {
                write!(f, "Range {:#x}+{} is outside the address space", addr, len)
            }
            Self::InvalidLocation { disk, block } => {
                write!(f, "Invalid location: disk {} block {}", disk, block)
            }
            Self::NotMounted => write!(f, "Array is not mounted"),
            Self::AlreadyMounted => write!(f, "Array is already mounted"),
            Self::InvalidCapacity(n) => write!(f, "Invalid cache capacity: {}", n),
            Self::CacheExists => write!(f, "Cache already exists"),
            Self::CacheMissing => write!(f, "Cache does not exist"),
            Self::DuplicateEntry { disk, block } => {
                write!(f, "Block (disk {}, block {}) is already cached", disk, block)
            }
            Self::NotConnected => write!(f, "Not connected to a JBOD server"),
            Self::InvalidAddress(addr) => write!(f, "Invalid server address: {}", addr),
            Self::Connect(e) => write!(f, "Connection failed: {}", e),
            Self::Malformed(desc) => write!(f, "Malformed response: {}", desc),
            Self::Rejected { opcode, status } => {
                write!(f, "Operation {:#010x} rejected with status {}", opcode, status)
            }
            Self::Encoding(e) => write!(f, "Image header encoding error: {}", e),
            Self::InvalidImage(desc) => write!(f, "Invalid disk image: {}", desc),
        }
    }
}

// 支持链式错误，方便追踪底层原因
impl std::error::Error for JbodError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::Connect(e) => Some(e),
            Self::Encoding(e) => Some(e),
            _ => None,
        }
    }
}

/// 统一结果类型
pub type Result<T> = std::result::Result<T, JbodError>;
