/// 每个物理块（Block）的大小：256 字节
/// 阵列以“块”为最小读写单位。
pub const BLOCK_SIZE: usize = 256;

/// 每个磁盘包含的块数
pub const BLOCKS_PER_DISK: usize = 256;

/// 阵列中的磁盘数量
pub const DISK_COUNT: usize = 16;

/// 单个磁盘的容量：256 * 256 = 64KB
pub const DISK_SIZE: usize = BLOCK_SIZE * BLOCKS_PER_DISK;

/// 线性地址空间总大小：16 * 64KB = 1MB
pub const TOTAL_SIZE: usize = DISK_SIZE * DISK_COUNT;

/// 单次 read/write 调用允许的最大字节数
pub const MAX_IO_SIZE: usize = 1024;

/// 读操作的地址上界（addr + len 不得超过）
pub const READ_LIMIT: u64 = 1_048_570;

/// 写操作的地址上界（addr + len 不得超过）
pub const WRITE_LIMIT: u64 = 1_048_576;

/// 一个物理块的字节数组，按值拷贝
pub type Block = [u8; BLOCK_SIZE];
