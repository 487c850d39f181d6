use serde::{Deserialize, Serialize};

use crate::{
    disk::types::{BLOCKS_PER_DISK, BLOCK_SIZE, DISK_COUNT},
    error::{JbodError, Result},
};

pub const MAGIC: u64 = 0x4A42_4F44_494D_4731; // "JBODIMG1"

/// 镜像头部占用的字节数，超级块序列化后放在这里
pub const IMAGE_HEADER_SIZE: usize = BLOCK_SIZE;

/// 本地镜像文件的超级块，记录创建时的几何参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperBlock {
    pub magic: u64,
    /** 几何信息 */
    pub block_size: u32,
    pub blocks_per_disk: u32,
    pub disk_count: u32,
    /** 其他元信息 */
    pub created_at: i64, // 创建时间（Unix 秒）
}

impl SuperBlock {
    pub fn new() -> Self {
        Self {
            magic: MAGIC,
            block_size: BLOCK_SIZE as u32,
            blocks_per_disk: BLOCKS_PER_DISK as u32,
            disk_count: DISK_COUNT as u32,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// 序列化并补零到 `IMAGE_HEADER_SIZE`
    pub fn to_header(&self) -> Result<[u8; IMAGE_HEADER_SIZE]> {
        let bytes = bincode::serialize(self)?;
        if bytes.len() > IMAGE_HEADER_SIZE {
            return Err(JbodError::InvalidImage(format!(
                "super block needs {} bytes",
                bytes.len()
            )));
        }
        let mut header = [0u8; IMAGE_HEADER_SIZE];
        header[..bytes.len()].copy_from_slice(&bytes);
        Ok(header)
    }

    /// 反序列化并确认几何参数与当前编译的一致
    pub fn from_header(header: &[u8]) -> Result<Self> {
        let sb: SuperBlock = bincode::deserialize(header)?;
        if sb.magic != MAGIC {
            return Err(JbodError::InvalidImage(format!("bad magic {:#x}", sb.magic)));
        }
        if sb.block_size as usize != BLOCK_SIZE
            || sb.blocks_per_disk as usize != BLOCKS_PER_DISK
            || sb.disk_count as usize != DISK_COUNT
        {
            return Err(JbodError::InvalidImage(format!(
                "geometry {}x{}x{} does not match {}x{}x{}",
                sb.disk_count,
                sb.blocks_per_disk,
                sb.block_size,
                DISK_COUNT,
                BLOCKS_PER_DISK,
                BLOCK_SIZE
            )));
        }
        Ok(sb)
    }
}

impl Default for SuperBlock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let sb = SuperBlock::new();
        let header = sb.to_header().unwrap();
        assert_eq!(SuperBlock::from_header(&header).unwrap(), sb);
    }

    #[test]
    fn foreign_geometry_is_rejected() {
        let sb = SuperBlock {
            disk_count: 8,
            ..SuperBlock::new()
        };
        let header = sb.to_header().unwrap();
        assert!(matches!(
            SuperBlock::from_header(&header),
            Err(JbodError::InvalidImage(_))
        ));
    }

    #[test]
    fn zeroed_header_has_bad_magic() {
        let header = [0u8; IMAGE_HEADER_SIZE];
        assert!(matches!(
            SuperBlock::from_header(&header),
            Err(JbodError::InvalidImage(_))
        ));
    }
}
