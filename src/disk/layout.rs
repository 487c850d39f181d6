//! 线性地址与 (磁盘, 块, 块内偏移) 之间的换算

use crate::{
    disk::types::{BLOCKS_PER_DISK, BLOCK_SIZE, DISK_COUNT, DISK_SIZE, TOTAL_SIZE},
    error::{JbodError, Result},
};

/// 线性地址在阵列中的物理位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub disk: u32,
    pub block: u32,
    pub offset: usize,
}

impl Location {
    /// 该块在当前位置之后还剩多少字节
    pub fn remaining_in_block(&self) -> usize {
        BLOCK_SIZE - self.offset
    }
}

/// 把线性地址翻译为物理位置，越界地址返回错误
pub fn translate(addr: u32) -> Result<Location> {
    let addr = addr as usize;
    if addr >= TOTAL_SIZE {
        return Err(JbodError::OutOfRange {
            addr: addr as u32,
            len: 0,
        });
    }

    Ok(Location {
        disk: (addr / DISK_SIZE) as u32,
        block: ((addr % DISK_SIZE) / BLOCK_SIZE) as u32,
        offset: addr % BLOCK_SIZE,
    })
}

/// translate 的逆运算
pub fn linear_address(loc: Location) -> Result<u32> {
    if !is_valid_block(loc.disk, loc.block) || loc.offset >= BLOCK_SIZE {
        return Err(JbodError::InvalidLocation {
            disk: loc.disk,
            block: loc.block,
        });
    }
    Ok((loc.disk as usize * DISK_SIZE + loc.block as usize * BLOCK_SIZE + loc.offset) as u32)
}

pub fn is_valid_block(disk: u32, block: u32) -> bool {
    (disk as usize) < DISK_COUNT && (block as usize) < BLOCKS_PER_DISK
}
