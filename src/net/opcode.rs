//! JBOD 操作码：一个 32 位字里打包四个字段
//!
//! ```text
//!  31      26 25   22 21            8 7       0
//! +----------+-------+---------------+---------+
//! | command  | disk  |   reserved    |  block  |
//! +----------+-------+---------------+---------+
//! ```

use crate::error::{JbodError, Result};

const COMMAND_SHIFT: u32 = 26;
const DISK_SHIFT: u32 = 22;
const RESERVED_SHIFT: u32 = 8;

const COMMAND_MASK: u32 = 0x3F;
const DISK_MASK: u32 = 0xF;
const RESERVED_MASK: u32 = 0x3FFF;
const BLOCK_MASK: u32 = 0xFF;

/// 服务器能识别的命令，编号与服务端约定一致
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Mount = 0,
    Unmount = 1,
    SeekToDisk = 2,
    SeekToBlock = 3,
    ReadBlock = 4,
    WriteBlock = 5,
}

impl TryFrom<u32> for Command {
    type Error = JbodError;

    fn try_from(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::Mount),
            1 => Ok(Self::Unmount),
            2 => Ok(Self::SeekToDisk),
            3 => Ok(Self::SeekToBlock),
            4 => Ok(Self::ReadBlock),
            5 => Ok(Self::WriteBlock),
            other => Err(JbodError::Malformed(format!("unknown command {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub command: Command,
    pub disk: u32,
    pub reserved: u32,
    pub block: u32,
}

impl Opcode {
    pub fn new(command: Command, disk: u32, reserved: u32, block: u32) -> Self {
        Self {
            command,
            disk,
            reserved,
            block,
        }
    }

    pub fn mount() -> Self {
        Self::new(Command::Mount, 0, 0, 0)
    }

    pub fn unmount() -> Self {
        Self::new(Command::Unmount, 0, 0, 0)
    }

    pub fn seek_to_disk(disk: u32) -> Self {
        Self::new(Command::SeekToDisk, disk, 0, 0)
    }

    pub fn seek_to_block(block: u32) -> Self {
        Self::new(Command::SeekToBlock, 0, 0, block)
    }

    pub fn read_block() -> Self {
        Self::new(Command::ReadBlock, 0, 0, 0)
    }

    pub fn write_block() -> Self {
        Self::new(Command::WriteBlock, 0, 0, 0)
    }

    /// 超出位宽的字段会被截断
    pub fn encode(&self) -> u32 {
        ((self.command as u32 & COMMAND_MASK) << COMMAND_SHIFT)
            | ((self.disk & DISK_MASK) << DISK_SHIFT)
            | ((self.reserved & RESERVED_MASK) << RESERVED_SHIFT)
            | (self.block & BLOCK_MASK)
    }

    pub fn decode(word: u32) -> Result<Self> {
        Ok(Self {
            command: Command::try_from((word >> COMMAND_SHIFT) & COMMAND_MASK)?,
            disk: (word >> DISK_SHIFT) & DISK_MASK,
            reserved: (word >> RESERVED_SHIFT) & RESERVED_MASK,
            block: word & BLOCK_MASK,
        })
    }

    /// 请求是否携带一个数据块
    pub fn carries_block(&self) -> bool {
        self.command == Command::WriteBlock
    }
}

impl From<Opcode> for u32 {
    fn from(op: Opcode) -> u32 {
        op.encode()
    }
}
