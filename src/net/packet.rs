//! 帧格式：8 字节头 + 可选的一个数据块，全部使用网络字节序
//!
//! ```text
//! | length: u16 | opcode: u32 | status: u16 | block (BLOCK_SIZE, optional) |
//! ```
//! `length` 是整帧长度（含头部），只能是 `HEADER_LEN` 或 `HEADER_LEN + BLOCK_SIZE`。

use std::io::{Read, Write};

use crate::{
    disk::{Block, BLOCK_SIZE},
    error::{JbodError, Result},
    net::Opcode,
};

pub const HEADER_LEN: usize = 8;

/// 带数据块的帧长度
pub const FRAME_WITH_BLOCK_LEN: usize = HEADER_LEN + BLOCK_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub length: u16,
    pub opcode: u32,
    pub status: u16,
}

impl Header {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..2].copy_from_slice(&self.length.to_be_bytes());
        buf[2..6].copy_from_slice(&self.opcode.to_be_bytes());
        buf[6..8].copy_from_slice(&self.status.to_be_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; HEADER_LEN]) -> Self {
        Self {
            length: u16::from_be_bytes([buf[0], buf[1]]),
            opcode: u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]),
            status: u16::from_be_bytes([buf[6], buf[7]]),
        }
    }

    /// 根据长度字段判断后面是否跟着一个数据块
    pub fn has_block(&self) -> Result<bool> {
        match self.length as usize {
            HEADER_LEN => Ok(false),
            FRAME_WITH_BLOCK_LEN => Ok(true),
            other => Err(JbodError::Malformed(format!("bad frame length {}", other))),
        }
    }
}

/// 一帧完整的消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub opcode: u32,
    pub status: u16,
    pub block: Option<Block>,
}

pub fn write_packet<W: Write>(
    w: &mut W,
    opcode: u32,
    status: u16,
    block: Option<&Block>,
) -> Result<()> {
    let length = if block.is_some() {
        FRAME_WITH_BLOCK_LEN
    } else {
        HEADER_LEN
    };
    let header = Header {
        length: length as u16,
        opcode,
        status,
    };

    w.write_all(&header.to_bytes())?;
    if let Some(block) = block {
        w.write_all(block)?;
    }
    w.flush()?;
    Ok(())
}

/// 先读固定长度的头，再按长度字段决定是否读一个块；任何短读都视为失败
pub fn read_packet<R: Read>(r: &mut R) -> Result<Packet> {
    let mut raw = [0u8; HEADER_LEN];
    r.read_exact(&mut raw)?;
    let header = Header::from_bytes(&raw);

    let block = if header.has_block()? {
        let mut block = [0u8; BLOCK_SIZE];
        r.read_exact(&mut block)?;
        Some(block)
    } else {
        None
    };

    Ok(Packet {
        opcode: header.opcode,
        status: header.status,
        block,
    })
}

/// 发送请求：只有写块命令才附带数据块
pub fn send_request<W: Write>(w: &mut W, op: Opcode, block: Option<&Block>) -> Result<()> {
    let payload = if op.carries_block() {
        Some(block.ok_or_else(|| {
            JbodError::Malformed("write request without a block".to_string())
        })?)
    } else {
        None
    };
    write_packet(w, op.encode(), 0, payload)
}

pub fn receive_response<R: Read>(r: &mut R) -> Result<Packet> {
    read_packet(r)
}
