use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::Path,
};

use log::{debug, info};

use crate::{
    disk::{
        block_device::JbodDevice,
        super_block::{SuperBlock, IMAGE_HEADER_SIZE},
        types::{Block, BLOCKS_PER_DISK, BLOCK_SIZE, DISK_COUNT, DISK_SIZE, TOTAL_SIZE},
    },
    error::{JbodError, Result},
    net::{Command, Opcode},
};

/// 用一个镜像文件模拟整个磁盘阵列
///
/// 文件布局：`IMAGE_HEADER_SIZE` 字节的超级块，之后是按磁盘顺序拼接的数据区。
#[derive(Debug)]
pub struct FileDisk {
    file: File,
    super_block: SuperBlock,
    mounted: bool,
    disk: u32,  // 当前磁盘
    block: u32, // 当前块，读写后自动后移
}

impl FileDisk {
    /// 打开镜像，不存在或为空时创建并分配空间
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let image_len = (IMAGE_HEADER_SIZE + TOTAL_SIZE) as u64;
        let super_block = if file.metadata()?.len() == 0 {
            let sb = SuperBlock::new();
            file.write_all(&sb.to_header()?)?;
            file.set_len(image_len)?;
            info!("created disk image {} ({} bytes)", path.display(), image_len);
            sb
        } else {
            let mut header = [0u8; IMAGE_HEADER_SIZE];
            file.read_exact(&mut header)?;
            let sb = SuperBlock::from_header(&header)?;
            if file.metadata()?.len() < image_len {
                return Err(JbodError::InvalidImage(format!(
                    "{} is shorter than {} bytes",
                    path.display(),
                    image_len
                )));
            }
            info!("opened disk image {}", path.display());
            sb
        };

        Ok(Self {
            file,
            super_block,
            mounted: false,
            disk: 0,
            block: 0,
        })
    }

    pub fn super_block(&self) -> &SuperBlock {
        &self.super_block
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn position(&self) -> Result<u64> {
        if self.disk as usize >= DISK_COUNT || self.block as usize >= BLOCKS_PER_DISK {
            return Err(JbodError::InvalidLocation {
                disk: self.disk,
                block: self.block,
            });
        }
        Ok((IMAGE_HEADER_SIZE
            + self.disk as usize * DISK_SIZE
            + self.block as usize * BLOCK_SIZE) as u64)
    }

    fn read_current(&mut self, buf: &mut Block) -> Result<()> {
        let pos = self.position()?;
        self.file.seek(SeekFrom::Start(pos))?;
        self.file.read_exact(buf)?;
        self.block += 1;
        Ok(())
    }

    fn write_current(&mut self, buf: &Block) -> Result<()> {
        let pos = self.position()?;
        self.file.seek(SeekFrom::Start(pos))?;
        self.file.write_all(buf)?;
        self.block += 1;
        Ok(())
    }
}

impl JbodDevice for FileDisk {
    fn execute(&mut self, op: Opcode, block: Option<&mut Block>) -> Result<()> {
        debug!("local {:?}", op);
        match op.command {
            Command::Mount => {
                if self.mounted {
                    return Err(JbodError::AlreadyMounted);
                }
                self.mounted = true;
                Ok(())
            }
            _ if !self.mounted => Err(JbodError::NotMounted),
            Command::Unmount => {
                self.file.flush()?;
                self.file.sync_data()?;
                self.mounted = false;
                Ok(())
            }
            Command::SeekToDisk => {
                self.disk = op.disk;
                self.block = 0;
                Ok(())
            }
            Command::SeekToBlock => {
                self.block = op.block;
                Ok(())
            }
            Command::ReadBlock => {
                let buf = block.ok_or_else(|| {
                    JbodError::Malformed("read without a destination block".to_string())
                })?;
                self.read_current(buf)
            }
            Command::WriteBlock => {
                let buf = block.ok_or_else(|| {
                    JbodError::Malformed("write without a source block".to_string())
                })?;
                self.write_current(buf)
            }
        }
    }
}
