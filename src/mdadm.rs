//! 线性地址读写引擎
//!
//! 把 `[addr, addr + len)` 拆成若干块：首尾可能是不完整的块，需要先读出原内容再拼接
//! （read-modify-write）；中间完整的块直接整块写入。所有操作都要求阵列已挂载。

use log::{debug, info, warn};

use crate::{
    cache::Cache,
    disk::{
        translate, Block, JbodDevice, Location, BLOCK_SIZE, MAX_IO_SIZE, READ_LIMIT, WRITE_LIMIT,
    },
    error::{JbodError, Result},
    net::Opcode,
};

#[derive(Debug)]
pub struct Mdadm<D: JbodDevice> {
    device: D,     // 底层阵列（本地镜像或远程服务器）
    cache: Cache,  // 可选的块缓存
    mounted: bool, // 是否挂载
}

impl<D: JbodDevice> Mdadm<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            cache: Cache::new(),
            mounted: false,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn create_cache(&mut self, capacity: usize) -> Result<()> {
        self.cache.create(capacity)
    }

    pub fn destroy_cache(&mut self) -> Result<()> {
        self.cache.destroy()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn mount(&mut self) -> Result<()> {
        if self.mounted {
            return Err(JbodError::AlreadyMounted);
        }
        self.device.execute(Opcode::mount(), None)?;
        self.mounted = true;
        info!("array mounted");
        Ok(())
    }

    pub fn unmount(&mut self) -> Result<()> {
        if !self.mounted {
            return Err(JbodError::NotMounted);
        }
        self.device.execute(Opcode::unmount(), None)?;
        self.mounted = false;

        match self.cache.hit_rate() {
            Some(rate) => info!("array unmounted, cache hit rate {:5.1}%", rate * 100.0),
            None => info!("array unmounted"),
        }
        Ok(())
    }

    /// 从线性地址 `addr` 读 `buf.len()` 字节，成功返回读到的字节数
    ///
    /// 中途传输失败时直接返回错误，`buf` 中已经填好的部分保持原样。
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<usize> {
        let len = buf.len();
        self.check_request(addr, len, READ_LIMIT)?;

        let mut done = 0;
        while done < len {
            let loc = translate(addr + done as u32)?;
            self.seek(loc)?;
            let block = match self.cached(loc) {
                Some(block) => block,
                None => self.read_from_device(loc)?,
            };

            let n = loc.remaining_in_block().min(len - done);
            buf[done..done + n].copy_from_slice(&block[loc.offset..loc.offset + n]);
            done += n;
        }

        debug!("read {} bytes at {:#x}", len, addr);
        Ok(len)
    }

    /// 把 `buf` 写到线性地址 `addr`，成功返回写入的字节数
    ///
    /// 逐块写入且不回滚：中途传输失败时，之前已经写完的块会保留在阵列上。
    pub fn write(&mut self, addr: u32, buf: &[u8]) -> Result<usize> {
        let len = buf.len();
        self.check_request(addr, len, WRITE_LIMIT)?;

        let mut done = 0;
        while done < len {
            let loc = translate(addr + done as u32)?;
            let n = loc.remaining_in_block().min(len - done);

            if n == BLOCK_SIZE {
                let mut block: Block = [0; BLOCK_SIZE];
                block.copy_from_slice(&buf[done..done + n]);
                self.write_to_device(loc, &mut block)?;
                self.store_in_cache(loc, &block);
            } else {
                let mut block = match self.cached(loc) {
                    Some(block) => block,
                    None => {
                        self.seek(loc)?;
                        self.read_from_device(loc)?
                    }
                };
                block[loc.offset..loc.offset + n].copy_from_slice(&buf[done..done + n]);
                self.write_to_device(loc, &mut block)?;
                self.cache.update(loc.disk, loc.block, &block);
            }
            done += n;
        }

        debug!("wrote {} bytes at {:#x}", len, addr);
        Ok(len)
    }

    fn check_request(&self, addr: u32, len: usize, limit: u64) -> Result<()> {
        if len > MAX_IO_SIZE {
            return Err(JbodError::InvalidLength(len));
        }
        if addr as u64 + len as u64 > limit {
            return Err(JbodError::OutOfRange { addr, len });
        }
        if !self.mounted {
            warn!("rejected I/O at {:#x}: array not mounted", addr);
            return Err(JbodError::NotMounted);
        }
        Ok(())
    }

    fn seek(&mut self, loc: Location) -> Result<()> {
        self.device.execute(Opcode::seek_to_disk(loc.disk), None)?;
        self.device.execute(Opcode::seek_to_block(loc.block), None)
    }

    fn cached(&mut self, loc: Location) -> Option<Block> {
        if !self.cache.enabled() {
            return None;
        }
        self.cache.lookup(loc.disk, loc.block)
    }

    /// 设备必须已经定位到 `loc`；读到的块顺便放进缓存
    fn read_from_device(&mut self, loc: Location) -> Result<Block> {
        let mut block: Block = [0; BLOCK_SIZE];
        self.device.execute(Opcode::read_block(), Some(&mut block))?;
        if self.cache.enabled() {
            if let Err(e) = self.cache.insert(loc.disk, loc.block, &block) {
                warn!("cache insert for disk {} block {} failed: {}", loc.disk, loc.block, e);
            }
        }
        Ok(block)
    }

    fn write_to_device(&mut self, loc: Location, block: &mut Block) -> Result<()> {
        self.seek(loc)?;
        self.device.execute(Opcode::write_block(), Some(block))
    }

    fn store_in_cache(&mut self, loc: Location, block: &Block) {
        if !self.cache.enabled() {
            return;
        }
        if self.cache.contains(loc.disk, loc.block) {
            self.cache.update(loc.disk, loc.block, block);
        } else if let Err(e) = self.cache.insert(loc.disk, loc.block, block) {
            warn!("cache insert for disk {} block {} failed: {}", loc.disk, loc.block, e);
        }
    }
}
