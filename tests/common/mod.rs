//! Common utilities for tests

#![allow(dead_code)]

use std::{
    io,
    net::TcpListener,
    thread::{self, JoinHandle},
};

use mini_jbod::{
    disk::{Block, JbodDevice, BLOCKS_PER_DISK, BLOCK_SIZE, DISK_COUNT, DISK_SIZE, TOTAL_SIZE},
    net::{
        packet::{read_packet, write_packet},
        Command, Opcode,
    },
    JbodError, Result,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An in-memory JBOD that records every command it receives.
pub struct MemoryJbod {
    data: Vec<u8>,
    mounted: bool,
    disk: u32,
    block: u32,
    writes: usize,
    fail_after_writes: Option<usize>,
    pub log: Vec<Command>,
}

impl MemoryJbod {
    pub fn new() -> Self {
        MemoryJbod {
            data: vec![0u8; TOTAL_SIZE],
            mounted: false,
            disk: 0,
            block: 0,
            writes: 0,
            fail_after_writes: None,
            log: Vec::new(),
        }
    }

    /// Every WRITE_BLOCK after the first `n` fails with a broken pipe.
    pub fn failing_after_writes(n: usize) -> Self {
        MemoryJbod {
            fail_after_writes: Some(n),
            ..Self::new()
        }
    }

    pub fn count(&self, cmd: Command) -> usize {
        self.log.iter().filter(|&&c| c == cmd).count()
    }

    pub fn bytes(&self, addr: usize, len: usize) -> &[u8] {
        &self.data[addr..addr + len]
    }

    fn offset(&self) -> Result<usize> {
        if self.disk as usize >= DISK_COUNT || self.block as usize >= BLOCKS_PER_DISK {
            return Err(JbodError::InvalidLocation {
                disk: self.disk,
                block: self.block,
            });
        }
        Ok(self.disk as usize * DISK_SIZE + self.block as usize * BLOCK_SIZE)
    }
}

impl JbodDevice for MemoryJbod {
    fn execute(&mut self, op: Opcode, block: Option<&mut Block>) -> Result<()> {
        self.log.push(op.command);

        match op.command {
            Command::Mount if self.mounted => Err(JbodError::AlreadyMounted),
            Command::Mount => {
                self.mounted = true;
                Ok(())
            }
            _ if !self.mounted => Err(JbodError::NotMounted),
            Command::Unmount => {
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
                let start = self.offset()?;
                let buf = block.expect("read needs a block");
                buf.copy_from_slice(&self.data[start..start + BLOCK_SIZE]);
                self.block += 1;
                Ok(())
            }
            Command::WriteBlock => {
                if self.fail_after_writes.is_some_and(|n| self.writes >= n) {
                    return Err(JbodError::Io(io::Error::new(
                        io::ErrorKind::BrokenPipe,
                        "injected write failure",
                    )));
                }
                let start = self.offset()?;
                let buf = block.expect("write needs a block");
                self.data[start..start + BLOCK_SIZE].copy_from_slice(buf);
                self.block += 1;
                self.writes += 1;
                Ok(())
            }
        }
    }
}

/// Serves `jbod` to a single client on a loopback port.
///
/// The thread stops when the client hangs up, or on its own after `hang_up_after`
/// requests, and hands the device back for inspection.
pub fn spawn_server(
    mut jbod: MemoryJbod,
    hang_up_after: Option<usize>,
) -> (u16, JoinHandle<MemoryJbod>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut served = 0;

        loop {
            if hang_up_after.is_some_and(|n| served >= n) {
                break;
            }
            let packet = match read_packet(&mut stream) {
                Ok(packet) => packet,
                Err(_) => break,
            };
            served += 1;

            let op = Opcode::decode(packet.opcode).unwrap();
            let mut block = packet.block.unwrap_or([0; BLOCK_SIZE]);
            let result = match op.command {
                Command::ReadBlock | Command::WriteBlock => jbod.execute(op, Some(&mut block)),
                _ => jbod.execute(op, None),
            };

            let status = if result.is_ok() { 0 } else { 0xFFFF };
            let payload = (result.is_ok() && op.command == Command::ReadBlock).then_some(&block);
            if write_packet(&mut stream, packet.opcode, status, payload).is_err() {
                break;
            }
        }
        jbod
    });

    (port, handle)
}

/// Deterministic test pattern.
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}
