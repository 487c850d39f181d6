use colored::*;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use mini_jbod::{
    disk::{translate, FileDisk, MAX_IO_SIZE},
    Config, JbodClient, JbodError, Mdadm,
};
use std::{error::Error, path::PathBuf};

use crate::{shell::backend::Backend, utils::hex_dump};

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Connect(Option<String>, Option<u16>),
    Disconnect,
    Open(Option<String>),
    Mount,
    Unmount,
    Cache(Option<usize>), // None 表示关闭缓存
    Stats,
    Locate(u32),
    Read(u32, usize),
    Write(u32, String),
    Fill(u32, usize, u8),
    Exit,
}

/// 一次 shell 会话持有的全部状态
pub struct Session {
    pub array: Mdadm<Backend>,
    pub config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            array: Mdadm::new(Backend::Remote(JbodClient::new())),
            config,
        }
    }

    fn switch_backend(&mut self, backend: Backend) -> Result<(), Box<dyn Error>> {
        if self.array.is_mounted() {
            return Err("unmount the array before switching backends".into());
        }
        *self.array.device_mut() = backend;
        Ok(())
    }
}

pub fn execute_command(cmd: &Command, session: &mut Session) -> Result<(), Box<dyn Error>> {
    match cmd {
        Command::Help => print_help(),
        Command::Connect(ip, port) => {
            let ip = ip.clone().unwrap_or_else(|| session.config.server.clone());
            let port = port.unwrap_or(session.config.port);
            let mut client = JbodClient::new();
            client.connect(&ip, port)?;
            session.switch_backend(Backend::Remote(client))?;
            println!("🔌 Connected to {}", format!("{}:{}", ip, port).green());
        }
        Command::Disconnect => {
            // 挂载状态下断开会让 unmount 无法再送达服务器
            if session.array.is_mounted() {
                return Err("unmount the array before disconnecting".into());
            }
            match session.array.device_mut() {
                Backend::Remote(client) => client.disconnect(),
                Backend::Local(_) => return Err("no remote connection is active".into()),
            }
            println!("🔌 Disconnected");
        }
        Command::Open(path) => {
            let path = path
                .clone()
                .map(PathBuf::from)
                .unwrap_or_else(|| session.config.image.clone());
            let disk = FileDisk::open(&path)?;
            session.switch_backend(Backend::Local(disk))?;
            println!("💾 Opened image {}", path.display().to_string().green());
        }
        Command::Mount => {
            session.array.mount()?;
            println!("✅ Array mounted");
        }
        Command::Unmount => {
            session.array.unmount()?;
            println!("✅ Array unmounted");
        }
        Command::Cache(Some(entries)) => {
            session.array.create_cache(*entries)?;
            println!("🧠 Cache enabled with {} entries", entries.to_string().cyan());
        }
        Command::Cache(None) => {
            session.array.destroy_cache()?;
            println!("🧠 Cache disabled");
        }
        Command::Stats => print_stats(session),
        Command::Locate(addr) => {
            let loc = translate(*addr)?;
            println!(
                "📍 {:#07x} → disk {} block {} offset {}",
                addr,
                loc.disk.to_string().cyan(),
                loc.block.to_string().cyan(),
                loc.offset.to_string().cyan()
            );
        }
        Command::Read(addr, len) => {
            if *len > MAX_IO_SIZE {
                return Err(JbodError::InvalidLength(*len).into());
            }
            let mut buf = vec![0u8; *len];
            let n = session.array.read(*addr, &mut buf)?;
            for line in hex_dump(*addr, &buf[..n]) {
                println!("{}", line);
            }
        }
        Command::Write(addr, text) => {
            let n = session.array.write(*addr, text.as_bytes())?;
            println!("✏️  Wrote {} bytes at {:#07x}", n.to_string().green(), addr);
        }
        Command::Fill(addr, len, byte) => fill(session, *addr, *len, *byte)?,
        Command::Exit => {
            if session.array.is_mounted() {
                let unmount = Confirm::new()
                    .with_prompt("Array is still mounted. Unmount before exit?")
                    .default(true)
                    .interact()?;
                if unmount {
                    session.array.unmount()?;
                }
            }
            println!("{}", "👋 Exiting mini-jbod shell...".yellow().bold());
        }
    }

    Ok(())
}

/// 按单次上限分片写入同一个字节，并显示进度
fn fill(session: &mut Session, addr: u32, len: usize, byte: u8) -> Result<(), Box<dyn Error>> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.green/black}] {bytes:>8}/{total_bytes} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let chunk = vec![byte; MAX_IO_SIZE];
    let mut done = 0;
    while done < len {
        let n = (len - done).min(MAX_IO_SIZE);
        if let Err(e) = session.array.write(addr.saturating_add(done as u32), &chunk[..n]) {
            pb.abandon_with_message(format!("❌ stopped after {} bytes", done));
            return Err(e.into());
        }
        done += n;
        pb.set_position(done as u64);
    }
    pb.finish_with_message("✅ done");
    Ok(())
}

fn print_stats(session: &Session) {
    let stats = session.array.cache().stats();
    let hit_rate = match session.array.cache().hit_rate() {
        Some(rate) => format!("{:5.1}%", rate * 100.0),
        None => "n/a".to_string(),
    };

    println!(
        "{}\n{}: {}\n{}: {}\n{}: {}/{} entries\n{}: {} queries, {} hits ({})\n",
        "📊 Array Info".bright_yellow().bold(),
        "Backend".blue(),
        session.array.device().describe(),
        "Mounted".blue(),
        session.array.is_mounted(),
        "Cache".blue(),
        stats.valid,
        stats.capacity,
        "Lookups".blue(),
        stats.queries,
        stats.hits,
        hit_rate
    );
}

fn print_help() {
    println!("{}", "📘 mini-jbod Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  connect [ip] [port]      Connect to a JBOD server
  disconnect               Close the server connection
  open [image]             Use a local disk image instead of a server
  mount                    Mount the array
  unmount                  Unmount the array
  cache <entries>|off      Create (2..4096 entries) or destroy the block cache
  stats                    Show backend, mount and cache statistics
  locate <addr>            Translate a linear address to disk/block/offset
  read <addr> <len>        Hex dump up to 1024 bytes
  write <addr> <text>      Write text at a linear address
  fill <addr> <len> <byte> Fill a range with one byte value
  help                     Show this help message
  exit                     Quit the shell

  Numbers accept decimal or 0x-prefixed hex.
"
        .bright_black()
    );
}
