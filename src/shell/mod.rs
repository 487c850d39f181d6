pub mod backend;
pub mod command;
pub mod parse;

use crate::shell::{
    command::{execute_command, Command, Session},
    parse::parse_command,
};
use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use mini_jbod::{
    disk::{DISK_COUNT, DISK_SIZE, TOTAL_SIZE},
    Config,
};
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};
use std::io::stdout;

const COMMANDS: [&str; 14] = [
    "help", "connect", "disconnect", "open", "mount", "unmount", "cache", "stats", "locate",
    "read", "write", "fill", "exit", "quit",
];

pub fn start_shell(config: Config) {
    boot_banner();

    let username = whoami::username();
    let hostname = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());

    let mut session = Session::new(config);
    if let Some(entries) = session.config.cache_entries {
        match session.array.create_cache(entries) {
            Ok(()) => println!("🧠 Cache enabled with {} entries", entries),
            Err(e) => println!("{} {}", "❌ Error:".red().bold(), e),
        }
    }

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );

    // 初始化 reedline，历史文件打不开时退回内存历史
    let mut line_editor = Reedline::create();
    match FileBackedHistory::with_file(100, session.config.history.clone()) {
        Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
        Err(e) => log::warn!("history disabled: {}", e),
    }

    // 命令补全
    let completer =
        DefaultCompleter::new_with_wordlen(COMMANDS.iter().map(|s| s.to_string()).collect(), 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    loop {
        let state = if session.array.is_mounted() {
            "mounted"
        } else {
            "unmounted"
        };
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(format!(
                "{}@{}:{}",
                username.green().bold(),
                hostname.cyan().bold(),
                state.blue()
            )),
            DefaultPromptSegment::Basic("mini-jbod".bright_blue().bold().to_string()),
        );

        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Some(cmd) => {
                        if let Err(e) = execute_command(&cmd, &mut session) {
                            println!("{} {}", "❌ Error:".red().bold(), e);
                        }
                        if cmd == Command::Exit {
                            println!("{}", "👋 Bye!".bright_yellow());
                            break;
                        }
                    }
                    None => println!(
                        "{}",
                        "⚠️  Unknown command or bad arguments. Type 'help' for command list."
                            .yellow()
                    ),
                }
            }
            Ok(Signal::CtrlC) => {
                println!();
                continue;
            }
            Ok(Signal::CtrlD) => {
                if let Err(e) = execute_command(&Command::Exit, &mut session) {
                    println!("{} {}", "❌ Error:".red().bold(), e);
                }
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                println!("Error reading line: {}", e);
                break;
            }
        }
    }

    println!("{}", "GoodBye!".bright_yellow());
}

/// 清屏并打印欢迎信息和阵列几何参数
fn boot_banner() {
    let mut stdout = stdout();

    if let Err(e) = execute!(
        stdout,
        Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        SetForegroundColor(Color::Cyan),
        Print(format!("Welcome to mini-jbod v{}\n", env!("CARGO_PKG_VERSION"))),
        ResetColor
    ) {
        log::debug!("terminal setup failed: {}", e);
    }

    println!(
        "{}",
        format!(
            "{} disks × {} KB = {} KB linear space",
            DISK_COUNT,
            DISK_SIZE / 1024,
            TOTAL_SIZE / 1024
        )
        .bright_black()
    );
}
