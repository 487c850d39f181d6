use mini_jbod::disk::MAX_IO_SIZE;

use crate::{shell::command::Command, utils::parse_number};

fn addr(token: &str) -> Option<u32> {
    parse_number(token).and_then(|n| u32::try_from(n).ok())
}

fn size(token: &str) -> Option<usize> {
    parse_number(token).and_then(|n| usize::try_from(n).ok())
}

pub fn parse_command(input: &str) -> Option<Command> {
    let tokens: Vec<&str> = input.trim().split_ascii_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let cmd = tokens[0];
    let args = &tokens[1..];

    match cmd {
        "help" => Some(Command::Help),
        "connect" => {
            let ip = args.first().map(|s| s.to_string());
            let port = match args.get(1) {
                Some(p) => Some(u16::try_from(parse_number(p)?).ok()?),
                None => None,
            };
            Some(Command::Connect(ip, port))
        }
        "disconnect" => Some(Command::Disconnect),
        "open" => Some(Command::Open(args.first().map(|s| s.to_string()))),
        "mount" => Some(Command::Mount),
        "unmount" => Some(Command::Unmount),
        "cache" => match *args.first()? {
            "off" => Some(Command::Cache(None)),
            n => size(n).map(|n| Command::Cache(Some(n))),
        },
        "stats" => Some(Command::Stats),
        "locate" => args.first().and_then(|a| addr(a)).map(Command::Locate),
        "read" => {
            if args.len() != 2 {
                return None;
            }
            let len = size(args[1]).filter(|&n| n <= MAX_IO_SIZE)?;
            Some(Command::Read(addr(args[0])?, len))
        }
        "write" => {
            if args.len() >= 2 {
                Some(Command::Write(addr(args[0])?, args[1..].join(" ")))
            } else {
                None
            }
        }
        "fill" => {
            if args.len() != 3 {
                return None;
            }
            let byte = u8::try_from(parse_number(args[2])?).ok()?;
            Some(Command::Fill(addr(args[0])?, size(args[1])?, byte))
        }
        "exit" | "quit" => Some(Command::Exit),
        _ => None,
    }
}
