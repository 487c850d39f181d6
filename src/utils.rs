/// 解析十进制或 `0x` 前缀的十六进制数
pub fn parse_number(s: &str) -> Option<u64> {
    let s = s.trim().replace('_', "");
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

/// 经典 hexdump 格式，每行 16 字节，左侧是线性地址
pub fn hex_dump(base: u32, data: &[u8]) -> Vec<String> {
    data.chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
            let ascii: String = chunk
                .iter()
                .map(|&b| {
                    if b.is_ascii_graphic() || b == b' ' {
                        b as char
                    } else {
                        '.'
                    }
                })
                .collect();
            format!(
                "{:08x}  {:<47}  |{}|",
                base as usize + i * 16,
                hex.join(" "),
                ascii
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_hex() {
        assert_eq!(parse_number("253"), Some(253));
        assert_eq!(parse_number("0xFD"), Some(253));
        assert_eq!(parse_number("0x10_0000"), Some(1 << 20));
        assert_eq!(parse_number("0xZZ"), None);
        assert_eq!(parse_number("-1"), None);
    }

    #[test]
    fn dump_layout() {
        let lines = hex_dump(0x100, b"Hello, JBOD!\x00\x01\x02\x03tail");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000100  48 65 6c 6c 6f"));
        assert!(lines[0].ends_with("|Hello, JBOD!....|"));
        assert!(lines[1].starts_with("00000110  74 61 69 6c"));
    }
}
