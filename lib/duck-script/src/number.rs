//! Best effort numeric literals. Nothing here fails; garbage parses to something.

fn hex_digit(b: u8) -> u32 {
    match b {
        b'0'..=b'9' => (b - b'0') as u32,
        b'a'..=b'f' => (b - b'a' + 10) as u32,
        b'A'..=b'F' => (b - b'A' + 10) as u32,
        _ => 0,
    }
}

/// Parse a decimal or `0x` prefixed hex literal.
///
/// Decimal scans every byte and skips non digits, so `12a3` is `123`.
/// In hex every byte shifts the value by one nibble, non hex bytes add 0.
/// Overflow wraps.
pub fn parse_uint(word: &[u8]) -> u32 {
    match word {
        [b'0', b'x' | b'X', digits @ ..] if !digits.is_empty() => digits
            .iter()
            .fold(0u32, |value, b| (value << 4) | hex_digit(*b)),
        _ => word
            .iter()
            .filter(|b| b.is_ascii_digit())
            .fold(0u32, |value, b| value.wrapping_mul(10).wrapping_add((b - b'0') as u32)),
    }
}

/// Signed variant of [`parse_uint`], an optional leading `-` or `+` sets the sign
pub fn parse_int(word: &[u8]) -> i32 {
    match word {
        [b'-', rest @ ..] => (parse_uint(rest) as i32).wrapping_neg(),
        [b'+', rest @ ..] => parse_uint(rest) as i32,
        _ => parse_uint(word) as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_uint, parse_int};

    #[test]
    fn test_decimal() {
        assert_eq!(parse_uint(b"123"), 123);
        assert_eq!(parse_uint(b"12a3"), 123);
        assert_eq!(parse_uint(b""), 0);
        assert_eq!(parse_uint(b"abc"), 0);
        assert_eq!(parse_uint(b"0"), 0);
    }

    #[test]
    fn test_hex() {
        assert_eq!(parse_uint(b"0x1A"), 26);
        assert_eq!(parse_uint(b"0XfF"), 255);
        assert_eq!(parse_uint(b"0x1g"), 0x10);
    }

    #[test]
    fn test_bare_prefix_is_decimal() {
        assert_eq!(parse_uint(b"0x"), 0);
        assert_eq!(parse_uint(b"0X"), 0);
    }

    #[test]
    fn test_overflow_wraps() {
        assert_eq!(parse_uint(b"4294967296"), 0);
        assert_eq!(parse_uint(b"0x123456789"), 0x23456789);
    }

    #[test]
    fn test_signed() {
        assert_eq!(parse_int(b"-10"), -10);
        assert_eq!(parse_int(b"+7"), 7);
        assert_eq!(parse_int(b"42"), 42);
        assert_eq!(parse_int(b"-0x10"), -16);
        assert_eq!(parse_int(b"1-2"), 12);
    }
}
