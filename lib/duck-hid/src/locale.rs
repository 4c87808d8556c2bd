//! Keyboard layouts, mapping characters to `[modifier, usage]` pairs.

use std::{fmt::Display, str::FromStr};

use serde::{Serialize, Deserialize};

use crate::key::{Modifier, SpecialKey};

const SHIFT: u8 = 0x02; // Modifier::LeftShift
const ALTGR: u8 = 0x40; // Modifier::RightAlt

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Host keyboard layout the gadget types for
pub enum Locale {
    #[default]
    /// United States
    US,
    /// United Kingdom
    GB,
    /// Germany (QWERTZ)
    DE,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Unknown layout name
pub struct UnknownLocale(pub String);

impl Display for UnknownLocale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("Unknown keyboard layout \"{}\"", self.0))
    }
}

impl std::error::Error for UnknownLocale {}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" | "EN_US" => Ok(Locale::US),
            "GB" | "UK" | "EN_GB" => Ok(Locale::GB),
            "DE" | "DE_DE" => Ok(Locale::DE),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::US => f.write_str("US"),
            Locale::GB => f.write_str("GB"),
            Locale::DE => f.write_str("DE"),
        }
    }
}

impl Locale {
    /// Key bytes (modifier, usage) producing `c`, None if the layout has no key for it
    pub fn to_kbytes(&self, c: char) -> Option<[u8; 2]> {
        match self {
            Locale::US => us(c),
            Locale::GB => gb(c).or_else(|| us(c)),
            Locale::DE => de(c).or_else(|| {
                if c.is_ascii_alphanumeric() || c.is_ascii_whitespace() {
                    us(c)
                } else {
                    None
                }
            }),
        }
    }
}

fn n(usage: u8) -> Option<[u8; 2]> {
    Some([0x00, usage])
}

fn s(usage: u8) -> Option<[u8; 2]> {
    Some([SHIFT, usage])
}

fn a(usage: u8) -> Option<[u8; 2]> {
    Some([ALTGR, usage])
}

fn us(c: char) -> Option<[u8; 2]> {
    match c {
        '\n' => n(SpecialKey::Enter.to_kbyte()),
        '\t' => n(SpecialKey::Tab.to_kbyte()),
        ' ' => n(SpecialKey::Spacebar.to_kbyte()),
        'a'..='z' => n(0x04 + (c as u8 - b'a')),
        'A'..='Z' => Some([Modifier::LeftShift.to_mkbyte(), 0x04 + (c as u8 - b'A')]),
        '1'..='9' => n(0x1E + (c as u8 - b'1')),
        '0' => n(0x27),
        '!' => s(0x1E),
        '@' => s(0x1F),
        '#' => s(0x20),
        '$' => s(0x21),
        '%' => s(0x22),
        '^' => s(0x23),
        '&' => s(0x24),
        '*' => s(0x25),
        '(' => s(0x26),
        ')' => s(0x27),
        '-' => n(0x2D),
        '_' => s(0x2D),
        '=' => n(0x2E),
        '+' => s(0x2E),
        '[' => n(0x2F),
        '{' => s(0x2F),
        ']' => n(0x30),
        '}' => s(0x30),
        '\\' => n(0x31),
        '|' => s(0x31),
        ';' => n(0x33),
        ':' => s(0x33),
        '\'' => n(0x34),
        '"' => s(0x34),
        '`' => n(0x35),
        '~' => s(0x35),
        ',' => n(0x36),
        '<' => s(0x36),
        '.' => n(0x37),
        '>' => s(0x37),
        '/' => n(0x38),
        '?' => s(0x38),
        _ => None,
    }
}

fn gb(c: char) -> Option<[u8; 2]> {
    match c {
        '"' => s(0x1F),
        '£' => s(0x20),
        '@' => s(0x34),
        '#' => n(0x32),
        '~' => s(0x32),
        '\\' => n(0x64),
        '|' => s(0x64),
        '¬' => s(0x35),
        '€' => a(0x21),
        _ => None,
    }
}

fn de(c: char) -> Option<[u8; 2]> {
    match c {
        'y' => n(0x1D),
        'Y' => s(0x1D),
        'z' => n(0x1C),
        'Z' => s(0x1C),
        '!' => s(0x1E),
        '"' => s(0x1F),
        '§' => s(0x20),
        '$' => s(0x21),
        '%' => s(0x22),
        '&' => s(0x23),
        '/' => s(0x24),
        '(' => s(0x25),
        ')' => s(0x26),
        '=' => s(0x27),
        'ß' => n(0x2D),
        '?' => s(0x2D),
        '\\' => a(0x2D),
        '´' => n(0x2E),
        '`' => s(0x2E),
        'ü' => n(0x2F),
        'Ü' => s(0x2F),
        '+' => n(0x30),
        '*' => s(0x30),
        '~' => a(0x30),
        '#' => n(0x32),
        '\'' => s(0x32),
        'ö' => n(0x33),
        'Ö' => s(0x33),
        'ä' => n(0x34),
        'Ä' => s(0x34),
        '^' => n(0x35),
        '°' => s(0x35),
        ',' => n(0x36),
        ';' => s(0x36),
        '.' => n(0x37),
        ':' => s(0x37),
        '-' => n(0x38),
        '_' => s(0x38),
        '<' => n(0x64),
        '>' => s(0x64),
        '|' => a(0x64),
        '@' => a(0x14),
        '€' => a(0x08),
        '{' => a(0x24),
        '[' => a(0x25),
        ']' => a(0x26),
        '}' => a(0x27),
        _ => None,
    }
}
