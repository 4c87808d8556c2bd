//! Key names usable on a plain key press line, e.g. `CTRL ALT DELETE`.

use duck_hid::key::{Modifier, SpecialKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyName {
    Special(SpecialKey),
    Modifier(Modifier),
}

/// Resolve a case sensitive key name
pub fn lookup(name: &[u8]) -> Option<KeyName> {
    use KeyName::{Special as S, Modifier as M};
    let key = match name {
        b"ENTER" => S(SpecialKey::Enter),
        b"MENU" | b"APP" => S(SpecialKey::Menu),
        b"DELETE" => S(SpecialKey::Delete),
        b"BACKSPACE" => S(SpecialKey::Backspace),
        b"HOME" => S(SpecialKey::Home),
        b"INSERT" => S(SpecialKey::Insert),
        b"PAGEUP" => S(SpecialKey::PageUp),
        b"PAGEDOWN" => S(SpecialKey::PageDown),
        b"UPARROW" | b"UP" => S(SpecialKey::UpArrow),
        b"DOWNARROW" | b"DOWN" => S(SpecialKey::DownArrow),
        b"LEFTARROW" | b"LEFT" => S(SpecialKey::LeftArrow),
        b"RIGHTARROW" | b"RIGHT" => S(SpecialKey::RightArrow),
        b"TAB" => S(SpecialKey::Tab),
        b"END" => S(SpecialKey::End),
        b"ESC" | b"ESCAPE" => S(SpecialKey::Escape),
        b"SPACE" => S(SpecialKey::Spacebar),
        b"PAUSE" | b"BREAK" => S(SpecialKey::Pause),
        b"CAPSLOCK" => S(SpecialKey::CapsLock),
        b"NUMLOCK" => S(SpecialKey::NumLock),
        b"PRINTSCREEN" => S(SpecialKey::PrintScreen),
        b"SCROLLLOCK" => S(SpecialKey::ScrollLock),

        b"F1" => S(SpecialKey::F1),
        b"F2" => S(SpecialKey::F2),
        b"F3" => S(SpecialKey::F3),
        b"F4" => S(SpecialKey::F4),
        b"F5" => S(SpecialKey::F5),
        b"F6" => S(SpecialKey::F6),
        b"F7" => S(SpecialKey::F7),
        b"F8" => S(SpecialKey::F8),
        b"F9" => S(SpecialKey::F9),
        b"F10" => S(SpecialKey::F10),
        b"F11" => S(SpecialKey::F11),
        b"F12" => S(SpecialKey::F12),

        b"NUM_0" => S(SpecialKey::Keypad0),
        b"NUM_1" => S(SpecialKey::Keypad1),
        b"NUM_2" => S(SpecialKey::Keypad2),
        b"NUM_3" => S(SpecialKey::Keypad3),
        b"NUM_4" => S(SpecialKey::Keypad4),
        b"NUM_5" => S(SpecialKey::Keypad5),
        b"NUM_6" => S(SpecialKey::Keypad6),
        b"NUM_7" => S(SpecialKey::Keypad7),
        b"NUM_8" => S(SpecialKey::Keypad8),
        b"NUM_9" => S(SpecialKey::Keypad9),
        b"NUM_ASTERIX" => S(SpecialKey::KeypadAsterisk),
        b"NUM_ENTER" => S(SpecialKey::KeypadEnter),
        b"NUM_MINUS" => S(SpecialKey::KeypadMinus),
        b"NUM_DOT" => S(SpecialKey::KeypadDot),
        b"NUM_PLUS" => S(SpecialKey::KeypadPlus),

        b"CTRL" | b"CONTROL" => M(Modifier::LeftControl),
        b"SHIFT" => M(Modifier::LeftShift),
        b"ALT" => M(Modifier::LeftAlt),
        b"ALTGR" => M(Modifier::RightAlt),
        b"WINDOWS" | b"GUI" | b"COMMAND" => M(Modifier::LeftMeta),
        _ => return None,
    };
    Some(key)
}

/// Iterate the characters of a byte string, skipping invalid UTF-8 sequences
pub fn chars(bytes: &[u8]) -> impl Iterator<Item = char> + '_ {
    bytes.utf8_chunks().flat_map(|chunk| chunk.valid().chars())
}
