#![warn(missing_docs)]

use std::io;

use crate::{HID, locale::Locale};

const KEY_REPORT_LEN: usize = 8;
const KEY_REPORT_MOD_IDX: usize = 0;
const KEY_REPORT_KEY_IDX: usize = 2;
const KEY_REPORT_SLOTS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// LED State Types
pub enum LEDState {
    /// Kana
    Kana,
    /// Compose
    Compose,
    /// ScrollLock
    ScrollLock,
    /// CapsLock
    CapsLock,
    /// NumLock
    NumLock,
}

impl LEDState {
    /// Get the state of a LED State Type from a host output report.
    /// True means on
    /// False means off
    pub fn get_state(&self, packet: u8) -> bool {
        match self {
            LEDState::Kana => packet & (0x01 << 4) != 0,
            LEDState::Compose => packet & (0x01 << 3) != 0,
            LEDState::ScrollLock => packet & (0x01 << 2) != 0,
            LEDState::CapsLock => packet & (0x01 << 1) != 0,
            LEDState::NumLock => packet & 0x01 != 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Boot protocol keyboard report: modifier byte, reserved byte, six key slots
pub struct KeyReport {
    /// Modifier bitmask
    pub modifiers: u8,
    /// Pressed key usages, 0 for an empty slot
    pub keys: [u8; KEY_REPORT_SLOTS],
}

impl KeyReport {
    /// New, empty report (all keys up)
    pub fn new() -> KeyReport {
        KeyReport::default()
    }

    /// Create from a modifier byte and up to six raw key usages
    pub fn from_raw(modifiers: u8, keys: [u8; KEY_REPORT_SLOTS]) -> KeyReport {
        KeyReport { modifiers, keys }
    }

    /// Add a key usage to the first free slot.
    /// Returns false when all six slots are taken (the key is dropped).
    pub fn add_key(&mut self, usage: u8) -> bool {
        if usage == 0 || self.contains_key(usage) {
            return true
        }
        match self.keys.iter_mut().find(|slot| **slot == 0) {
            Some(slot) => {
                *slot = usage;
                true
            }
            None => false,
        }
    }

    /// Check if report contains the key usage
    pub fn contains_key(&self, usage: u8) -> bool {
        self.keys.iter().any(|key| *key == usage)
    }

    /// Add modifier bits to report
    pub fn add_mod(&mut self, modifiers: u8) {
        self.modifiers |= modifiers;
    }

    /// True when no key and no modifier is held
    pub fn is_empty(&self) -> bool {
        self.modifiers == 0 && self.keys.iter().all(|key| *key == 0)
    }

    /// Wire format
    pub fn to_bytes(&self) -> [u8; KEY_REPORT_LEN] {
        let mut data = [0; KEY_REPORT_LEN];
        data[KEY_REPORT_MOD_IDX] = self.modifiers;
        data[KEY_REPORT_KEY_IDX..].copy_from_slice(&self.keys);
        data
    }

    /// Send report to hid interface
    pub fn send(&self, hid: &mut HID) -> io::Result<usize> {
        hid.send_key_packet(&self.to_bytes())
    }

    /// Print packet data
    pub fn print_data(data: &[u8]) {
        for data in data {
            print!("{:02x}", data);
        }
        println!();
    }
}

/// Virtual Keyboard
///
/// Keeps the currently held keys and buffers every report change until
/// [`Keyboard::send`] flushes them to the gadget.
pub struct Keyboard {
    reports: Vec<KeyReport>,
    holding: KeyReport,
    locale: Locale,
}

impl Keyboard {
    /// New
    pub fn new() -> Keyboard {
        Keyboard { reports: Vec::new(), holding: KeyReport::new(), locale: Locale::default() }
    }

    /// Active layout used for characters
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Switch the layout used for characters
    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    /// Currently held keys
    pub fn holding(&self) -> &KeyReport {
        &self.holding
    }

    /// Buffered reports not yet sent
    pub fn pending(&self) -> &[KeyReport] {
        &self.reports
    }

    /// Hold special key down
    pub fn press_special(&mut self, special: &SpecialKey) {
        self.holding.add_key(special.to_kbyte());
        self.reports.push(self.holding);
    }

    /// Hold modifier key down
    pub fn press_modifier(&mut self, modifier: &Modifier) {
        self.holding.add_mod(modifier.to_mkbyte());
        self.reports.push(self.holding);
    }

    /// Hold the key producing `c` in the active layout down.
    /// None if the layout cannot produce the character.
    pub fn press_char(&mut self, c: &char) -> Option<()> {
        let kbytes = self.locale.to_kbytes(*c)?;
        self.holding.add_mod(kbytes[0]);
        self.holding.add_key(kbytes[1]);
        self.reports.push(self.holding);
        Some(())
    }

    /// Press and release the key producing `c`, leaving held keys untouched.
    pub fn write_char(&mut self, c: &char) -> Option<()> {
        let kbytes = self.locale.to_kbytes(*c)?;
        let mut report = self.holding;
        report.add_mod(kbytes[0]);
        report.add_key(kbytes[1]);
        self.reports.push(report);
        self.reports.push(self.holding);
        Some(())
    }

    /// Send a raw report as is
    pub fn press_report(&mut self, report: KeyReport) {
        self.holding = report;
        self.reports.push(report);
    }

    /// Release every held key and modifier
    pub fn release(&mut self) {
        self.holding = KeyReport::new();
        self.reports.push(self.holding);
    }

    /// Flush Buffered keystrokes to HID interface
    pub fn send(&mut self, hid: &mut HID) -> io::Result<usize> {
        let mut size = 0;
        for report in self.reports.drain(..) {
            size += report.send(hid)?;
        }
        Ok(size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Modifier Keys
pub enum Modifier {
    /// Left Control
    LeftControl,
    /// Left Shift
    LeftShift,
    /// Left Alt
    LeftAlt,
    /// Left Meta
    LeftMeta,
    /// Right Control
    RightControl,
    /// Right Shift
    RightShift,
    /// Right Alt
    RightAlt,
    /// Right Meta
    RightMeta,
}

impl Modifier {
    /// A list of modifiers to keycode bytes
    pub fn all_to_byte(modifiers: &[Modifier]) -> u8 {
        modifiers.iter()
            .map(|modi| modi.to_mkbyte())
            .reduce(|accum, byte| accum | byte)
            .unwrap_or(0)
    }

    ///Modifier to bytes
    pub fn to_mkbyte(&self) -> u8 {
        let base = 0x00000001;
        match self {
            Modifier::RightMeta => base << 7,
            Modifier::RightAlt => base << 6,
            Modifier::RightShift => base << 5,
            Modifier::RightControl => base << 4,
            Modifier::LeftMeta => base << 3,
            Modifier::LeftAlt => base << 2,
            Modifier::LeftShift => base << 1,
            Modifier::LeftControl => base,
        }
    }
}

#[derive(Debug, Eq, Hash, PartialEq, Clone, Copy)]
/// Special Key
pub enum SpecialKey {
    /// Enter
    Enter,
    /// Escape
    Escape,
    /// Backspace
    Backspace,
    /// Tab
    Tab,
    /// Spacebar
    Spacebar,
    /// CapsLock
    CapsLock,
    /// F1
    F1,
    /// F2
    F2,
    /// F3
    F3,
    /// F4
    F4,
    /// F5
    F5,
    /// F6
    F6,
    /// F7
    F7,
    /// F8
    F8,
    /// F9
    F9,
    /// F10
    F10,
    /// F11
    F11,
    /// F12
    F12,
    /// PrintScreen (SysRq)
    PrintScreen,
    /// ScrollLock
    ScrollLock,
    /// Pause
    Pause,
    /// Insert
    Insert,
    /// Home
    Home,
    /// PageUp
    PageUp,
    /// Delete forward
    Delete,
    /// End
    End,
    /// PageDown
    PageDown,
    /// RightArrow
    RightArrow,
    /// LeftArrow
    LeftArrow,
    /// DownArrow
    DownArrow,
    /// UpArrow
    UpArrow,
    /// NumLock
    NumLock,
    /// Keypad *
    KeypadAsterisk,
    /// Keypad -
    KeypadMinus,
    /// Keypad +
    KeypadPlus,
    /// Keypad Enter
    KeypadEnter,
    /// Keypad 1
    Keypad1,
    /// Keypad 2
    Keypad2,
    /// Keypad 3
    Keypad3,
    /// Keypad 4
    Keypad4,
    /// Keypad 5
    Keypad5,
    /// Keypad 6
    Keypad6,
    /// Keypad 7
    Keypad7,
    /// Keypad 8
    Keypad8,
    /// Keypad 9
    Keypad9,
    /// Keypad 0
    Keypad0,
    /// Keypad .
    KeypadDot,
    /// Non-US \ and |
    NonUSBackslash,
    /// Application
    Application,
    /// Menu (props)
    Menu,
}

impl SpecialKey {
    /// Special Key to Byte
    pub fn to_kbyte(&self) -> u8 {
        match self {
            SpecialKey::Enter => 0x28, // 40, 0x28, Keyboard, ReturnEnter
            SpecialKey::Escape => 0x29, // 41, 0x29, Keyboard, Escape
            SpecialKey::Backspace => 0x2A, // 42, 0x2A, Keyboard, Backspace
            SpecialKey::Tab => 0x2B, // 43, 0x2B, Keyboard, Tab
            SpecialKey::Spacebar => 0x2C, // 44, 0x2C, Keyboard, Spacebar
            SpecialKey::CapsLock => 0x39, // 57, 0x39, Keyboard, CapsLock
            SpecialKey::F1 => 0x3A, // 58, 0x3A, Keyboard, F1
            SpecialKey::F2 => 0x3B, // 59, 0x3B, Keyboard, F2
            SpecialKey::F3 => 0x3C, // 60, 0x3C, Keyboard, F3
            SpecialKey::F4 => 0x3D, // 61, 0x3D, Keyboard, F4
            SpecialKey::F5 => 0x3E, // 62, 0x3E, Keyboard, F5
            SpecialKey::F6 => 0x3F, // 63, 0x3F, Keyboard, F6
            SpecialKey::F7 => 0x40, // 64, 0x40, Keyboard, F7
            SpecialKey::F8 => 0x41, // 65, 0x41, Keyboard, F8
            SpecialKey::F9 => 0x42, // 66, 0x42, Keyboard, F9
            SpecialKey::F10 => 0x43, // 67, 0x43, Keyboard, F10
            SpecialKey::F11 => 0x44, // 68, 0x44, Keyboard, F11
            SpecialKey::F12 => 0x45, // 69, 0x45, Keyboard, F12
            SpecialKey::PrintScreen => 0x46, // 70, 0x46, Keyboard, PrintScreen
            SpecialKey::ScrollLock => 0x47, // 71, 0x47, Keyboard, ScrollLock
            SpecialKey::Pause => 0x48, // 72, 0x48, Keyboard, Pause
            SpecialKey::Insert => 0x49, // 73, 0x49, Keyboard, Insert
            SpecialKey::Home => 0x4A, // 74, 0x4A, Keyboard, Home
            SpecialKey::PageUp => 0x4B, // 75, 0x4B, Keyboard, PageUp
            SpecialKey::Delete => 0x4C, // 76, 0x4C, Keyboard, DeleteForward
            SpecialKey::End => 0x4D, // 77, 0x4D, Keyboard, End
            SpecialKey::PageDown => 0x4E, // 78, 0x4E, Keyboard, PageDown
            SpecialKey::RightArrow => 0x4F, // 79, 0x4F, Keyboard, RightArrow
            SpecialKey::LeftArrow => 0x50, // 80, 0x50, Keyboard, LeftArrow
            SpecialKey::DownArrow => 0x51, // 81, 0x51, Keyboard, DownArrow
            SpecialKey::UpArrow => 0x52, // 82, 0x52, Keyboard, UpArrow
            SpecialKey::NumLock => 0x53, // 83, 0x53, Keypad, NumLockAndClear
            SpecialKey::KeypadAsterisk => 0x55, // 85, 0x55, Keypad, '*'
            SpecialKey::KeypadMinus => 0x56, // 86, 0x56, Keypad, '-'
            SpecialKey::KeypadPlus => 0x57, // 87, 0x57, Keypad, '+'
            SpecialKey::KeypadEnter => 0x58, // 88, 0x58, Keypad, ENTER
            SpecialKey::Keypad1 => 0x59, // 89, 0x59, Keypad, _1AndEnd
            SpecialKey::Keypad2 => 0x5A, // 90, 0x5A, Keypad, _2AndDownArrow
            SpecialKey::Keypad3 => 0x5B, // 91, 0x5B, Keypad, _3AndPageDn
            SpecialKey::Keypad4 => 0x5C, // 92, 0x5C, Keypad, _4AndLeftArrow
            SpecialKey::Keypad5 => 0x5D, // 93, 0x5D, Keypad, _5
            SpecialKey::Keypad6 => 0x5E, // 94, 0x5E, Keypad, _6AndRightArrow
            SpecialKey::Keypad7 => 0x5F, // 95, 0x5F, Keypad, _7AndHome
            SpecialKey::Keypad8 => 0x60, // 96, 0x60, Keypad, _8AndUpArrow
            SpecialKey::Keypad9 => 0x61, // 97, 0x61, Keypad, _9AndPageUp
            SpecialKey::Keypad0 => 0x62, // 98, 0x62, Keypad, _0AndInsert
            SpecialKey::KeypadDot => 0x63, // 99, 0x63, Keypad, _DotAndDelete
            SpecialKey::NonUSBackslash => 0x64, // 100, 0x64, Keyboard, NonUSSlashAndPipe
            SpecialKey::Application => 0x65, // 101, 0x65, Keyboard, Application
            SpecialKey::Menu => 0x76, // 118, 0x76, Keyboard, Menu
        }
    }
}
