//! Collaborators the interpreter drives.
//!
//! Calls are infallible from the interpreter's point of view; implementations
//! report their own I/O failures.

use duck_hid::key::{KeyReport, Modifier, SpecialKey};

/// Monotonic millisecond clock
pub trait Clock {
    fn millis(&self) -> u64;
    /// Block for `ms` milliseconds
    fn delay(&mut self, ms: u64);
}

/// Cooperative scheduler, ticked during long sleeps and while typing
pub trait Scheduler {
    fn tick(&mut self);
}

/// Keyboard and mouse
pub trait InputDevice {
    /// Press and release the key producing `c`, held keys stay held
    fn write_char(&mut self, c: char);
    /// Hold the key producing `c`
    fn press_char(&mut self, c: char);
    fn press_key(&mut self, key: SpecialKey);
    fn press_modifier(&mut self, modifier: Modifier);
    /// Release every held key and modifier
    fn release(&mut self);
    fn send_report(&mut self, report: &KeyReport);
    /// Switch the keyboard layout by name, unknown names keep the current layout
    fn set_locale(&mut self, name: &str);

    fn mouse_move(&mut self, x: i32, y: i32);
    fn mouse_click(&mut self, buttons: u8);
    fn mouse_press(&mut self, buttons: u8);
    fn mouse_release(&mut self, buttons: u8);
    fn mouse_scroll(&mut self, vertical: i32, horizontal: i32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Blue,
}

impl Color {
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Red => (255, 0, 0),
            Color::Green => (0, 255, 0),
            Color::Blue => (0, 0, 255),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkMode {
    Solid,
    Slow,
    Fast,
    Off,
}

impl BlinkMode {
    pub const SLOW_INTERVAL: u32 = 1000;
    pub const FAST_INTERVAL: u32 = 200;

    /// Blink interval in ms, 0 for a steady light
    pub fn interval(&self) -> u32 {
        match self {
            BlinkMode::Solid | BlinkMode::Off => 0,
            BlinkMode::Slow => Self::SLOW_INTERVAL,
            BlinkMode::Fast => Self::FAST_INTERVAL,
        }
    }
}

/// Status LED
pub trait Indicator {
    fn set_mode(&mut self, color: Color, mode: BlinkMode);
    /// Set an RGB colour blinking every `blink` ms, 0 for steady
    fn set_color(&mut self, r: u8, g: u8, b: u8, blink: u32);
}

/// Everything the interpreter needs from the device
pub trait Device: InputDevice + Indicator + Clock + Scheduler {}

impl<T: InputDevice + Indicator + Clock + Scheduler + ?Sized> Device for T {}
