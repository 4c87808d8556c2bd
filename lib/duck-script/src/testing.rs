use duck_hid::key::{KeyReport, Modifier, SpecialKey};

use crate::device::{BlinkMode, Clock, Color, Indicator, InputDevice, Scheduler};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Write(char),
    Press(char),
    Key(SpecialKey),
    Modifier(Modifier),
    Release,
    Report(KeyReport),
    Locale(String),
    Move(i32, i32),
    Click(u8),
    MousePress(u8),
    MouseRelease(u8),
    Scroll(i32, i32),
    Mode(Color, BlinkMode),
    Color(u8, u8, u8, u32),
}

/// Records device calls on a fake clock. Each recorded call costs `cost` ms.
#[derive(Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
    pub now: u64,
    pub cost: u64,
    pub slept: u64,
    pub ticks: usize,
}

impl Recorder {
    pub fn new() -> Recorder {
        Recorder::default()
    }

    fn record(&mut self, call: Call) {
        self.now += self.cost;
        self.calls.push(call);
    }

    pub fn typed(&self) -> String {
        self.calls.iter()
            .filter_map(|call| match call {
                Call::Write(c) => Some(*c),
                _ => None,
            })
            .collect()
    }
}

impl Clock for Recorder {
    fn millis(&self) -> u64 {
        self.now
    }

    fn delay(&mut self, ms: u64) {
        self.now += ms;
        self.slept += ms;
    }
}

impl Scheduler for Recorder {
    fn tick(&mut self) {
        self.ticks += 1;
    }
}

impl InputDevice for Recorder {
    fn write_char(&mut self, c: char) {
        self.record(Call::Write(c));
    }

    fn press_char(&mut self, c: char) {
        self.record(Call::Press(c));
    }

    fn press_key(&mut self, key: SpecialKey) {
        self.record(Call::Key(key));
    }

    fn press_modifier(&mut self, modifier: Modifier) {
        self.record(Call::Modifier(modifier));
    }

    fn release(&mut self) {
        self.record(Call::Release);
    }

    fn send_report(&mut self, report: &KeyReport) {
        self.record(Call::Report(*report));
    }

    fn set_locale(&mut self, name: &str) {
        self.record(Call::Locale(name.to_string()));
    }

    fn mouse_move(&mut self, x: i32, y: i32) {
        self.record(Call::Move(x, y));
    }

    fn mouse_click(&mut self, buttons: u8) {
        self.record(Call::Click(buttons));
    }

    fn mouse_press(&mut self, buttons: u8) {
        self.record(Call::MousePress(buttons));
    }

    fn mouse_release(&mut self, buttons: u8) {
        self.record(Call::MouseRelease(buttons));
    }

    fn mouse_scroll(&mut self, vertical: i32, horizontal: i32) {
        self.record(Call::Scroll(vertical, horizontal));
    }
}

impl Indicator for Recorder {
    fn set_mode(&mut self, color: Color, mode: BlinkMode) {
        self.record(Call::Mode(color, mode));
    }

    fn set_color(&mut self, r: u8, g: u8, b: u8, blink: u32) {
        self.record(Call::Color(r, g, b, blink));
    }
}
