use std::{io, thread, time::{Duration, Instant}};

use log::{debug, warn};
use duck_hid::{HID, key::{Keyboard, KeyReport, Modifier, SpecialKey, LEDState}, locale::Locale, mouse::Mouse};
use duck_script::device::{BlinkMode, Clock, Color, Indicator, InputDevice, Scheduler};

use crate::{led::Led, OrLog};

const INDICATOR_POLL: Duration = Duration::from_millis(100);

/// The USB gadget the interpreter types on: keyboard and mouse endpoints plus the status LED
pub struct Gadget {
    hid: HID,
    keyboard: Keyboard,
    mouse: Mouse,
    led: Led,
    start: Instant,
}

impl Gadget {
    pub fn new(hid: HID, led: Led) -> Gadget {
        Gadget { hid, keyboard: Keyboard::new(), mouse: Mouse::new(), led, start: Instant::now() }
    }

    pub fn locale(&self) -> Locale {
        self.keyboard.locale()
    }

    fn send_keyboard(&mut self) {
        self.keyboard.send(&mut self.hid).or_log("Unable to send keyboard report");
    }

    fn send_mouse(&mut self) {
        self.mouse.send(&mut self.hid).or_log("Unable to send mouse report");
    }

    /// Block until the host changes its lock key indicators.
    /// The first report received only sets the baseline.
    pub fn wait_for_indicator(&mut self) -> io::Result<()> {
        let mut last: Option<u8> = None;
        loop {
            self.tick();
            let Some(state) = self.hid.receive_states_packet(INDICATOR_POLL)? else {
                continue;
            };
            debug!(
                "Indicators caps {} num {} scroll {}",
                LEDState::CapsLock.get_state(state),
                LEDState::NumLock.get_state(state),
                LEDState::ScrollLock.get_state(state),
            );
            match last {
                Some(prev) if prev != state => return Ok(()),
                _ => last = Some(state),
            }
        }
    }
}

impl Clock for Gadget {
    fn millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn delay(&mut self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}

impl Scheduler for Gadget {
    fn tick(&mut self) {
        let now = self.millis();
        self.led.update(now);
    }
}

impl InputDevice for Gadget {
    fn write_char(&mut self, c: char) {
        if self.keyboard.write_char(&c).is_none() {
            warn!("No key for {:?} in layout {}", c, self.keyboard.locale());
        }
        self.send_keyboard();
    }

    fn press_char(&mut self, c: char) {
        if self.keyboard.press_char(&c).is_none() {
            warn!("No key for {:?} in layout {}", c, self.keyboard.locale());
        }
        self.send_keyboard();
    }

    fn press_key(&mut self, key: SpecialKey) {
        self.keyboard.press_special(&key);
        self.send_keyboard();
    }

    fn press_modifier(&mut self, modifier: Modifier) {
        self.keyboard.press_modifier(&modifier);
        self.send_keyboard();
    }

    fn release(&mut self) {
        self.keyboard.release();
        self.send_keyboard();
    }

    fn send_report(&mut self, report: &KeyReport) {
        self.keyboard.press_report(*report);
        self.send_keyboard();
    }

    fn set_locale(&mut self, name: &str) {
        match name.parse::<Locale>() {
            Ok(locale) => {
                debug!("Layout {}", locale);
                self.keyboard.set_locale(locale);
            },
            Err(e) => warn!("{}, keeping {}", e, self.keyboard.locale()),
        }
    }

    fn mouse_move(&mut self, x: i32, y: i32) {
        self.mouse.move_by(x, y);
        self.send_mouse();
    }

    fn mouse_click(&mut self, buttons: u8) {
        self.mouse.click(buttons);
        self.send_mouse();
    }

    fn mouse_press(&mut self, buttons: u8) {
        self.mouse.press(buttons);
        self.send_mouse();
    }

    fn mouse_release(&mut self, buttons: u8) {
        self.mouse.release(buttons);
        self.send_mouse();
    }

    fn mouse_scroll(&mut self, vertical: i32, horizontal: i32) {
        self.mouse.scroll(vertical, horizontal);
        self.send_mouse();
    }
}

impl Indicator for Gadget {
    fn set_mode(&mut self, color: Color, mode: BlinkMode) {
        self.led.set_mode(color, mode);
        self.tick();
    }

    fn set_color(&mut self, r: u8, g: u8, b: u8, blink: u32) {
        self.led.set_color(r, g, b, blink);
        self.tick();
    }
}
