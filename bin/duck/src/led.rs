use std::{fs, io, path::{Path, PathBuf}};

use log::{debug, info};
use duck_script::device::{BlinkMode, Color, Indicator};

use crate::OrLog;

/// Status LED. Drives a sysfs LED when one is configured, otherwise only logs.
///
/// A sysfs LED has a single channel, so the colour becomes its brightness.
pub struct Led {
    path: Option<PathBuf>,
    enabled: bool,
    rgb: (u8, u8, u8),
    blink: u32,
    lit: Option<bool>,
}

impl Led {
    pub fn new(path: Option<PathBuf>, enabled: bool) -> Led {
        Led { path, enabled, rgb: (0, 0, 0), blink: 0, lit: None }
    }

    pub fn color(&self) -> (u8, u8, u8) {
        self.rgb
    }

    pub fn blink(&self) -> u32 {
        self.blink
    }

    fn brightness(&self) -> u8 {
        let (r, g, b) = self.rgb;
        r.max(g).max(b)
    }

    /// Whether the LED should be on at `now` ms
    pub fn is_lit(&self, now: u64) -> bool {
        if !self.enabled || self.brightness() == 0 {
            return false;
        }
        self.blink == 0 || (now / self.blink as u64) % 2 == 0
    }

    /// Apply the blink phase at `now` ms
    pub fn update(&mut self, now: u64) {
        let lit = self.is_lit(now);
        if self.lit == Some(lit) {
            return;
        }
        self.lit = Some(lit);
        if let Some(path) = &self.path {
            let value = if lit { self.brightness() } else { 0 };
            write_brightness(path, value).or_log("Unable to set LED brightness");
        }
    }
}

fn write_brightness(path: &Path, value: u8) -> io::Result<()> {
    fs::write(path.join("brightness"), value.to_string())
}

impl Indicator for Led {
    fn set_mode(&mut self, color: Color, mode: BlinkMode) {
        let (r, g, b) = match mode {
            BlinkMode::Off => (0, 0, 0),
            _ => color.to_rgb(),
        };
        debug!("LED {:?} {:?}", color, mode);
        self.set_color(r, g, b, mode.interval());
    }

    fn set_color(&mut self, r: u8, g: u8, b: u8, blink: u32) {
        info!("LED rgb({}, {}, {}) blink {} ms", r, g, b, blink);
        self.rgb = (r, g, b);
        self.blink = blink;
        self.lit = None;
    }
}
