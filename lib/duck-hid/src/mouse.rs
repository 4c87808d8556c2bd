use std::io;

use crate::HID;

const MOUSE_DATA_BUT_IDX: usize = 0;
const MOUSE_DATA_X_IDX: usize = 1;
const MOUSE_DATA_Y_IDX: usize = 2;
const MOUSE_DATA_WHEL_IDX: usize = 3;
const MOUSE_DATA_PAN_IDX: usize = 4;
const MOUSE_DATA_LEN: usize = 5;

/// Left button bit
pub const MOUSE_LEFT: u8 = 0x01;
/// Right button bit
pub const MOUSE_RIGHT: u8 = 0x02;
/// Middle button bit
pub const MOUSE_MIDDLE: u8 = 0x04;

/// Relative mouse, buffers reports until [`Mouse::send`]
pub struct Mouse {
    buttons: u8,
    packets: Vec<[u8; MOUSE_DATA_LEN]>,
}

/// Split a displacement into steps that each fit a signed report byte
fn steps(displacement: i32) -> impl Iterator<Item = i8> {
    let count = (displacement.unsigned_abs() + 126) / 127;
    let sign = displacement.signum();
    let mut remaining = displacement.unsigned_abs();
    (0..count).map(move |_| {
        let step = remaining.min(127);
        remaining -= step;
        (step as i32 * sign) as i8
    })
}

impl Mouse {
    pub fn new() -> Mouse {
        Mouse { buttons: 0, packets: Vec::new() }
    }

    fn packet(&self, x: i8, y: i8, wheel: i8, pan: i8) -> [u8; MOUSE_DATA_LEN] {
        let mut data = [0; MOUSE_DATA_LEN];
        data[MOUSE_DATA_BUT_IDX] = self.buttons;
        data[MOUSE_DATA_X_IDX] = x as u8;
        data[MOUSE_DATA_Y_IDX] = y as u8;
        data[MOUSE_DATA_WHEL_IDX] = wheel as u8;
        data[MOUSE_DATA_PAN_IDX] = pan as u8;
        data
    }

    /// Currently held buttons
    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    /// Buffered reports not yet sent
    pub fn pending(&self) -> &[[u8; MOUSE_DATA_LEN]] {
        &self.packets
    }

    pub fn press(&mut self, buttons: u8) {
        self.buttons |= buttons;
        self.packets.push(self.packet(0, 0, 0, 0));
    }

    pub fn release(&mut self, buttons: u8) {
        self.buttons &= !buttons;
        self.packets.push(self.packet(0, 0, 0, 0));
    }

    pub fn click(&mut self, buttons: u8) {
        self.press(buttons);
        self.release(buttons);
    }

    /// Move by (x, y); displacements beyond a report byte are split over several reports
    pub fn move_by(&mut self, x: i32, y: i32) {
        let mut xs = steps(x);
        let mut ys = steps(y);
        loop {
            match (xs.next(), ys.next()) {
                (None, None) => break,
                (x, y) => self.packets.push(self.packet(x.unwrap_or(0), y.unwrap_or(0), 0, 0)),
            }
        }
    }

    /// Scroll the wheel (vertical) and pan (horizontal)
    pub fn scroll(&mut self, vertical: i32, horizontal: i32) {
        let mut vs = steps(vertical);
        let mut hs = steps(horizontal);
        loop {
            match (vs.next(), hs.next()) {
                (None, None) => break,
                (v, h) => self.packets.push(self.packet(0, 0, v.unwrap_or(0), h.unwrap_or(0))),
            }
        }
    }

    pub fn send(&mut self, hid: &mut HID) -> io::Result<usize> {
        let mut size = 0;
        for packet in self.packets.drain(..) {
            size += hid.send_mouse_packet(&packet)?;
        }
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::{Mouse, MOUSE_LEFT, MOUSE_RIGHT};

    #[test]
    fn test_click() {
        let mut mouse = Mouse::new();
        mouse.click(MOUSE_RIGHT);
        assert_eq!(mouse.pending(), &[[MOUSE_RIGHT, 0, 0, 0, 0], [0, 0, 0, 0, 0]]);
        assert_eq!(mouse.buttons(), 0);
    }

    #[test]
    fn test_move_split() {
        let mut mouse = Mouse::new();
        mouse.press(MOUSE_LEFT);
        mouse.move_by(300, -5);
        let packets = &mouse.pending()[1..];
        assert_eq!(packets.len(), 3);
        assert_eq!(packets[0], [MOUSE_LEFT, 127, (-5i8) as u8, 0, 0]);
        assert_eq!(packets[1], [MOUSE_LEFT, 127, 0, 0, 0]);
        assert_eq!(packets[2], [MOUSE_LEFT, 46, 0, 0, 0]);
    }

    #[test]
    fn test_scroll() {
        let mut mouse = Mouse::new();
        mouse.scroll(-3, 2);
        assert_eq!(mouse.pending(), &[[0, 0, 0, (-3i8) as u8, 2]]);
    }

    #[test]
    fn test_zero_move_sends_nothing() {
        let mut mouse = Mouse::new();
        mouse.move_by(0, 0);
        assert!(mouse.pending().is_empty());
    }
}
