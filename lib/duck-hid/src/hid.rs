pub use hid::HID;

#[cfg(not(feature = "debug"))]
mod hid {
    use std::{fs::{OpenOptions, File}, io::{Write, self, Read}, path::Path, time::Duration, os::unix::io::AsRawFd};

    use nix::poll::{poll, PollFd, PollFlags};

    /// Keyboard and mouse gadget endpoints
    pub struct HID {
        mouse_hid: File,
        keyboard_hid: File,
    }

    impl HID {
        /// Open the keyboard and mouse endpoints, i.e. `/dev/hidg0` and `/dev/hidg1`
        pub fn new<K: AsRef<Path>, M: AsRef<Path>>(keyboard: K, mouse: M) -> io::Result<HID> {
            Ok(HID {
                mouse_hid: OpenOptions::new()
                    .read(true)
                    .write(true)
                    .open(mouse)?,
                keyboard_hid: OpenOptions::new()
                    .read(true)
                    .write(true)
                    .open(keyboard)? })
        }

        /// Wait up to `timeout` for the host's indicator (LED) output report.
        pub fn receive_states_packet(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
            let mut fds = [PollFd::new(self.keyboard_hid.as_raw_fd(), PollFlags::POLLIN)];
            let timeout = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
            if poll(&mut fds, timeout)? == 0 {
                return Ok(None)
            }

            let mut buf = [0;1];
            match self.keyboard_hid.read(&mut buf)? {
                0 => Ok(None),
                _ => Ok(Some(buf[0])),
            }
        }

        pub fn send_key_packet(&mut self, data: &[u8]) -> io::Result<usize> {
            self.keyboard_hid.write(data)
        }

        pub fn send_mouse_packet(&mut self, data: &[u8]) -> io::Result<usize> {
            self.mouse_hid.write(data)
        }
    }
}

#[cfg(feature = "debug")]
mod hid {
    use std::{io, path::Path, thread, time::Duration};

    use crate::key::KeyReport;

    /// Prints packets instead of writing to gadget endpoints
    pub struct HID {
    }

    impl HID {
        pub fn new<K: AsRef<Path>, M: AsRef<Path>>(_keyboard: K, _mouse: M) -> io::Result<HID> {
            Ok(HID {})
        }

        pub fn receive_states_packet(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
            thread::sleep(timeout);
            Ok(None)
        }

        pub fn send_key_packet(&mut self, data: &[u8]) -> io::Result<usize> {
            print!("SEND KEY: ");
            KeyReport::print_data(data);
            Ok(data.len())
        }

        pub fn send_mouse_packet(&mut self, data: &[u8]) -> io::Result<usize> {
            print!("SEND MOUSE: ");
            KeyReport::print_data(data);
            Ok(data.len())
        }
    }
}
