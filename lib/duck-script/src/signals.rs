//! What the driver loop reads back after each [`Interpreter::execute`].

use std::mem;

use crate::{device::Clock, interpreter::Interpreter};

impl Interpreter {
    /// Pending repetitions of the previous command
    pub fn repeats(&self) -> u32 {
        self.repeat_num
    }

    /// Read and clear the pending repetitions
    pub fn take_repeats(&mut self) -> u32 {
        mem::take(&mut self.repeat_num)
    }

    /// The last line was `LOOP_BEGIN`
    pub fn loop_begin(&self) -> bool {
        self.loop_begin
    }

    /// The last line was `LOOP_END`
    pub fn loop_end(&self) -> bool {
        self.loop_end
    }

    /// Iterations requested by the last `LOOP_BEGIN`
    pub fn loops(&self) -> u32 {
        self.loop_num
    }

    /// Time left of the last sleep in ms
    pub fn remaining_delay(&self, clock: &dyn Clock) -> u64 {
        (self.sleep_start + self.sleep_time).saturating_sub(clock.millis())
    }

    pub fn import_pending(&self) -> bool {
        !self.import_path.is_empty()
    }

    /// Read and clear the pending import path, empty when none is pending
    pub fn take_import(&mut self) -> String {
        mem::take(&mut self.import_path)
    }

    pub fn default_delay(&self) -> u32 {
        self.default_delay
    }

    pub fn set_default_delay(&mut self, ms: u32) {
        self.default_delay = ms;
    }
}
