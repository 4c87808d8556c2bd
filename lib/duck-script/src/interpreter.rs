//! Line interpreter.
//!
//! [`Interpreter::execute`] runs every line of a buffer against a [`Device`].
//! State survives between calls, so a line split over two buffers (a string
//! longer than the read buffer, a block comment, a verbatim block) continues
//! where the last call stopped. Repetition, loops and imports are only
//! signalled, see the accessors in `signals.rs`; the caller decides which
//! buffer comes next.

use log::trace;

use duck_hid::key::{KeyReport, SpecialKey};

use crate::{
    device::{BlinkMode, Clock, Color, Device, Scheduler},
    keys::{self, KeyName},
    number::{parse_int, parse_uint},
    tokenizer::{self, Line, Word},
};

/// Inter-command delay until `DEFAULTDELAY` says otherwise
pub const DEFAULT_DELAY: u32 = 5;
/// Sleeps shorter than this block in one go, longer ones tick the scheduler
const SHORT_SLEEP: u64 = 50;
/// Scheduler tick interval while typing, in characters
const TICK_EVERY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// What the next line continues
pub enum Mode {
    #[default]
    None,
    /// Unterminated `REM`/`#` line
    LineComment,
    /// Between `###` lines
    BlockComment,
    /// Unterminated `STRING` (`line_feed` false) or `STRINGLN` line
    RawString { line_feed: bool },
    /// Between `LSTRING_BEGIN` and `LSTRING_END`
    Verbatim,
}

impl Mode {
    pub fn is_active(&self) -> bool {
        *self != Mode::None
    }

    /// Block comments and verbatim blocks only exit to `None`. A line
    /// comment or raw string is replaced by any mode entered on its line.
    fn transition(&mut self, next: Mode) {
        debug_assert!(
            next == Mode::None
                || !matches!(self, Mode::BlockComment | Mode::Verbatim)
                || *self == next,
            "{:?} -> {:?}", self, next
        );
        *self = next;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Charge {
    DefaultDelay,
    NoDelay,
    /// A `REPEAT` line, keeps its own repeat credit
    Repeat,
}

#[derive(Debug)]
pub struct Interpreter {
    pub(crate) mode: Mode,
    pub(crate) default_delay: u32,
    pub(crate) repeat_num: u32,
    pub(crate) loop_num: u32,
    pub(crate) loop_begin: bool,
    pub(crate) loop_end: bool,
    pub(crate) import_path: String,
    /// When the current line started, for drift compensation
    pub(crate) timestamp: u64,
    pub(crate) sleep_start: u64,
    pub(crate) sleep_time: u64,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter {
            mode: Mode::None,
            default_delay: DEFAULT_DELAY,
            repeat_num: 0,
            loop_num: 0,
            loop_begin: false,
            loop_end: false,
            import_path: String::new(),
            timestamp: 0,
            sleep_start: 0,
            sleep_time: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Run every line of `buffer`
    pub fn execute<D: Device + ?Sized>(&mut self, buffer: &[u8], dev: &mut D) {
        self.timestamp = dev.millis();

        for line in tokenizer::lines(buffer) {
            self.loop_begin = false;
            self.loop_end = false;
            trace!("{:?} {:?}", self.mode, line);

            let charge = self.dispatch(&line, dev);

            if !self.mode.is_active() && charge == Charge::DefaultDelay {
                self.sleep(self.default_delay as u64, dev);
            }
            if line.is_terminated() && self.repeat_num > 0 && charge != Charge::Repeat {
                self.repeat_num -= 1;
            }

            self.timestamp = dev.millis();
            dev.tick();
        }
    }

    fn dispatch<D: Device + ?Sized>(&mut self, line: &Line, dev: &mut D) -> Charge {
        let terminated = line.is_terminated();

        match self.mode {
            Mode::BlockComment => {
                if first_is(line, "###") {
                    self.mode.transition(Mode::None);
                }
                return Charge::NoDelay;
            },
            Mode::Verbatim => {
                if first_is(line, "LSTRING_END") {
                    self.mode.transition(Mode::None);
                    return Charge::NoDelay;
                }
                type_bytes(line.raw(), dev);
                if terminated {
                    enter(dev);
                }
                return Charge::DefaultDelay;
            },
            _ => (),
        }

        if first_is(line, "LSTRING_BEGIN") {
            self.mode.transition(Mode::Verbatim);
            return Charge::NoDelay;
        }
        if self.mode == Mode::LineComment || first_is(line, "REM") || first_is(line, "#") {
            self.mode.transition(if terminated { Mode::None } else { Mode::LineComment });
            return Charge::NoDelay;
        }
        if first_is(line, "###") {
            self.mode.transition(Mode::BlockComment);
            return Charge::NoDelay;
        }

        let argument = line.argument().unwrap_or(&[]);

        // Timing commands interrupt a raw string
        if first_is(line, "DEFAULTDELAY") || first_is(line, "DEFAULT_DELAY") {
            self.mode.transition(Mode::None);
            self.default_delay = parse_uint(argument);
            return Charge::NoDelay;
        }
        if first_is(line, "DELAY") {
            self.mode.transition(Mode::None);
            self.sleep(parse_uint(argument) as u64, dev);
            return Charge::NoDelay;
        }

        if let Mode::RawString { line_feed } = self.mode {
            type_bytes(line.raw(), dev);
            if terminated {
                if line_feed {
                    enter(dev);
                }
                self.mode.transition(Mode::None);
            }
            return Charge::DefaultDelay;
        }

        let Some(command) = line.first_word() else {
            return Charge::NoDelay;
        };
        let mut args = line.words().skip(1);

        match command.as_bytes() {
            b"STRING" => {
                type_bytes(argument, dev);
                if !terminated {
                    self.mode.transition(Mode::RawString { line_feed: false });
                }
                Charge::DefaultDelay
            },
            b"STRINGLN" => {
                type_bytes(argument, dev);
                if terminated {
                    enter(dev);
                } else {
                    self.mode.transition(Mode::RawString { line_feed: true });
                }
                Charge::DefaultDelay
            },
            b"REPEAT" | b"REPLAY" => {
                self.repeat_num = parse_uint(argument).saturating_add(1);
                Charge::Repeat
            },
            b"LOOP_BEGIN" => {
                self.loop_num = parse_uint(argument);
                self.loop_begin = true;
                Charge::NoDelay
            },
            b"LOOP_END" => {
                self.loop_end = true;
                Charge::NoDelay
            },
            b"LOCALE" => {
                if let Some(name) = args.next() {
                    dev.set_locale(&String::from_utf8_lossy(name.as_bytes()));
                }
                Charge::NoDelay
            },
            b"LED" => {
                led(line, dev);
                Charge::NoDelay
            },
            b"KEYCODE" => {
                if let Some(modifiers) = args.next() {
                    let mut keys = [0u8; 6];
                    for (key, word) in keys.iter_mut().zip(args) {
                        *key = parse_uint(word.as_bytes()) as u8;
                    }
                    dev.send_report(&KeyReport::from_raw(parse_uint(modifiers.as_bytes()) as u8, keys));
                    dev.release();
                }
                Charge::NoDelay
            },
            b"MOUSE" | b"MOVE" => {
                let (x, y) = int_pair(args);
                dev.mouse_move(x, y);
                Charge::DefaultDelay
            },
            b"MOUSE_CLICK" | b"CLICK" => {
                dev.mouse_click(button(args.next()));
                Charge::DefaultDelay
            },
            b"MOUSE_PRESS" | b"PRESS" => {
                dev.mouse_press(button(args.next()));
                Charge::DefaultDelay
            },
            b"MOUSE_RELEASE" | b"RELEASE" => {
                dev.mouse_release(button(args.next()));
                Charge::DefaultDelay
            },
            b"MOUSE_SCROLL" | b"SCROLL" => {
                let (vertical, horizontal) = int_pair(args);
                dev.mouse_scroll(vertical, horizontal);
                Charge::DefaultDelay
            },
            b"IMPORT" => {
                self.import_path = String::from_utf8_lossy(argument).into_owned();
                Charge::NoDelay
            },
            _ => {
                for word in line.words() {
                    press(&word, dev);
                }
                if terminated {
                    dev.release();
                }
                Charge::DefaultDelay
            },
        }
    }

    /// Sleep `time` ms minus the time spent since the current line started.
    ///
    /// Returns at once if that time already covers the request. Long sleeps
    /// keep ticking the scheduler.
    pub fn sleep<C: Clock + Scheduler + ?Sized>(&mut self, time: u64, dev: &mut C) {
        let offset = dev.millis().saturating_sub(self.timestamp);
        if offset >= time {
            return;
        }
        let time = time - offset;

        self.sleep_start = dev.millis();
        self.sleep_time = time;

        if time < SHORT_SLEEP {
            dev.delay(time);
            return;
        }

        let end = self.sleep_start + time;
        while dev.millis() < end {
            dev.delay(1);
            dev.tick();
        }
    }
}

fn first_is(line: &Line, keyword: &str) -> bool {
    line.first_word().map_or(false, |word| word.is(keyword))
}

fn enter<D: Device + ?Sized>(dev: &mut D) {
    dev.press_key(SpecialKey::Enter);
    dev.release();
}

fn type_bytes<D: Device + ?Sized>(bytes: &[u8], dev: &mut D) {
    for (i, c) in keys::chars(bytes).enumerate() {
        dev.write_char(c);
        if (i + 1) % TICK_EVERY == 0 {
            dev.tick();
        }
    }
}

fn press<D: Device + ?Sized>(word: &Word, dev: &mut D) {
    match keys::lookup(word.as_bytes()) {
        Some(KeyName::Special(key)) => dev.press_key(key),
        Some(KeyName::Modifier(modifier)) => dev.press_modifier(modifier),
        None => {
            for c in keys::chars(word.as_bytes()) {
                dev.press_char(c);
            }
        },
    }
}

fn int_pair<'a>(mut args: impl Iterator<Item = Word<'a>>) -> (i32, i32) {
    let first = args.next().map_or(0, |word| parse_int(word.as_bytes()));
    let second = args.next().map_or(0, |word| parse_int(word.as_bytes()));
    (first, second)
}

/// Button bitmask for a button index, 0 when out of range
fn button(index: Option<Word>) -> u8 {
    let index = index.map_or(0, |word| parse_uint(word.as_bytes()));
    1u8.checked_shl(index).unwrap_or(0)
}

fn led<D: Device + ?Sized>(line: &Line, dev: &mut D) {
    let mut args = line.words().skip(1);

    if line.word_count() == 3 {
        let color = match args.next() {
            Some(word) if word.is("R") => Color::Red,
            Some(word) if word.is("G") => Color::Green,
            _ => Color::Blue,
        };
        let mode = match args.next() {
            Some(word) if word.is("SOLID") => BlinkMode::Solid,
            Some(word) if word.is("SLOW") => BlinkMode::Slow,
            Some(word) if word.is("FAST") => BlinkMode::Fast,
            _ => BlinkMode::Off,
        };
        dev.set_mode(color, mode);
    } else {
        let mut values = [0u32; 4];
        for (value, word) in values.iter_mut().zip(args) {
            *value = parse_uint(word.as_bytes());
        }
        dev.set_color(values[0] as u8, values[1] as u8, values[2] as u8, values[3]);
    }
}

#[cfg(test)]
mod tests {
    use duck_hid::key::{KeyReport, Modifier, SpecialKey};

    use crate::{device::{BlinkMode, Color}, testing::{Call, Recorder}};

    use super::{Interpreter, Mode};

    fn run(script: &str) -> (Interpreter, Recorder) {
        let mut interpreter = Interpreter::new();
        let mut rec = Recorder::new();
        interpreter.execute(script.as_bytes(), &mut rec);
        (interpreter, rec)
    }

    #[test]
    fn test_key_lines_without_delay() {
        let (_, rec) = run("DEFAULTDELAY 0\nA\nB\n");
        assert_eq!(rec.calls, vec![Call::Press('A'), Call::Release, Call::Press('B'), Call::Release]);
        assert_eq!(rec.slept, 0);
    }

    #[test]
    fn test_default_delay() {
        let (interpreter, rec) = run("A\nB\n");
        assert_eq!(interpreter.default_delay(), 5);
        assert_eq!(rec.slept, 10);

        let (_, rec) = run("DEFAULT_DELAY 20\nA\n");
        assert_eq!(rec.slept, 20);
    }

    #[test]
    fn test_drift_compensation() {
        let mut interpreter = Interpreter::new();
        let mut rec = Recorder::new();
        rec.cost = 3;
        interpreter.execute(b"DEFAULTDELAY 10\nA\n", &mut rec);
        assert_eq!(rec.slept, 4);
    }

    #[test]
    fn test_sleep_after_overhead() {
        let mut interpreter = Interpreter::new();
        let mut rec = Recorder::new();
        interpreter.execute(b"", &mut rec);

        rec.now += 20;
        interpreter.sleep(10, &mut rec);
        assert_eq!(rec.slept, 0);

        interpreter.sleep(30, &mut rec);
        assert_eq!(rec.slept, 10);
    }

    #[test]
    fn test_long_sleep_ticks() {
        let (interpreter, rec) = run("DELAY 100\n");
        assert_eq!(rec.slept, 100);
        assert!(rec.ticks >= 100);
        assert_eq!(interpreter.sleep_time, 100);
        assert_eq!(interpreter.remaining_delay(&rec), 0);
    }

    #[test]
    fn test_remaining_delay() {
        let mut interpreter = Interpreter::new();
        let mut rec = Recorder::new();
        interpreter.execute(b"DELAY 100\n", &mut rec);
        rec.now = interpreter.sleep_start + 40;
        assert_eq!(interpreter.remaining_delay(&rec), 60);
    }

    #[test]
    fn test_string() {
        let (_, rec) = run("STRING Hello World\n");
        assert_eq!(rec.typed(), "Hello World");
        assert!(!rec.calls.contains(&Call::Key(SpecialKey::Enter)));

        let (_, rec) = run("STRINGLN Hello\n");
        assert_eq!(rec.typed(), "Hello");
        assert_eq!(&rec.calls[5..], &[Call::Key(SpecialKey::Enter), Call::Release]);
    }

    #[test]
    fn test_string_across_buffers() {
        let mut interpreter = Interpreter::new();
        let mut rec = Recorder::new();
        interpreter.execute(b"STRING abc", &mut rec);
        assert_eq!(interpreter.mode(), Mode::RawString { line_feed: false });
        assert_eq!(rec.slept, 0);

        interpreter.execute(b" def\n", &mut rec);
        assert_eq!(interpreter.mode(), Mode::None);
        assert_eq!(rec.typed(), "abc def");
        assert_eq!(rec.slept, 5);
    }

    #[test]
    fn test_verbatim_interrupts_string() {
        let mut interpreter = Interpreter::new();
        let mut rec = Recorder::new();
        interpreter.execute(b"STRING abc", &mut rec);
        interpreter.execute(b"LSTRING_BEGIN def\nxyz\nLSTRING_END\n", &mut rec);
        assert_eq!(interpreter.mode(), Mode::None);
        assert_eq!(rec.typed(), "abcxyz");
    }

    #[test]
    fn test_delay_interrupts_string() {
        let mut interpreter = Interpreter::new();
        let mut rec = Recorder::new();
        interpreter.execute(b"STRING abc", &mut rec);
        interpreter.execute(b"DELAY 100\n", &mut rec);
        assert_eq!(interpreter.mode(), Mode::None);
        assert_eq!(rec.typed(), "abc");
        assert_eq!(rec.slept, 100);

        interpreter.execute(b"STRINGLN abc", &mut rec);
        interpreter.execute(b"DEFAULTDELAY 0\nA\n", &mut rec);
        assert_eq!(interpreter.default_delay(), 0);
        assert_eq!(rec.typed(), "abcabc");
        assert!(!rec.calls.contains(&Call::Key(SpecialKey::Enter)));
        assert_eq!(&rec.calls[rec.calls.len() - 2..], &[Call::Press('A'), Call::Release]);
    }

    #[test]
    fn test_comments_interrupt_string() {
        let mut interpreter = Interpreter::new();
        let mut rec = Recorder::new();
        interpreter.execute(b"STRING abc", &mut rec);
        interpreter.execute(b"REM secret\n", &mut rec);
        assert_eq!(interpreter.mode(), Mode::None);
        assert_eq!(rec.typed(), "abc");

        interpreter.execute(b"STRING def", &mut rec);
        interpreter.execute(b"# more", &mut rec);
        assert_eq!(interpreter.mode(), Mode::LineComment);
        interpreter.execute(b" of it\n", &mut rec);
        assert_eq!(interpreter.mode(), Mode::None);

        interpreter.execute(b"STRING ghi", &mut rec);
        interpreter.execute(b"###\nSTRING hidden\n###\n", &mut rec);
        assert_eq!(interpreter.mode(), Mode::None);
        assert_eq!(rec.typed(), "abcdefghi");
    }

    #[test]
    fn test_verbatim_interrupts_comment() {
        let mut interpreter = Interpreter::new();
        let mut rec = Recorder::new();
        interpreter.execute(b"REM abc", &mut rec);
        interpreter.execute(b"LSTRING_BEGIN\n", &mut rec);
        assert_eq!(interpreter.mode(), Mode::Verbatim);

        interpreter.execute(b"hello\nLSTRING_END\n", &mut rec);
        assert_eq!(interpreter.mode(), Mode::None);
        assert_eq!(rec.typed(), "hello");
    }

    #[test]
    fn test_comment_swallows_commands() {
        let mut interpreter = Interpreter::new();
        let mut rec = Recorder::new();
        interpreter.execute(b"REM abc", &mut rec);
        interpreter.execute(b"DELAY 100\n", &mut rec);
        assert_eq!(interpreter.mode(), Mode::None);
        assert_eq!(rec.slept, 0);
        assert!(rec.calls.is_empty());
    }

    #[test]
    fn test_stringln_across_buffers() {
        let mut interpreter = Interpreter::new();
        let mut rec = Recorder::new();
        interpreter.execute(b"STRINGLN ab", &mut rec);
        assert!(!rec.calls.contains(&Call::Key(SpecialKey::Enter)));
        interpreter.execute(b"cd\n", &mut rec);
        assert_eq!(rec.typed(), "abcd");
        let enters = rec.calls.iter().filter(|call| **call == Call::Key(SpecialKey::Enter)).count();
        assert_eq!(enters, 1);
        assert_eq!(interpreter.mode(), Mode::None);
    }

    #[test]
    fn test_verbatim_block() {
        let (interpreter, rec) = run("LSTRING_BEGIN\n  two  spaces\nREM not a comment\nLSTRING_END\nA\n");
        assert_eq!(interpreter.mode(), Mode::None);
        assert_eq!(rec.typed(), "  two  spacesREM not a comment");
        let enters = rec.calls.iter().filter(|call| **call == Call::Key(SpecialKey::Enter)).count();
        assert_eq!(enters, 2);
        assert_eq!(&rec.calls[rec.calls.len() - 2..], &[Call::Press('A'), Call::Release]);
    }

    #[test]
    fn test_verbatim_ends_on_first_word_only() {
        let (interpreter, rec) = run("LSTRING_BEGIN\nnot LSTRING_END\n");
        assert_eq!(interpreter.mode(), Mode::Verbatim);
        assert_eq!(rec.typed(), "not LSTRING_END");
    }

    #[test]
    fn test_comments() {
        let (interpreter, rec) = run("REM hi\n# x\n###\nSTRING no\n###\nB\n");
        assert_eq!(interpreter.mode(), Mode::None);
        assert_eq!(rec.calls, vec![Call::Press('B'), Call::Release]);
        assert_eq!(rec.slept, 5);
    }

    #[test]
    fn test_comment_across_buffers() {
        let mut interpreter = Interpreter::new();
        let mut rec = Recorder::new();
        interpreter.execute(b"REM abc", &mut rec);
        assert_eq!(interpreter.mode(), Mode::LineComment);
        interpreter.execute(b"STRING x\n", &mut rec);
        assert_eq!(interpreter.mode(), Mode::None);
        assert!(rec.calls.is_empty());
    }

    #[test]
    fn test_blank_line() {
        let (_, rec) = run("\n");
        assert!(rec.calls.is_empty());
        assert_eq!(rec.slept, 0);
    }

    #[test]
    fn test_repeat() {
        let (interpreter, _) = run("A\nREPEAT 3\n");
        assert_eq!(interpreter.repeats(), 4);

        let mut interpreter = interpreter;
        let mut rec = Recorder::new();
        interpreter.execute(b"B\n", &mut rec);
        assert_eq!(interpreter.repeats(), 3);
        assert_eq!(interpreter.take_repeats(), 3);
        assert_eq!(interpreter.repeats(), 0);

        let (interpreter, _) = run("REPLAY 0\n");
        assert_eq!(interpreter.repeats(), 1);
    }

    #[test]
    fn test_loop_markers() {
        let mut interpreter = Interpreter::new();
        let mut rec = Recorder::new();
        interpreter.execute(b"LOOP_BEGIN 3\n", &mut rec);
        assert!(interpreter.loop_begin());
        assert!(!interpreter.loop_end());
        assert_eq!(interpreter.loops(), 3);

        interpreter.execute(b"LOOP_END\n", &mut rec);
        assert!(!interpreter.loop_begin());
        assert!(interpreter.loop_end());

        interpreter.execute(b"A\n", &mut rec);
        assert!(!interpreter.loop_end());
    }

    #[test]
    fn test_import() {
        let (mut interpreter, rec) = run("IMPORT sub.txt\n");
        assert!(rec.calls.is_empty());
        assert!(interpreter.import_pending());
        assert_eq!(interpreter.take_import(), "sub.txt");
        assert!(!interpreter.import_pending());
        assert_eq!(interpreter.take_import(), "");

        let (mut interpreter, _) = run("IMPORT my scripts/sub.txt \n");
        assert_eq!(interpreter.take_import(), "my scripts/sub.txt ");
    }

    #[test]
    fn test_led() {
        let (_, rec) = run("LED R SLOW\nLED 1 2 3\nLED X Y\n");
        assert_eq!(rec.calls, vec![
            Call::Mode(Color::Red, BlinkMode::Slow),
            Call::Color(1, 2, 3, 0),
            Call::Mode(Color::Blue, BlinkMode::Off),
        ]);
        assert_eq!(rec.slept, 0);
    }

    #[test]
    fn test_keycode() {
        let (_, rec) = run("KEYCODE 0x02 0x04 5\n");
        assert_eq!(rec.calls, vec![
            Call::Report(KeyReport::from_raw(0x02, [0x04, 5, 0, 0, 0, 0])),
            Call::Release,
        ]);

        let (_, rec) = run("KEYCODE\n");
        assert!(rec.calls.is_empty());
    }

    #[test]
    fn test_mouse() {
        let (_, rec) = run("DEFAULTDELAY 0\nMOUSE -10 20\nCLICK 1\nPRESS\nMOUSE_RELEASE 2\nSCROLL -1\nCLICK 9\n");
        assert_eq!(rec.calls, vec![
            Call::Move(-10, 20),
            Call::Click(0x02),
            Call::MousePress(0x01),
            Call::MouseRelease(0x04),
            Call::Scroll(-1, 0),
            Call::Click(0),
        ]);
    }

    #[test]
    fn test_chord() {
        let (_, rec) = run("CTRL ALT DELETE\n");
        assert_eq!(rec.calls, vec![
            Call::Modifier(Modifier::LeftControl),
            Call::Modifier(Modifier::LeftAlt),
            Call::Key(SpecialKey::Delete),
            Call::Release,
        ]);

        let (_, rec) = run("GUI r\n");
        assert_eq!(rec.calls, vec![Call::Modifier(Modifier::LeftMeta), Call::Press('r'), Call::Release]);
    }

    #[test]
    fn test_unknown_word_pressed_per_char() {
        let (_, rec) = run("abc\n");
        assert_eq!(rec.calls, vec![Call::Press('a'), Call::Press('b'), Call::Press('c'), Call::Release]);

        let (_, rec) = run("CTRL");
        assert_eq!(rec.calls, vec![Call::Modifier(Modifier::LeftControl)]);
    }

    #[test]
    fn test_locale() {
        let (_, rec) = run("LOCALE DE\nLOCALE\n");
        assert_eq!(rec.calls, vec![Call::Locale("DE".to_string())]);
    }

    #[test]
    fn test_typing_ticks() {
        let (_, rec) = run("STRING abcdefghijklmnopqrstuvwxy\n");
        assert_eq!(rec.ticks, 3);
    }
}
