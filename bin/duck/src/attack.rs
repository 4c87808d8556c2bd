//! Runs a script: feeds it line by line to the interpreter and acts on the
//! imports, loops and repeats it signals.

use std::time::Duration;

use log::{error, info, warn};
use duck_script::{
    Interpreter, ScriptStack,
    device::{Clock, Device, Indicator, InputDevice},
    navigation::{NavigationError, Next},
    storage::Storage,
};

use crate::{gadget::Gadget, preferences::Preferences, OrLog};

const BUFFER_SIZE: usize = 256;
/// Pause between the indicator change and the first key
const INDICATOR_GRACE: Duration = Duration::from_millis(100);

/// An open `LOOP_BEGIN`
#[derive(Debug)]
struct LoopFrame {
    /// Stack depth of the script the loop is in
    depth: usize,
    /// Offset of the first line of the body
    start: u64,
    remaining: u32,
}

/// Run `main` and every script it imports until the last one finishes
pub fn run<S: Storage, D: Device + ?Sized>(
    stack: &mut ScriptStack<S>,
    interpreter: &mut Interpreter,
    dev: &mut D,
    main: &str,
) -> Result<(), NavigationError> {
    stack.open(main, true)?;
    info!("Running {}", main);

    let mut buf = [0u8; BUFFER_SIZE];
    let mut previous: Vec<u8> = Vec::new();
    let mut fragment = false;
    let mut loops: Vec<LoopFrame> = Vec::new();

    loop {
        let len = stack.read_line(&mut buf).or_log("Unable to read script").unwrap_or(0);
        if len == 0 {
            loops.retain(|frame| frame.depth < stack.depth());
            fragment = false;
            match stack.open_next_file()? {
                Next::Finished => break,
                Next::Resumed => continue,
            }
        }

        let line = &buf[..len];
        interpreter.execute(line, dev);
        follow(stack, interpreter, &mut loops)?;

        let repeats = interpreter.take_repeats();
        if repeats > 0 {
            if previous.is_empty() {
                warn!("Nothing to repeat");
            }
            for _ in 0..repeats {
                if previous.is_empty() {
                    break;
                }
                interpreter.execute(&previous, dev);
                follow(stack, interpreter, &mut loops)?;
            }
        } else {
            if !fragment {
                previous.clear();
            }
            previous.extend_from_slice(line);
        }
        fragment = stack.storage().in_line();
    }

    info!("Finished {}", main);
    Ok(())
}

/// Act on the import and loop signals of the line just executed
fn follow<S: Storage>(
    stack: &mut ScriptStack<S>,
    interpreter: &mut Interpreter,
    loops: &mut Vec<LoopFrame>,
) -> Result<(), NavigationError> {
    if interpreter.import_pending() {
        let path = interpreter.take_import();
        match stack.open(&path, true) {
            Ok(()) => info!("Importing {}", path),
            Err(e) => warn!("Unable to import {}, {}", path, e),
        }
    }

    if interpreter.loop_begin() {
        loops.push(LoopFrame {
            depth: stack.depth(),
            start: stack.position(),
            remaining: interpreter.loops().saturating_sub(1),
        });
    } else if interpreter.loop_end() {
        match loops.last_mut() {
            Some(frame) if frame.depth == stack.depth() => {
                if frame.remaining > 0 {
                    frame.remaining -= 1;
                    stack.seek(frame.start)?;
                } else {
                    loops.pop();
                }
            },
            _ => warn!("LOOP_END without LOOP_BEGIN"),
        }
    }
    Ok(())
}

/// Run `script` on the gadget with the attack settings from `preferences`
pub fn start<S: Storage>(
    preferences: &Preferences,
    stack: &mut ScriptStack<S>,
    interpreter: &mut Interpreter,
    gadget: &mut Gadget,
    script: &str,
) {
    if preferences.run_on_indicator {
        info!("Waiting for a lock key indicator change");
        if gadget.wait_for_indicator().or_log("Unable to read indicators").is_none() {
            return;
        }
        gadget.delay(INDICATOR_GRACE.as_millis() as u64);
    } else {
        gadget.delay(preferences.initial_delay);
    }

    gadget.set_locale(&preferences.default_layout);
    interpreter.set_default_delay(preferences.default_delay);

    let [r, g, b, blink] = preferences.attack_color;
    gadget.set_color(r as u8, g as u8, b as u8, blink);

    if let Err(e) = run(stack, interpreter, gadget, script) {
        error!("Attack stopped, {}", e);
    }
    stack.clear();

    let [r, g, b, blink] = preferences.idle_color;
    gadget.set_color(r as u8, g as u8, b as u8, blink);
}
