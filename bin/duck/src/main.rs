use std::{process::exit, path::PathBuf, str::FromStr, fmt::Display, fs, io::Write};

use clap::{Parser, Subcommand};
use log::{error, info};
use duck_hid::HID;
use duck_script::{Interpreter, ScriptStack, storage::{FileStorage, Storage}};

use crate::{gadget::Gadget, led::Led, preferences::{Preferences, PREFERENCES_JSON}};

/// Script runner
mod attack;
/// Tokenizer dry run
mod check;
/// Keyboard, mouse and LED glue
mod gadget;
/// Status LED
mod led;
/// preferences.json
mod preferences;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Cli Args
struct Args {
    #[arg(short, long)]
    /// Path to config directory
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a script, the main script by default
    Run {
        script: Option<String>,
    },
    /// List scripts with their size
    List,
    /// Print the words and argument of every line of a script without running it
    Check {
        script: String,
    },
}

/// Turns a result into a option containing the ok value.
/// If the result is an error it will log a message followed by the error message as an error.
pub trait OrLog<T> {
    fn or_log(self, msg: &str) -> Option<T>;
}

impl<T, E> OrLog<T> for std::result::Result<T, E>
where
    E: Display
{
    fn or_log(self, msg: &str) -> Option<T> {
        match self {
            Ok(t) => Some(t),
            Err(e) => {
                error!("{}, {}", msg, e);
                None
            }
        }
    }
}

/// Accepts a result or option. If a result it is turned into a option containing the ok value.
/// If the option is none or the result is err then it will log the message as an error,
/// followed by the error message (for result), and exit the program with and exit status of 1.
pub trait OrExit<T> {
    fn or_exit(self, msg: &str) -> T;

    fn or_exit_print(self, msg: &str) -> T;
}

impl<T, E> OrExit<T> for std::result::Result<T, E>
where
    E: Display
{
    fn or_exit(self, msg: &str) -> T {
        match self {
            Ok(t) => t,
            Err(e) => {
                error!("{}, {}", msg, e);
                exit(1);
            }
        }
    }

    fn or_exit_print(self, msg: &str) -> T {
        match self {
            Ok(t) => t,
            Err(e) => {
                println!("{}, {}", msg, e);
                exit(1);
            }
        }
    }
}

impl<T> OrExit<T> for Option<T> {
    fn or_exit(self, msg: &str) -> T {
        match self {
            Some(t) => t,
            None => {
                error!("{}", msg);
                exit(1);
            }
        }
    }

    fn or_exit_print(self, msg: &str) -> T {
        match self {
            Some(t) => t,
            None => {
                println!("{}", msg);
                exit(1);
            }
        }
    }
}

fn main() {
    const LOG_CONFIG: &str = "log-config.yaml";

    let args = Args::parse();

    let config = args.config
        .map(|path| {
            PathBuf::from_str(&path)
            .or_exit_print("Invalid config path")
        })
        .or_else(|| dirs::config_dir().map(|p| p.join("duck")))
        .or_exit_print("Unable to locate config directory");
    fs::create_dir_all(&config).or_exit_print("Unable to create config folder");

    // init logger
    let logger_config = config.join(LOG_CONFIG);
    if !logger_config.exists() {
        const DEFAULT_CONFIG: &str = include_str!("../log-config.yaml");
        fs::File::create(&logger_config)
            .or_exit_print("Unable to create logger config")
            .write_all(DEFAULT_CONFIG.as_bytes())
            .or_exit_print("Unable to create logger config");
    }
    if let Err(e) = log4rs::init_file(&logger_config, Default::default()) {
        println!("Unable to load logger config, {}", e);
        return;
    }

    let preferences = Preferences::load_or_create(&config.join(PREFERENCES_JSON))
        .or_exit("Unable to load preferences");

    let script_dir = preferences.script_dir(&config);
    fs::create_dir_all(&script_dir).or_exit("Unable to create script folder");
    let storage = FileStorage::new(&script_dir);

    if !storage.exists(&preferences.main_script) {
        let header = format!("# Duck (v{})\n", env!("CARGO_PKG_VERSION"));
        storage.write(&preferences.main_script, header.as_bytes())
            .or_log("Unable to create main script");
    }

    match args.command.unwrap_or(Command::Run { script: None }) {
        Command::List => {
            for (script, size) in storage.list().or_exit("Unable to list scripts") {
                println!("{:>8}  {}", size, script);
            }
        },
        Command::Check { script } => {
            let content = fs::read(storage.resolve(&script)).or_exit("Unable to read script");
            for line in check::describe(&content) {
                println!("{}", line);
            }
        },
        Command::Run { script } => {
            let script = script.unwrap_or_else(|| preferences.main_script.clone());

            let hid = HID::new(&preferences.hid.keyboard, &preferences.hid.mouse)
                .or_exit("Unable to open HID gadget");
            let led = Led::new(preferences.hid.led.clone(), preferences.led_enabled);
            let mut gadget = Gadget::new(hid, led);

            let mut stack = ScriptStack::with_max_depth(storage, preferences.max_import_depth);
            let mut interpreter = Interpreter::new();

            info!("Script folder {}", script_dir.display());
            attack::start(&preferences, &mut stack, &mut interpreter, &mut gadget, &script);
        },
    }
}
