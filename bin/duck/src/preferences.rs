use std::{fmt::Display, fs, io, path::{Path, PathBuf}};

use log::{info, warn};
use serde::{Serialize, Deserialize};

/// Preferences file inside the config directory
pub const PREFERENCES_JSON: &str = "preferences.json";
/// Default script directory inside the config directory
const SCRIPTS: &str = "scripts";

#[derive(Debug)]
pub enum PreferencesError {
    IO(io::Error),
    Json(serde_json::Error),
}

impl Display for PreferencesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreferencesError::IO(e) => f.write_fmt(format_args!("IO error, {}", e)),
            PreferencesError::Json(e) => f.write_fmt(format_args!("Invalid preferences, {}", e)),
        }
    }
}

impl From<io::Error> for PreferencesError {
    fn from(value: io::Error) -> Self {
        PreferencesError::IO(value)
    }
}

impl From<serde_json::Error> for PreferencesError {
    fn from(value: serde_json::Error) -> Self {
        PreferencesError::Json(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Gadget device files
pub struct HidPaths {
    pub keyboard: PathBuf,
    pub mouse: PathBuf,
    /// Sysfs LED directory, i.e. `/sys/class/leds/led0`
    pub led: Option<PathBuf>,
}

impl Default for HidPaths {
    fn default() -> Self {
        HidPaths {
            keyboard: PathBuf::from("/dev/hidg0"),
            mouse: PathBuf::from("/dev/hidg1"),
            led: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub default_layout: String,
    pub default_delay: u32,
    pub main_script: String,
    /// Where scripts live, `<config>/scripts` when unset
    pub script_dir: Option<PathBuf>,
    /// Wait before typing so the host can set up the keyboard, in ms
    pub initial_delay: u64,
    /// Start once the host toggles caps, num or scroll lock
    pub run_on_indicator: bool,
    pub led_enabled: bool,
    /// `[r, g, b, blink ms]` while a script runs
    pub attack_color: [u32; 4],
    /// `[r, g, b, blink ms]` once it finished
    pub idle_color: [u32; 4],
    pub max_import_depth: usize,
    pub hid: HidPaths,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            default_layout: "US".to_string(),
            default_delay: 5,
            main_script: "main_script.txt".to_string(),
            script_dir: None,
            initial_delay: 1000,
            run_on_indicator: false,
            led_enabled: true,
            attack_color: [128, 0, 0, 0],
            idle_color: [0, 25, 0, 0],
            max_import_depth: duck_script::navigation::DEFAULT_MAX_DEPTH,
            hid: HidPaths::default(),
        }
    }
}

impl Preferences {
    pub fn load(path: &Path) -> Result<Preferences, PreferencesError> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), PreferencesError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Load `path`, creating it with defaults when missing.
    /// A malformed file is left alone and the defaults are used.
    pub fn load_or_create(path: &Path) -> Result<Preferences, PreferencesError> {
        if !path.exists() {
            let preferences = Preferences::default();
            preferences.save(path)?;
            info!("Created {}", path.display());
            return Ok(preferences);
        }

        match Preferences::load(path) {
            Ok(preferences) => Ok(preferences),
            Err(PreferencesError::Json(e)) => {
                warn!("Unable to parse {}, using defaults, {}", path.display(), e);
                Ok(Preferences::default())
            },
            Err(e) => Err(e),
        }
    }

    pub fn script_dir(&self, config: &Path) -> PathBuf {
        self.script_dir.clone().unwrap_or_else(|| config.join(SCRIPTS))
    }
}
