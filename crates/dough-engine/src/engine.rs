//! Settings owned by the engine itself.
//!
//! They live in two files, [`ENGINE_CORE`] and [`ENGINE_VIDEO`], and are
//! registered through [`engine_target`], which hosts scan before their own
//! target:
//!
//! ```toml
//! # EngineCore.cfg
//! LogEnabled = true # Write log output
//! LogLevel = "info" # tracing filter, e.g. "info" or "warn,dough_engine=debug"
//!
//! # EngineVideo.cfg
//! Fullscreen = false # Start in exclusive fullscreen
//! # Initial window geometry and title
//! Window = { width = 1280, height = 720, title = "Dough", vsync = true }
//! ```

use serde::{Deserialize, Serialize};

use dough_core::{ConfigValue, Setting};

use crate::application::scan::ScanTarget;

/// Core engine settings file.
pub const ENGINE_CORE: &str = "EngineCore.cfg";

/// Video and window settings file.
pub const ENGINE_VIDEO: &str = "EngineVideo.cfg";

// ── Window settings ───────────────────────────────────────────────────────────

/// Initial window configuration.
///
/// Every field has a serde default so a hand-edited file that drops a field
/// still loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Dough".to_string(),
            vsync: true,
        }
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// Whether log output is written at all.
pub static LOG_ENABLED: Setting<bool> = Setting::new(true);

/// `EnvFilter` directive applied after `init`.
pub static LOG_LEVEL: Setting<String> = Setting::unset();

pub static WINDOW: Setting<WindowSettings> = Setting::unset();

pub static FULLSCREEN: Setting<bool> = Setting::new(false);

/// Registration table for the engine's settings.
pub fn engine_target() -> ScanTarget {
    let mut target = ScanTarget::new("dough_engine");
    target
        .register(
            "LOG_ENABLED",
            &LOG_ENABLED,
            ConfigValue::new("LogEnabled", ENGINE_CORE).comment("Write log output"),
        )
        .register(
            "LOG_LEVEL",
            &LOG_LEVEL,
            ConfigValue::new("LogLevel", ENGINE_CORE)
                .comment("tracing filter, e.g. \"info\" or \"warn,dough_engine=debug\"")
                .default_value(String::from("info")),
        )
        .register(
            "FULLSCREEN",
            &FULLSCREEN,
            ConfigValue::new("Fullscreen", ENGINE_VIDEO).comment("Start in exclusive fullscreen"),
        )
        .register(
            "WINDOW",
            &WINDOW,
            ConfigValue::new("Window", ENGINE_VIDEO)
                .comment("Initial window geometry and title")
                .default_value(WindowSettings::default()),
        );
    target
}
