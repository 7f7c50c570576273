//! Doughbox: a small host that exercises the config lifecycle end to end.
//!
//! # Usage
//!
//! ```text
//! doughbox [OPTIONS]
//!
//! Options:
//!   --config-dir <DIR>        Config directory [default: Config/]
//!   --frames <N>              Frames to simulate before exiting [default: 120]
//!   --backup-history <N>      Backups kept per config file [default: 0]
//! ```
//!
//! # What happens at startup
//!
//! ```text
//! main()
//!  ├─ init_logging()                 -- RUST_LOG or "info"
//!  ├─ init_config(dir, [engine, doughbox])
//!  ├─ logging.apply(LogEnabled, LogLevel)
//!  ├─ frame loop                     -- mutates FramesRendered
//!  └─ refresh_config_values()        -- makes the mutations durable
//! ```
//!
//! Run it twice: the second run reports the launch count and frame total
//! carried over from the first.

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use dough_core::{ConfigValue, Setting, DEFAULT_CONFIG_DIR};
use dough_engine::application::options::ConfigOptions;
use dough_engine::engine::{self, engine_target};
use dough_engine::infrastructure::logging::init_logging;
use dough_engine::{runtime, ScanTarget};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Demo host for the Dough config subsystem.
#[derive(Debug, Parser)]
#[command(name = "doughbox", about = "Persisted runtime configuration demo", version)]
struct Cli {
    /// Directory holding the `.cfg` files.  Created if missing.
    #[arg(long, default_value = DEFAULT_CONFIG_DIR, env = "DOUGH_CONFIG_DIR")]
    config_dir: String,

    /// Number of frames to simulate before saving and exiting.
    #[arg(long, default_value_t = 120)]
    frames: u64,

    /// Rotated backups kept per config file under `<config-dir>/backups/`.
    #[arg(long, default_value_t = 0, env = "DOUGH_BACKUP_HISTORY")]
    backup_history: usize,
}

// ── Host settings ─────────────────────────────────────────────────────────────

const DOUGHBOX_FILE: &str = "Doughbox.cfg";

static LAUNCH_COUNT: Setting<u64> = Setting::new(0);
static GREETING: Setting<String> = Setting::unset();
static LAYERS: Setting<Vec<String>> = Setting::unset();
static FRAMES_RENDERED: Setting<u64> = Setting::new(0);

fn doughbox_target() -> ScanTarget {
    let mut target = ScanTarget::new("doughbox");
    target
        .register(
            "LAUNCH_COUNT",
            &LAUNCH_COUNT,
            ConfigValue::new("LaunchCount", DOUGHBOX_FILE).comment("Times doughbox has started"),
        )
        .register(
            "GREETING",
            &GREETING,
            ConfigValue::new("Greeting", DOUGHBOX_FILE)
                .default_value(String::from("Hello from doughbox")),
        )
        .register(
            "LAYERS",
            &LAYERS,
            ConfigValue::new("Layers", DOUGHBOX_FILE)
                .comment("Layer stack, bottom first")
                .default_value(vec![String::from("world"), String::from("ui")]),
        )
        .register(
            "FRAMES_RENDERED",
            &FRAMES_RENDERED,
            ConfigValue::new("FramesRendered", DOUGHBOX_FILE),
        );
    target
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let logging = init_logging().context("failed to install log subscriber")?;
    let cli = Cli::parse();

    runtime::configure(ConfigOptions {
        backup_history: cli.backup_history,
        ..ConfigOptions::default()
    });

    let engine = engine_target();
    let host = doughbox_target();
    let report = runtime::init_config(&cli.config_dir, &[&engine, &host]);
    if let Some(e) = &report.aborted {
        anyhow::bail!("config directory unusable: {e}");
    }
    if !report.is_clean() {
        warn!(
            rejected = report.rejected.len(),
            bind_failures = report.bind_failures.len(),
            store_failures = report.store_failures.len(),
            "config loaded with errors"
        );
    }

    if let Err(e) = logging.apply(engine::LOG_ENABLED.get(), &engine::LOG_LEVEL.get()) {
        warn!("keeping previous log filter: {e}");
    }

    LAUNCH_COUNT.update(|n| *n += 1);
    let window = engine::WINDOW.get();
    info!(
        launch = LAUNCH_COUNT.get(),
        width = window.width,
        height = window.height,
        fullscreen = engine::FULLSCREEN.get(),
        "{}",
        GREETING.get()
    );
    info!(layers = ?LAYERS.get(), "layer stack");

    for _ in 0..cli.frames {
        FRAMES_RENDERED.update(|n| *n += 1);
    }

    let refresh = runtime::refresh_config_values();
    info!(
        written = refresh.written,
        frames_total = FRAMES_RENDERED.get(),
        directory = %runtime::config_directory().display(),
        "config saved"
    );
    if !refresh.is_clean() {
        anyhow::bail!(
            "failed to persist config: {} value(s), {} file(s)",
            refresh.bind_failures.len(),
            refresh.store_failures.len()
        );
    }
    Ok(())
}
