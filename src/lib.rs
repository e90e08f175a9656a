//! # WorkArea Outliner
//!
//! Traces the rectangle a job will occupy on the machine so an operator can
//! check it fits before committing material.
//!
//! ## Architecture
//!
//! The workspace is split into crates:
//!
//! 1. **workarea-core** - Bounding box model, host job and analysis capabilities
//! 2. **workarea-settings** - Outline settings, persistence, snapshots
//! 3. **workarea-devicedb** - Machine profiles and axis speeds
//! 4. **workarea-gcode** - Header metadata dialects and full-file extents
//! 5. **workarea-communication** - Motion commands and transports
//! 6. **workarea-outline** - Resolver, planner and the `outline` command
//! 7. **workarea** - This crate: logging setup and the command-line tool

pub mod cli;

pub use workarea_communication::{
    MotionCommand, MotionTransport, RecordingTransport, SerialConfig, SerialTransport,
    WriterTransport,
};
pub use workarea_core::{
    AnalysisStore, Axis, AxisRange, BoundingBox, JobLocator, JobRef, LocalJobLocator,
    MetadataFileStore, Position, StorageLocation,
};
pub use workarea_devicedb::{DeviceManager, DeviceProfile, MachineProfileProvider};
pub use workarea_gcode::{DialectPipeline, GcodeExtentsAnalyzer, GeometryAnalyzer};
pub use workarea_outline::{
    BoundingBoxResolver, OutlineError, OutlinePlanner, OutlineResponse, OutlineService,
    OUTLINE_COMMAND,
};
pub use workarea_settings::{
    ConfigurationProvider, FeedrateSource, OutlinerSettings, SettingsManager, SettingsPersistence,
    XyEndMode, ZEndMode,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Initialize logging
///
/// Logs go to stderr so stdout stays free for emitted G-code. `RUST_LOG`
/// overrides `default_level` when set.
pub fn init_logging(default_level: tracing::Level, format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_thread_names(true)
                .with_line_number(true);
            registry.with(fmt_layer).try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer().json().with_writer(std::io::stderr);
            registry.with(fmt_layer).try_init()?;
        }
    }

    Ok(())
}
