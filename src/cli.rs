use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use workarea_communication::{MotionTransport, SerialConfig, SerialTransport, WriterTransport};
use workarea_core::{BoundingBox, JobRef, LocalJobLocator, MetadataFileStore};
use workarea_devicedb::{DeviceManager, DeviceProfile};
use workarea_outline::{BoundingBoxResolver, OutlineResponse, OutlineService, OUTLINE_COMMAND};
use workarea_settings::{ConfigurationProvider, SettingsManager, SettingsPersistence};

use crate::LogFormat;

#[derive(Debug, Parser)]
#[command(
    name = "workarea",
    version,
    about = "Trace the work area of a G-code job on the machine"
)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, global = true)]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the job's work area and trace its outline
    Outline(OutlineArgs),
    /// Resolve and print the work area without moving anything
    Bbox(BboxArgs),
    /// Print the effective settings, optionally updating keys first
    Settings(SettingsArgs),
}

#[derive(Debug, Args, Clone)]
struct SettingsLocation {
    /// Settings file (.toml or .json); defaults to the user config directory
    #[arg(long)]
    settings: Option<PathBuf>,
}

impl SettingsLocation {
    fn manager(&self) -> anyhow::Result<SettingsManager> {
        let persistence = match &self.settings {
            Some(path) => SettingsPersistence::new(path),
            None => SettingsPersistence::at_default_location()?,
        };
        SettingsManager::new(persistence)
            .with_context(|| "failed to load settings".to_string())
    }
}

#[derive(Debug, Args, Clone)]
struct OutlineArgs {
    /// G-code job to outline
    #[arg(long)]
    file: PathBuf,
    #[command(flatten)]
    settings: SettingsLocation,
    /// Machine profiles file (JSON); the built-in default profile is used otherwise
    #[arg(long)]
    profiles: Option<PathBuf>,
    /// Serial port of the controller; commands go to stdout when omitted
    #[arg(long)]
    port: Option<String>,
    #[arg(long, default_value_t = 115200, requires = "port")]
    baud: u32,
}

#[derive(Debug, Args, Clone)]
struct BboxArgs {
    /// G-code job to inspect
    #[arg(long)]
    file: PathBuf,
    #[command(flatten)]
    settings: SettingsLocation,
    /// Skip header metadata even when the settings file does not
    #[arg(long)]
    ignore_metadata: bool,
}

#[derive(Debug, Args, Clone)]
struct SettingsArgs {
    #[command(flatten)]
    settings: SettingsLocation,
    /// Update a key before printing, e.g. `--set xyEndMode=park`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    updates: Vec<String>,
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Outline(args) => run_outline(args),
            Command::Bbox(args) => run_bbox(args),
            Command::Settings(args) => run_settings(args),
        }
    }
}

/// Split a job path into a base directory and a file name under it
fn job_location(file: &Path) -> anyhow::Result<(PathBuf, String)> {
    if !file.is_file() {
        bail!("{} is not a file", file.display());
    }
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no usable file name", file.display()))?
        .to_string();
    let base = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((base, name))
}

fn run_outline(args: OutlineArgs) -> anyhow::Result<()> {
    let (base, name) = job_location(&args.file)?;
    let settings = Arc::new(args.settings.manager()?);

    let profiles = match &args.profiles {
        Some(path) => DeviceManager::load(path)
            .with_context(|| format!("failed to load profiles from {}", path.display()))?,
        None => DeviceManager::with_profile(DeviceProfile::new("default", "Default machine"))?,
    };

    let transport: Arc<dyn MotionTransport> = match &args.port {
        Some(port) => Arc::new(SerialTransport::open(&SerialConfig::new(port, args.baud))?),
        None => Arc::new(WriterTransport::stdout()),
    };

    let locator = Arc::new(LocalJobLocator::new(&base));
    locator.select(name);

    let service = OutlineService::new(
        settings,
        locator,
        Arc::new(MetadataFileStore::new(&base)),
        Arc::new(profiles),
        transport,
    );

    match service.handle_command(OUTLINE_COMMAND) {
        OutlineResponse::Success(bbox) => {
            eprintln!("{}", bbox.summary());
            Ok(())
        }
        OutlineResponse::Failure { status, message } => bail!("{} ({})", message, status),
    }
}

fn run_bbox(args: BboxArgs) -> anyhow::Result<()> {
    let (base, name) = job_location(&args.file)?;
    let settings = args.settings.manager()?.snapshot();
    let ignore_metadata = args.ignore_metadata || settings.ignore_metadata;
    let resolver = BoundingBoxResolver::new(
        Arc::new(LocalJobLocator::new(&base)),
        Arc::new(MetadataFileStore::new(&base)),
    );

    let resolution = resolver.resolve_with_source(&JobRef::local(name), ignore_metadata)?;
    print_box(&resolution.bbox)?;
    eprintln!("Source: {}", resolution.source);
    Ok(())
}

fn print_box(bbox: &BoundingBox) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(bbox)?);
    Ok(())
}

fn run_settings(args: SettingsArgs) -> anyhow::Result<()> {
    let manager = args.settings.manager()?;

    for update in &args.updates {
        let (key, value) = update
            .split_once('=')
            .with_context(|| format!("expected KEY=VALUE, got {:?}", update))?;
        manager.set_value(key.trim(), value.trim())?;
    }

    print!("{}", manager.snapshot().to_toml_string()?);
    Ok(())
}
