use anyhow::Result;
use clap::Parser;
use shutterlink::{
    IndicatorSink, LoggingFeedback, ShutterlinkConfig, ShutterlinkOrchestrator, SimulatedDriver,
    SimulatedDriverSettings, SysfsLedSink,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser, Debug)]
#[command(name = "shutterlink")]
#[command(about = "Capture lifecycle and artifact upload orchestrator for button-driven cameras")]
#[command(version)]
#[command(long_about = "Drives a camera's still and video capture from hardware buttons, keeps \
the mode indicator in sync, and uploads finished recordings to a fixed HTTP endpoint once the \
driver has written their metadata.")]
struct Args {
    #[arg(short, long, default_value = "shutterlink.toml", help = "Path to TOML configuration file")]
    config: String,

    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    #[arg(long, help = "Build every component but do not start the session")]
    dry_run: bool,

    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    #[arg(long, value_name = "DIR", help = "Also write daily-rolling log files to DIR")]
    log_dir: Option<PathBuf>,

    #[arg(short, long, help = "Drive the session from the terminal instead of input buttons")]
    keyboard: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config();
        return Ok(());
    }

    let guard = init_logging(&args)?;

    info!("Starting Shutterlink v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let config = match ShutterlinkConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("✗ Configuration validation failed: {}", e);
        drop(guard);
        std::process::exit(1);
    }

    if args.validate_config {
        println!("✓ Configuration is valid");
        return Ok(());
    }

    let indicator: Arc<dyn IndicatorSink> = match &config.device.led_root {
        Some(led_root) => Arc::new(SysfsLedSink::new(led_root)),
        None => Arc::new(LoggingFeedback),
    };

    let builder = ShutterlinkOrchestrator::builder(config.clone());
    let driver = SimulatedDriver::new(
        &config.device.storage_root,
        SimulatedDriverSettings::from(&config.recording),
        builder.driver_callbacks(),
    )
    .map_err(|e| {
        error!("Failed to open capture driver: {}", e);
        e
    })?;

    let mut orchestrator = builder
        .with_driver(Arc::new(driver))
        .with_indicator(indicator)
        .with_keyboard(args.keyboard)
        .with_buttons(!args.keyboard)
        .build()
        .map_err(|e| {
            error!("Failed to create orchestrator: {}", e);
            e
        })?;

    if args.dry_run {
        info!("Dry run mode - components built but not started");
        println!(
            "✓ Dry run completed - uploads go to {}",
            orchestrator.uploader().endpoint()
        );
        return Ok(());
    }

    let exit_code = orchestrator.run().await.map_err(|e| {
        error!("System error during execution: {}", e);
        e
    })?;

    info!("Shutterlink exited with code: {}", exit_code);

    drop(guard);
    std::process::exit(exit_code);
}

fn init_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{
        fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    };

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shutterlink={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    let (file_layer, guard) = match &args.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "shutterlink.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_target(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn print_default_config() {
    println!("# Shutterlink Configuration File");
    println!("# This is the default configuration with all available options");
    println!();

    let default_config = r#"[device]
# Model name; models ending in "Z1" show the mode as text, others use LEDs
model = "RICOH THETA V"
# Shared media root; media index paths are relative to it
storage_root = "/storage/emulated/0"
# sysfs LED class directory (optional); LEDs are only logged when unset
# led_root = "/sys/class/leds"

[upload]
# Fixed endpoint receiving one multipart POST per recording
url = "http://upload.example.com/v1/upload"
# Multipart field carrying the file
field_name = "data"
# Connect/read/write ceiling in seconds
timeout_secs = 600
# Total attempts on transport failure (1 = no retry)
max_attempts = 1
# Delay between attempts in milliseconds
retry_delay_ms = 5000

[input]
# evdev device delivering the camera buttons
device = "/dev/input/event0"
# Hold time before a press counts as long
long_press_ms = 1000
# Key codes of the shutter and mode buttons
shutter_key_code = 212
mode_key_code = 167

[recording]
# Recording limit of the simulated driver in seconds
max_duration_secs = 300
# Simulated still capture time in milliseconds
picture_delay_ms = 500
# Simulated metadata write time in milliseconds
metadata_delay_ms = 800

[system]
# Event bus capacity
event_bus_capacity = 100
# Upper bound on waiting for callbacks and uploads after the session ends
shutdown_grace_secs = 30
# Media index journal, relative to the storage root
media_journal = "media_index.jsonl"
"#;

    println!("{}", default_config);
}
