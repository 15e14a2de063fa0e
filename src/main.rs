use anyhow::{Context, Result};
use auto_clicker::config::parse_duration;
use auto_clicker::{input, ActionMode, AutoClicker, Config, MouseButton, Point};
use clap::Parser;
use colored::Colorize;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "autoclick", version, about = "Automate mouse clicks with global hotkeys")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Clicks per second
    #[arg(short, long)]
    rate: Option<f64>,

    /// Delay between clicks, e.g. "100ms" or "2s" (overrides --rate)
    #[arg(short, long, value_parser = parse_interval)]
    interval: Option<Duration>,

    /// Mouse button: left, right or middle
    #[arg(short, long)]
    button: Option<MouseButton>,

    /// Action: click or hold
    #[arg(short, long)]
    mode: Option<ActionMode>,

    /// Fixed X coordinate (requires --y)
    #[arg(long, requires = "y")]
    x: Option<i32>,

    /// Fixed Y coordinate (requires --x)
    #[arg(long, requires = "x")]
    y: Option<i32>,

    #[arg(long)]
    start_key: Option<String>,

    #[arg(long)]
    stop_key: Option<String>,

    #[arg(long)]
    toggle_key: Option<String>,

    /// Print the pointer position while idle
    #[arg(long)]
    track_position: bool,

    /// Start clicking immediately instead of waiting for a hotkey
    #[arg(long)]
    now: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn parse_interval(value: &str) -> std::result::Result<Duration, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

impl Cli {
    fn into_config(self) -> Result<(Config, bool)> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(rate) = self.rate {
            config.rate = rate;
            config.interval = None;
        }
        if let Some(interval) = self.interval {
            config.interval = Some(interval);
        }
        if let Some(button) = self.button {
            config.button = button;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let (Some(x), Some(y)) = (self.x, self.y) {
            config.position = Some(Point::new(x, y));
        }
        if let Some(key) = self.start_key {
            config.start_hotkey = key;
        }
        if let Some(key) = self.stop_key {
            config.stop_hotkey = key;
        }
        if let Some(key) = self.toggle_key {
            config.toggle_hotkey = key;
        }
        config.track_position |= self.track_position;
        config.verbose |= self.verbose;

        config.validate()?;
        Ok((config, self.now))
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn describe(config: &Config) {
    let spec = match config.action_spec() {
        Ok(spec) => spec,
        Err(_) => return,
    };
    let target = spec
        .position
        .map(|p| format!("at ({p})"))
        .unwrap_or_else(|| "at the pointer".to_string());
    match spec.mode {
        ActionMode::Repeat => println!(
            "🖱️  {} click, {:.2} per second, {}",
            spec.button.to_string().bold(),
            spec.rate_per_second,
            target
        ),
        ActionMode::Hold => println!("🖱️  hold {} {}", spec.button.to_string().bold(), target),
    }

    let hotkeys = config.hotkeys();
    for (label, key) in [
        ("start", &hotkeys.start),
        ("stop", &hotkeys.stop),
        ("toggle", &hotkeys.toggle),
    ] {
        if !key.trim().is_empty() {
            println!("   {:<6} {}", label, key.cyan());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, start_now) = cli.into_config().context("invalid configuration")?;
    init_logging(config.verbose);
    let spec = config.action_spec()?;

    let backend = input::default_backend().context("no input backend available")?;
    let clicker = AutoClicker::new(backend, spec, |_| {})?;
    clicker
        .assign_hotkeys(config.hotkeys())
        .context("failed to bind hotkeys")?;
    clicker.set_position_tracking(config.track_position);

    describe(&config);
    println!("{}", "Press Ctrl+C to exit".dimmed());

    if start_now {
        clicker.start()?;
    }

    let mut positions = clicker.subscribe_position();
    let mut sampling = true;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            result = &mut shutdown => {
                result.context("failed to listen for Ctrl+C")?;
                break;
            }
            changed = positions.changed(), if sampling => {
                if changed.is_err() {
                    sampling = false;
                    continue;
                }
                let sample = *positions.borrow_and_update();
                if !sample.paused {
                    println!("📍 Position: {}", sample.position.to_string().green());
                }
            }
        }
    }

    clicker.shutdown();
    println!("{}", "Stopped".yellow());
    Ok(())
}
