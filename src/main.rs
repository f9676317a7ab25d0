use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{debug, error, info, warn};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::mpsc;
use touchdock::actions::ActionDispatcher;
use touchdock::config::{default_config_path, Config};
use touchdock::dock_manager::DockEvent;
use touchdock::layout::{frame_for, DockLayout, Edge, LayoutOptions};
use touchdock::platform::system_platform;
use touchdock::watcher::NotifyWatcher;
use touchdock::{DockManager, DockPrefs, PresetLoader, Rect, Result};

#[derive(Parser)]
#[command(name = "touchdock")]
#[command(about = "A touch-friendly application dock for macOS")]
struct Cli {
    #[arg(short, long, help = "Configuration file path")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the dock (default)")]
    Run,
    #[command(about = "List available presets")]
    Presets,
    #[command(about = "Check that a preset loads and list its items")]
    Validate { name: String },
    #[command(about = "Perform a preset item's action once")]
    Trigger {
        preset: String,
        #[arg(help = "Item name or zero-based index")]
        item: String,
    },
    #[command(about = "Print the icon layout for a dock size")]
    Layout {
        #[arg(long)]
        width: f64,
        #[arg(long)]
        count: usize,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long, default_value = "bottom")]
        edge: String,
        #[arg(long)]
        single_row: bool,
    },
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {:?}", config_path))?;

    match cli.command {
        Some(Commands::Run) | None => run(config, config_path).await,
        Some(Commands::Presets) => list_presets(&config, &config_path),
        Some(Commands::Validate { name }) => validate(&config, &name),
        Some(Commands::Trigger { preset, item }) => trigger(&config, &preset, &item),
        Some(Commands::Layout {
            width,
            count,
            height,
            edge,
            single_row,
        }) => print_layout(&config, width, height, count, &edge, !single_row),
    }
}

async fn run(config: Config, config_path: PathBuf) -> Result<()> {
    info!("Starting TouchDock");

    let prefs_path = Config::prefs_path(&config_path);
    let prefs = DockPrefs::load(&prefs_path);
    let mut dock = DockManager::new(config, prefs, system_platform(), Box::new(NotifyWatcher))
        .with_prefs_path(prefs_path);

    let sender = dock.event_sender();
    std::thread::spawn(move || read_commands(sender));

    tokio::select! {
        result = dock.run() => {
            if let Err(e) = result {
                error!("Dock error: {}", e);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            dock.shutdown();
        }
    }

    Ok(())
}

// Feeds text commands from stdin into the dock's event loop. Runs on its
// own thread so a pending read never holds up runtime shutdown.
fn read_commands(sender: mpsc::UnboundedSender<DockEvent>) {
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read command: {}", e);
                return;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match DockEvent::parse_command(trimmed) {
            Some(event) => {
                debug!("Command from stdin: {:?}", event);
                if sender.send(event).is_err() {
                    return;
                }
            }
            None => warn!("Unknown command: {:?}", trimmed),
        }
    }
    debug!("stdin closed, no more commands");
}

fn loader(config: &Config) -> PresetLoader {
    PresetLoader::new(&config.presets, Box::new(NotifyWatcher))
}

fn list_presets(config: &Config, config_path: &std::path::Path) -> Result<()> {
    let selected = DockPrefs::load(Config::prefs_path(config_path)).selected_preset;
    for name in loader(config).available_presets() {
        let marker = if name == selected { "*" } else { " " };
        println!("{} {}", marker, name);
    }
    Ok(())
}

fn validate(config: &Config, name: &str) -> Result<()> {
    let loader = loader(config);
    let path = loader.resolve_path(name)?;
    let preset = PresetLoader::read_preset(&path)?;

    println!("{} ({:?}): {} items", preset.name, path, preset.items.len());
    for (index, item) in preset.items.iter().enumerate() {
        let target = match (&item.bundle_id, &item.payload) {
            (_, Some(payload)) => payload.as_str(),
            (Some(bundle_id), None) => bundle_id.as_str(),
            (None, None) => "-",
        };
        println!(
            "{:>3}  {:<24} {:<12} {}",
            index,
            item.display_name,
            item.action_kind().name(),
            target
        );
    }
    Ok(())
}

fn trigger(config: &Config, preset_name: &str, item_ref: &str) -> Result<()> {
    let mut loader = loader(config);
    let preset = loader.load(preset_name)?;

    let item = match item_ref.parse::<usize>() {
        Ok(index) => preset.items.get(index),
        Err(_) => preset
            .items
            .iter()
            .find(|item| item.display_name.eq_ignore_ascii_case(item_ref)),
    }
    .with_context(|| format!("no item {:?} in preset {}", item_ref, preset_name))?;

    let dispatcher = ActionDispatcher::new(system_platform());
    dispatcher.dispatch(item)?;
    Ok(())
}

fn print_layout(
    config: &Config,
    width: f64,
    height: Option<f64>,
    count: usize,
    edge: &str,
    multi_row: bool,
) -> Result<()> {
    let edge = Edge::from_string(edge).with_context(|| format!("unknown edge {:?}", edge))?;
    let screen = Rect::new(0.0, 0.0, width, height.unwrap_or(width));
    let frame = frame_for(screen, edge, config.general.thickness);
    let layout = DockLayout::compute(
        frame,
        edge,
        count,
        LayoutOptions {
            icon_size: config.general.icon_size,
            multi_row: multi_row || !edge.is_horizontal(),
        },
    );

    println!(
        "{} edge, frame {:?}, {} per row, {} rows",
        edge.name(),
        layout.frame,
        layout.per_row,
        layout.row_count()
    );
    for (index, row) in layout.rows.iter().enumerate() {
        println!("row {}: {:?} at {:?}", index, row.icons, row.frame);
    }
    println!("controls at {:?}", layout.control_strip);
    Ok(())
}

