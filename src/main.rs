//! Binary entrypoint for the wasteland CLI.
//!
//! Commands:
//! - `init` - write a starter `wasteland.toml`
//! - `new <name>` - start a fresh character and play on stdin/stdout
//! - `load <name>` - resume the newest snapshot for a character
//! - `templates [--dir <path>]` - export the built-in templates as JSON for editing
//!
//! See the library crate docs for module-level details: `wasteland::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use wasteland::config::Config;
use wasteland::game::{
    load_latest, load_templates, write_snapshot, write_templates, Command, GameMode, Session,
    Snapshot, SystemClock, Templates,
};
use wasteland::validation::validate_character_name;

#[derive(Parser)]
#[command(name = "wasteland")]
#[command(about = "A turn-based text adventure in a cyberpunk wasteland")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "wasteland.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Start a new character
    New {
        /// Character name
        name: String,
    },
    /// Resume the latest save for a character
    Load {
        /// Character name
        name: String,
    },
    /// Export the built-in templates as JSON files
    Templates {
        /// Output directory
        #[arg(short, long, default_value = "./templates")]
        dir: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init runs before any config exists; everything else may use the file when present.
    let config = match cli.command {
        Commands::Init => None,
        _ => match Config::load(&cli.config).await {
            Ok(config) => Some(config),
            Err(e) => {
                if Path::new(&cli.config).exists() {
                    return Err(e);
                }
                None
            }
        },
    };
    init_logging(&config, cli.verbose);
    let config = config.unwrap_or_default();

    match cli.command {
        Commands::Init => {
            if Path::new(&cli.config).exists() {
                warn!("{} already exists; leaving it untouched", cli.config);
                return Ok(());
            }
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Templates { dir } => {
            write_templates(Path::new(&dir), &Templates::default())?;
            info!("Templates written to {}", dir);
        }
        Commands::New { name } => {
            let name = validate_character_name(&name).map_err(|e| anyhow!("{}", e))?;
            let templates = templates_for(&config)?;
            let session = Session::new_game(&name, templates, config, SystemClock);
            play(session).await?;
        }
        Commands::Load { name } => {
            let save_dir = config.storage.save_dir.clone();
            let snapshot = load_latest(Path::new(&save_dir), &name)?;
            let templates = templates_for(&config)?;
            let session = Session::from_snapshot(snapshot, templates, config, SystemClock);
            play(session).await?;
        }
    }

    Ok(())
}

fn templates_for(config: &Config) -> Result<Templates> {
    let dir = config.game.template_dir.as_deref().map(Path::new);
    Ok(load_templates(dir)?)
}

/// Write a snapshot unless nothing changed since `last_saved`.
fn save(session: &Session, last_saved: &mut Option<Snapshot>) -> Result<()> {
    let snapshot = session.snapshot();
    if last_saved.as_ref().is_some_and(|prev| prev.same_state(&snapshot)) {
        debug!("nothing changed since the last save; skipped");
        return Ok(());
    }
    let dir = session.config().storage.save_dir.clone();
    let path = write_snapshot(Path::new(&dir), &snapshot)?;
    println!("Saved to {}", path.display());
    *last_saved = Some(snapshot);
    Ok(())
}

/// Read commands from stdin until the player quits from the main menu, dies, or closes input.
async fn play(mut session: Session) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_saved: Option<Snapshot> = None;
    println!("Type 'start' to begin, 'quit' to leave.");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        for notice in session.update() {
            println!("{}", notice);
        }
        let cmd = Command::parse(&line);
        let leaving = cmd == Command::Quit && session.mode() == GameMode::MainMenu;
        let report = session.handle(cmd);
        for out in &report.lines {
            println!("{}", out);
        }
        if report.save_requested {
            save(&session, &mut last_saved)?;
        }
        if leaving || report.mode == GameMode::Dying {
            break;
        }
    }

    if !session.is_over() && session.world().current_name().is_some() {
        save(&session, &mut last_saved)?;
    }
    info!("Session {} ended", session.id());
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity wins over the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Warn),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    match file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Game output owns the terminal; log lines go to the console only when stderr is one.
            let is_tty = atty::is(atty::Stream::Stderr);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty && verbosity > 0 {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
