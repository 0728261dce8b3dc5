//! vtconsole - VT100 line-editing console on the local terminal
//!
//! Runs the console in raw mode against the host terminal, with keys mapped
//! to the bytes a VT220 serial terminal would send.
//!
//! # Quick Start
//!
//! ```text
//! vtconsole                      # Defaults and ~/.vtconsole/config.toml
//! vtconsole -c lab.toml          # Alternate config file
//! ```
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | Enter | Execute line |
//! | Ctrl+C | Discard line |
//! | Backspace / Delete | Delete before / at cursor |
//! | Home / End | Start / end of line |
//! | Insert | Toggle insert / overwrite |
//! | Up / Down | History recall |
//! | Esc Esc | Clear line |

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vtconsole::config::Config;
use vtconsole::core::rx::rx_queue;
use vtconsole::ui::{read_key, StdoutTransport, Terminal};
use vtconsole::{CommandTable, Console, Session, Transport};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Receive queue size, like a small UART FIFO
const RX_CAPACITY: usize = 64;

/// Key poll interval on the reader thread
const POLL_TIMEOUT: Duration = Duration::from_millis(20);

/// Command line options
#[derive(Debug, Default)]
struct Options {
    /// Explicit config file
    config: Option<PathBuf>,
}

fn print_version() {
    eprintln!("vtconsole {}", VERSION);
}

fn print_help() {
    eprintln!("vtconsole {} - VT100 line-editing console", VERSION);
    eprintln!();
    eprintln!("Usage: vtconsole [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <FILE>   Use FILE instead of ~/.vtconsole/config.toml");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  ?                     List commands");
    eprintln!("  cls                   Clear screen");
    eprintln!("  echo <TEXT>           Print TEXT");
    eprintln!("  history               List the command history");
    eprintln!("  exit                  Leave the console");
    eprintln!();
    eprintln!("Configuration: ~/.vtconsole/config.toml");
    eprintln!("Log file:      ~/.vtconsole/vtconsole.log (filter with RUST_LOG)");
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut options = Options::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing config file argument".to_string());
                }
                options.config = Some(PathBuf::from(&args[i]));
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(options)
}

/// Log to `~/.vtconsole/vtconsole.log`; the terminal belongs to the console
fn init_logging(level: &str) {
    let log_path = Config::config_dir()
        .map(|dir| dir.join("vtconsole.log"))
        .unwrap_or_else(|| PathBuf::from("vtconsole.log"));

    // Open log file (append mode)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

/// Built-in commands of the demo console
fn demo_commands(running: Arc<AtomicBool>) -> CommandTable {
    CommandTable::new()
        .register("?", "Show a short commands description", |ctx, out| {
            ctx.commands.write_help(out);
            Ok(())
        })
        .register("cls", "Clear screen", |_, out| {
            out.emit(b"\x1b[H\x1b[J");
            Ok(())
        })
        .register("echo", "Print the rest of the line", |ctx, out| {
            let text = ctx.rest();
            let start = text.iter().position(|&b| b != b' ').unwrap_or(text.len());
            out.emit(&text[start..]);
            Ok(())
        })
        .register("history", "Show the commands history", |ctx, out| {
            for (i, line) in ctx.history.iter().enumerate() {
                out.emit(format!("[{}] ", i).as_bytes());
                out.emit(line);
                out.emit(b"\r\n");
            }
            Ok(())
        })
        .register("exit", "Leave the console", move |_, out| {
            out.emit(b"bye");
            running.store(false, Ordering::SeqCst);
            Ok(())
        })
}

fn main() -> anyhow::Result<()> {
    let options = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let config = match &options.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    init_logging(&config.log.level);
    info!("vtconsole {} starting...", VERSION);

    let settings = config.settings();
    info!(
        "Prompt {:?}, max_command {}, max_history {}",
        settings.prompt, settings.max_command, settings.max_history
    );

    let running = Arc::new(AtomicBool::new(true));
    let commands = demo_commands(running.clone()).into_shared();

    let mut terminal = Terminal::new();
    terminal.init()?;

    let result = run(settings, commands, running);

    let _ = terminal.cleanup();
    if let Err(e) = &result {
        error!("Console failed: {:#}", e);
    }
    info!("vtconsole exiting");
    result
}

/// Main loop: the reader thread fills the queue, this thread drains it
fn run(
    settings: vtconsole::ConsoleSettings,
    commands: Arc<CommandTable>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let mut out = StdoutTransport::new();
    let console = Console::init(settings, commands, &mut out)?;
    out.flush();

    let (producer, consumer) = rx_queue(RX_CAPACITY);
    let mut session = Session::new(console, consumer, running);
    session.start(producer, || read_key(POLL_TIMEOUT).map(Some));

    while session.is_running() {
        if session.process_input(&mut out) > 0 {
            out.flush();
        } else {
            thread::sleep(Duration::from_millis(5));
        }
    }

    session.stop();
    out.flush();
    Ok(())
}
