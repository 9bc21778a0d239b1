// Keypipe Daemon
// Bridges a Unix socket keycode stream to a virtual uinput keyboard

use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use keypipe_core::{
    default_socket_path, InjectionEngine, Settings, SocketServer, VirtualKeyboard, DEVICE_NAME,
};

/// Inject keyboard events from a Unix socket keycode stream
#[derive(Parser, Debug)]
#[command(name = "keypipe")]
#[command(about = "Inject keyboard events from a Unix socket keycode stream", long_about = None)]
struct Args {
    /// Socket path (default: $XDG_RUNTIME_DIR/keypipe.socket)
    #[arg(short, long, value_name = "PATH")]
    socket: Option<PathBuf>,

    /// Virtual device name
    #[arg(short, long, value_name = "NAME")]
    name: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// SIGINT/SIGTERM clear the running flag, then poke the socket so the
/// blocking accept wakes up and the loop can observe the flag.
fn spawn_signal_handler(running: Arc<AtomicBool>, socket_path: PathBuf) {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    std::thread::spawn(move || {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM]) {
            if signals.forever().next().is_some() {
                info!("received signal, shutting down");
                running.store(false, Ordering::SeqCst);
                let _ = UnixStream::connect(&socket_path);
            }
        }
    });
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = Settings::load_default().context("loading settings")?;
    if let Some(source) = settings.source_path() {
        info!("loaded settings from {}", source.display());
    }

    // Precedence: CLI flag > settings file > built-in default.
    let socket_path = args
        .socket
        .or_else(|| settings.socket_path().map(Path::to_path_buf))
        .unwrap_or_else(default_socket_path);
    let device_name = args
        .name
        .or_else(|| settings.device_name().map(str::to_string))
        .unwrap_or_else(|| DEVICE_NAME.to_string());

    let keyboard =
        VirtualKeyboard::with_name(&device_name).context("creating virtual keyboard")?;
    let mut engine = InjectionEngine::new(keyboard);

    let server = SocketServer::bind(&socket_path)
        .with_context(|| format!("binding {}", socket_path.display()))?;

    let running = Arc::new(AtomicBool::new(true));
    spawn_signal_handler(running.clone(), socket_path.clone());

    let result = server.run(&mut engine, &running).context("server loop");

    // Release anything still latched, then tear the device down once.
    if let Err(e) = engine.release_held_modifiers() {
        warn!("failed to release held modifiers: {}", e);
    }
    let mut keyboard = engine.into_sink();
    keyboard.destroy();
    info!("keypipe stopped");

    result
}
