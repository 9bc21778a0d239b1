// Keypipe Send
// Writes keycode bytes to a running keypipe daemon

use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use keypipe_core::{default_socket_path, Modifier};

/// Send keycodes to a running keypipe daemon
#[derive(Parser, Debug)]
#[command(name = "keypipe-send")]
#[command(about = "Send keycodes to a running keypipe daemon", long_about = None)]
struct Args {
    /// Socket path (default: $XDG_RUNTIME_DIR/keypipe.socket)
    #[arg(short, long, value_name = "PATH")]
    socket: Option<PathBuf>,

    /// Keycodes, written to the daemon as one message. Decimal values or
    /// modifier names (LEFT_SHIFT, RIGHT_CTRL, ...).
    #[arg(value_name = "KEYCODE", required = true, value_parser = parse_keycode)]
    keycodes: Vec<u8>,
}

fn parse_keycode(arg: &str) -> Result<u8, String> {
    if let Some(modifier) = Modifier::from_name(arg) {
        return Ok(modifier.keycode().raw());
    }
    arg.parse::<u8>()
        .map_err(|_| format!("'{}' is neither a keycode byte nor a modifier name", arg))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let path = args.socket.unwrap_or_else(default_socket_path);

    let mut socket = UnixStream::connect(&path)
        .with_context(|| format!("connecting to {}", path.display()))?;
    // One write, so the daemon sees the keycodes as a single chunk.
    socket.write_all(&args.keycodes).context("writing keycodes")?;
    Ok(())
}
