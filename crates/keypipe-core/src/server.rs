// Keypipe Socket Server
// Serial accept/read loop feeding byte chunks into the injection engine

use std::ffi::OsString;
use std::fs;
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, FromRawFd};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::engine::InjectionEngine;
use crate::output::KeySink;

/// Socket file name under the runtime directory.
pub const SOCKET_NAME: &str = "keypipe.socket";

/// Read buffer size; one read is one chunk.
const CHUNK_CAPACITY: usize = 1024;

/// Pending-connection backlog. One: a second client queues in the kernel
/// until the first has fully closed.
const BACKLOG: libc::c_int = 1;

/// Errors that can occur while serving the socket
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to create socket: {0}")]
    Create(io::Error),

    #[error("Failed to bind {path}: {source}")]
    Bind { path: PathBuf, source: io::Error },

    #[error("Failed to listen on {path}: {source}")]
    Listen { path: PathBuf, source: io::Error },

    #[error("Failed to accept connection: {0}")]
    Accept(io::Error),

    #[error("Socket path too long: {0}")]
    PathTooLong(PathBuf),

    #[error(transparent)]
    Device(#[from] crate::output::DeviceError),
}

/// Default socket path: `$XDG_RUNTIME_DIR/keypipe.socket`, falling back
/// to `/tmp` when the runtime directory is not set.
pub fn default_socket_path() -> PathBuf {
    socket_path_in(std::env::var_os("XDG_RUNTIME_DIR"))
}

fn socket_path_in(runtime_dir: Option<OsString>) -> PathBuf {
    let mut path = PathBuf::from(runtime_dir.unwrap_or_else(|| "/tmp".into()));
    path.push(SOCKET_NAME);
    path
}

/// Listening endpoint with a serial, single-connection service loop.
///
/// All I/O is blocking on the caller's thread; the engine is fed from the
/// same thread, so it stays single-writer without locks.
pub struct SocketServer {
    listener: UnixListener,
    path: PathBuf,
}

impl SocketServer {
    /// Bind the listening socket, replacing any stale socket file left at
    /// the path by a previous run.
    ///
    /// Built on raw socket calls because the backlog of 1 is part of the
    /// serving contract and std's `UnixListener::bind` does not expose it.
    pub fn bind(path: &Path) -> Result<Self, ServerError> {
        let addr = sockaddr_un(path)?;

        let fd = unsafe { libc::socket(libc::AF_UNIX, libc::SOCK_STREAM, 0) };
        if fd < 0 {
            return Err(ServerError::Create(io::Error::last_os_error()));
        }
        // Hand the fd to std immediately so every error path closes it.
        let listener = unsafe { UnixListener::from_raw_fd(fd) };

        let _ = fs::remove_file(path);

        let rc = unsafe {
            libc::bind(
                listener.as_raw_fd(),
                &addr as *const libc::sockaddr_un as *const libc::sockaddr,
                std::mem::size_of::<libc::sockaddr_un>() as libc::socklen_t,
            )
        };
        if rc != 0 {
            return Err(ServerError::Bind {
                path: path.to_path_buf(),
                source: io::Error::last_os_error(),
            });
        }

        let rc = unsafe { libc::listen(listener.as_raw_fd(), BACKLOG) };
        if rc != 0 {
            return Err(ServerError::Listen {
                path: path.to_path_buf(),
                source: io::Error::last_os_error(),
            });
        }

        info!("listening on {}", path.display());
        Ok(Self {
            listener,
            path: path.to_path_buf(),
        })
    }

    /// The bound socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the serial accept/read loop until `running` is cleared.
    ///
    /// Exactly one client is serviced at a time. A read error drops the
    /// connection and the loop resumes accepting; an accept error is
    /// fatal. A shutdown path clears the flag and then connects once to
    /// the socket: the connect wakes the blocking accept, the empty
    /// connection drains like any other, and the loop exits at the next
    /// flag check. Connections already queued when the flag clears are
    /// still served in full.
    pub fn run<S: KeySink>(
        &self,
        engine: &mut InjectionEngine<S>,
        running: &AtomicBool,
    ) -> Result<(), ServerError> {
        while running.load(Ordering::SeqCst) {
            let stream = match self.listener.accept() {
                Ok((stream, _addr)) => stream,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ServerError::Accept(e)),
            };
            info!("client connected");
            self.serve_connection(stream, engine)?;
        }
        Ok(())
    }

    /// Feed one connection's reads into the engine until end of stream.
    fn serve_connection<S: KeySink>(
        &self,
        mut stream: UnixStream,
        engine: &mut InjectionEngine<S>,
    ) -> Result<(), ServerError> {
        let mut buffer = [0u8; CHUNK_CAPACITY];
        loop {
            match stream.read(&mut buffer) {
                Ok(0) => {
                    info!("client disconnected");
                    return Ok(());
                }
                // One read is one chunk; the boundary matters to the
                // engine's lone-keystroke rule.
                Ok(n) => engine.process_chunk(&buffer[..n])?,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("read error, dropping connection: {}", e);
                    return Ok(());
                }
            }
        }
    }
}

impl Drop for SocketServer {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn sockaddr_un(path: &Path) -> Result<libc::sockaddr_un, ServerError> {
    use std::os::unix::ffi::OsStrExt;

    let bytes = path.as_os_str().as_bytes();
    let mut addr: libc::sockaddr_un = unsafe { std::mem::zeroed() };
    // One slot is reserved for the trailing NUL.
    if bytes.len() >= addr.sun_path.len() {
        return Err(ServerError::PathTooLong(path.to_path_buf()));
    }

    addr.sun_family = libc::AF_UNIX as libc::sa_family_t;
    for (dst, &src) in addr.sun_path.iter_mut().zip(bytes) {
        *dst = src as libc::c_char;
    }
    Ok(addr)
}
