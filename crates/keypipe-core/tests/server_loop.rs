// Keypipe Server Loop Integration Tests
//
// Drives a real Unix socket server thread with a recording sink: one
// message per connection, so each write arrives as one chunk.

use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use keypipe_core::{DeviceError, InjectionEngine, KeySink, Keycode, SocketServer};

const LEFT_SHIFT: u8 = 42;
const KEY_A: u8 = 30;
const KEY_S: u8 = 31;
const KEY_B: u8 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emission {
    Press(u8),
    Release(u8),
}

use Emission::{Press, Release};

/// Recording sink whose log outlives the server thread.
#[derive(Clone, Default)]
struct SharedSink {
    emitted: Arc<Mutex<Vec<Emission>>>,
}

impl KeySink for SharedSink {
    fn press(&mut self, key: Keycode) -> Result<(), DeviceError> {
        self.emitted.lock().unwrap().push(Emission::Press(key.raw()));
        Ok(())
    }

    fn release(&mut self, key: Keycode) -> Result<(), DeviceError> {
        self.emitted
            .lock()
            .unwrap()
            .push(Emission::Release(key.raw()));
        Ok(())
    }
}

fn temp_socket_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("keypipe-test-{}-{}.socket", tag, std::process::id()))
}

/// Write one message on its own connection, then close it. With the
/// serial accept model the server finishes this connection before it
/// accepts the next one.
fn send_message(path: &PathBuf, bytes: &[u8]) {
    let mut client = UnixStream::connect(path).expect("connect to test server");
    client.write_all(bytes).expect("write message");
}

fn stop_server(path: &PathBuf, running: &AtomicBool) {
    running.store(false, Ordering::SeqCst);
    // Wake the blocking accept so the loop observes the cleared flag.
    let _ = UnixStream::connect(path);
}

#[test]
fn test_server_feeds_chunks_and_survives_reconnects() {
    let path = temp_socket_path("chunks");
    let server = SocketServer::bind(&path).expect("bind test socket");

    let sink = SharedSink::default();
    let emitted = sink.emitted.clone();
    let mut engine = InjectionEngine::new(sink);

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    let handle = thread::spawn(move || server.run(&mut engine, &flag));

    // Connection 1: latch shift.
    send_message(&path, &[LEFT_SHIFT]);
    // Connection 2: a two-byte message; the latch must survive it.
    send_message(&path, &[KEY_A, KEY_S]);
    // Connection 3: a lone keystroke; the latch must be released.
    send_message(&path, &[KEY_B]);

    stop_server(&path, &running);
    handle.join().unwrap().expect("server loop result");

    assert_eq!(
        *emitted.lock().unwrap(),
        vec![
            Press(LEFT_SHIFT),
            Press(KEY_A),
            Release(KEY_A),
            Press(KEY_S),
            Release(KEY_S),
            Press(KEY_B),
            Release(KEY_B),
            Release(LEFT_SHIFT),
        ]
    );
}

#[test]
fn test_server_ignores_empty_connection() {
    let path = temp_socket_path("empty");
    let server = SocketServer::bind(&path).expect("bind test socket");

    let sink = SharedSink::default();
    let emitted = sink.emitted.clone();
    let mut engine = InjectionEngine::new(sink);

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    let handle = thread::spawn(move || server.run(&mut engine, &flag));

    // Connect and close without writing anything.
    drop(UnixStream::connect(&path).expect("connect to test server"));
    // A later client still gets serviced.
    send_message(&path, &[KEY_A]);

    stop_server(&path, &running);
    handle.join().unwrap().expect("server loop result");

    assert_eq!(*emitted.lock().unwrap(), vec![Press(KEY_A), Release(KEY_A)]);
}

#[test]
fn test_bind_replaces_stale_socket_file() {
    let path = temp_socket_path("stale");
    std::fs::write(&path, b"stale").expect("plant stale file");

    let server = SocketServer::bind(&path).expect("bind over stale file");
    assert_eq!(server.path(), path.as_path());

    // The stale regular file is gone; the path is now a live socket.
    let metadata = std::fs::symlink_metadata(&path).expect("socket metadata");
    assert!(!metadata.is_file());
}

#[test]
fn test_dropping_server_removes_socket_file() {
    let path = temp_socket_path("cleanup");
    let server = SocketServer::bind(&path).expect("bind test socket");
    assert!(path.exists());

    drop(server);
    assert!(!path.exists());
}
