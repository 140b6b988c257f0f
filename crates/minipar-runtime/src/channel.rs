//! Socket-backed channels: the shared connection table and wire helpers.
//!
//! Wire format per the language: raw bytes over TCP, at most
//! [`MAX_MESSAGE`] bytes per read, no framing, no length prefix. A
//! zero-length read means the peer closed the session.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;

use crate::error::RuntimeError;

/// Upper bound on a single channel message.
pub const MAX_MESSAGE: usize = 2048;

/// Client connection table, shared by reference across `par` branches.
///
/// The outer mutex guards only the table; each stream sits behind its own
/// mutex so a `send` holds its channel for the full write/read exchange and
/// concurrent sends on the same channel serialize.
#[derive(Clone, Default)]
pub struct Connections {
    inner: Arc<Mutex<IndexMap<String, Arc<Mutex<TcpStream>>>>>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a client connection to `host:port`, stores it under `name`,
    /// and returns the banner the server sends on accept.
    pub fn connect(&self, name: &str, host: &str, port: u16) -> Result<String, RuntimeError> {
        let mut stream = TcpStream::connect((host, port)).map_err(|err| {
            RuntimeError::new(format!("cannot connect `{name}` to {host}:{port}: {err}"))
        })?;
        let banner = read_message(&mut stream)
            .map_err(|err| RuntimeError::new(format!("receive failed on `{name}`: {err}")))?;
        self.inner
            .lock()
            .expect("connection table poisoned")
            .insert(name.to_owned(), Arc::new(Mutex::new(stream)));
        Ok(banner)
    }

    /// Writes `data` on the channel and waits for the reply. At most one
    /// exchange is in flight per channel.
    pub fn send(&self, name: &str, data: &str) -> Result<String, RuntimeError> {
        let stream = self.stream(name)?;
        let mut stream = stream.lock().expect("channel stream poisoned");
        stream
            .write_all(data.as_bytes())
            .map_err(|err| RuntimeError::new(format!("send failed on `{name}`: {err}")))?;
        read_message(&mut stream)
            .map_err(|err| RuntimeError::new(format!("receive failed on `{name}`: {err}")))
    }

    /// Closes the channel and removes it from the table.
    pub fn close(&self, name: &str) -> Result<(), RuntimeError> {
        let stream = self
            .inner
            .lock()
            .expect("connection table poisoned")
            .shift_remove(name)
            .ok_or_else(|| RuntimeError::new(format!("channel `{name}` is not open")))?;
        let stream = stream.lock().expect("channel stream poisoned");
        // The peer may already be gone; closing is best-effort.
        let _ = stream.shutdown(Shutdown::Both);
        Ok(())
    }

    fn stream(&self, name: &str) -> Result<Arc<Mutex<TcpStream>>, RuntimeError> {
        self.inner
            .lock()
            .expect("connection table poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::new(format!("channel `{name}` is not open")))
    }
}

/// Reads one message of up to [`MAX_MESSAGE`] bytes as UTF-8 text. An empty
/// result means the peer closed the connection.
pub fn read_message(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buf = [0u8; MAX_MESSAGE];
    let n = stream.read(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
}
