//! In-memory [`Connection`] for tests.
//!
//! The read side replays a script of chunks exactly as given, so a test
//! decides where the "socket" splits the byte stream. Writes are recorded.
//! Clones share the same script, so a test can keep one clone and feed
//! more chunks after handing the other to the code under test.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{Connection, ConnectionId, TransportError};

static NEXT_MOCK_ID: AtomicU64 = AtomicU64::new(1_000_000);

/// One scripted outcome of a `recv` call.
#[derive(Debug, Clone)]
pub enum Step {
    /// The read returns these bytes.
    Chunk(Vec<u8>),
    /// The peer closes the connection.
    Close,
    /// The read fails with a connection reset.
    Fail,
}

#[derive(Default)]
struct Shared {
    script: Mutex<VecDeque<Step>>,
    written: Mutex<Vec<Vec<u8>>>,
    fail_writes: AtomicBool,
}

/// A scripted connection. When the script runs dry, `recv` waits until
/// more steps are pushed.
#[derive(Clone)]
pub struct ScriptedConnection {
    id: ConnectionId,
    local: SocketAddr,
    shared: Arc<Shared>,
}

impl ScriptedConnection {
    /// Creates a connection with an empty script.
    pub fn new() -> Self {
        Self {
            id: ConnectionId::new(NEXT_MOCK_ID.fetch_add(1, Ordering::Relaxed)),
            local: SocketAddr::from(([10, 0, 0, 5], 27115)),
            shared: Arc::default(),
        }
    }

    /// Creates a connection whose reads return `chunks` in order.
    pub fn with_chunks(chunks: impl IntoIterator<Item = Vec<u8>>) -> Self {
        let conn = Self::new();
        for chunk in chunks {
            conn.push(Step::Chunk(chunk));
        }
        conn
    }

    /// Appends a step to the read script.
    pub fn push(&self, step: Step) {
        lock(&self.shared.script).push_back(step);
    }

    /// Appends a chunk to the read script.
    pub fn push_chunk(&self, chunk: impl Into<Vec<u8>>) {
        self.push(Step::Chunk(chunk.into()));
    }

    /// Everything written so far, one entry per `send`.
    pub fn written(&self) -> Vec<Vec<u8>> {
        lock(&self.shared.written).clone()
    }

    /// Makes every following `send` fail.
    pub fn fail_writes(&self) {
        self.shared.fail_writes.store(true, Ordering::SeqCst);
    }
}

impl Default for ScriptedConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection for ScriptedConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        if self.shared.fail_writes.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed(
                std::io::ErrorKind::BrokenPipe.into(),
            ));
        }
        lock(&self.shared.written).push(data.to_vec());
        Ok(())
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            let next = lock(&self.shared.script).pop_front();
            match next {
                Some(Step::Chunk(chunk)) => return Ok(Some(chunk)),
                Some(Step::Close) => return Ok(None),
                Some(Step::Fail) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::ErrorKind::ConnectionReset.into(),
                    ));
                }
                None => tokio::time::sleep(Duration::from_millis(5)).await,
            }
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn local_addr(&self) -> SocketAddr {
        self.local
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
