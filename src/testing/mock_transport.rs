//! In-memory datagram transport

use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::net::DatagramTransport;

#[derive(Debug, Default)]
struct State {
    inbound: VecDeque<(Vec<u8>, SocketAddr)>,
    sent: Vec<(Vec<u8>, SocketAddr)>,
    receive_error: Option<io::ErrorKind>,
    send_error: Option<io::ErrorKind>,
    short_write: Option<usize>,
}

/// Datagram transport backed by in-memory queues
///
/// Clones share the same queues, so a test keeps one handle while the
/// participant owns another.
#[derive(Debug, Clone)]
pub struct MockTransport {
    local: SocketAddr,
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    /// Create a transport reporting `local` as its address
    #[must_use]
    pub fn new(local: SocketAddr) -> Self {
        Self {
            local,
            state: Arc::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a datagram to be received
    pub fn push(&self, data: impl Into<Vec<u8>>, from: SocketAddr) {
        self.lock().inbound.push_back((data.into(), from));
    }

    /// Number of datagrams not yet received
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().inbound.len()
    }

    /// Datagrams sent so far
    #[must_use]
    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.lock().sent.clone()
    }

    /// Remove and return the datagrams sent so far
    #[must_use]
    pub fn take_sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        std::mem::take(&mut self.lock().sent)
    }

    /// Make the next receive fail with `kind`
    pub fn fail_next_receive(&self, kind: io::ErrorKind) {
        self.lock().receive_error = Some(kind);
    }

    /// Make every send fail with `kind`, or succeed again with `None`
    pub fn fail_sends(&self, kind: Option<io::ErrorKind>) {
        self.lock().send_error = kind;
    }

    /// Cap the bytes each send reports as written, or lift the cap with `None`
    pub fn short_write(&self, limit: Option<usize>) {
        self.lock().short_write = limit;
    }
}

impl DatagramTransport for MockTransport {
    fn recv_nonblocking(&self, buf: &mut [u8]) -> io::Result<Option<(usize, SocketAddr)>> {
        let mut state = self.lock();
        if let Some(kind) = state.receive_error.take() {
            return Err(io::Error::from(kind));
        }

        let Some((data, from)) = state.inbound.pop_front() else {
            return Ok(None);
        };
        // Excess bytes are discarded, as with a real datagram socket
        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(Some((len, from)))
    }

    fn send_nonblocking(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        let mut state = self.lock();
        if let Some(kind) = state.send_error {
            return Err(io::Error::from(kind));
        }

        let len = state.short_write.map_or(buf.len(), |limit| limit.min(buf.len()));
        state.sent.push((buf[..len].to_vec(), target));
        Ok(len)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(self.local)
    }
}
