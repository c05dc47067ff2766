//! Datagram transport seam

use std::io::{ErrorKind, Result};
use std::net::SocketAddr;

/// Non-blocking datagram socket
///
/// The participant never waits on a socket: receives report "no data" and
/// sends are attempted once.
pub trait DatagramTransport: Send {
    /// Receive one datagram if one is queued
    ///
    /// Returns `Ok(None)` when nothing is available.
    ///
    /// # Errors
    ///
    /// Any failure other than "would block".
    fn recv_nonblocking(&self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>>;

    /// Send one datagram without waiting, returning the bytes written
    ///
    /// # Errors
    ///
    /// Any transport failure, including "would block".
    fn send_nonblocking(&self, buf: &[u8], target: SocketAddr) -> Result<usize>;

    /// Local address the socket is bound to
    ///
    /// # Errors
    ///
    /// Returns an error if the socket has no local address.
    fn local_addr(&self) -> Result<SocketAddr>;
}

/// Map a "would block" outcome of a non-blocking receive to `None`
///
/// # Errors
///
/// Passes every other error through.
pub fn nonblocking<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
        Err(e) => Err(e),
    }
}

impl<T: DatagramTransport + Sync + ?Sized> DatagramTransport for std::sync::Arc<T> {
    fn recv_nonblocking(&self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>> {
        (**self).recv_nonblocking(buf)
    }

    fn send_nonblocking(&self, buf: &[u8], target: SocketAddr) -> Result<usize> {
        (**self).send_nonblocking(buf, target)
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        (**self).local_addr()
    }
}
