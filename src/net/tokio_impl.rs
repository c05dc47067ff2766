//! Tokio runtime implementation

use std::io::Result;
use std::net::{IpAddr, SocketAddr};

use super::traits::{DatagramTransport, nonblocking};

// Re-export tokio types for convenience
pub use tokio::net::UdpSocket;

impl DatagramTransport for UdpSocket {
    fn recv_nonblocking(&self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>> {
        nonblocking(self.try_recv_from(buf))
    }

    fn send_nonblocking(&self, buf: &[u8], target: SocketAddr) -> Result<usize> {
        self.try_send_to(buf, target)
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        UdpSocket::local_addr(self)
    }
}

/// UDP socket helper
///
/// # Errors
///
/// Returns the bind error, e.g. when the port is taken.
pub async fn bind_udp(address: IpAddr, port: u16) -> Result<UdpSocket> {
    UdpSocket::bind(SocketAddr::new(address, port)).await
}
