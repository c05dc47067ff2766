//! Network abstraction layer
//!
//! The participant talks to its two UDP ports through [`DatagramTransport`],
//! implemented here for `tokio::net::UdpSocket`.

mod tokio_impl;
mod traits;


pub use tokio_impl::{UdpSocket, bind_udp};
pub use traits::{DatagramTransport, nonblocking};
