//! Network reachability capability.
//!
//! Consulted by calling code before a fetch. The cipher never looks at it.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Answers whether the network path to a service is currently usable.
pub trait Reachability {
    fn is_reachable(&self) -> bool;
}

impl<F> Reachability for F
where
    F: Fn() -> bool,
{
    fn is_reachable(&self) -> bool {
        self()
    }
}

/// Reachable when a TCP connection to `addr` opens within `timeout`.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    /// `addr` is a `host:port` pair, resolved on every probe.
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    fn resolve(&self) -> Vec<SocketAddr> {
        match self.addr.to_socket_addrs() {
            Ok(addrs) => addrs.collect(),
            Err(err) => {
                tracing::debug!(addr = %self.addr, error = %err, "reachability probe could not resolve");
                Vec::new()
            }
        }
    }
}

impl Reachability for TcpProbe {
    fn is_reachable(&self) -> bool {
        self.resolve()
            .iter()
            .any(|addr| TcpStream::connect_timeout(addr, self.timeout).is_ok())
    }
}
