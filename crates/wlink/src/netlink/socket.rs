//! Netlink transport: the [`Transport`] seam and the async generic netlink socket.

use std::future::Future;

use super::error::Result;

/// A datagram transport carrying netlink messages.
///
/// [`NetlinkSocket`] is the kernel implementation. The trait exists so the
/// generic netlink layer can be driven by any message source.
pub trait Transport: Send + Sync {
    /// Local port ID stamped into outgoing headers.
    fn pid(&self) -> u32;

    /// Next request sequence number.
    fn next_seq(&self) -> u32;

    /// Send one fully framed request.
    fn send(&self, msg: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Receive one datagram, which may hold several netlink messages.
    fn recv_msg(&self) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Release the underlying resource. Later sends fail with `Error::Closed`.
    fn close(&mut self) -> Result<()>;
}

#[cfg(target_os = "linux")]
pub use linux::NetlinkSocket;

#[cfg(target_os = "linux")]
mod linux {
    use std::os::unix::io::{AsRawFd, RawFd};
    use std::sync::atomic::{AtomicU32, Ordering};

    use bytes::BytesMut;
    use netlink_sys::{Socket, SocketAddr, protocols};
    use tokio::io::Interest;
    use tokio::io::unix::AsyncFd;

    use super::Transport;
    use crate::netlink::error::{Error, Result};

    /// Receive buffer size; large enough for a full nl80211 dump datagram.
    const RECV_BUF_SIZE: usize = 32768;

    /// Async NETLINK_GENERIC socket.
    ///
    /// The file descriptor is closed when the socket is dropped or
    /// [`close`](Transport::close)d, whichever comes first.
    pub struct NetlinkSocket {
        /// The underlying async file descriptor, `None` once closed.
        fd: Option<AsyncFd<Socket>>,
        /// Sequence number counter.
        seq: AtomicU32,
        /// Local port ID (assigned by kernel).
        pid: u32,
    }

    impl NetlinkSocket {
        /// Open and bind a generic netlink socket.
        pub fn new() -> Result<Self> {
            let mut socket = Socket::new(protocols::NETLINK_GENERIC)?;
            socket.set_non_blocking(true)?;

            // Bind to get a port ID
            let mut addr = SocketAddr::new(0, 0);
            socket.bind(&addr)?;
            socket.get_address(&mut addr)?;
            let pid = addr.port_number();

            // Enable extended ACK for better error messages
            socket.set_ext_ack(true).ok(); // Ignore if not supported

            let fd = AsyncFd::new(socket)?;
            tracing::debug!(pid, "opened generic netlink socket");

            Ok(Self {
                fd: Some(fd),
                seq: AtomicU32::new(1),
                pid,
            })
        }

        fn fd(&self) -> Result<&AsyncFd<Socket>> {
            self.fd.as_ref().ok_or(Error::Closed)
        }
    }

    impl Transport for NetlinkSocket {
        fn pid(&self) -> u32 {
            self.pid
        }

        fn next_seq(&self) -> u32 {
            self.seq.fetch_add(1, Ordering::Relaxed)
        }

        async fn send(&self, msg: &[u8]) -> Result<()> {
            let fd = self.fd()?;
            loop {
                let mut guard = fd.ready(Interest::WRITABLE).await?;

                match guard.try_io(|inner| inner.get_ref().send(msg, 0)) {
                    Ok(result) => {
                        result?;
                        return Ok(());
                    }
                    Err(_would_block) => continue,
                }
            }
        }

        async fn recv_msg(&self) -> Result<Vec<u8>> {
            let fd = self.fd()?;
            let mut buf = BytesMut::with_capacity(RECV_BUF_SIZE);

            loop {
                let mut guard = fd.ready(Interest::READABLE).await?;

                match guard.try_io(|inner| inner.get_ref().recv(&mut buf, 0)) {
                    Ok(result) => {
                        let _n = result?;
                        // buf has been advanced by recv, so buf[..] contains the data
                        return Ok(buf.to_vec());
                    }
                    Err(_would_block) => continue,
                }
            }
        }

        fn close(&mut self) -> Result<()> {
            if self.fd.take().is_some() {
                tracing::debug!(pid = self.pid, "closed generic netlink socket");
            }
            Ok(())
        }
    }

    impl AsRawFd for NetlinkSocket {
        /// Returns -1 once the socket is closed.
        fn as_raw_fd(&self) -> RawFd {
            self.fd
                .as_ref()
                .map(|fd| fd.get_ref().as_raw_fd())
                .unwrap_or(-1)
        }
    }
}
