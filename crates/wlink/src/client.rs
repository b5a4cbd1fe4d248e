//! Platform-independent wireless client.
//!
//! [`Client`] is the entry point most callers want. It delegates to a
//! [`Backend`] chosen at build time: the nl80211 backend on Linux, and
//! [`Unsupported`] everywhere else.
//!
//! # Example
//!
//! ```rust,no_run
//! use wlink::Client;
//! use wlink::netlink::genl::nl80211::InterfaceType;
//!
//! # async fn example() -> wlink::Result<()> {
//! let mut client = Client::new().await?;
//!
//! for ifi in client.interfaces().await? {
//!     if ifi.iftype != InterfaceType::Station {
//!         continue;
//!     }
//!     match client.station_info(&ifi).await {
//!         Ok(sta) => println!("{}: {} dBm", ifi.name, sta.signal),
//!         Err(e) if e.is_absent() => println!("{}: not connected", ifi.name),
//!         Err(e) => return Err(e),
//!     }
//! }
//!
//! client.close()?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use crate::netlink::error::{Error, Result};
use crate::netlink::genl::GenlConnection;
use crate::netlink::genl::nl80211::{Bss, Interface, InterfaceType, Nl80211Connection, StationInfo};
use crate::netlink::socket::Transport;

/// Operating-system specific source of wireless telemetry.
///
/// Absence is reported as `Ok(None)`; [`Client`] turns it into the
/// matching error.
pub trait Backend: Send + Sync {
    /// List wireless interfaces.
    fn interfaces(&self) -> impl Future<Output = Result<Vec<Interface>>> + Send;

    /// Current BSS of `ifi`, if any.
    fn bss(&self, ifi: &Interface) -> impl Future<Output = Result<Option<Bss>>> + Send;

    /// Peer statistics of station interface `ifi`, if connected.
    fn station_info(
        &self,
        ifi: &Interface,
    ) -> impl Future<Output = Result<Option<StationInfo>>> + Send;

    /// Release backend resources.
    fn close(&mut self) -> Result<()>;
}

impl<T: Transport> Backend for Nl80211Connection<T> {
    async fn interfaces(&self) -> Result<Vec<Interface>> {
        self.get_interfaces().await
    }

    async fn bss(&self, ifi: &Interface) -> Result<Option<Bss>> {
        self.get_bss(ifi.index).await
    }

    async fn station_info(&self, ifi: &Interface) -> Result<Option<StationInfo>> {
        self.get_station_info(ifi.index).await
    }

    fn close(&mut self) -> Result<()> {
        Nl80211Connection::close(self)
    }
}

/// Backend for operating systems without wireless support in this crate.
///
/// It cannot be opened, so a [`Client`] over it is never constructed.
#[derive(Debug)]
pub struct Unsupported {
    _private: (),
}

impl Unsupported {
    /// Always fails with [`Error::Unsupported`].
    pub fn open() -> Result<Self> {
        Err(Error::unsupported())
    }
}

impl Backend for Unsupported {
    async fn interfaces(&self) -> Result<Vec<Interface>> {
        Err(Error::unsupported())
    }

    async fn bss(&self, _ifi: &Interface) -> Result<Option<Bss>> {
        Err(Error::unsupported())
    }

    async fn station_info(&self, _ifi: &Interface) -> Result<Option<StationInfo>> {
        Err(Error::unsupported())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// The backend for the target operating system.
#[cfg(target_os = "linux")]
pub type PlatformBackend = Nl80211Connection<crate::netlink::socket::NetlinkSocket>;

/// The backend for the target operating system.
#[cfg(not(target_os = "linux"))]
pub type PlatformBackend = Unsupported;

/// Wireless client: interfaces, BSS and station statistics.
///
/// A client is open from construction until [`close`](Self::close). Every
/// operation on a closed client fails with [`Error::Closed`] without
/// touching the kernel. Each operation is one request/response exchange;
/// nothing is retried and no timeout is applied.
pub struct Client<B = PlatformBackend> {
    backend: Option<B>,
}

impl Client {
    /// Open a client on the platform backend.
    ///
    /// Fails with [`Error::Unsupported`] on operating systems other than
    /// Linux, and with [`Error::FamilyNotFound`] when the kernel lacks
    /// nl80211.
    pub async fn new() -> Result<Self> {
        Ok(Self::from_backend(open_platform_backend().await?))
    }
}

#[cfg(target_os = "linux")]
async fn open_platform_backend() -> Result<PlatformBackend> {
    Nl80211Connection::new().await
}

#[cfg(not(target_os = "linux"))]
async fn open_platform_backend() -> Result<PlatformBackend> {
    Unsupported::open()
}

impl<T: Transport> Client<Nl80211Connection<T>> {
    /// Open a client speaking nl80211 over `transport`.
    pub async fn with_transport(transport: T) -> Result<Self> {
        let conn = Nl80211Connection::from_genl(GenlConnection::from_transport(transport)).await?;
        Ok(Self::from_backend(conn))
    }
}

impl<B: Backend> Client<B> {
    /// Wrap an already open backend.
    pub fn from_backend(backend: B) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    fn backend(&self) -> Result<&B> {
        self.backend.as_ref().ok_or(Error::Closed)
    }

    /// List wireless interfaces. No wireless hardware yields an empty list.
    pub async fn interfaces(&self) -> Result<Vec<Interface>> {
        self.backend()?.interfaces().await
    }

    /// Get the BSS `ifi` is currently joined to.
    ///
    /// Fails with [`Error::NotAssociated`] when there is none.
    pub async fn bss(&self, ifi: &Interface) -> Result<Bss> {
        self.backend()?
            .bss(ifi)
            .await?
            .ok_or_else(|| Error::NotAssociated {
                interface: ifi.name.clone(),
            })
    }

    /// Get statistics for the peer of station interface `ifi`.
    ///
    /// Fails with [`Error::NotStation`], without any I/O, when `ifi` is not a
    /// station, and with [`Error::NotConnected`] when no peer is connected.
    pub async fn station_info(&self, ifi: &Interface) -> Result<StationInfo> {
        let backend = self.backend()?;
        if ifi.iftype != InterfaceType::Station {
            return Err(Error::NotStation {
                interface: ifi.name.clone(),
            });
        }
        backend
            .station_info(ifi)
            .await?
            .ok_or_else(|| Error::NotConnected {
                interface: ifi.name.clone(),
            })
    }

    /// Release the backend. A second call fails with [`Error::Closed`].
    pub fn close(&mut self) -> Result<()> {
        let mut backend = self.backend.take().ok_or(Error::Closed)?;
        tracing::debug!("closing wireless client");
        backend.close()
    }
}
