//! Async nl80211 client for WiFi telemetry on Linux.
//!
//! This crate reads wireless interface state, the BSS an interface is
//! joined to, and station statistics from the kernel's nl80211 Generic
//! Netlink family. It is read-only: nothing here scans, associates or
//! changes configuration.
//!
//! # Features
//!
//! - `output` - JSON/text output formatting
//! - `testing` - in-memory kernel double ([`testing::ScriptedTransport`])
//! - `full` - All features enabled
//!
//! # Example
//!
//! ```rust,no_run
//! use wlink::Client;
//!
//! #[tokio::main]
//! async fn main() -> wlink::Result<()> {
//!     let client = Client::new().await?;
//!
//!     for ifi in client.interfaces().await? {
//!         println!("{}: {} ({})", ifi.index, ifi.name, ifi.iftype);
//!         match client.bss(&ifi).await {
//!             Ok(bss) => println!("  SSID {}", bss.ssid_lossy()),
//!             Err(e) if e.is_absent() => println!("  not associated"),
//!             Err(e) => return Err(e),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! On operating systems other than Linux, [`Client::new`] fails with
//! [`Error::Unsupported`].

// Core modules (always available)
pub mod client;
pub mod netlink;

// Feature-gated modules
#[cfg(feature = "output")]
pub mod output;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export common types at crate root for convenience
pub use client::{Backend, Client};
pub use netlink::genl::nl80211::{
    Bss, BssStatus, HardwareAddr, Interface, InterfaceType, Nl80211Connection, StationInfo,
};
pub use netlink::{Error, Result};
