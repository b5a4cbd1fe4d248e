//! Netlink protocol plumbing for the nl80211 client.
//!
//! Layers, leaves first:
//!
//! - [`attr`], [`message`], [`builder`]: wire format (headers, TLV
//!   attributes, alignment) for decoding and encoding messages
//! - [`socket`]: the [`Transport`] trait and the kernel socket
//! - [`genl`]: Generic Netlink family resolution and exchanges, with the
//!   nl80211 family in [`genl::nl80211`]
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wlink::netlink::genl::nl80211::Nl80211Connection;
//!
//! # async fn example() -> wlink::Result<()> {
//! let conn = Nl80211Connection::new().await?;
//! for ifi in conn.get_interfaces().await? {
//!     println!("{}: {}", ifi.index, ifi.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod attr;
pub mod builder;
pub mod error;
pub mod genl;
pub mod message;
pub mod socket;

pub use builder::MessageBuilder;
pub use error::{Error, Result};
#[cfg(target_os = "linux")]
pub use socket::NetlinkSocket;
pub use socket::Transport;
