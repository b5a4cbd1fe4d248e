//! nl80211 wireless telemetry via Generic Netlink.
//!
//! nl80211 is the kernel's configuration interface for 802.11 devices. This
//! module speaks the read-only subset needed to enumerate wireless
//! interfaces, find the BSS an interface is associated with, and read the
//! statistics of a station interface's peer.
//!
//! # Example
//!
//! ```rust,no_run
//! use wlink::netlink::genl::nl80211::{InterfaceType, Nl80211Connection};
//!
//! # async fn example() -> wlink::Result<()> {
//! let conn = Nl80211Connection::new().await?;
//!
//! for ifi in conn.get_interfaces().await? {
//!     println!("{} ({}): {}", ifi.name, ifi.index, ifi.iftype);
//!     if ifi.iftype != InterfaceType::Station {
//!         continue;
//!     }
//!     if let Some(bss) = conn.get_bss(ifi.index).await? {
//!         println!("  BSS {} on {} MHz", bss.bssid, bss.frequency);
//!     }
//!     if let Some(sta) = conn.get_station_info(ifi.index).await? {
//!         println!("  signal {} dBm", sta.signal);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod connection;
mod parse;
mod types;

pub use connection::Nl80211Connection;
pub use types::{Bss, BssStatus, HardwareAddr, Interface, InterfaceType, StationInfo};

/// nl80211 Generic Netlink family name.
pub const NL80211_GENL_NAME: &str = "nl80211";

/// nl80211 commands used by this crate.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nl80211Cmd {
    GetInterface = 5,
    NewInterface = 7,
    GetStation = 17,
    NewStation = 19,
    GetScan = 32,
    NewScanResults = 34,
}

impl Nl80211Cmd {
    /// Operation name used in error context.
    pub fn name(self) -> &'static str {
        match self {
            Self::GetInterface => "nl80211 get_interface",
            Self::NewInterface => "nl80211 new_interface",
            Self::GetStation => "nl80211 get_station",
            Self::NewStation => "nl80211 new_station",
            Self::GetScan => "nl80211 get_scan",
            Self::NewScanResults => "nl80211 new_scan_results",
        }
    }
}

/// Top-level nl80211 attributes (enum nl80211_attrs).
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nl80211Attr {
    Wiphy = 1,
    Ifindex = 3,
    Ifname = 4,
    Iftype = 5,
    Mac = 6,
    StaInfo = 21,
    WiphyFreq = 38,
    Generation = 46,
    Bss = 47,
    Wdev = 153,
}

/// Attributes nested in NL80211_ATTR_BSS (enum nl80211_bss).
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BssAttr {
    Bssid = 1,
    Frequency = 2,
    Tsf = 3,
    BeaconInterval = 4,
    Capability = 5,
    InformationElements = 6,
    SignalMbm = 7,
    SignalUnspec = 8,
    Status = 9,
    SeenMsAgo = 10,
    BeaconIes = 11,
}

/// Attributes nested in NL80211_ATTR_STA_INFO (enum nl80211_sta_info).
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaInfoAttr {
    InactiveTime = 1,
    RxBytes = 2,
    TxBytes = 3,
    Signal = 7,
    TxBitrate = 8,
    RxPackets = 9,
    TxPackets = 10,
    TxRetries = 11,
    TxFailed = 12,
    SignalAvg = 13,
    RxBitrate = 14,
    BssParam = 15,
    ConnectedTime = 16,
    StaFlags = 17,
    BeaconLoss = 18,
    RxBytes64 = 23,
    TxBytes64 = 24,
}

/// Attributes nested in the TX/RX bitrate containers (enum nl80211_rate_info).
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateInfoAttr {
    /// Total bitrate, u16, units of 100 kbit/s.
    Bitrate = 1,
    Mcs = 2,
    Width40 = 3,
    ShortGi = 4,
    /// Total bitrate, u32, units of 100 kbit/s.
    Bitrate32 = 5,
}

/// Information element ID carrying the SSID.
pub const WLAN_EID_SSID: u8 = 0;

/// Maximum SSID length in octets.
pub const SSID_MAX_LEN: usize = 32;
