//! nl80211 record types.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// A 6-byte IEEE 802 hardware address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HardwareAddr(pub [u8; 6]);

impl HardwareAddr {
    /// Raw address bytes.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// All-zero address, as reported for hardware without one.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }
}

impl From<[u8; 6]> for HardwareAddr {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

#[cfg(feature = "output")]
impl serde::Serialize for HardwareAddr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Virtual interface type (enum nl80211_iftype).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InterfaceType {
    #[default]
    Unspecified,
    AdHoc,
    Station,
    Ap,
    ApVlan,
    Wds,
    Monitor,
    MeshPoint,
    P2pClient,
    P2pGo,
    P2pDevice,
    Ocb,
    Nan,
    /// A type this crate does not know about.
    Unknown(u32),
}

impl InterfaceType {
    /// The kernel's numeric value.
    pub fn number(self) -> u32 {
        match self {
            Self::Unspecified => 0,
            Self::AdHoc => 1,
            Self::Station => 2,
            Self::Ap => 3,
            Self::ApVlan => 4,
            Self::Wds => 5,
            Self::Monitor => 6,
            Self::MeshPoint => 7,
            Self::P2pClient => 8,
            Self::P2pGo => 9,
            Self::P2pDevice => 10,
            Self::Ocb => 11,
            Self::Nan => 12,
            Self::Unknown(n) => n,
        }
    }

    /// Name as printed by `iw dev`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::AdHoc => "IBSS",
            Self::Station => "managed",
            Self::Ap => "AP",
            Self::ApVlan => "AP/VLAN",
            Self::Wds => "WDS",
            Self::Monitor => "monitor",
            Self::MeshPoint => "mesh point",
            Self::P2pClient => "P2P-client",
            Self::P2pGo => "P2P-GO",
            Self::P2pDevice => "P2P-device",
            Self::Ocb => "outside context of a BSS",
            Self::Nan => "NAN",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl From<u32> for InterfaceType {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Unspecified,
            1 => Self::AdHoc,
            2 => Self::Station,
            3 => Self::Ap,
            4 => Self::ApVlan,
            5 => Self::Wds,
            6 => Self::Monitor,
            7 => Self::MeshPoint,
            8 => Self::P2pClient,
            9 => Self::P2pGo,
            10 => Self::P2pDevice,
            11 => Self::Ocb,
            12 => Self::Nan,
            n => Self::Unknown(n),
        }
    }
}

#[cfg(feature = "output")]
impl serde::Serialize for InterfaceType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(n) => write!(f, "unknown ({n})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// A wireless network interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "output", derive(serde::Serialize))]
pub struct Interface {
    /// Kernel interface index.
    pub index: u32,
    /// Interface name, e.g. `wlan0`.
    pub name: String,
    /// Hardware address; all zero when the kernel reports none.
    pub hardware_addr: HardwareAddr,
    /// Index of the wiphy (radio) this interface belongs to.
    pub phy: u32,
    /// Wireless device identifier (wdev).
    pub device: u64,
    /// Operating mode.
    pub iftype: InterfaceType,
    /// Operating frequency in MHz, present only once the interface is on a channel.
    pub frequency: Option<u32>,
}

/// Association state of a BSS (enum nl80211_bss_status).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BssStatus {
    /// The scan result carried no status: a BSS seen but not joined.
    #[default]
    NotAssociated,
    Authenticated,
    Associated,
    IbssJoined,
    /// A status value this crate does not know about.
    Unknown(u32),
}

impl From<u32> for BssStatus {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Authenticated,
            1 => Self::Associated,
            2 => Self::IbssJoined,
            n => Self::Unknown(n),
        }
    }
}

#[cfg(feature = "output")]
impl serde::Serialize for BssStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for BssStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAssociated => f.write_str("not associated"),
            Self::Authenticated => f.write_str("authenticated"),
            Self::Associated => f.write_str("associated"),
            Self::IbssJoined => f.write_str("joined"),
            Self::Unknown(n) => write!(f, "unknown ({n})"),
        }
    }
}

/// A basic service set: the network an interface is joined to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "output", derive(serde::Serialize))]
pub struct Bss {
    /// Hardware address of the access point.
    pub bssid: HardwareAddr,
    /// Raw SSID octets (0-32 bytes, not necessarily UTF-8).
    #[cfg_attr(feature = "output", serde(serialize_with = "crate::output::ser::lossy_text"))]
    pub ssid: Vec<u8>,
    /// Frequency in MHz.
    pub frequency: u32,
    /// Interval between beacons.
    #[cfg_attr(feature = "output", serde(serialize_with = "crate::output::ser::millis"))]
    pub beacon_interval: Duration,
    /// Time since a beacon or probe response from this BSS was last seen.
    #[cfg_attr(feature = "output", serde(serialize_with = "crate::output::ser::millis"))]
    pub last_seen: Duration,
    /// Association state.
    pub status: BssStatus,
}

impl Bss {
    /// SSID as text, with invalid UTF-8 replaced.
    pub fn ssid_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.ssid)
    }
}

/// Statistics for the peer of a station interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "output", derive(serde::Serialize))]
pub struct StationInfo {
    /// Hardware address of the peer.
    pub hardware_addr: HardwareAddr,
    /// Time since the connection was established.
    #[cfg_attr(feature = "output", serde(serialize_with = "crate::output::ser::millis"))]
    pub connected: Duration,
    /// Time since the last activity.
    #[cfg_attr(feature = "output", serde(serialize_with = "crate::output::ser::millis"))]
    pub inactive: Duration,
    pub received_bytes: u64,
    pub transmitted_bytes: u64,
    pub received_packets: u64,
    pub transmitted_packets: u64,
    /// Last receive bitrate in bits per second.
    pub receive_bitrate: u64,
    /// Current transmit bitrate in bits per second.
    pub transmit_bitrate: u64,
    /// Signal strength of the last received frame, in dBm.
    pub signal: i32,
    pub transmit_retries: u64,
    pub transmit_failed: u64,
    /// Number of times beacon loss was detected.
    pub beacon_loss: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_addr_display() {
        let addr = HardwareAddr([0x00, 0x1a, 0x2b, 0xac, 0xde, 0xff]);
        assert_eq!(addr.to_string(), "00:1a:2b:ac:de:ff");
        assert!(!addr.is_zero());
        assert!(HardwareAddr::default().is_zero());
    }

    #[test]
    fn test_interface_type_numbers() {
        for n in 0..=12 {
            assert_eq!(InterfaceType::from(n).number(), n);
        }
        assert_eq!(InterfaceType::from(2), InterfaceType::Station);
        assert_eq!(InterfaceType::from(99), InterfaceType::Unknown(99));
        assert_eq!(InterfaceType::Unknown(99).to_string(), "unknown (99)");
        assert_eq!(InterfaceType::Monitor.to_string(), "monitor");
    }

    #[test]
    fn test_bss_status() {
        assert_eq!(BssStatus::from(0), BssStatus::Authenticated);
        assert_eq!(BssStatus::from(1), BssStatus::Associated);
        assert_eq!(BssStatus::from(2), BssStatus::IbssJoined);
        assert_eq!(BssStatus::from(7), BssStatus::Unknown(7));
        assert_eq!(BssStatus::default(), BssStatus::NotAssociated);
    }

    #[test]
    fn test_ssid_lossy() {
        let bss = Bss {
            ssid: vec![b'h', b'o', 0xff, b'm', b'e'],
            ..Default::default()
        };
        assert_eq!(bss.ssid_lossy(), "ho\u{fffd}me");
    }
}
