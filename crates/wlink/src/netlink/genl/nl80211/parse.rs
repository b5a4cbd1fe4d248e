//! Mapping of nl80211 attribute streams onto record types.
//!
//! Each parser walks one attribute section with [`AttrIter`], keeps the
//! attributes it knows and skips the rest. Any malformed attribute, or a
//! missing mandatory one, fails the whole record.

use std::time::Duration;

use super::types::{Bss, BssStatus, HardwareAddr, Interface, InterfaceType, StationInfo};
use super::{BssAttr, Nl80211Attr, RateInfoAttr, SSID_MAX_LEN, StaInfoAttr, WLAN_EID_SSID};
use crate::netlink::attr::{Attr, AttrIter, get};
use crate::netlink::error::{Error, Result};

/// One 802.11 time unit.
const TIME_UNIT: Duration = Duration::from_micros(1024);

/// Bitrates are reported in units of 100 kbit/s.
const BITRATE_UNIT_BPS: u64 = 100_000;

fn hardware_addr(attr: &Attr<'_>) -> Result<HardwareAddr> {
    get::mac(attr.payload()).map(HardwareAddr)
}

/// Decode one NL80211_CMD_NEW_INTERFACE message.
pub(super) fn parse_interface(data: &[u8]) -> Result<Interface> {
    let mut index = None;
    let mut ifi = Interface::default();

    for attr in AttrIter::new(data) {
        let attr = attr?;
        match attr.kind() {
            t if t == Nl80211Attr::Ifindex as u16 => index = Some(attr.u32()?),
            t if t == Nl80211Attr::Ifname as u16 => ifi.name = attr.string()?.to_string(),
            t if t == Nl80211Attr::Mac as u16 => ifi.hardware_addr = hardware_addr(&attr)?,
            t if t == Nl80211Attr::Wiphy as u16 => ifi.phy = attr.u32()?,
            t if t == Nl80211Attr::Wdev as u16 => ifi.device = attr.u64()?,
            t if t == Nl80211Attr::Iftype as u16 => ifi.iftype = InterfaceType::from(attr.u32()?),
            t if t == Nl80211Attr::WiphyFreq as u16 => ifi.frequency = Some(attr.u32()?),
            _ => {}
        }
    }

    ifi.index = index.ok_or(Error::MissingAttribute {
        record: "interface",
        attribute: "NL80211_ATTR_IFINDEX",
    })?;
    Ok(ifi)
}

/// Decode the BSS carried by one NL80211_CMD_NEW_SCAN_RESULTS message.
///
/// Returns `None` when the message has no BSS container.
pub(super) fn parse_scan_result(data: &[u8]) -> Result<Option<Bss>> {
    for attr in AttrIter::new(data) {
        let attr = attr?;
        if attr.kind() == Nl80211Attr::Bss as u16 {
            return parse_bss(attr.payload()).map(Some);
        }
    }
    Ok(None)
}

/// Decode the contents of an NL80211_ATTR_BSS container.
pub(super) fn parse_bss(data: &[u8]) -> Result<Bss> {
    let mut bssid = None;
    let mut bss = Bss::default();

    for attr in AttrIter::new(data) {
        let attr = attr?;
        match attr.kind() {
            t if t == BssAttr::Bssid as u16 => bssid = Some(hardware_addr(&attr)?),
            t if t == BssAttr::Frequency as u16 => bss.frequency = attr.u32()?,
            t if t == BssAttr::BeaconInterval as u16 => {
                bss.beacon_interval = TIME_UNIT * u32::from(attr.u16()?);
            }
            t if t == BssAttr::SeenMsAgo as u16 => {
                bss.last_seen = Duration::from_millis(u64::from(attr.u32()?));
            }
            t if t == BssAttr::InformationElements as u16 => {
                bss.ssid = parse_ssid(attr.payload())?.unwrap_or_default();
            }
            t if t == BssAttr::Status as u16 => bss.status = BssStatus::from(attr.u32()?),
            _ => {}
        }
    }

    bss.bssid = bssid.ok_or(Error::MissingAttribute {
        record: "bss",
        attribute: "NL80211_BSS_BSSID",
    })?;
    Ok(bss)
}

/// Find the SSID element in an information element stream.
///
/// Elements are a 1-byte ID and a 1-byte length followed by that many
/// bytes, back to back.
fn parse_ssid(mut ies: &[u8]) -> Result<Option<Vec<u8>>> {
    while !ies.is_empty() {
        let [id, len, rest @ ..] = ies else {
            return Err(Error::InvalidAttribute(
                "truncated information element header".into(),
            ));
        };
        let len = usize::from(*len);
        if len > rest.len() {
            return Err(Error::InvalidAttribute(format!(
                "information element {id} length {len} exceeds {} remaining bytes",
                rest.len()
            )));
        }
        if *id == WLAN_EID_SSID {
            if len > SSID_MAX_LEN {
                return Err(Error::InvalidAttribute(format!("SSID of {len} bytes")));
            }
            return Ok(Some(rest[..len].to_vec()));
        }
        ies = &rest[len..];
    }
    Ok(None)
}

/// Decode one NL80211_CMD_NEW_STATION message.
pub(super) fn parse_station(data: &[u8]) -> Result<StationInfo> {
    let mut mac = None;
    let mut info = None;

    for attr in AttrIter::new(data) {
        let attr = attr?;
        match attr.kind() {
            t if t == Nl80211Attr::Mac as u16 => mac = Some(hardware_addr(&attr)?),
            t if t == Nl80211Attr::StaInfo as u16 => info = Some(parse_sta_info(attr.payload())?),
            _ => {}
        }
    }

    let mut sta = info.ok_or(Error::MissingAttribute {
        record: "station",
        attribute: "NL80211_ATTR_STA_INFO",
    })?;
    sta.hardware_addr = mac.ok_or(Error::MissingAttribute {
        record: "station",
        attribute: "NL80211_ATTR_MAC",
    })?;
    Ok(sta)
}

/// Decode the contents of an NL80211_ATTR_STA_INFO container.
fn parse_sta_info(data: &[u8]) -> Result<StationInfo> {
    let mut sta = StationInfo::default();
    let mut rx_bytes64 = None;
    let mut tx_bytes64 = None;

    for attr in AttrIter::new(data) {
        let attr = attr?;
        match attr.kind() {
            t if t == StaInfoAttr::ConnectedTime as u16 => {
                sta.connected = Duration::from_secs(u64::from(attr.u32()?));
            }
            t if t == StaInfoAttr::InactiveTime as u16 => {
                sta.inactive = Duration::from_millis(u64::from(attr.u32()?));
            }
            t if t == StaInfoAttr::RxBytes as u16 => sta.received_bytes = u64::from(attr.u32()?),
            t if t == StaInfoAttr::TxBytes as u16 => {
                sta.transmitted_bytes = u64::from(attr.u32()?);
            }
            t if t == StaInfoAttr::RxBytes64 as u16 => rx_bytes64 = Some(attr.u64()?),
            t if t == StaInfoAttr::TxBytes64 as u16 => tx_bytes64 = Some(attr.u64()?),
            t if t == StaInfoAttr::RxPackets as u16 => {
                sta.received_packets = u64::from(attr.u32()?);
            }
            t if t == StaInfoAttr::TxPackets as u16 => {
                sta.transmitted_packets = u64::from(attr.u32()?);
            }
            t if t == StaInfoAttr::TxRetries as u16 => {
                sta.transmit_retries = u64::from(attr.u32()?);
            }
            t if t == StaInfoAttr::TxFailed as u16 => sta.transmit_failed = u64::from(attr.u32()?),
            t if t == StaInfoAttr::BeaconLoss as u16 => sta.beacon_loss = u64::from(attr.u32()?),
            t if t == StaInfoAttr::Signal as u16 => sta.signal = i32::from(attr.i8()?),
            t if t == StaInfoAttr::TxBitrate as u16 => {
                sta.transmit_bitrate = parse_rate_info(attr.payload())?;
            }
            t if t == StaInfoAttr::RxBitrate as u16 => {
                sta.receive_bitrate = parse_rate_info(attr.payload())?;
            }
            _ => {}
        }
    }

    // 32-bit byte counters wrap at 4 GiB
    if let Some(rx) = rx_bytes64 {
        sta.received_bytes = rx;
    }
    if let Some(tx) = tx_bytes64 {
        sta.transmitted_bytes = tx;
    }

    Ok(sta)
}

/// Decode a rate info container into bits per second.
fn parse_rate_info(data: &[u8]) -> Result<u64> {
    let mut bitrate16 = None;
    let mut bitrate32 = None;

    for attr in AttrIter::new(data) {
        let attr = attr?;
        match attr.kind() {
            t if t == RateInfoAttr::Bitrate as u16 => bitrate16 = Some(u32::from(attr.u16()?)),
            t if t == RateInfoAttr::Bitrate32 as u16 => bitrate32 = Some(attr.u32()?),
            _ => {}
        }
    }

    let units = bitrate32.or(bitrate16).unwrap_or(0);
    Ok(u64::from(units) * BITRATE_UNIT_BPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::builder::MessageBuilder;
    use crate::netlink::message::NLMSG_HDRLEN;

    /// Attribute section produced by `build`.
    fn attrs(build: impl FnOnce(&mut MessageBuilder)) -> Vec<u8> {
        let mut builder = MessageBuilder::new(0x1c, 0);
        build(&mut builder);
        builder.finish()[NLMSG_HDRLEN..].to_vec()
    }

    #[test]
    fn test_interface_all_attributes() {
        let data = attrs(|b| {
            b.append_attr_u32(Nl80211Attr::Ifindex as u16, 3);
            b.append_attr_str(Nl80211Attr::Ifname as u16, "wlan0");
            b.append_attr_u32(Nl80211Attr::Wiphy as u16, 0);
            b.append_attr_u64(Nl80211Attr::Wdev as u16, 1);
            b.append_attr(Nl80211Attr::Mac as u16, &[0x02, 0, 0, 0, 0, 0x01]);
            b.append_attr_u32(Nl80211Attr::Iftype as u16, 2);
            b.append_attr_u32(Nl80211Attr::WiphyFreq as u16, 2412);
        });

        let ifi = parse_interface(&data).unwrap();
        assert_eq!(ifi.index, 3);
        assert_eq!(ifi.name, "wlan0");
        assert_eq!(ifi.phy, 0);
        assert_eq!(ifi.device, 1);
        assert_eq!(ifi.hardware_addr.to_string(), "02:00:00:00:00:01");
        assert_eq!(ifi.iftype, InterfaceType::Station);
        assert_eq!(ifi.frequency, Some(2412));
    }

    #[test]
    fn test_interface_optional_attributes_default() {
        let data = attrs(|b| {
            b.append_attr_u32(Nl80211Attr::Ifindex as u16, 5);
            b.append_attr_str(Nl80211Attr::Ifname as u16, "mon0");
        });

        let ifi = parse_interface(&data).unwrap();
        assert_eq!(ifi.index, 5);
        assert_eq!(ifi.frequency, None);
        assert!(ifi.hardware_addr.is_zero());
        assert_eq!(ifi.iftype, InterfaceType::Unspecified);
    }

    #[test]
    fn test_interface_missing_index() {
        let data = attrs(|b| b.append_attr_str(Nl80211Attr::Ifname as u16, "wlan0"));
        let err = parse_interface(&data).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAttribute {
                record: "interface",
                ..
            }
        ));
    }

    #[test]
    fn test_interface_skips_unknown_attributes() {
        let data = attrs(|b| {
            b.append_attr_u32(Nl80211Attr::Ifindex as u16, 3);
            b.append_attr(0x7ff, &[1, 2, 3, 4, 5, 6, 7]);
            let nest = b.nest_start(0x7fe);
            b.append_attr_u8(1, 1);
            b.nest_end(nest);
            b.append_attr_str(Nl80211Attr::Ifname as u16, "wlan0");
        });

        let ifi = parse_interface(&data).unwrap();
        assert_eq!(ifi.index, 3);
        assert_eq!(ifi.name, "wlan0");
    }

    #[test]
    fn test_interface_short_scalar_is_error() {
        let data = attrs(|b| {
            b.append_attr_u32(Nl80211Attr::Ifindex as u16, 3);
            b.append_attr(Nl80211Attr::Wiphy as u16, &[1, 0]);
        });
        assert!(parse_interface(&data).unwrap_err().is_decode());
    }

    #[test]
    fn test_interface_decoding_is_deterministic() {
        let data = attrs(|b| {
            b.append_attr_u32(Nl80211Attr::Ifindex as u16, 9);
            b.append_attr_str(Nl80211Attr::Ifname as u16, "wlp2s0");
            b.append_attr_u32(Nl80211Attr::Iftype as u16, 3);
        });
        assert_eq!(parse_interface(&data).unwrap(), parse_interface(&data).unwrap());
    }

    fn bss_attrs(ies: &[u8], status: Option<u32>) -> Vec<u8> {
        attrs(|b| {
            b.append_attr_u32(Nl80211Attr::Ifindex as u16, 3);
            let nest = b.nest_start(Nl80211Attr::Bss as u16);
            b.append_attr(BssAttr::Bssid as u16, &[0xa0, 0xb1, 0xc2, 0xd3, 0xe4, 0xf5]);
            b.append_attr_u32(BssAttr::Frequency as u16, 5180);
            b.append_attr_u64(BssAttr::Tsf as u16, 123_456_789);
            b.append_attr_u16(BssAttr::BeaconInterval as u16, 100);
            b.append_attr_u32(BssAttr::SeenMsAgo as u16, 40);
            b.append_attr(BssAttr::InformationElements as u16, ies);
            if let Some(status) = status {
                b.append_attr_u32(BssAttr::Status as u16, status);
            }
            b.nest_end(nest);
        })
    }

    #[test]
    fn test_scan_result() {
        // Supported rates element before the SSID
        let ies = [1, 2, 0x82, 0x84, 0, 4, b'h', b'o', b'm', b'e'];
        let bss = parse_scan_result(&bss_attrs(&ies, Some(1)))
            .unwrap()
            .unwrap();

        assert_eq!(bss.bssid.to_string(), "a0:b1:c2:d3:e4:f5");
        assert_eq!(bss.ssid, b"home");
        assert_eq!(bss.frequency, 5180);
        assert_eq!(bss.beacon_interval, Duration::from_micros(102_400));
        assert_eq!(bss.last_seen, Duration::from_millis(40));
        assert_eq!(bss.status, BssStatus::Associated);
    }

    #[test]
    fn test_scan_result_without_status() {
        let ies = [0, 3, b'c', b'a', b'f'];
        let bss = parse_scan_result(&bss_attrs(&ies, None)).unwrap().unwrap();
        assert_eq!(bss.status, BssStatus::NotAssociated);
    }

    #[test]
    fn test_scan_result_hidden_ssid() {
        let bss = parse_scan_result(&bss_attrs(&[0, 0], Some(1)))
            .unwrap()
            .unwrap();
        assert!(bss.ssid.is_empty());
    }

    #[test]
    fn test_scan_result_malformed_elements() {
        // SSID element claims 9 bytes, 2 present
        let err = parse_scan_result(&bss_attrs(&[0, 9, b'a', b'b'], Some(1))).unwrap_err();
        assert!(err.is_decode());

        let err = parse_scan_result(&bss_attrs(&[0], Some(1))).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_scan_result_without_elements_has_empty_ssid() {
        let data = attrs(|b| {
            let nest = b.nest_start(Nl80211Attr::Bss as u16);
            b.append_attr(BssAttr::Bssid as u16, &[0xa0, 0xb1, 0xc2, 0xd3, 0xe4, 0xf5]);
            b.append_attr_u32(BssAttr::Frequency as u16, 2437);
            b.append_attr_u32(BssAttr::Status as u16, 1);
            b.nest_end(nest);
        });

        let bss = parse_scan_result(&data).unwrap().unwrap();
        assert!(bss.ssid.is_empty());
        assert_eq!(bss.frequency, 2437);
        assert_eq!(bss.status, BssStatus::Associated);
    }

    #[test]
    fn test_scan_result_oversized_ssid() {
        let mut ies = vec![WLAN_EID_SSID, 33];
        ies.extend_from_slice(&[b'x'; 33]);
        let err = parse_scan_result(&bss_attrs(&ies, Some(1))).unwrap_err();
        assert!(err.is_decode());

        // 32 bytes is the longest valid SSID
        let mut ies = vec![WLAN_EID_SSID, 32];
        ies.extend_from_slice(&[b'x'; 32]);
        let bss = parse_scan_result(&bss_attrs(&ies, Some(1))).unwrap().unwrap();
        assert_eq!(bss.ssid.len(), SSID_MAX_LEN);
    }

    #[test]
    fn test_scan_result_without_container() {
        let data = attrs(|b| b.append_attr_u32(Nl80211Attr::Ifindex as u16, 3));
        assert_eq!(parse_scan_result(&data).unwrap(), None);
    }

    #[test]
    fn test_bss_missing_bssid() {
        let data = attrs(|b| b.append_attr_u32(BssAttr::Frequency as u16, 2437));
        assert!(matches!(
            parse_bss(&data).unwrap_err(),
            Error::MissingAttribute { record: "bss", .. }
        ));
    }

    #[test]
    fn test_station() {
        let data = attrs(|b| {
            b.append_attr_u32(Nl80211Attr::Ifindex as u16, 3);
            b.append_attr(Nl80211Attr::Mac as u16, &[0xa0, 0xb1, 0xc2, 0xd3, 0xe4, 0xf5]);
            let info = b.nest_start(Nl80211Attr::StaInfo as u16);
            b.append_attr_u32(StaInfoAttr::InactiveTime as u16, 320);
            b.append_attr_u32(StaInfoAttr::RxBytes as u16, 1000);
            b.append_attr_u32(StaInfoAttr::TxBytes as u16, 2000);
            b.append_attr_u8(StaInfoAttr::Signal as u16, (-52i8) as u8);
            let rate = b.nest_start(StaInfoAttr::TxBitrate as u16);
            b.append_attr_u16(RateInfoAttr::Bitrate as u16, 1300);
            b.append_attr_u32(RateInfoAttr::Bitrate32 as u16, 8667);
            b.append_attr_u8(RateInfoAttr::Mcs as u16, 9);
            b.nest_end(rate);
            let rate = b.nest_start(StaInfoAttr::RxBitrate as u16);
            b.append_attr_u16(RateInfoAttr::Bitrate as u16, 540);
            b.nest_end(rate);
            b.append_attr_u32(StaInfoAttr::RxPackets as u16, 10);
            b.append_attr_u32(StaInfoAttr::TxPackets as u16, 20);
            b.append_attr_u32(StaInfoAttr::TxRetries as u16, 3);
            b.append_attr_u32(StaInfoAttr::TxFailed as u16, 1);
            b.append_attr_u32(StaInfoAttr::ConnectedTime as u16, 3600);
            b.append_attr_u32(StaInfoAttr::BeaconLoss as u16, 2);
            b.nest_end(info);
        });

        let sta = parse_station(&data).unwrap();
        assert_eq!(sta.hardware_addr.to_string(), "a0:b1:c2:d3:e4:f5");
        assert_eq!(sta.inactive, Duration::from_millis(320));
        assert_eq!(sta.connected, Duration::from_secs(3600));
        assert_eq!(sta.received_bytes, 1000);
        assert_eq!(sta.transmitted_bytes, 2000);
        assert_eq!(sta.received_packets, 10);
        assert_eq!(sta.transmitted_packets, 20);
        assert_eq!(sta.signal, -52);
        assert_eq!(sta.transmit_bitrate, 866_700_000);
        assert_eq!(sta.receive_bitrate, 54_000_000);
        assert_eq!(sta.transmit_retries, 3);
        assert_eq!(sta.transmit_failed, 1);
        assert_eq!(sta.beacon_loss, 2);
    }

    #[test]
    fn test_station_prefers_64bit_counters() {
        let data = attrs(|b| {
            b.append_attr(Nl80211Attr::Mac as u16, &[2, 0, 0, 0, 0, 2]);
            let info = b.nest_start(Nl80211Attr::StaInfo as u16);
            b.append_attr_u64(StaInfoAttr::RxBytes64 as u16, 5_000_000_000);
            b.append_attr_u32(StaInfoAttr::RxBytes as u16, 705_032_704);
            b.append_attr_u32(StaInfoAttr::TxBytes as u16, 17);
            b.append_attr_u64(StaInfoAttr::TxBytes64 as u16, 17);
            b.nest_end(info);
        });

        let sta = parse_station(&data).unwrap();
        assert_eq!(sta.received_bytes, 5_000_000_000);
        assert_eq!(sta.transmitted_bytes, 17);
    }

    #[test]
    fn test_station_missing_info() {
        let data = attrs(|b| b.append_attr(Nl80211Attr::Mac as u16, &[2, 0, 0, 0, 0, 2]));
        assert!(matches!(
            parse_station(&data).unwrap_err(),
            Error::MissingAttribute {
                attribute: "NL80211_ATTR_STA_INFO",
                ..
            }
        ));
    }

    #[test]
    fn test_station_overlong_nested_length() {
        let mut data = attrs(|b| {
            b.append_attr(Nl80211Attr::Mac as u16, &[2, 0, 0, 0, 0, 2]);
            let info = b.nest_start(Nl80211Attr::StaInfo as u16);
            b.append_attr_u32(StaInfoAttr::InactiveTime as u16, 1);
            b.nest_end(info);
        });
        // Inflate the inner attribute's length past the container
        let inner = data.len() - 8;
        data[inner..inner + 2].copy_from_slice(&40u16.to_ne_bytes());

        assert!(parse_station(&data).unwrap_err().is_decode());
    }

    #[test]
    fn test_rate_info_empty() {
        assert_eq!(parse_rate_info(&[]).unwrap(), 0);
    }
}
