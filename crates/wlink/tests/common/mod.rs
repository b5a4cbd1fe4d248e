//! Shared fixtures for client scenarios.
//!
//! Builds clients over `ScriptedTransport`, with a scripted kernel that
//! knows a fixed set of interfaces, one associated BSS and one connected
//! peer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use wlink::netlink::genl::nl80211::Nl80211Cmd;
use wlink::testing::{
    Request, ScriptedTransport, bss_message, datagram, done, interface_message, station_message,
};
use wlink::{
    Bss, BssStatus, Client, HardwareAddr, Interface, InterfaceType, Nl80211Connection,
    StationInfo,
};

pub type TestClient = Client<Nl80211Connection<ScriptedTransport>>;

pub fn wlan0() -> Interface {
    Interface {
        index: 3,
        name: "wlan0".into(),
        hardware_addr: HardwareAddr([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]),
        phy: 0,
        device: 1,
        iftype: InterfaceType::Station,
        frequency: Some(5180),
    }
}

pub fn ap0() -> Interface {
    Interface {
        index: 4,
        name: "ap0".into(),
        hardware_addr: HardwareAddr([0x02, 0x11, 0x22, 0x33, 0x44, 0x66]),
        phy: 1,
        device: 0x1_0000_0001,
        iftype: InterfaceType::Ap,
        frequency: Some(2437),
    }
}

pub fn home_bss() -> Bss {
    Bss {
        bssid: HardwareAddr([0xa0, 0xb1, 0xc2, 0xd3, 0xe4, 0xf5]),
        ssid: b"home".to_vec(),
        frequency: 5180,
        beacon_interval: Duration::from_micros(102_400),
        last_seen: Duration::from_millis(8),
        status: BssStatus::Associated,
    }
}

pub fn peer() -> StationInfo {
    StationInfo {
        hardware_addr: HardwareAddr([0xa0, 0xb1, 0xc2, 0xd3, 0xe4, 0xf5]),
        connected: Duration::from_secs(600),
        inactive: Duration::from_millis(30),
        received_bytes: 8_589_934_592,
        transmitted_bytes: 1_048_576,
        received_packets: 900_000,
        transmitted_packets: 40_000,
        receive_bitrate: 780_000_000,
        transmit_bitrate: 866_700_000,
        signal: -51,
        transmit_retries: 7,
        transmit_failed: 0,
        beacon_loss: 1,
    }
}

/// Answers like a kernel where `wlan0` is associated and connected.
pub fn associated_kernel(req: &Request) -> Vec<Vec<u8>> {
    let seq = req.header.nlmsg_seq;
    let ifindex = req.ifindex();

    let mut messages = Vec::new();
    match req.genl.cmd {
        cmd if cmd == Nl80211Cmd::GetInterface as u8 => {
            messages.push(interface_message(seq, &wlan0()));
            messages.push(interface_message(seq, &ap0()));
        }
        cmd if cmd == Nl80211Cmd::GetScan as u8 && ifindex == Some(wlan0().index) => {
            let mut neighbour = home_bss();
            neighbour.bssid = HardwareAddr([0x0e, 0, 0, 0, 0, 0x02]);
            neighbour.ssid = b"cafe".to_vec();
            neighbour.status = BssStatus::NotAssociated;
            messages.push(bss_message(seq, wlan0().index, &neighbour));
            messages.push(bss_message(seq, wlan0().index, &home_bss()));
        }
        cmd if cmd == Nl80211Cmd::GetStation as u8 && ifindex == Some(wlan0().index) => {
            messages.push(station_message(seq, wlan0().index, &peer()));
        }
        _ => {}
    }
    messages.push(done(seq));
    vec![datagram(&messages)]
}

/// A client over `kernel`, plus the log of requests it sends.
pub async fn client_with(
    kernel: impl FnMut(&Request) -> Vec<Vec<u8>> + Send + 'static,
) -> (TestClient, Arc<Mutex<Vec<Request>>>) {
    let transport = ScriptedTransport::nl80211(kernel);
    let sent = transport.sent_log();
    let client = Client::with_transport(transport)
        .await
        .expect("client over scripted transport");
    (client, sent)
}

/// Number of nl80211 requests (family lookups excluded) sent so far.
pub fn nl80211_requests(sent: &Mutex<Vec<Request>>) -> usize {
    sent.lock()
        .unwrap()
        .iter()
        .filter(|req| req.header.nlmsg_type == wlink::testing::NL80211_FAMILY_ID)
        .count()
}
