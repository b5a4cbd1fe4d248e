//! In-memory kernel double for exercising the stack without a socket.
//!
//! [`ScriptedTransport`] implements [`Transport`]: every request it is sent
//! is decoded into a [`Request`], recorded, and handed to a closure that
//! returns the datagrams the "kernel" answers with. The free functions build
//! those datagrams with the crate's own [`MessageBuilder`].
//!
//! Available to unit tests and, with the `testing` feature, to downstream
//! crates and integration tests.
//!
//! ```rust
//! use wlink::netlink::genl::nl80211::{Interface, InterfaceType, Nl80211Cmd};
//! use wlink::testing::{ScriptedTransport, datagram, done, interface_message};
//! use wlink::Client;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> wlink::Result<()> {
//! let transport = ScriptedTransport::nl80211(|req| {
//!     let seq = req.header.nlmsg_seq;
//!     assert_eq!(req.genl.cmd, Nl80211Cmd::GetInterface as u8);
//!     let wlan0 = Interface {
//!         index: 3,
//!         name: "wlan0".into(),
//!         iftype: InterfaceType::Station,
//!         ..Default::default()
//!     };
//!     vec![datagram(&[interface_message(seq, &wlan0), done(seq)])]
//! });
//!
//! let client = Client::with_transport(transport).await?;
//! assert_eq!(client.interfaces().await?[0].name, "wlan0");
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::netlink::attr::{AttrIter, get};
use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::{Error, Result};
use crate::netlink::genl::nl80211::{
    Bss, BssAttr, BssStatus, Interface, Nl80211Attr, Nl80211Cmd, RateInfoAttr, StaInfoAttr,
    StationInfo, WLAN_EID_SSID,
};
use crate::netlink::genl::{
    CtrlAttr, CtrlAttrMcastGrp, CtrlCmd, GENL_HDRLEN, GENL_ID_CTRL, GenlMsgHdr,
};
use crate::netlink::message::{
    NLM_F_ACK_TLVS, NLM_F_MULTI, NLM_F_REQUEST, NLMSG_HDRLEN, NLMSGERR_ATTR_MSG, NlMsgHdr,
    NlMsgType,
};
use crate::netlink::socket::Transport;

/// Family ID the scripted controller assigns to nl80211.
pub const NL80211_FAMILY_ID: u16 = 0x1c;

/// Port ID reported by [`ScriptedTransport`].
pub const SCRIPTED_PID: u32 = 4242;

/// A request as the kernel would see it.
#[derive(Debug, Clone)]
pub struct Request {
    pub header: NlMsgHdr,
    pub genl: GenlMsgHdr,
    /// Raw attribute section following the generic netlink header.
    pub attrs: Vec<u8>,
}

impl Request {
    fn parse(msg: &[u8]) -> Result<Self> {
        let header = NlMsgHdr::from_bytes(msg)?;
        let body = msg.get(NLMSG_HDRLEN..).unwrap_or_default();
        let genl = GenlMsgHdr::from_bytes(body)?;
        Ok(Self {
            header,
            genl,
            attrs: body[GENL_HDRLEN..].to_vec(),
        })
    }

    fn attr_payload(&self, kind: u16) -> Option<&[u8]> {
        AttrIter::new(&self.attrs)
            .filter_map(|attr| attr.ok())
            .find(|attr| attr.kind() == kind)
            .map(|attr| attr.payload())
    }

    /// Value of a top-level u32 attribute.
    pub fn attr_u32(&self, kind: u16) -> Option<u32> {
        self.attr_payload(kind).and_then(|p| get::u32_ne(p).ok())
    }

    /// Value of a top-level string attribute.
    pub fn attr_str(&self, kind: u16) -> Option<String> {
        self.attr_payload(kind)
            .and_then(|p| get::string(p).ok())
            .map(str::to_string)
    }

    /// Interface index the request is keyed by.
    pub fn ifindex(&self) -> Option<u32> {
        self.attr_u32(Nl80211Attr::Ifindex as u16)
    }
}

type Handler = Box<dyn FnMut(&Request) -> Vec<Vec<u8>> + Send>;

/// A [`Transport`] that answers from a closure instead of the kernel.
///
/// Replies are queued per request and handed out one datagram per
/// `recv_msg`. Receiving with nothing queued fails with `WouldBlock`
/// instead of waiting forever.
pub struct ScriptedTransport {
    handler: Mutex<Handler>,
    queue: Mutex<VecDeque<Vec<u8>>>,
    sent: Arc<Mutex<Vec<Request>>>,
    seq: AtomicU32,
    closed: bool,
}

impl ScriptedTransport {
    /// Answer every request with `handler`.
    pub fn new(handler: impl FnMut(&Request) -> Vec<Vec<u8>> + Send + 'static) -> Self {
        Self {
            handler: Mutex::new(Box::new(handler)),
            queue: Mutex::new(VecDeque::new()),
            sent: Arc::new(Mutex::new(Vec::new())),
            seq: AtomicU32::new(1),
            closed: false,
        }
    }

    /// Answer family lookups as a kernel with nl80211 loaded would, and
    /// everything else with `handler`.
    pub fn nl80211(mut handler: impl FnMut(&Request) -> Vec<Vec<u8>> + Send + 'static) -> Self {
        Self::new(move |req| {
            if req.header.nlmsg_type == GENL_ID_CTRL {
                let seq = req.header.nlmsg_seq;
                vec![datagram(&[family_reply(seq), ack(seq, 0)])]
            } else {
                handler(req)
            }
        })
    }

    /// Shared log of every request sent so far.
    pub fn sent_log(&self) -> Arc<Mutex<Vec<Request>>> {
        Arc::clone(&self.sent)
    }
}

impl Transport for ScriptedTransport {
    fn pid(&self) -> u32 {
        SCRIPTED_PID
    }

    fn next_seq(&self) -> u32 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    async fn send(&self, msg: &[u8]) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        let request = Request::parse(msg)?;
        let replies = {
            let mut handler = self.handler.lock().unwrap_or_else(PoisonError::into_inner);
            (*handler)(&request)
        };
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(replies);
        Ok(())
    }

    async fn recv_msg(&self) -> Result<Vec<u8>> {
        if self.closed {
            return Err(Error::Closed);
        }
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| Error::Io(io::Error::from(io::ErrorKind::WouldBlock)))
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Concatenate messages into one datagram.
pub fn datagram(messages: &[Vec<u8>]) -> Vec<u8> {
    messages.concat()
}

/// A generic netlink message from the kernel.
pub fn genl_reply(
    family_id: u16,
    cmd: u8,
    seq: u32,
    flags: u16,
    build_attrs: impl FnOnce(&mut MessageBuilder),
) -> Vec<u8> {
    let mut builder = MessageBuilder::new(family_id, flags);
    builder.append(&GenlMsgHdr::new(cmd, 1));
    build_attrs(&mut builder);
    builder.set_seq(seq);
    builder.set_pid(SCRIPTED_PID);
    builder.finish()
}

/// NLMSG_DONE ending a dump.
pub fn done(seq: u32) -> Vec<u8> {
    let mut builder = MessageBuilder::new(NlMsgType::DONE, NLM_F_MULTI);
    builder.append_bytes(&0i32.to_ne_bytes());
    builder.set_seq(seq);
    builder.finish()
}

/// NLMSG_ERROR carrying `errno` (negative), or an ACK when it is 0.
pub fn ack(seq: u32, errno: i32) -> Vec<u8> {
    let mut builder = MessageBuilder::new(NlMsgType::ERROR, 0);
    builder.append_bytes(&errno.to_ne_bytes());
    let mut original = NlMsgHdr::new(NL80211_FAMILY_ID, NLM_F_REQUEST);
    original.nlmsg_seq = seq;
    builder.append(&original);
    builder.set_seq(seq);
    builder.finish()
}

/// NLMSG_DONE ending a dump with a kernel error.
pub fn done_with_error(seq: u32, errno: i32) -> Vec<u8> {
    let mut builder = MessageBuilder::new(NlMsgType::DONE, NLM_F_MULTI);
    builder.append_bytes(&errno.to_ne_bytes());
    builder.set_seq(seq);
    builder.finish()
}

/// NLMSG_ERROR rejecting `req` with an extended ACK message.
///
/// Laid out as the kernel does without `NETLINK_CAP_ACK`: the whole request
/// is echoed and the NLMSGERR_ATTR_MSG attribute follows it.
pub fn ext_ack(req: &Request, errno: i32, text: &str) -> Vec<u8> {
    let seq = req.header.nlmsg_seq;
    let mut builder = MessageBuilder::new(NlMsgType::ERROR, NLM_F_ACK_TLVS);
    builder.append_bytes(&errno.to_ne_bytes());
    builder.append(&req.header);
    builder.append(&req.genl);
    builder.append_bytes(&req.attrs);
    builder.append_attr_str(NLMSGERR_ATTR_MSG, text);
    builder.set_seq(seq);
    builder.finish()
}

/// CTRL_CMD_NEWFAMILY describing nl80211 with its multicast groups.
pub fn family_reply(seq: u32) -> Vec<u8> {
    genl_reply(GENL_ID_CTRL, CtrlCmd::NewFamily as u8, seq, 0, |b| {
        b.append_attr_str(CtrlAttr::FamilyName as u16, "nl80211");
        b.append_attr_u16(CtrlAttr::FamilyId as u16, NL80211_FAMILY_ID);
        b.append_attr_u32(CtrlAttr::Version as u16, 1);
        b.append_attr_u32(CtrlAttr::HdrSize as u16, 0);
        b.append_attr_u32(CtrlAttr::MaxAttr as u16, 327);
        let groups = b.nest_start(CtrlAttr::McastGroups as u16);
        for (index, (name, id)) in [("config", 2), ("scan", 3), ("regulatory", 4), ("mlme", 5)]
            .into_iter()
            .enumerate()
        {
            let entry = b.nest_start(index as u16 + 1);
            b.append_attr_u32(CtrlAttrMcastGrp::Id as u16, id);
            b.append_attr_str(CtrlAttrMcastGrp::Name as u16, name);
            b.nest_end(entry);
        }
        b.nest_end(groups);
    })
}

/// An NL80211_CMD_NEW_INTERFACE dump part describing `ifi`.
pub fn interface_message(seq: u32, ifi: &Interface) -> Vec<u8> {
    nl80211_message(Nl80211Cmd::NewInterface, seq, |b| {
        b.append_attr_u32(Nl80211Attr::Ifindex as u16, ifi.index);
        b.append_attr_str(Nl80211Attr::Ifname as u16, &ifi.name);
        b.append_attr_u32(Nl80211Attr::Wiphy as u16, ifi.phy);
        b.append_attr_u64(Nl80211Attr::Wdev as u16, ifi.device);
        b.append_attr(Nl80211Attr::Mac as u16, &ifi.hardware_addr.octets());
        b.append_attr_u32(Nl80211Attr::Iftype as u16, ifi.iftype.number());
        if let Some(freq) = ifi.frequency {
            b.append_attr_u32(Nl80211Attr::WiphyFreq as u16, freq);
        }
    })
}

/// An NL80211_CMD_NEW_SCAN_RESULTS dump part describing `bss` on `ifindex`.
///
/// The status attribute is left out for [`BssStatus::NotAssociated`].
pub fn bss_message(seq: u32, ifindex: u32, bss: &Bss) -> Vec<u8> {
    nl80211_message(Nl80211Cmd::NewScanResults, seq, |b| {
        b.append_attr_u32(Nl80211Attr::Ifindex as u16, ifindex);
        let nest = b.nest_start(Nl80211Attr::Bss as u16);
        b.append_attr(BssAttr::Bssid as u16, &bss.bssid.octets());
        b.append_attr_u32(BssAttr::Frequency as u16, bss.frequency);
        let tu = (bss.beacon_interval.as_micros() / 1024) as u16;
        b.append_attr_u16(BssAttr::BeaconInterval as u16, tu);
        b.append_attr_u32(BssAttr::SeenMsAgo as u16, bss.last_seen.as_millis() as u32);
        let mut ies = vec![WLAN_EID_SSID, bss.ssid.len() as u8];
        ies.extend_from_slice(&bss.ssid);
        b.append_attr(BssAttr::InformationElements as u16, &ies);
        let status = match bss.status {
            BssStatus::NotAssociated => None,
            BssStatus::Authenticated => Some(0),
            BssStatus::Associated => Some(1),
            BssStatus::IbssJoined => Some(2),
            BssStatus::Unknown(n) => Some(n),
        };
        if let Some(status) = status {
            b.append_attr_u32(BssAttr::Status as u16, status);
        }
        b.nest_end(nest);
    })
}

/// An NL80211_CMD_NEW_STATION dump part describing `sta` on `ifindex`.
///
/// Counters are sent in their 64-bit form where nl80211 has one.
pub fn station_message(seq: u32, ifindex: u32, sta: &StationInfo) -> Vec<u8> {
    nl80211_message(Nl80211Cmd::NewStation, seq, |b| {
        b.append_attr_u32(Nl80211Attr::Ifindex as u16, ifindex);
        b.append_attr(Nl80211Attr::Mac as u16, &sta.hardware_addr.octets());
        let info = b.nest_start(Nl80211Attr::StaInfo as u16);
        b.append_attr_u32(
            StaInfoAttr::InactiveTime as u16,
            sta.inactive.as_millis() as u32,
        );
        b.append_attr_u32(
            StaInfoAttr::ConnectedTime as u16,
            sta.connected.as_secs() as u32,
        );
        b.append_attr_u64(StaInfoAttr::RxBytes64 as u16, sta.received_bytes);
        b.append_attr_u64(StaInfoAttr::TxBytes64 as u16, sta.transmitted_bytes);
        b.append_attr_u32(StaInfoAttr::RxPackets as u16, sta.received_packets as u32);
        b.append_attr_u32(StaInfoAttr::TxPackets as u16, sta.transmitted_packets as u32);
        b.append_attr_u8(StaInfoAttr::Signal as u16, sta.signal as i8 as u8);
        for (kind, bps) in [
            (StaInfoAttr::TxBitrate, sta.transmit_bitrate),
            (StaInfoAttr::RxBitrate, sta.receive_bitrate),
        ] {
            let rate = b.nest_start(kind as u16);
            b.append_attr_u32(RateInfoAttr::Bitrate32 as u16, (bps / 100_000) as u32);
            b.nest_end(rate);
        }
        b.append_attr_u32(StaInfoAttr::TxRetries as u16, sta.transmit_retries as u32);
        b.append_attr_u32(StaInfoAttr::TxFailed as u16, sta.transmit_failed as u32);
        b.append_attr_u32(StaInfoAttr::BeaconLoss as u16, sta.beacon_loss as u32);
        b.nest_end(info);
    })
}

/// An nl80211 dump part with hand-built attributes.
pub fn nl80211_message(
    cmd: Nl80211Cmd,
    seq: u32,
    build_attrs: impl FnOnce(&mut MessageBuilder),
) -> Vec<u8> {
    genl_reply(NL80211_FAMILY_ID, cmd as u8, seq, NLM_F_MULTI, build_attrs)
}
