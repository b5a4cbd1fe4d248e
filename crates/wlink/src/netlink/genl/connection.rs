//! Generic Netlink connection with family resolution.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tokio::sync::Mutex;

use super::header::{GenlMsgHdr, split_payload};
use super::{CTRL_VERSION, CtrlAttr, CtrlAttrMcastGrp, CtrlCmd, GENL_ID_CTRL};
use crate::netlink::attr::{AttrIter, get};
use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::{Error, Result};
use crate::netlink::message::{
    MessageIter, NLM_F_ACK, NLM_F_DUMP, NLM_F_REQUEST, NlMsgError, NlMsgType,
};
use crate::netlink::socket::Transport;

/// Information about a Generic Netlink family.
#[derive(Debug, Clone)]
pub struct FamilyInfo {
    /// Dynamically assigned family ID (used as nlmsg_type).
    pub id: u16,
    /// Family version.
    pub version: u8,
    /// Header size (additional bytes after genlmsghdr).
    pub hdr_size: u32,
    /// Maximum attribute number.
    pub max_attr: u32,
    /// Multicast groups: name -> group ID.
    pub mcast_groups: HashMap<String, u32>,
}

/// Generic Netlink connection.
///
/// Provides family ID resolution and request/dump exchanges over a
/// [`Transport`]. Family lookups are cached for the lifetime of the
/// connection; a fresh connection is needed to observe a family that was
/// loaded or unloaded afterwards.
///
/// Each exchange holds the transport for its full duration (request plus
/// every response part), so concurrent callers never interleave on the
/// socket.
///
/// # Example
///
/// ```rust,no_run
/// use wlink::netlink::genl::GenlConnection;
///
/// # async fn example() -> wlink::Result<()> {
/// let conn = GenlConnection::new()?;
///
/// // Get family info (cached after first call)
/// let family = conn.get_family("nl80211").await?;
/// println!("nl80211 family ID: {}", family.id);
/// for (group, id) in &family.mcast_groups {
///     println!("  multicast group {group}: {id}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct GenlConnection<T> {
    transport: Mutex<T>,
    cache: RwLock<HashMap<String, FamilyInfo>>,
}

#[cfg(target_os = "linux")]
impl GenlConnection<crate::netlink::socket::NetlinkSocket> {
    /// Open a Generic Netlink connection on a new kernel socket.
    pub fn new() -> Result<Self> {
        Ok(Self::from_transport(
            crate::netlink::socket::NetlinkSocket::new()?,
        ))
    }
}

impl<T: Transport> GenlConnection<T> {
    /// Create a GENL connection over an existing transport.
    pub fn from_transport(transport: T) -> Self {
        Self {
            transport: Mutex::new(transport),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Get information about a Generic Netlink family.
    ///
    /// The result is cached, so subsequent calls for the same family
    /// do not require kernel communication. Fails with
    /// [`Error::FamilyNotFound`] when no kernel module registered `name`.
    pub async fn get_family(&self, name: &str) -> Result<FamilyInfo> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(info) = cache.get(name) {
                return Ok(info.clone());
            }
        }

        let info = self.query_family(name).await?;
        tracing::debug!(
            family = name,
            id = info.id,
            version = info.version,
            groups = info.mcast_groups.len(),
            "resolved generic netlink family"
        );

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), info.clone());

        Ok(info)
    }

    /// Get the family ID for a given family name.
    pub async fn get_family_id(&self, name: &str) -> Result<u16> {
        Ok(self.get_family(name).await?.id)
    }

    /// Query the kernel for family information.
    async fn query_family(&self, name: &str) -> Result<FamilyInfo> {
        let mut builder = MessageBuilder::new(GENL_ID_CTRL, NLM_F_REQUEST | NLM_F_ACK);
        builder.append(&GenlMsgHdr::new(CtrlCmd::GetFamily as u8, CTRL_VERSION));
        builder.append_attr_str(CtrlAttr::FamilyName as u16, name);

        let not_found = || Error::FamilyNotFound {
            name: name.to_string(),
        };

        let responses = match self.exchange(builder, false).await {
            // ENOENT means no module registered the family
            Err(e) if e.errno() == Some(libc::ENOENT) => return Err(not_found()),
            Err(e) => return Err(e.with_context(format!("resolving family {name}"))),
            Ok(responses) => responses,
        };

        let payload = responses.first().ok_or_else(not_found)?;
        let (_, attrs) = split_payload(payload)?;
        parse_family_attrs(attrs)
    }

    /// Send a GENL command and wait for its reply and ACK.
    ///
    /// Returns the payloads (GENL header included) of every reply message.
    pub async fn command(
        &self,
        family_id: u16,
        cmd: u8,
        version: u8,
        build_attrs: impl FnOnce(&mut MessageBuilder),
    ) -> Result<Vec<Vec<u8>>> {
        let mut builder = MessageBuilder::new(family_id, NLM_F_REQUEST | NLM_F_ACK);
        builder.append(&GenlMsgHdr::new(cmd, version));
        build_attrs(&mut builder);
        self.exchange(builder, false).await
    }

    /// Send a GENL dump command and collect all responses up to NLMSG_DONE.
    ///
    /// Returns the payloads (GENL header included) of every dump part, in
    /// the order the kernel sent them, across as many datagrams as it took.
    pub async fn dump_command(
        &self,
        family_id: u16,
        cmd: u8,
        version: u8,
        build_attrs: impl FnOnce(&mut MessageBuilder),
    ) -> Result<Vec<Vec<u8>>> {
        let mut builder = MessageBuilder::new(family_id, NLM_F_REQUEST | NLM_F_DUMP);
        builder.append(&GenlMsgHdr::new(cmd, version));
        build_attrs(&mut builder);
        self.exchange(builder, true).await
    }

    /// Release the transport. Later exchanges fail with [`Error::Closed`].
    pub fn close(&mut self) -> Result<()> {
        self.transport.get_mut().close()
    }

    /// Run one request/response exchange while holding the transport.
    ///
    /// Messages carrying another sequence number are leftovers from an
    /// earlier, abandoned exchange and are skipped.
    async fn exchange(&self, mut builder: MessageBuilder, dump: bool) -> Result<Vec<Vec<u8>>> {
        let transport = self.transport.lock().await;

        let seq = transport.next_seq();
        builder.set_seq(seq);
        builder.set_pid(transport.pid());
        let msg = builder.finish();

        tracing::trace!(seq, dump, len = msg.len(), "sending generic netlink request");
        transport.send(&msg).await?;

        let mut responses = Vec::new();
        let mut interrupted = false;

        loop {
            let data = transport.recv_msg().await?;

            for result in MessageIter::new(&data) {
                let (header, payload) = result?;

                if header.nlmsg_seq != seq {
                    tracing::trace!(
                        expected = seq,
                        actual = header.nlmsg_seq,
                        "skipping stale netlink message"
                    );
                    continue;
                }

                interrupted |= header.is_dump_interrupted();

                match header.nlmsg_type {
                    NlMsgType::NOOP => {}
                    NlMsgType::OVERRUN => {
                        return Err(Error::InvalidMessage("netlink receive overrun".into()));
                    }
                    NlMsgType::ERROR => {
                        let err = NlMsgError::from_bytes(payload)?;
                        if !err.is_ack() {
                            let text = err.ext_message(&header, payload);
                            tracing::debug!(seq, errno = err.error, ?text, "kernel rejected request");
                            return Err(Error::from_errno_with_message(err.error, text));
                        }
                        if !dump {
                            return Ok(responses);
                        }
                    }
                    NlMsgType::DONE => {
                        if payload.len() >= 4 {
                            let code = get::i32_ne(payload)?;
                            if code < 0 {
                                return Err(Error::from_errno(code));
                            }
                        }
                        if interrupted {
                            return Err(Error::DumpInterrupted);
                        }
                        tracing::trace!(seq, messages = responses.len(), "dump complete");
                        return Ok(responses);
                    }
                    _ => responses.push(payload.to_vec()),
                }
            }
        }
    }
}

/// Parse family attributes from a CTRL_CMD_GETFAMILY response.
fn parse_family_attrs(data: &[u8]) -> Result<FamilyInfo> {
    let mut id: Option<u16> = None;
    let mut version: u8 = 0;
    let mut hdr_size: u32 = 0;
    let mut max_attr: u32 = 0;
    let mut mcast_groups = HashMap::new();

    for attr in AttrIter::new(data) {
        let attr = attr?;
        match attr.kind() {
            t if t == CtrlAttr::FamilyId as u16 => id = Some(attr.u16()?),
            t if t == CtrlAttr::Version as u16 => version = attr.u32()? as u8,
            t if t == CtrlAttr::HdrSize as u16 => hdr_size = attr.u32()?,
            t if t == CtrlAttr::MaxAttr as u16 => max_attr = attr.u32()?,
            t if t == CtrlAttr::McastGroups as u16 => {
                mcast_groups = parse_mcast_groups(attr.payload())?;
            }
            _ => {}
        }
    }

    let id = id.ok_or_else(|| Error::InvalidMessage("missing family ID".into()))?;

    Ok(FamilyInfo {
        id,
        version,
        hdr_size,
        max_attr,
        mcast_groups,
    })
}

/// Parse multicast groups from CTRL_ATTR_MCAST_GROUPS.
///
/// The attribute is an indexed array: each entry's type is its position and
/// its payload holds the group's name and ID.
fn parse_mcast_groups(data: &[u8]) -> Result<HashMap<String, u32>> {
    let mut groups = HashMap::new();

    for entry in AttrIter::new(data) {
        let mut name: Option<String> = None;
        let mut grp_id: Option<u32> = None;

        for attr in entry?.nested() {
            let attr = attr?;
            match attr.kind() {
                t if t == CtrlAttrMcastGrp::Name as u16 => name = Some(attr.string()?.to_string()),
                t if t == CtrlAttrMcastGrp::Id as u16 => grp_id = Some(attr.u32()?),
                _ => {}
            }
        }

        if let (Some(name), Some(id)) = (name, grp_id) {
            groups.insert(name, id);
        }
    }

    Ok(groups)
}
