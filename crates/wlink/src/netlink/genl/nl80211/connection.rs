//! nl80211 connection for wireless telemetry.

use super::parse::{parse_interface, parse_scan_result, parse_station};
use super::types::{Bss, BssStatus, Interface, StationInfo};
use super::{NL80211_GENL_NAME, Nl80211Attr, Nl80211Cmd};
use crate::netlink::error::Result;
use crate::netlink::genl::{FamilyInfo, GenlConnection, split_payload};
use crate::netlink::socket::Transport;

/// Connection for querying nl80211.
///
/// Wraps a Generic Netlink connection together with the resolved nl80211
/// family. Every query is a single dump exchange; records are decoded only
/// once the whole dump has arrived, and one undecodable record fails the
/// query.
pub struct Nl80211Connection<T> {
    genl: GenlConnection<T>,
    family: FamilyInfo,
}

#[cfg(target_os = "linux")]
impl Nl80211Connection<crate::netlink::socket::NetlinkSocket> {
    /// Open a kernel socket and resolve the nl80211 family.
    ///
    /// Fails with [`Error::FamilyNotFound`](crate::Error::FamilyNotFound)
    /// when the kernel has no wireless support.
    pub async fn new() -> Result<Self> {
        Self::from_genl(GenlConnection::new()?).await
    }
}

impl<T: Transport> Nl80211Connection<T> {
    /// Resolve nl80211 on an existing GENL connection.
    ///
    /// The connection is dropped, and its transport released, if resolution fails.
    pub async fn from_genl(genl: GenlConnection<T>) -> Result<Self> {
        let family = genl.get_family(NL80211_GENL_NAME).await?;
        Ok(Self { genl, family })
    }

    /// Get the underlying GENL connection.
    pub fn genl(&self) -> &GenlConnection<T> {
        &self.genl
    }

    /// The resolved nl80211 family, including its multicast groups.
    pub fn family(&self) -> &FamilyInfo {
        &self.family
    }

    /// List all wireless interfaces.
    ///
    /// A system without wireless interfaces yields an empty list.
    pub async fn get_interfaces(&self) -> Result<Vec<Interface>> {
        let responses = self.dump(Nl80211Cmd::GetInterface, None).await?;

        responses
            .iter()
            .map(|payload| {
                let (_, attrs) = split_payload(payload)?;
                parse_interface(attrs)
            })
            .collect()
    }

    /// Get the BSS the interface is authenticated, associated or joined to.
    ///
    /// Scan results for other networks carry no status and are skipped.
    /// Returns `None` when the interface has no current BSS.
    pub async fn get_bss(&self, ifindex: u32) -> Result<Option<Bss>> {
        let responses = self.dump(Nl80211Cmd::GetScan, Some(ifindex)).await?;

        let mut current = None;
        for payload in &responses {
            let (_, attrs) = split_payload(payload)?;
            if let Some(bss) = parse_scan_result(attrs)? {
                if current.is_none() && bss.status != BssStatus::NotAssociated {
                    current = Some(bss);
                }
            }
        }

        Ok(current)
    }

    /// Get statistics for the peer of a station interface.
    ///
    /// Returns `None` when no peer is connected. If the kernel lists more
    /// than one peer, the first is returned.
    pub async fn get_station_info(&self, ifindex: u32) -> Result<Option<StationInfo>> {
        let responses = self.dump(Nl80211Cmd::GetStation, Some(ifindex)).await?;

        let stations = responses
            .iter()
            .map(|payload| {
                let (_, attrs) = split_payload(payload)?;
                parse_station(attrs)
            })
            .collect::<Result<Vec<_>>>()?;

        if stations.len() > 1 {
            tracing::debug!(ifindex, peers = stations.len(), "using first listed station");
        }
        Ok(stations.into_iter().next())
    }

    /// Release the socket. Later queries fail with [`Error::Closed`](crate::Error::Closed).
    pub fn close(&mut self) -> Result<()> {
        tracing::debug!(family = self.family.id, "closing nl80211 connection");
        self.genl.close()
    }

    async fn dump(&self, cmd: Nl80211Cmd, ifindex: Option<u32>) -> Result<Vec<Vec<u8>>> {
        tracing::debug!(command = cmd.name(), ?ifindex, "nl80211 dump");

        let responses = self
            .genl
            .dump_command(self.family.id, cmd as u8, self.family.version, |builder| {
                if let Some(ifindex) = ifindex {
                    builder.append_attr_u32(Nl80211Attr::Ifindex as u16, ifindex);
                }
            })
            .await
            .map_err(|e| e.with_context(cmd.name()))?;

        tracing::trace!(command = cmd.name(), messages = responses.len(), "nl80211 dump complete");
        Ok(responses)
    }
}
