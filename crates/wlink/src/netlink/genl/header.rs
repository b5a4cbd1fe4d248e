//! Generic Netlink message header.
//!
//! GENL messages have an additional header after the standard netlink header:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ nlmsghdr (16 bytes)                     │
//! │   nlmsg_len, nlmsg_type (family_id),    │
//! │   nlmsg_flags, nlmsg_seq, nlmsg_pid     │
//! ├─────────────────────────────────────────┤
//! │ genlmsghdr (4 bytes)                    │
//! │   cmd (u8), version (u8), reserved (u16)│
//! ├─────────────────────────────────────────┤
//! │ Attributes (TLV format)                 │
//! └─────────────────────────────────────────┘
//! ```

use std::mem;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::netlink::error::{Error, Result};

/// Generic Netlink message header.
///
/// This header immediately follows the standard netlink header in GENL messages.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct GenlMsgHdr {
    /// Command identifier (family-specific)
    pub cmd: u8,
    /// Interface version
    pub version: u8,
    /// Reserved for future use
    pub reserved: u16,
}

/// Size of the GENL header in bytes.
pub const GENL_HDRLEN: usize = mem::size_of::<GenlMsgHdr>();

impl GenlMsgHdr {
    /// Create a new GENL header with the given command and version.
    #[inline]
    pub const fn new(cmd: u8, version: u8) -> Self {
        Self {
            cmd,
            version,
            reserved: 0,
        }
    }

    /// Read a header from the front of a netlink payload.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(hdr, _)| hdr)
            .map_err(|_| Error::Truncated {
                expected: GENL_HDRLEN,
                actual: data.len(),
            })
    }

    /// Get the header as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }
}

/// Split a generic netlink payload into its header and attribute section.
pub fn split_payload(payload: &[u8]) -> Result<(GenlMsgHdr, &[u8])> {
    let hdr = GenlMsgHdr::from_bytes(payload)?;
    Ok((hdr, &payload[GENL_HDRLEN..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genl_header_size() {
        assert_eq!(GENL_HDRLEN, 4);
    }

    #[test]
    fn test_genl_header_new() {
        let hdr = GenlMsgHdr::new(1, 2);
        assert_eq!(hdr.cmd, 1);
        assert_eq!(hdr.version, 2);
        assert_eq!(hdr.reserved, 0);
    }

    #[test]
    fn test_genl_header_from_bytes() {
        let data = [0x05, 0x01, 0x00, 0x00]; // cmd=5, version=1
        let hdr = GenlMsgHdr::from_bytes(&data).unwrap();
        assert_eq!(hdr.cmd, 5);
        assert_eq!(hdr.version, 1);
    }

    #[test]
    fn test_genl_header_from_bytes_too_short() {
        let data = [0x03, 0x01, 0x00]; // Only 3 bytes
        assert!(matches!(
            GenlMsgHdr::from_bytes(&data),
            Err(Error::Truncated {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_split_payload() {
        let data = [0x11, 0x01, 0x00, 0x00, 0xaa, 0xbb];
        let (hdr, attrs) = split_payload(&data).unwrap();
        assert_eq!(hdr.cmd, 0x11);
        assert_eq!(attrs, &[0xaa, 0xbb]);
    }
}
