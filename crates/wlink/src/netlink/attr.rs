//! Netlink attribute (nlattr) handling.
//!
//! Every attribute stream in a generic netlink payload, top-level or nested,
//! is walked with [`AttrIter`]. Each step yields an [`Attr`]: the attribute
//! type plus its raw payload, which the caller reinterprets either as a scalar
//! (through the accessors on [`Attr`] or the [`get`] helpers) or as another
//! attribute stream (through [`Attr::nested`]).

use super::error::{Error, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Netlink attribute alignment.
pub const NLA_ALIGNTO: usize = 4;

/// Align a length to NLA_ALIGNTO boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// Size of the attribute header.
pub const NLA_HDRLEN: usize = 4; // nla_align(size_of::<NlAttr>())

/// Netlink attribute header (mirrors struct nlattr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlAttr {
    /// Length including header.
    pub nla_len: u16,
    /// Attribute type.
    pub nla_type: u16,
}

/// Attribute type flags.
pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

impl NlAttr {
    /// Create a new attribute header.
    pub fn new(attr_type: u16, data_len: usize) -> Self {
        Self {
            nla_len: (NLA_HDRLEN + data_len) as u16,
            nla_type: attr_type,
        }
    }

    /// Get the attribute type without flags.
    pub fn kind(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    /// Check if this is a nested attribute.
    pub fn is_nested(&self) -> bool {
        self.nla_type & NLA_F_NESTED != 0
    }

    /// Get the payload length (total length minus header).
    pub fn payload_len(&self) -> usize {
        (self.nla_len as usize).saturating_sub(NLA_HDRLEN)
    }

    /// Convert to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Read a header from the front of `data`.
    ///
    /// Copies the four header bytes, so `data` need not be aligned.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(attr, _)| attr)
            .map_err(|_| Error::Truncated {
                expected: NLA_HDRLEN,
                actual: data.len(),
            })
    }
}

/// One decoded attribute node: its type and raw payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attr<'a> {
    kind: u16,
    nested: bool,
    payload: &'a [u8],
}

impl<'a> Attr<'a> {
    /// Attribute type with the nested/byte-order flags masked off.
    pub fn kind(&self) -> u16 {
        self.kind
    }

    /// Whether the sender set NLA_F_NESTED.
    ///
    /// The kernel does not set this flag on every container, so parsers
    /// decide by attribute type and call [`nested`](Self::nested) regardless.
    pub fn is_nested(&self) -> bool {
        self.nested
    }

    /// Raw payload bytes.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Reinterpret the payload as an attribute stream.
    pub fn nested(&self) -> AttrIter<'a> {
        AttrIter::new(self.payload)
    }

    pub fn u8(&self) -> Result<u8> {
        get::u8(self.payload)
    }

    pub fn u16(&self) -> Result<u16> {
        get::u16_ne(self.payload)
    }

    pub fn u32(&self) -> Result<u32> {
        get::u32_ne(self.payload)
    }

    pub fn u64(&self) -> Result<u64> {
        get::u64_ne(self.payload)
    }

    pub fn i8(&self) -> Result<i8> {
        get::i8(self.payload)
    }

    pub fn string(&self) -> Result<&'a str> {
        get::string(self.payload)
    }
}

/// Iterator over netlink attributes in a buffer.
///
/// Yields `Err` once and then stops when an attribute header claims more
/// bytes than remain, or fewer than its own header. Trailing bytes shorter
/// than a header are alignment padding and end the stream.
pub struct AttrIter<'a> {
    data: &'a [u8],
}

impl<'a> AttrIter<'a> {
    /// Create a new attribute iterator.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Check if there are no more attributes.
    pub fn is_empty(&self) -> bool {
        self.data.len() < NLA_HDRLEN
    }
}

impl<'a> Iterator for AttrIter<'a> {
    type Item = Result<Attr<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.len() < NLA_HDRLEN {
            return None;
        }

        let attr = match NlAttr::from_bytes(self.data) {
            Ok(a) => a,
            Err(e) => {
                self.data = &[];
                return Some(Err(e));
            }
        };

        let len = attr.nla_len as usize;
        if len < NLA_HDRLEN || len > self.data.len() {
            let actual = self.data.len();
            self.data = &[];
            return Some(Err(Error::InvalidAttribute(format!(
                "attribute {} length {} exceeds {} remaining bytes",
                attr.kind(),
                len,
                actual
            ))));
        }

        let payload = &self.data[NLA_HDRLEN..len];
        let aligned_len = nla_align(len);

        // Move to next attribute
        if aligned_len >= self.data.len() {
            self.data = &[];
        } else {
            self.data = &self.data[aligned_len..];
        }

        Some(Ok(Attr {
            kind: attr.kind(),
            nested: attr.is_nested(),
            payload,
        }))
    }
}

/// Helper functions for extracting typed values from attribute payloads.
///
/// All multi-byte integers are host (kernel native) byte order.
pub mod get {
    use super::*;

    /// Extract a u8 value.
    pub fn u8(data: &[u8]) -> Result<u8> {
        if data.is_empty() {
            return Err(Error::InvalidAttribute("empty u8 attribute".into()));
        }
        Ok(data[0])
    }

    /// Extract an i8 value.
    pub fn i8(data: &[u8]) -> Result<i8> {
        Ok(u8(data)? as i8)
    }

    /// Extract a u16 value (native endian).
    pub fn u16_ne(data: &[u8]) -> Result<u16> {
        if data.len() < 2 {
            return Err(Error::InvalidAttribute("truncated u16 attribute".into()));
        }
        Ok(u16::from_ne_bytes([data[0], data[1]]))
    }

    /// Extract a u32 value (native endian).
    pub fn u32_ne(data: &[u8]) -> Result<u32> {
        if data.len() < 4 {
            return Err(Error::InvalidAttribute("truncated u32 attribute".into()));
        }
        Ok(u32::from_ne_bytes([data[0], data[1], data[2], data[3]]))
    }

    /// Extract a u64 value (native endian).
    pub fn u64_ne(data: &[u8]) -> Result<u64> {
        if data.len() < 8 {
            return Err(Error::InvalidAttribute("truncated u64 attribute".into()));
        }
        Ok(u64::from_ne_bytes([
            data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
        ]))
    }

    /// Extract an i32 value (native endian).
    pub fn i32_ne(data: &[u8]) -> Result<i32> {
        if data.len() < 4 {
            return Err(Error::InvalidAttribute("truncated i32 attribute".into()));
        }
        Ok(i32::from_ne_bytes([data[0], data[1], data[2], data[3]]))
    }

    /// Extract a null-terminated string.
    pub fn string(data: &[u8]) -> Result<&str> {
        // Find null terminator or use whole buffer
        let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        std::str::from_utf8(&data[..len])
            .map_err(|e| Error::InvalidAttribute(format!("invalid UTF-8: {}", e)))
    }

    /// Extract a 6-byte hardware address.
    pub fn mac(data: &[u8]) -> Result<[u8; 6]> {
        data.get(..6)
            .and_then(|b| <[u8; 6]>::try_from(b).ok())
            .ok_or_else(|| {
                Error::InvalidAttribute(format!("hardware address of {} bytes", data.len()))
            })
    }
}
