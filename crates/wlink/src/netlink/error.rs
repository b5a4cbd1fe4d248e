//! Error types for nl80211 operations.

use std::io;

/// Result type for nl80211 operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the wireless subsystem.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[cfg(feature = "output")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Kernel returned an error code.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Kernel error with operation context.
    #[error("{operation}: {message} (errno {errno})")]
    KernelWithContext {
        /// The operation that failed.
        operation: String,
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Message was truncated.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected message length.
        expected: usize,
        /// Actual bytes available.
        actual: usize,
    },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid attribute format.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// A record was missing an attribute it cannot be built without.
    #[error("{record} record is missing required attribute {attribute}")]
    MissingAttribute {
        /// The record being decoded ("interface", "bss", "station").
        record: &'static str,
        /// The attribute name.
        attribute: &'static str,
    },

    /// The kernel flagged a dump as inconsistent (NLM_F_DUMP_INTR).
    #[error("dump interrupted: the object list changed while it was being dumped")]
    DumpInterrupted,

    /// Generic netlink family is not registered with the kernel.
    #[error("generic netlink family not found: {name}")]
    FamilyNotFound {
        /// The family name that was looked up.
        name: String,
    },

    /// No backend exists for this operating system.
    #[error("wlink is not implemented on {os}/{arch}")]
    Unsupported {
        /// Operating system name.
        os: &'static str,
        /// CPU architecture name.
        arch: &'static str,
    },

    /// The client or transport was already closed.
    #[error("connection closed")]
    Closed,

    /// Station statistics were requested for a non-station interface.
    #[error("interface {interface} is not a station")]
    NotStation {
        /// The interface name.
        interface: String,
    },

    /// The interface has no current BSS.
    #[error("interface {interface} is not associated with a BSS")]
    NotAssociated {
        /// The interface name.
        interface: String,
    },

    /// The station interface has no connected peer.
    #[error("interface {interface} has no connected station")]
    NotConnected {
        /// The interface name.
        interface: String,
    },

    /// Interface not found.
    #[error("interface not found: {name}")]
    InterfaceNotFound {
        /// The interface name that was not found.
        name: String,
    },
}

impl Error {
    /// Create a kernel error from an errno value.
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::Kernel {
            errno: -errno,
            message,
        }
    }

    /// Create a kernel error carrying the kernel's extended ACK text.
    ///
    /// The text is appended to the errno description; without one this is
    /// [`from_errno`](Self::from_errno).
    pub fn from_errno_with_message(errno: i32, ext_message: Option<&str>) -> Self {
        match (Self::from_errno(errno), ext_message) {
            (Self::Kernel { errno, message }, Some(text)) if !text.is_empty() => Self::Kernel {
                errno,
                message: format!("{message}: {text}"),
            },
            (err, _) => err,
        }
    }

    /// The error for operating systems without a backend.
    pub fn unsupported() -> Self {
        Self::Unsupported {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }

    /// Add context to this error.
    ///
    /// Wraps kernel errors with operation context. Other errors are returned unchanged.
    pub fn with_context(self, operation: impl Into<String>) -> Self {
        match self {
            Self::Kernel { errno, message } => Self::KernelWithContext {
                operation: operation.into(),
                errno,
                message,
            },
            other => other,
        }
    }

    /// Check if this is a "not found" error (ENOENT, ENODEV, etc.).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } | Self::KernelWithContext { errno, .. } => {
                matches!(*errno, libc::ENOENT | libc::ENODEV)
            }
            Self::InterfaceNotFound { .. } | Self::FamilyNotFound { .. } => true,
            _ => false,
        }
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } | Self::KernelWithContext { errno, .. } => {
                matches!(*errno, libc::EPERM | libc::EACCES)
            }
            Self::Io(e) => e.kind() == io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    /// Check if this is a "device busy" error (EBUSY) or an interrupted dump.
    ///
    /// Both are transient; retrying is left to the caller.
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } | Self::KernelWithContext { errno, .. } => {
                *errno == libc::EBUSY
            }
            Self::DumpInterrupted => true,
            _ => false,
        }
    }

    /// Check if the platform or kernel lacks wireless support entirely.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. } | Self::FamilyNotFound { .. })
    }

    /// Check if this reports the absence of a BSS or connected station.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::NotAssociated { .. } | Self::NotConnected { .. })
    }

    /// Check if this is a decode error (malformed kernel response).
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. }
                | Self::InvalidMessage(_)
                | Self::InvalidAttribute(_)
                | Self::MissingAttribute { .. }
        )
    }

    /// Get the errno value if this is a kernel error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } | Self::KernelWithContext { errno, .. } => Some(*errno),
            _ => None,
        }
    }
}
