//! Error types for footprint computation

use crate::PixelFormat;

/// Errors reported by the footprint resolver, indexer and packer
///
/// Every failure is a caller input error: the computation is deterministic, so
/// retrying with the same input always yields the same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FootprintError {
    /// The pixel format has no known block or plane layout
    #[error("pixel format {format:?} has no copyable layout")]
    UnsupportedFormat {
        /// The rejected format
        format: PixelFormat,
    },
    /// The requested subresource range is empty or runs past the end of the resource
    #[error("subresource range (first {first}, count {count}) is empty or exceeds the {total} subresources of the resource")]
    Range {
        /// First requested subresource index
        first: u32,
        /// Number of requested subresources
        count: u32,
        /// Total number of subresources in the resource
        total: u32,
    },
    /// A plane index was requested that the format does not have
    #[error("plane {plane} does not exist in {format:?}")]
    InvalidPlane {
        /// The format being resolved
        format: PixelFormat,
        /// The requested plane slice
        plane: u32,
    },
    /// A computed byte quantity does not fit in its representable range
    #[error("{quantity} overflows its representable range")]
    ArithmeticOverflow {
        /// Name of the quantity that overflowed
        quantity: &'static str,
    },
    /// The resource description is not a valid texture or buffer
    #[error("invalid resource description: {reason}")]
    InvalidResource {
        /// Why the description was rejected
        reason: &'static str,
    },
    /// A caller-supplied copy alignment is not a power of two
    #[error("copy alignment must be a power of two (row pitch {row_pitch}, placement {placement})")]
    InvalidAlignment {
        /// Requested row pitch alignment
        row_pitch: u32,
        /// Requested placement alignment
        placement: u64,
    },
}

impl FootprintError {
    pub(crate) fn overflow(quantity: &'static str) -> Self {
        Self::ArithmeticOverflow { quantity }
    }
}
