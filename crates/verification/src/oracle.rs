//! Reference oracle interface
//!
//! An oracle produces the footprints a trusted source expects for a resource,
//! so the core's output can be checked against it.

use copyable_footprints::{FootprintBatch, FootprintError, PixelFormat, ResourceDescription};

/// Errors reported by reference oracles and the device copy validator
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The core rejected the request
    #[error(transparent)]
    Footprint(#[from] FootprintError),
    /// The oracle cannot express this resource; the case is skipped
    #[error("{oracle} cannot handle this case: {reason}")]
    Unsupported {
        /// Name of the oracle that skipped the case
        oracle: &'static str,
        /// Why the case was skipped
        reason: String,
    },
    /// The oracle rejected the request as malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// No fixture exists for the requested range
    #[error("no fixture for {format:?} (first {first}, count {count})")]
    MissingFixture {
        /// Format of the requested resource
        format: PixelFormat,
        /// First requested subresource
        first: u32,
        /// Number of requested subresources
        count: u32,
    },
    /// No GPU adapter is available
    #[error("failed to request adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),
    /// The adapter refused to create a device
    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    /// Waiting on the device failed
    #[error("failed to poll device: {0}")]
    Poll(#[from] wgpu::PollError),
    /// Mapping the readback buffer failed
    #[error("failed to map readback buffer: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),
    /// The device rejected a copy built from the footprints
    #[error("device validation failed: {0}")]
    Validation(String),
    /// Data read back through a footprint differs from the data uploaded through it
    #[error("subresource {subresource} did not survive the copy round trip")]
    DataMismatch {
        /// Index of the corrupted subresource
        subresource: u32,
    },
}

impl OracleError {
    /// Whether this error means the case was skipped rather than failed
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. } | Self::MissingFixture { .. })
    }
}

/// A trusted source of copyable footprints
///
/// Implementations place the first subresource at offset 0.
pub trait ReferenceOracle {
    /// Short name used in reports
    fn name(&self) -> &'static str;

    /// Returns the footprints this oracle expects for `count` subresources starting at `first`
    ///
    /// # Arguments
    /// * `desc` - The resource to lay out
    /// * `first` - Index of the first subresource
    /// * `count` - Number of subresources
    ///
    /// # Returns
    /// The expected footprints, or [`OracleError::Unsupported`] if the oracle has no answer
    fn query_reference_footprints(&self, desc: &ResourceDescription, first: u32, count: u32) -> Result<FootprintBatch, OracleError>;
}
