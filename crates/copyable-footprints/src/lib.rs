//! Copyable footprint computation for GPU resources
//!
//! Given a texture or buffer description and a contiguous range of its
//! subresources, this crate computes how each subresource is laid out in a
//! linear buffer for GPU copies: the placed offset, the row pitch, the number
//! of rows, the unpadded row size, and the total buffer span of the range.
//! The computation is pure and never touches a device.

mod error;

pub mod footprint;
pub mod format;
pub mod resource;
pub mod subresource;

pub use error::FootprintError;
pub use footprint::{
    CopyAlignment, FootprintBatch, FootprintEntry, PlacedFootprint, SubresourceFootprint, SubresourceLayout, TEXTURE_DATA_PITCH_ALIGNMENT, TEXTURE_DATA_PLACEMENT_ALIGNMENT, compute_footprints,
    compute_footprints_with_alignment, required_intermediate_size, subresource_layout,
};
pub use format::{FormatInfo, PixelFormat, PlaneInfo, PlaneSizing};
pub use resource::{ResourceDescription, ResourceDimension, TextureLayout};
pub use subresource::{SubresourceCoordinate, calc_subresource, decompose_subresource, expand};
