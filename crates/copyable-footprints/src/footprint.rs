//! Footprint packing
//!
//! Computes where each subresource of a resource lands in a linear buffer
//! when copied with the GPU copy engine's packing rules: every row is padded
//! to the row pitch alignment, and every subresource starts at the next
//! placement-aligned offset after the previous one.

use crate::{FootprintError, PixelFormat, ResourceDescription, ResourceDimension, SubresourceCoordinate, subresource};
use tracing::{debug, trace};

/// Default row pitch alignment in bytes
pub const TEXTURE_DATA_PITCH_ALIGNMENT: u32 = 256;
/// Default subresource placement alignment in bytes
pub const TEXTURE_DATA_PLACEMENT_ALIGNMENT: u64 = 512;

/// Row pitch and placement alignments used for packing
///
/// The defaults match the copy engine. Other power-of-two alignments are an
/// extension for callers targeting stricter staging layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CopyAlignment {
    row_pitch: u32,
    placement: u64,
}

impl Default for CopyAlignment {
    fn default() -> Self {
        Self {
            row_pitch: TEXTURE_DATA_PITCH_ALIGNMENT,
            placement: TEXTURE_DATA_PLACEMENT_ALIGNMENT,
        }
    }
}

impl CopyAlignment {
    /// Creates an alignment pair; a zero field selects its default
    ///
    /// # Errors
    /// [`FootprintError::InvalidAlignment`] if a non-zero field is not a power of two.
    pub fn new(row_pitch: u32, placement: u64) -> Result<Self, FootprintError> {
        let defaults = Self::default();
        let row_pitch_value = if row_pitch == 0 { defaults.row_pitch } else { row_pitch };
        let placement_value = if placement == 0 { defaults.placement } else { placement };

        if !row_pitch_value.is_power_of_two() || !placement_value.is_power_of_two() {
            return Err(FootprintError::InvalidAlignment { row_pitch, placement });
        }

        Ok(Self {
            row_pitch: row_pitch_value,
            placement: placement_value,
        })
    }

    pub fn row_pitch(&self) -> u32 {
        self.row_pitch
    }

    pub fn placement(&self) -> u64 {
        self.placement
    }
}

/// Shape of one subresource in a linear buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubresourceFootprint {
    /// Format of the copied data (the plane format for planar resources)
    pub format: PixelFormat,
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Depth in texels
    pub depth: u32,
    /// Bytes between the starts of consecutive block rows
    pub row_pitch: u32,
}

/// A subresource footprint placed at a buffer offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedFootprint {
    /// Offset in bytes from the start of the buffer
    pub offset: u64,
    /// Shape of the subresource at that offset
    pub footprint: SubresourceFootprint,
}

/// Layout of a single subresource, independent of its placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubresourceLayout {
    /// Shape of the subresource
    pub footprint: SubresourceFootprint,
    /// Number of block rows per depth slice
    pub num_rows: u32,
    /// Unpadded byte size of one block row
    pub row_size_in_bytes: u64,
    /// Bytes occupied by the subresource: row pitch x rows x depth
    pub packed_size: u64,
}

/// Footprints of a contiguous subresource range
///
/// `layouts`, `num_rows` and `row_sizes_in_bytes` are parallel and ordered by
/// subresource index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FootprintBatch {
    pub layouts: Vec<PlacedFootprint>,
    pub num_rows: Vec<u32>,
    pub row_sizes_in_bytes: Vec<u64>,
    /// Bytes spanned from the first entry's offset to the end of the last entry
    pub total_bytes: u64,
}

/// Borrowed view of one entry of a [`FootprintBatch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FootprintEntry<'a> {
    pub layout: &'a PlacedFootprint,
    pub num_rows: u32,
    pub row_size_in_bytes: u64,
}

impl FootprintEntry<'_> {
    /// Bytes occupied by this entry, or `None` on overflow
    pub fn packed_size(&self) -> Option<u64> {
        let footprint = &self.layout.footprint;
        (footprint.row_pitch as u64).checked_mul(self.num_rows as u64)?.checked_mul(footprint.depth as u64)
    }
}

impl FootprintBatch {
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Iterates over the entries in subresource order
    pub fn iter(&self) -> impl Iterator<Item = FootprintEntry<'_>> {
        self.layouts
            .iter()
            .zip(&self.num_rows)
            .zip(&self.row_sizes_in_bytes)
            .map(|((layout, &num_rows), &row_size_in_bytes)| FootprintEntry {
                layout,
                num_rows,
                row_size_in_bytes,
            })
    }

    /// Entry at `index`
    pub fn get(&self, index: usize) -> Option<FootprintEntry<'_>> {
        Some(FootprintEntry {
            layout: self.layouts.get(index)?,
            num_rows: *self.num_rows.get(index)?,
            row_size_in_bytes: *self.row_sizes_in_bytes.get(index)?,
        })
    }

    /// Bytes occupied by the entry at `index`
    pub fn packed_size(&self, index: usize) -> Option<u64> {
        self.get(index)?.packed_size()
    }
}

fn align_up(value: u64, alignment: u64) -> Result<u64, FootprintError> {
    value.checked_next_multiple_of(alignment).ok_or(FootprintError::overflow("aligned offset"))
}

/// Computes the layout of one subresource coordinate, without placing it
fn layout_coordinate(desc: &ResourceDescription, coordinate: SubresourceCoordinate, alignment: CopyAlignment) -> Result<SubresourceLayout, FootprintError> {
    if desc.dimension == ResourceDimension::Buffer {
        let width = u32::try_from(desc.width).map_err(|_| FootprintError::overflow("buffer width"))?;
        let row_pitch = align_up(desc.width, alignment.row_pitch() as u64)?;
        return Ok(SubresourceLayout {
            footprint: SubresourceFootprint {
                format: PixelFormat::Unknown,
                width,
                height: 1,
                depth: 1,
                row_pitch: u32::try_from(row_pitch).map_err(|_| FootprintError::overflow("row pitch"))?,
            },
            num_rows: 1,
            row_size_in_bytes: desc.width,
            packed_size: row_pitch,
        });
    }

    let sizing = desc.format.plane_sizing(coordinate.plane_slice)?;
    let (width, height, depth) = desc.mip_extent(coordinate.mip_level);
    let width = u32::try_from(width).map_err(|_| FootprintError::overflow("texture width"))?;
    let (width, height) = sizing.plane_extent(width, height);

    let num_rows = sizing.block_rows(height);
    let row_size_in_bytes = sizing.row_size(width)?;
    let row_pitch = align_up(row_size_in_bytes, alignment.row_pitch() as u64)?;
    let packed_size = row_pitch
        .checked_mul(num_rows as u64)
        .and_then(|size| size.checked_mul(depth as u64))
        .ok_or(FootprintError::overflow("subresource size"))?;

    Ok(SubresourceLayout {
        footprint: SubresourceFootprint {
            format: sizing.format,
            width,
            height,
            depth,
            row_pitch: u32::try_from(row_pitch).map_err(|_| FootprintError::overflow("row pitch"))?,
        },
        num_rows,
        row_size_in_bytes,
        packed_size,
    })
}

/// Computes the unplaced layout of a single subresource
///
/// # Errors
/// Same as [`compute_footprints`] for a one-entry range.
pub fn subresource_layout(desc: &ResourceDescription, index: u32) -> Result<SubresourceLayout, FootprintError> {
    let coordinates = subresource::expand(desc, index, 1)?;
    layout_coordinate(desc, coordinates[0], CopyAlignment::default())
}

/// Computes copyable footprints for `count` subresources starting at `first`
///
/// The first subresource is placed at `base_offset` rounded up to 512 bytes,
/// and each following one at the next 512-byte boundary after its predecessor.
/// Row pitches are rounded up to 256 bytes.
///
/// # Arguments
/// * `desc` - The resource to lay out
/// * `first` - Index of the first subresource
/// * `count` - Number of subresources (at least 1)
/// * `base_offset` - Where the caller intends to place the data in its buffer
///
/// # Returns
/// The placed footprints with their row counts, row sizes, and the total
/// span measured from the first aligned offset
///
/// # Errors
/// [`FootprintError::UnsupportedFormat`], [`FootprintError::InvalidResource`],
/// [`FootprintError::Range`] or [`FootprintError::ArithmeticOverflow`]; no
/// partial result is ever returned.
pub fn compute_footprints(desc: &ResourceDescription, first: u32, count: u32, base_offset: u64) -> Result<FootprintBatch, FootprintError> {
    compute_footprints_with_alignment(desc, first, count, base_offset, CopyAlignment::default())
}

/// [`compute_footprints`] with caller-chosen alignments
pub fn compute_footprints_with_alignment(desc: &ResourceDescription, first: u32, count: u32, base_offset: u64, alignment: CopyAlignment) -> Result<FootprintBatch, FootprintError> {
    let coordinates = subresource::expand(desc, first, count)?;

    let first_offset = align_up(base_offset, alignment.placement())?;
    let mut cursor = first_offset;

    let mut layouts = Vec::with_capacity(coordinates.len());
    let mut num_rows = Vec::with_capacity(coordinates.len());
    let mut row_sizes_in_bytes = Vec::with_capacity(coordinates.len());

    for (index, coordinate) in (first..first + count).zip(coordinates) {
        let layout = layout_coordinate(desc, coordinate, alignment)?;
        let offset = align_up(cursor, alignment.placement())?;
        cursor = offset.checked_add(layout.packed_size).ok_or(FootprintError::overflow("buffer offset"))?;

        trace!(
            subresource = index,
            mip = coordinate.mip_level,
            slice = coordinate.array_slice,
            plane = coordinate.plane_slice,
            offset,
            row_pitch = layout.footprint.row_pitch,
            rows = layout.num_rows,
            "placed subresource"
        );

        layouts.push(PlacedFootprint {
            offset,
            footprint: layout.footprint,
        });
        num_rows.push(layout.num_rows);
        row_sizes_in_bytes.push(layout.row_size_in_bytes);
    }

    let total_bytes = cursor - first_offset;
    debug!(format = ?desc.format, first, count, base_offset, total_bytes, "computed copyable footprints");

    Ok(FootprintBatch {
        layouts,
        num_rows,
        row_sizes_in_bytes,
        total_bytes,
    })
}

/// Size of a staging buffer that holds `count` subresources starting at `first`
pub fn required_intermediate_size(desc: &ResourceDescription, first: u32, count: u32) -> Result<u64, FootprintError> {
    Ok(compute_footprints(desc, first, count, 0)?.total_bytes)
}
