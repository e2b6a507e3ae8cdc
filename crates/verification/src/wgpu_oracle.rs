//! Reference oracle built on wgpu's format tables
//!
//! Recomputes footprints from wgpu's own texel block sizes, block dimensions
//! and mip extents, independently of the core's format resolver and packer.

use crate::oracle::{OracleError, ReferenceOracle};
use crate::wgpu_helpers::{full_mip_chain, plane_aspects, texture_dimension, wgpu_format};
use copyable_footprints::{FootprintBatch, PixelFormat, PlacedFootprint, ResourceDescription, SubresourceFootprint};

/// Placement alignment of subresources in a staging buffer
const PLACEMENT_ALIGNMENT: u64 = 512;

/// Oracle that derives footprints from wgpu's texture format tables
#[derive(Debug, Clone, Copy, Default)]
pub struct WgpuTableOracle;

impl WgpuTableOracle {
    fn unsupported(reason: impl Into<String>) -> OracleError {
        OracleError::Unsupported {
            oracle: "wgpu-table",
            reason: reason.into(),
        }
    }

    fn buffer_footprints(desc: &ResourceDescription, first: u32, count: u32) -> Result<FootprintBatch, OracleError> {
        if first != 0 || count != 1 {
            return Err(OracleError::InvalidRequest(format!("buffers have a single subresource, got first {first} count {count}")));
        }
        let width = u32::try_from(desc.width).map_err(|_| Self::unsupported("buffer larger than 4 GiB"))?;
        let row_pitch = width.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

        Ok(FootprintBatch {
            layouts: vec![PlacedFootprint {
                offset: 0,
                footprint: SubresourceFootprint {
                    format: PixelFormat::Unknown,
                    width,
                    height: 1,
                    depth: 1,
                    row_pitch,
                },
            }],
            num_rows: vec![1],
            row_sizes_in_bytes: vec![desc.width],
            total_bytes: row_pitch as u64,
        })
    }
}

impl ReferenceOracle for WgpuTableOracle {
    fn name(&self) -> &'static str {
        "wgpu-table"
    }

    fn query_reference_footprints(&self, desc: &ResourceDescription, first: u32, count: u32) -> Result<FootprintBatch, OracleError> {
        let Some(dimension) = texture_dimension(desc.dimension) else {
            return Self::buffer_footprints(desc, first, count);
        };
        let format = wgpu_format(desc.format).ok_or_else(|| Self::unsupported(format!("{:?} has no wgpu equivalent", desc.format)))?;
        let width = u32::try_from(desc.width).map_err(|_| OracleError::InvalidRequest("texture width exceeds 32 bits".to_string()))?;

        let is_volume = dimension == wgpu::TextureDimension::D3;
        let size = wgpu::Extent3d {
            width,
            height: if dimension == wgpu::TextureDimension::D1 { 1 } else { desc.height },
            depth_or_array_layers: desc.depth_or_array_size as u32,
        };
        let mip_levels = match desc.mip_levels {
            0 => full_mip_chain(size, dimension),
            levels => levels as u32,
        };
        let array_layers = if is_volume { 1 } else { size.depth_or_array_layers };
        let planes = plane_aspects(desc.format);

        let total = mip_levels * array_layers * planes.len() as u32;
        if count == 0 || first.checked_add(count).is_none_or(|end| end > total) {
            return Err(OracleError::InvalidRequest(format!("range first {first} count {count} outside {total} subresources")));
        }

        let mut batch = FootprintBatch {
            layouts: Vec::new(),
            num_rows: Vec::new(),
            row_sizes_in_bytes: Vec::new(),
            total_bytes: 0,
        };
        let mut end = 0u64;

        for index in first..first + count {
            let mip = index % mip_levels;
            let plane = (index / (mip_levels * array_layers)) as usize;
            let (aspect, plane_format) = planes[plane];

            let mip_size = size.mip_level_size(mip, dimension);
            let depth = if is_volume { mip_size.depth_or_array_layers } else { 1 };

            let (plane_width, plane_height, (block_width, block_height)) = match aspect {
                // 4:2:0 chroma carries one sample per 2x2 luma texels
                wgpu::TextureAspect::Plane1 => (mip_size.width.div_ceil(2), mip_size.height.div_ceil(2), (1, 1)),
                wgpu::TextureAspect::All => (mip_size.width, mip_size.height, format.block_dimensions()),
                _ => (mip_size.width, mip_size.height, (1, 1)),
            };
            let block_size = format
                .block_copy_size(Some(aspect))
                .ok_or_else(|| Self::unsupported(format!("{format:?} aspect {aspect:?} is not copyable")))?;

            let row_size = plane_width.div_ceil(block_width) as u64 * block_size as u64;
            let num_rows = plane_height.div_ceil(block_height);
            let row_pitch = row_size.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64);
            let offset = end.next_multiple_of(PLACEMENT_ALIGNMENT);
            end = offset + row_pitch * num_rows as u64 * depth as u64;

            batch.layouts.push(PlacedFootprint {
                offset,
                footprint: SubresourceFootprint {
                    format: plane_format,
                    width: plane_width,
                    height: plane_height,
                    depth,
                    row_pitch: row_pitch as u32,
                },
            });
            batch.num_rows.push(num_rows);
            batch.row_sizes_in_bytes.push(row_size);
        }

        batch.total_bytes = end;
        Ok(batch)
    }
}
