//! Hardware-backed footprint validation
//!
//! Uploads a byte pattern into a real texture through the computed footprints,
//! copies every subresource back into a buffer laid out the same way, and
//! checks that the device accepted every copy and that the data survived.

use crate::OracleError;
use crate::wgpu_helpers::{create_texture, plane_aspects, read_buffer, texture_dimension, wgpu_format};
use copyable_footprints::{FootprintBatch, ResourceDescription, decompose_subresource};
use tracing::{debug, info};

/// Validates footprints by round-tripping data through a wgpu device
pub struct DeviceCopyValidator {
    /// The wgpu device
    device: wgpu::Device,
    /// The wgpu command queue
    queue: wgpu::Queue,
    /// Adapter name for reporting
    adapter_name: String,
}

/// Returns why `desc` cannot be validated on a device, if it cannot
///
/// # Arguments
/// * `desc` - The resource to check
/// * `features` - Features enabled on the device
pub fn unsupported_reason(desc: &ResourceDescription, features: wgpu::Features) -> Option<String> {
    let Some(dimension) = texture_dimension(desc.dimension) else {
        return Some("buffers have no texture to copy from".to_string());
    };
    let Some(format) = wgpu_format(desc.format) else {
        return Some(format!("{:?} has no wgpu equivalent", desc.format));
    };

    if plane_aspects(desc.format).len() > 1 || format.is_depth_stencil_format() {
        return Some(format!("{:?} cannot be written through the queue", desc.format));
    }
    if desc.sample_count > 1 {
        return Some("multisampled textures cannot be copied".to_string());
    }
    if !features.contains(format.required_features()) {
        return Some(format!("device lacks features for {format:?}"));
    }

    let (block_width, block_height) = format.block_dimensions();
    let is_compressed = (block_width, block_height) != (1, 1);
    match dimension {
        wgpu::TextureDimension::D1 if desc.mip_levels != 1 || desc.depth_or_array_size != 1 || is_compressed => {
            Some("1D textures are limited to a single uncompressed mip and layer".to_string())
        }
        wgpu::TextureDimension::D3 if is_compressed => Some("compressed volume textures are not validated".to_string()),
        _ if desc.width % block_width as u64 != 0 || desc.height % block_height != 0 => Some("mip 0 is not a whole number of blocks".to_string()),
        _ => None,
    }
}

impl DeviceCopyValidator {
    /// Creates a validator on the highest-performance adapter
    ///
    /// Enables whichever optional texture format features the adapter offers.
    ///
    /// # Returns
    /// A new validator or an error if no device could be created
    pub async fn new() -> Result<Self, OracleError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        let wanted = wgpu::Features::TEXTURE_COMPRESSION_BC | wgpu::Features::TEXTURE_FORMAT_16BIT_NORM | wgpu::Features::DEPTH32FLOAT_STENCIL8;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Footprint Validator"),
                required_features: adapter.features() & wanted,
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: Default::default(),
            })
            .await?;

        let adapter_name = adapter.get_info().name;
        info!(adapter = %adapter_name, "device copy validator ready");

        Ok(Self { device, queue, adapter_name })
    }

    /// Name of the adapter backing this validator
    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    /// Round-trips a byte pattern through every footprint of `batch`
    ///
    /// # Arguments
    /// * `desc` - The resource the batch was computed for
    /// * `first` - Subresource index of the first entry of `batch`
    /// * `batch` - Footprints to validate
    ///
    /// # Returns
    /// `Ok(())` if every copy was accepted and the data came back unchanged
    pub fn validate(&self, desc: &ResourceDescription, first: u32, batch: &FootprintBatch) -> Result<(), OracleError> {
        if let Some(reason) = unsupported_reason(desc, self.device.features()) {
            return Err(OracleError::Unsupported { oracle: "device", reason });
        }
        let (Some(format), Some(dimension)) = (wgpu_format(desc.format), texture_dimension(desc.dimension)) else {
            return Err(OracleError::Validation("resource changed during validation".to_string()));
        };
        let (block_width, block_height) = format.block_dimensions();

        let mip_levels = desc.mip_level_count() as u32;
        let array_size = desc.array_size() as u32;
        let texture = create_texture(&self.device, desc, format, dimension, mip_levels);

        let base = batch.layouts.first().map_or(0, |layout| layout.offset);
        let buffer_size = (base + batch.total_bytes).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        let upload = pattern(buffer_size as usize);

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Footprint Readback Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Footprint Copy Encoder") });

        for (index, entry) in (first..).zip(batch.iter()) {
            let coordinate = decompose_subresource(index, mip_levels, array_size);
            let footprint = entry.layout.footprint;
            let copy = wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: coordinate.mip_level,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: coordinate.array_slice,
                },
                aspect: wgpu::TextureAspect::All,
            };
            let layout = wgpu::TexelCopyBufferLayout {
                offset: entry.layout.offset,
                bytes_per_row: Some(footprint.row_pitch),
                rows_per_image: Some(entry.num_rows),
            };
            // Copies of compressed mips cover whole blocks
            let extent = wgpu::Extent3d {
                width: footprint.width.next_multiple_of(block_width),
                height: footprint.height.next_multiple_of(block_height),
                depth_or_array_layers: footprint.depth,
            };

            debug!(subresource = index, mip = coordinate.mip_level, slice = coordinate.array_slice, offset = entry.layout.offset, "copying subresource");
            self.queue.write_texture(copy, &upload, layout, extent);
            encoder.copy_texture_to_buffer(copy, wgpu::TexelCopyBufferInfo { buffer: &buffer, layout }, extent);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(OracleError::Validation(error.to_string()));
        }

        let readback = read_buffer(&self.device, &buffer)?;
        for (index, entry) in (first..).zip(batch.iter()) {
            let footprint = entry.layout.footprint;
            for row in 0..entry.num_rows as u64 * footprint.depth as u64 {
                let start = (entry.layout.offset + row * footprint.row_pitch as u64) as usize;
                let end = start + entry.row_size_in_bytes as usize;
                if upload[start..end] != readback[start..end] {
                    return Err(OracleError::DataMismatch { subresource: index });
                }
            }
        }

        Ok(())
    }
}

/// Deterministic byte pattern that differs between neighboring rows and subresources
fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use copyable_footprints::PixelFormat;

    #[test]
    fn test_supported_resources() {
        let features = wgpu::Features::TEXTURE_COMPRESSION_BC;
        let rgba8 = ResourceDescription::texture_2d(PixelFormat::R8G8B8A8Unorm, 100, 100, 3).with_mip_levels(0);
        assert_eq!(unsupported_reason(&rgba8, features), None);

        let bc1 = ResourceDescription::texture_2d(PixelFormat::Bc1Unorm, 16, 16, 1).with_mip_levels(0);
        assert_eq!(unsupported_reason(&bc1, features), None);
    }

    #[test]
    fn test_unsupported_resources() {
        let none = wgpu::Features::empty();
        assert!(unsupported_reason(&ResourceDescription::buffer(1000), none).is_some());
        assert!(unsupported_reason(&ResourceDescription::texture_2d(PixelFormat::Nv12, 64, 64, 1), none).is_some());
        assert!(unsupported_reason(&ResourceDescription::texture_2d(PixelFormat::D32Float, 64, 64, 1), none).is_some());
        assert!(unsupported_reason(&ResourceDescription::texture_2d(PixelFormat::Bc1Unorm, 16, 16, 1), none).is_some());
        assert!(unsupported_reason(&ResourceDescription::texture_2d(PixelFormat::R8Unorm, 64, 64, 1).with_sample_count(4), none).is_some());
        assert!(unsupported_reason(&ResourceDescription::texture_1d(PixelFormat::R8Unorm, 64, 1).with_mip_levels(0), none).is_some());
    }

    #[test]
    fn test_partial_blocks_are_not_validated() {
        let features = wgpu::Features::TEXTURE_COMPRESSION_BC;
        let desc = ResourceDescription::texture_2d(PixelFormat::Bc1Unorm, 10, 16, 1);
        assert!(unsupported_reason(&desc, features).is_some());
    }
}
