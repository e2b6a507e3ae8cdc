//! wgpu utility functions for footprint verification
//!
//! This module maps pixel formats onto wgpu texture formats and provides the
//! texture creation and buffer readback helpers used by the device validator.

use copyable_footprints::{PixelFormat, ResourceDescription, ResourceDimension};

/// Texture usage flags for copy round-trip textures
pub const TEXTURE_USAGE_COPY: wgpu::TextureUsages = wgpu::TextureUsages::COPY_SRC.union(wgpu::TextureUsages::COPY_DST);

/// Maps a pixel format onto the wgpu texture format with the same copy layout
///
/// Typeless formats map onto the unsigned integer format of the same size.
/// Returns `None` for formats wgpu cannot represent.
pub fn wgpu_format(format: PixelFormat) -> Option<wgpu::TextureFormat> {
    use PixelFormat::*;
    use wgpu::TextureFormat as F;

    Some(match format {
        R32G32B32A32Typeless | R32G32B32A32Uint => F::Rgba32Uint,
        R32G32B32A32Float => F::Rgba32Float,
        R32G32B32A32Sint => F::Rgba32Sint,
        R16G16B16A16Float => F::Rgba16Float,
        R16G16B16A16Unorm => F::Rgba16Unorm,
        R16G16B16A16Uint => F::Rgba16Uint,
        R16G16B16A16Snorm => F::Rgba16Snorm,
        R32G32Float => F::Rg32Float,
        R32G32Uint => F::Rg32Uint,
        R10G10B10A2Unorm => F::Rgb10a2Unorm,
        R10G10B10A2Uint => F::Rgb10a2Uint,
        R11G11B10Float => F::Rg11b10Ufloat,
        R8G8B8A8Typeless | R8G8B8A8Uint => F::Rgba8Uint,
        R8G8B8A8Unorm => F::Rgba8Unorm,
        R8G8B8A8UnormSrgb => F::Rgba8UnormSrgb,
        R8G8B8A8Snorm => F::Rgba8Snorm,
        R8G8B8A8Sint => F::Rgba8Sint,
        B8G8R8A8Unorm | B8G8R8X8Unorm => F::Bgra8Unorm,
        B8G8R8A8UnormSrgb => F::Bgra8UnormSrgb,
        R16G16Typeless | R16G16Uint => F::Rg16Uint,
        R16G16Float => F::Rg16Float,
        R16G16Unorm => F::Rg16Unorm,
        R32Typeless | R32Uint => F::R32Uint,
        R32Float => F::R32Float,
        R32Sint => F::R32Sint,
        D32Float => F::Depth32Float,
        R9G9B9E5Sharedexp => F::Rgb9e5Ufloat,
        R8G8Typeless | R8G8Uint => F::Rg8Uint,
        R8G8Unorm => F::Rg8Unorm,
        R8G8Snorm => F::Rg8Snorm,
        R16Typeless | R16Uint => F::R16Uint,
        R16Float => F::R16Float,
        R16Unorm => F::R16Unorm,
        D16Unorm => F::Depth16Unorm,
        R8Typeless | R8Uint => F::R8Uint,
        R8Unorm => F::R8Unorm,
        R8Snorm => F::R8Snorm,
        Bc1Unorm => F::Bc1RgbaUnorm,
        Bc1UnormSrgb => F::Bc1RgbaUnormSrgb,
        Bc2Unorm => F::Bc2RgbaUnorm,
        Bc2UnormSrgb => F::Bc2RgbaUnormSrgb,
        Bc3Unorm => F::Bc3RgbaUnorm,
        Bc3UnormSrgb => F::Bc3RgbaUnormSrgb,
        Bc4Unorm => F::Bc4RUnorm,
        Bc4Snorm => F::Bc4RSnorm,
        Bc5Unorm => F::Bc5RgUnorm,
        Bc5Snorm => F::Bc5RgSnorm,
        Bc6hUf16 => F::Bc6hRgbUfloat,
        Bc6hSf16 => F::Bc6hRgbFloat,
        Bc7Unorm => F::Bc7RgbaUnorm,
        Bc7UnormSrgb => F::Bc7RgbaUnormSrgb,
        Nv12 => F::NV12,
        D24UnormS8Uint => F::Depth24PlusStencil8,
        D32FloatS8X24Uint => F::Depth32FloatStencil8,
        Unknown | R32G32B32Float | R32G32B32Uint | B5G6R5Unorm | B5G5R5A1Unorm | B4G4R4A4Unorm | A8Unorm | R8G8B8G8Unorm | G8R8G8B8Unorm | Yuy2 | Y210 | Y216 | P010 | P016 | Opaque420 | Nv11
        | P208 => return None,
    })
}

/// Texture aspects addressed by each plane slice, paired with the format reported for that plane
pub fn plane_aspects(format: PixelFormat) -> Vec<(wgpu::TextureAspect, PixelFormat)> {
    match format {
        PixelFormat::Nv12 => vec![(wgpu::TextureAspect::Plane0, PixelFormat::R8Typeless), (wgpu::TextureAspect::Plane1, PixelFormat::R8G8Typeless)],
        PixelFormat::D24UnormS8Uint | PixelFormat::D32FloatS8X24Uint => {
            vec![(wgpu::TextureAspect::DepthOnly, PixelFormat::R32Typeless), (wgpu::TextureAspect::StencilOnly, PixelFormat::R8Typeless)]
        }
        _ => vec![(wgpu::TextureAspect::All, format)],
    }
}

/// Converts a resource dimension to a wgpu texture dimension; `None` for buffers
pub fn texture_dimension(dimension: ResourceDimension) -> Option<wgpu::TextureDimension> {
    match dimension {
        ResourceDimension::Buffer => None,
        ResourceDimension::Texture1D => Some(wgpu::TextureDimension::D1),
        ResourceDimension::Texture2D => Some(wgpu::TextureDimension::D2),
        ResourceDimension::Texture3D => Some(wgpu::TextureDimension::D3),
    }
}

/// Full mip chain length for a texture of the given mip 0 size
pub fn full_mip_chain(size: wgpu::Extent3d, dimension: wgpu::TextureDimension) -> u32 {
    let largest = match dimension {
        wgpu::TextureDimension::D1 => size.width,
        wgpu::TextureDimension::D2 => size.width.max(size.height),
        wgpu::TextureDimension::D3 => size.width.max(size.height).max(size.depth_or_array_layers),
    };
    32 - largest.leading_zeros()
}

/// Creates a texture matching a resource description
///
/// # Arguments
/// * `device` - The wgpu device to create the texture on
/// * `desc` - The resource to mirror; must be a texture
/// * `format` - The wgpu format standing in for `desc.format`
/// * `dimension` - The wgpu dimension of `desc`
/// * `mip_level_count` - Resolved mip level count
///
/// # Returns
/// A texture usable as copy source and destination
pub fn create_texture(device: &wgpu::Device, desc: &ResourceDescription, format: wgpu::TextureFormat, dimension: wgpu::TextureDimension, mip_level_count: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Footprint Texture"),
        size: wgpu::Extent3d {
            width: desc.width as u32,
            height: desc.effective_height(),
            depth_or_array_layers: desc.depth_or_array_size as u32,
        },
        mip_level_count,
        sample_count: desc.sample_count,
        dimension,
        format,
        usage: TEXTURE_USAGE_COPY,
        view_formats: &[],
    })
}

/// Reads back the full contents of a mappable buffer
///
/// # Arguments
/// * `device` - The wgpu device that owns the buffer
/// * `buffer` - A buffer created with `MAP_READ` usage
///
/// # Returns
/// The buffer bytes
pub fn read_buffer(device: &wgpu::Device, buffer: &wgpu::Buffer) -> Result<Vec<u8>, crate::OracleError> {
    let buffer_slice = buffer.slice(..);
    let (sender, receiver) = futures_intrusive::channel::shared::oneshot_channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        // The receiver only goes away if the caller stopped waiting
        let _ = sender.send(result);
    });

    device.poll(wgpu::PollType::Wait)?;
    match pollster::block_on(receiver.receive()) {
        Some(result) => result?,
        None => return Err(crate::OracleError::Validation("buffer mapping was abandoned".to_string())),
    }

    let data = buffer_slice.get_mapped_range().to_vec();
    buffer.unmap();
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mapping_preserves_block_size() {
        for (format, bytes) in [(PixelFormat::R8G8B8A8Typeless, 4), (PixelFormat::R16G16B16A16Float, 8), (PixelFormat::R8Unorm, 1), (PixelFormat::Bc1Unorm, 8), (PixelFormat::Bc7Unorm, 16)] {
            let mapped = wgpu_format(format).unwrap();
            assert_eq!(mapped.block_copy_size(None), Some(bytes), "{format:?}");
        }
    }

    #[test]
    fn test_unrepresentable_formats() {
        assert_eq!(wgpu_format(PixelFormat::Unknown), None);
        assert_eq!(wgpu_format(PixelFormat::Yuy2), None);
        assert_eq!(wgpu_format(PixelFormat::P010), None);
    }

    #[test]
    fn test_plane_aspects() {
        assert_eq!(plane_aspects(PixelFormat::R8Unorm), vec![(wgpu::TextureAspect::All, PixelFormat::R8Unorm)]);
        assert_eq!(plane_aspects(PixelFormat::Nv12).len(), 2);
        assert_eq!(plane_aspects(PixelFormat::D32FloatS8X24Uint)[1], (wgpu::TextureAspect::StencilOnly, PixelFormat::R8Typeless));
    }

    #[test]
    fn test_full_mip_chain() {
        let size = wgpu::Extent3d {
            width: 100,
            height: 100,
            depth_or_array_layers: 6,
        };
        assert_eq!(full_mip_chain(size, wgpu::TextureDimension::D2), 7);
        assert_eq!(full_mip_chain(size, wgpu::TextureDimension::D1), 7);

        let volume = wgpu::Extent3d {
            width: 4,
            height: 4,
            depth_or_array_layers: 256,
        };
        assert_eq!(full_mip_chain(volume, wgpu::TextureDimension::D3), 9);
    }
}
