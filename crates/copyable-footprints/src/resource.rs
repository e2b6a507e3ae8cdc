//! Resource descriptions
//!
//! A [`ResourceDescription`] is the immutable input to every footprint query.
//! It mirrors the fields of a GPU resource descriptor that influence linear
//! copy layouts and nothing else.

use crate::{FootprintError, PixelFormat};

/// Dimensionality of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ResourceDimension {
    /// Untyped linear memory
    Buffer,
    /// One-dimensional texture or texture array
    Texture1D,
    /// Two-dimensional texture or texture array
    Texture2D,
    /// Volume texture
    Texture3D,
}

/// Texel layout of the resource in GPU memory
///
/// Informative only: copyable footprints are row-major regardless of how the
/// resource itself is swizzled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TextureLayout {
    /// Driver-chosen layout
    #[default]
    Unknown,
    /// Row-major linear layout
    RowMajor,
}

/// Description of a buffer or texture resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceDescription {
    /// Resource dimensionality
    pub dimension: ResourceDimension,
    /// Width in texels, or size in bytes for buffers
    pub width: u64,
    /// Height in texels (ignored for 1D textures)
    pub height: u32,
    /// Array size for 1D/2D textures, depth for 3D textures
    pub depth_or_array_size: u16,
    /// Mip level count; 0 means the full chain down to 1x1
    pub mip_levels: u16,
    /// Pixel format
    pub format: PixelFormat,
    /// Samples per texel
    pub sample_count: u32,
    /// Texel layout hint
    #[cfg_attr(feature = "serde", serde(default))]
    pub layout: TextureLayout,
}

impl ResourceDescription {
    /// Describes a buffer of `size` bytes
    pub fn buffer(size: u64) -> Self {
        Self {
            dimension: ResourceDimension::Buffer,
            width: size,
            height: 1,
            depth_or_array_size: 1,
            mip_levels: 1,
            format: PixelFormat::Unknown,
            sample_count: 1,
            layout: TextureLayout::RowMajor,
        }
    }

    /// Describes a single-mip 1D texture array
    pub fn texture_1d(format: PixelFormat, width: u64, array_size: u16) -> Self {
        Self {
            dimension: ResourceDimension::Texture1D,
            width,
            height: 1,
            depth_or_array_size: array_size,
            mip_levels: 1,
            format,
            sample_count: 1,
            layout: TextureLayout::Unknown,
        }
    }

    /// Describes a single-mip 2D texture array
    pub fn texture_2d(format: PixelFormat, width: u64, height: u32, array_size: u16) -> Self {
        Self {
            dimension: ResourceDimension::Texture2D,
            height,
            ..Self::texture_1d(format, width, array_size)
        }
    }

    /// Describes a single-mip volume texture
    pub fn texture_3d(format: PixelFormat, width: u64, height: u32, depth: u16) -> Self {
        Self {
            dimension: ResourceDimension::Texture3D,
            ..Self::texture_2d(format, width, height, depth)
        }
    }

    /// Sets the mip level count (0 for the full chain)
    pub fn with_mip_levels(mut self, mip_levels: u16) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    /// Sets the sample count
    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Sets the texel layout hint
    pub fn with_layout(mut self, layout: TextureLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Number of array slices (always 1 for buffers and volume textures)
    pub fn array_size(&self) -> u16 {
        match self.dimension {
            ResourceDimension::Texture1D | ResourceDimension::Texture2D => self.depth_or_array_size,
            ResourceDimension::Buffer | ResourceDimension::Texture3D => 1,
        }
    }

    /// Effective height of mip 0 (1 for buffers and 1D textures)
    pub fn effective_height(&self) -> u32 {
        match self.dimension {
            ResourceDimension::Texture2D | ResourceDimension::Texture3D => self.height,
            ResourceDimension::Buffer | ResourceDimension::Texture1D => 1,
        }
    }

    /// Depth of mip 0 (1 for everything except volume textures)
    pub fn depth(&self) -> u16 {
        match self.dimension {
            ResourceDimension::Texture3D => self.depth_or_array_size,
            _ => 1,
        }
    }

    /// Length of the full mip chain, `floor(log2(max dimension)) + 1`
    pub fn max_mip_levels(&self) -> u16 {
        if self.dimension == ResourceDimension::Buffer {
            return 1;
        }
        let largest = self.width.max(self.effective_height() as u64).max(self.depth() as u64).max(1);
        (u64::BITS - largest.leading_zeros()) as u16
    }

    /// Effective mip level count, resolving 0 to the full chain
    pub fn mip_level_count(&self) -> u16 {
        match self.mip_levels {
            0 => self.max_mip_levels(),
            n => n,
        }
    }

    /// Number of planes (always 1 for buffers, 0 for unsupported formats)
    pub fn plane_count(&self) -> u32 {
        match self.dimension {
            ResourceDimension::Buffer => 1,
            _ => self.format.plane_count(),
        }
    }

    /// Total number of subresources: mips x array slices x planes
    pub fn subresource_count(&self) -> Result<u32, FootprintError> {
        (self.mip_level_count() as u32)
            .checked_mul(self.array_size() as u32)
            .and_then(|n| n.checked_mul(self.plane_count()))
            .ok_or(FootprintError::overflow("subresource count"))
    }

    /// Mip-reduced `(width, height, depth)` of a mip level, each at least 1
    ///
    /// Reduction is independent of the format's block size.
    pub fn mip_extent(&self, mip_level: u32) -> (u64, u32, u32) {
        (
            mip_reduce(self.width, mip_level),
            mip_reduce(self.effective_height() as u64, mip_level) as u32,
            mip_reduce(self.depth() as u64, mip_level) as u32,
        )
    }

    /// Checks that this description names a resource that can have copyable footprints
    ///
    /// # Errors
    /// [`FootprintError::InvalidResource`] describing the first violated rule, or
    /// [`FootprintError::UnsupportedFormat`] if a texture's format has no layout.
    pub fn validate(&self) -> Result<(), FootprintError> {
        let invalid = |reason| Err(FootprintError::InvalidResource { reason });

        if self.width == 0 {
            return invalid("width must be at least 1");
        }
        if self.sample_count == 0 {
            return invalid("sample count must be at least 1");
        }

        if self.dimension == ResourceDimension::Buffer {
            if self.format != PixelFormat::Unknown {
                return invalid("buffers must use the unknown format");
            }
            if self.height != 1 || self.depth_or_array_size != 1 {
                return invalid("buffers must have height and depth of 1");
            }
            if self.mip_levels > 1 || self.sample_count != 1 {
                return invalid("buffers have exactly one mip level and one sample");
            }
            return Ok(());
        }

        self.format.info()?;

        if self.width > u32::MAX as u64 {
            return invalid("texture width must fit in 32 bits");
        }
        if self.effective_height() == 0 {
            return invalid("height must be at least 1");
        }
        if self.depth_or_array_size == 0 {
            return invalid("depth or array size must be at least 1");
        }
        if self.mip_levels > self.max_mip_levels() {
            return invalid("mip level count exceeds the full mip chain");
        }
        if self.sample_count > 1 && self.dimension != ResourceDimension::Texture2D {
            return invalid("only 2D textures can be multisampled");
        }

        Ok(())
    }
}

fn mip_reduce(dimension: u64, mip_level: u32) -> u64 {
    dimension.checked_shr(mip_level).unwrap_or(0).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_chain_mip_count() {
        let desc = ResourceDescription::texture_2d(PixelFormat::R8G8B8A8Unorm, 100, 100, 1).with_mip_levels(0);
        assert_eq!(desc.max_mip_levels(), 7);
        assert_eq!(desc.mip_level_count(), 7);

        let explicit = desc.with_mip_levels(3);
        assert_eq!(explicit.mip_level_count(), 3);
    }

    #[test]
    fn test_full_chain_uses_largest_axis() {
        assert_eq!(ResourceDescription::texture_2d(PixelFormat::R8Unorm, 1, 1024, 1).max_mip_levels(), 11);
        assert_eq!(ResourceDescription::texture_2d(PixelFormat::R8Unorm, 1, 1, 1).max_mip_levels(), 1);
        // Array size is not a spatial dimension
        assert_eq!(ResourceDescription::texture_2d(PixelFormat::R8Unorm, 4, 4, 256).max_mip_levels(), 3);
        // Depth is
        assert_eq!(ResourceDescription::texture_3d(PixelFormat::R8Unorm, 4, 4, 256).max_mip_levels(), 9);
    }

    #[test]
    fn test_one_dimensional_texture_ignores_height() {
        let mut desc = ResourceDescription::texture_1d(PixelFormat::R32Float, 1000, 3).with_mip_levels(0);
        desc.height = 4096;
        assert_eq!(desc.effective_height(), 1);
        assert_eq!(desc.max_mip_levels(), 10);
        assert_eq!(desc.mip_extent(2), (250, 1, 1));
        assert_eq!(desc.array_size(), 3);
    }

    #[test]
    fn test_volume_texture_has_no_array_dimension() {
        let desc = ResourceDescription::texture_3d(PixelFormat::R8G8B8A8Unorm, 64, 64, 8);
        assert_eq!(desc.array_size(), 1);
        assert_eq!(desc.depth(), 8);
        assert_eq!(desc.mip_extent(1), (32, 32, 4));
        assert_eq!(desc.mip_extent(5), (2, 2, 1));
    }

    #[test]
    fn test_mip_extent_clamps_to_one() {
        let desc = ResourceDescription::texture_2d(PixelFormat::Bc1Unorm, 16, 8, 1);
        assert_eq!(desc.mip_extent(4), (1, 1, 1));
        assert_eq!(desc.mip_extent(200), (1, 1, 1));
    }

    #[test]
    fn test_subresource_count_includes_planes() {
        let rgba = ResourceDescription::texture_2d(PixelFormat::R8G8B8A8Unorm, 100, 100, 5).with_mip_levels(0);
        assert_eq!(rgba.subresource_count(), Ok(35));

        let nv12 = ResourceDescription::texture_2d(PixelFormat::Nv12, 100, 100, 2);
        assert_eq!(nv12.subresource_count(), Ok(4));

        assert_eq!(ResourceDescription::buffer(4096).subresource_count(), Ok(1));
    }

    #[test]
    fn test_validate_accepts_common_resources() {
        assert_eq!(ResourceDescription::texture_2d(PixelFormat::R8G8B8A8Unorm, 100, 100, 1).validate(), Ok(()));
        assert_eq!(ResourceDescription::texture_2d(PixelFormat::R8G8B8A8Unorm, 100, 100, 1).with_sample_count(4).validate(), Ok(()));
        assert_eq!(ResourceDescription::texture_3d(PixelFormat::Bc7Unorm, 64, 64, 64).with_mip_levels(0).validate(), Ok(()));
        assert_eq!(ResourceDescription::buffer(65536).validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_invalid_resources() {
        let rgba = ResourceDescription::texture_2d(PixelFormat::R8G8B8A8Unorm, 100, 100, 1);

        assert!(matches!(ResourceDescription { width: 0, ..rgba }.validate(), Err(FootprintError::InvalidResource { .. })));
        assert!(matches!(ResourceDescription { height: 0, ..rgba }.validate(), Err(FootprintError::InvalidResource { .. })));
        assert!(matches!(ResourceDescription { depth_or_array_size: 0, ..rgba }.validate(), Err(FootprintError::InvalidResource { .. })));
        assert!(matches!(rgba.with_mip_levels(8).validate(), Err(FootprintError::InvalidResource { .. })));
        assert!(matches!(rgba.with_sample_count(0).validate(), Err(FootprintError::InvalidResource { .. })));
        assert!(matches!(
            ResourceDescription::texture_3d(PixelFormat::R8Unorm, 4, 4, 4).with_sample_count(4).validate(),
            Err(FootprintError::InvalidResource { .. })
        ));
        assert_eq!(
            ResourceDescription { format: PixelFormat::Unknown, ..rgba }.validate(),
            Err(FootprintError::UnsupportedFormat { format: PixelFormat::Unknown })
        );
        assert!(matches!(
            ResourceDescription {
                format: PixelFormat::R8Unorm,
                ..ResourceDescription::buffer(16)
            }
            .validate(),
            Err(FootprintError::InvalidResource { .. })
        ));
    }
}
