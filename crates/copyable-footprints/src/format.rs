//! Pixel format descriptor resolution
//!
//! This module maps a [`PixelFormat`] to the byte sizing a GPU copy engine uses
//! for linear buffer layouts: bytes per texel or block, the block extent for
//! block-compressed and packed formats, and the per-plane layout of planar
//! video and depth-stencil formats.

use crate::FootprintError;

/// Pixel format identifiers with a known (or explicitly unknown) copy layout
///
/// Names follow the DXGI format naming of the layouts they describe. The
/// `*Typeless` single and dual channel formats are the per-plane formats
/// reported for the planes of planar resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PixelFormat {
    /// No format; the only valid format for buffers
    Unknown,

    R32G32B32A32Typeless,
    R32G32B32A32Float,
    R32G32B32A32Uint,
    R32G32B32A32Sint,
    R32G32B32Float,
    R32G32B32Uint,
    R16G16B16A16Float,
    R16G16B16A16Unorm,
    R16G16B16A16Uint,
    R16G16B16A16Snorm,
    R32G32Float,
    R32G32Uint,

    R10G10B10A2Unorm,
    R10G10B10A2Uint,
    R11G11B10Float,
    R8G8B8A8Typeless,
    R8G8B8A8Unorm,
    R8G8B8A8UnormSrgb,
    R8G8B8A8Uint,
    R8G8B8A8Snorm,
    R8G8B8A8Sint,
    B8G8R8A8Unorm,
    B8G8R8A8UnormSrgb,
    B8G8R8X8Unorm,
    R16G16Typeless,
    R16G16Float,
    R16G16Unorm,
    R16G16Uint,
    R32Typeless,
    R32Float,
    R32Uint,
    R32Sint,
    D32Float,
    R9G9B9E5Sharedexp,

    R8G8Typeless,
    R8G8Unorm,
    R8G8Uint,
    R8G8Snorm,
    R16Typeless,
    R16Float,
    R16Unorm,
    R16Uint,
    D16Unorm,
    B5G6R5Unorm,
    B5G5R5A1Unorm,
    B4G4R4A4Unorm,

    R8Typeless,
    R8Unorm,
    R8Uint,
    R8Snorm,
    A8Unorm,

    /// Packed 4:2:2, two texels per 32-bit block
    R8G8B8G8Unorm,
    /// Packed 4:2:2, two texels per 32-bit block
    G8R8G8B8Unorm,
    /// Packed 4:2:2 8-bit video, two texels per 32-bit block
    Yuy2,
    /// Packed 4:2:2 10-bit video, two texels per 64-bit block
    Y210,
    /// Packed 4:2:2 16-bit video, two texels per 64-bit block
    Y216,

    Bc1Unorm,
    Bc1UnormSrgb,
    Bc2Unorm,
    Bc2UnormSrgb,
    Bc3Unorm,
    Bc3UnormSrgb,
    Bc4Unorm,
    Bc4Snorm,
    Bc5Unorm,
    Bc5Snorm,
    Bc6hUf16,
    Bc6hSf16,
    Bc7Unorm,
    Bc7UnormSrgb,

    /// 4:2:0 8-bit luma plane plus interleaved chroma plane
    Nv12,
    /// 4:2:0 10-bit (in 16-bit containers) luma plus interleaved chroma
    P010,
    /// 4:2:0 16-bit luma plus interleaved chroma
    P016,
    /// Opaque 4:2:0 layout, copied as NV12
    Opaque420,
    /// 4:1:1 8-bit luma plus interleaved chroma
    Nv11,
    /// 4:2:2 8-bit luma plus interleaved chroma
    P208,
    /// Depth plane plus stencil plane
    D24UnormS8Uint,
    /// Depth plane plus stencil plane
    D32FloatS8X24Uint,
}

/// Layout of one plane of a planar format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PlaneInfo {
    /// Format reported in footprints of this plane
    pub format: PixelFormat,
    /// Bytes per texel of this plane
    pub bytes_per_texel: u32,
    /// Horizontal subsampling divisor relative to the resource width
    pub subsample_x: u32,
    /// Vertical subsampling divisor relative to the resource height
    pub subsample_y: u32,
}

impl PlaneInfo {
    const fn new(format: PixelFormat, bytes_per_texel: u32, subsample_x: u32, subsample_y: u32) -> Self {
        Self {
            format,
            bytes_per_texel,
            subsample_x,
            subsample_y,
        }
    }
}

const PLANES_420_8BIT: [PlaneInfo; 2] = [PlaneInfo::new(PixelFormat::R8Typeless, 1, 1, 1), PlaneInfo::new(PixelFormat::R8G8Typeless, 2, 2, 2)];
const PLANES_420_16BIT: [PlaneInfo; 2] = [PlaneInfo::new(PixelFormat::R16Typeless, 2, 1, 1), PlaneInfo::new(PixelFormat::R16G16Typeless, 4, 2, 2)];
const PLANES_411_8BIT: [PlaneInfo; 2] = [PlaneInfo::new(PixelFormat::R8Typeless, 1, 1, 1), PlaneInfo::new(PixelFormat::R8G8Typeless, 2, 4, 1)];
const PLANES_422_8BIT: [PlaneInfo; 2] = [PlaneInfo::new(PixelFormat::R8Typeless, 1, 1, 1), PlaneInfo::new(PixelFormat::R8G8Typeless, 2, 2, 1)];
const PLANES_DEPTH_STENCIL: [PlaneInfo; 2] = [PlaneInfo::new(PixelFormat::R32Typeless, 4, 1, 1), PlaneInfo::new(PixelFormat::R8Typeless, 1, 1, 1)];

/// Copy layout of a pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatInfo {
    /// One texel per element
    Uncompressed {
        /// Bytes per texel
        bytes_per_texel: u32,
    },
    /// Texels stored in fixed-size blocks (BC formats, packed 4:2:2)
    BlockCompressed {
        /// Block width in texels
        block_width: u32,
        /// Block height in texels
        block_height: u32,
        /// Bytes per block
        bytes_per_block: u32,
    },
    /// Several independently laid-out planes
    Planar {
        /// Plane layouts in plane-slice order
        planes: &'static [PlaneInfo],
    },
}

impl FormatInfo {
    /// Bytes per block (per texel for uncompressed formats, plane 0 for planar ones)
    pub fn bytes_per_block(&self) -> u32 {
        match self {
            Self::Uncompressed { bytes_per_texel } => *bytes_per_texel,
            Self::BlockCompressed { bytes_per_block, .. } => *bytes_per_block,
            Self::Planar { planes } => planes[0].bytes_per_texel,
        }
    }

    /// Block extent `(width, height)` in texels
    pub fn block_extent(&self) -> (u32, u32) {
        match self {
            Self::BlockCompressed { block_width, block_height, .. } => (*block_width, *block_height),
            Self::Uncompressed { .. } | Self::Planar { .. } => (1, 1),
        }
    }

    /// Number of planes
    pub fn plane_count(&self) -> u32 {
        match self {
            Self::Planar { planes } => planes.len() as u32,
            Self::Uncompressed { .. } | Self::BlockCompressed { .. } => 1,
        }
    }

    /// Layout of one plane, or `None` if the plane does not exist
    ///
    /// Non-planar formats have a single plane reported in `format` with no subsampling.
    pub fn plane(&self, format: PixelFormat, plane_slice: u32) -> Option<PlaneSizing> {
        match self {
            Self::Planar { planes } => planes.get(plane_slice as usize).map(|plane| PlaneSizing {
                format: plane.format,
                block_width: 1,
                block_height: 1,
                bytes_per_block: plane.bytes_per_texel,
                subsample_x: plane.subsample_x,
                subsample_y: plane.subsample_y,
            }),
            _ if plane_slice != 0 => None,
            _ => {
                let (block_width, block_height) = self.block_extent();
                Some(PlaneSizing {
                    format,
                    block_width,
                    block_height,
                    bytes_per_block: self.bytes_per_block(),
                    subsample_x: 1,
                    subsample_y: 1,
                })
            }
        }
    }
}

/// Uniform sizing of a single plane
///
/// Every format category collapses into this shape, so the packer applies
/// one rule regardless of whether the plane came from an uncompressed,
/// block-compressed or planar format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneSizing {
    /// Format reported in the plane's footprint
    pub format: PixelFormat,
    /// Block width in texels
    pub block_width: u32,
    /// Block height in texels
    pub block_height: u32,
    /// Bytes per block
    pub bytes_per_block: u32,
    /// Horizontal subsampling divisor
    pub subsample_x: u32,
    /// Vertical subsampling divisor
    pub subsample_y: u32,
}

impl PlaneSizing {
    /// Plane dimensions for a mip-reduced `(width, height)` of the resource
    ///
    /// A partially covered chroma pair still occupies a full chroma sample.
    pub fn plane_extent(&self, width: u32, height: u32) -> (u32, u32) {
        (width.div_ceil(self.subsample_x).max(1), height.div_ceil(self.subsample_y).max(1))
    }

    /// Number of block rows covering `height` texels
    pub fn block_rows(&self, height: u32) -> u32 {
        height.div_ceil(self.block_height).max(1)
    }

    /// Unpadded byte size of one block row covering `width` texels
    pub fn row_size(&self, width: u32) -> Result<u64, FootprintError> {
        let block_columns = width.div_ceil(self.block_width).max(1) as u64;
        block_columns.checked_mul(self.bytes_per_block as u64).ok_or(FootprintError::overflow("row size"))
    }
}

impl PixelFormat {
    /// Resolves the copy layout of this format
    ///
    /// # Errors
    /// Returns [`FootprintError::UnsupportedFormat`] for [`PixelFormat::Unknown`].
    pub fn info(self) -> Result<FormatInfo, FootprintError> {
        use PixelFormat::*;

        let uncompressed = |bytes_per_texel| FormatInfo::Uncompressed { bytes_per_texel };
        let block = |block_width, block_height, bytes_per_block| FormatInfo::BlockCompressed {
            block_width,
            block_height,
            bytes_per_block,
        };

        Ok(match self {
            Unknown => return Err(FootprintError::UnsupportedFormat { format: self }),

            R32G32B32A32Typeless | R32G32B32A32Float | R32G32B32A32Uint | R32G32B32A32Sint => uncompressed(16),
            R32G32B32Float | R32G32B32Uint => uncompressed(12),
            R16G16B16A16Float | R16G16B16A16Unorm | R16G16B16A16Uint | R16G16B16A16Snorm | R32G32Float | R32G32Uint => uncompressed(8),

            R10G10B10A2Unorm | R10G10B10A2Uint | R11G11B10Float | R8G8B8A8Typeless | R8G8B8A8Unorm | R8G8B8A8UnormSrgb | R8G8B8A8Uint | R8G8B8A8Snorm | R8G8B8A8Sint | B8G8R8A8Unorm
            | B8G8R8A8UnormSrgb | B8G8R8X8Unorm | R16G16Typeless | R16G16Float | R16G16Unorm | R16G16Uint | R32Typeless | R32Float | R32Uint | R32Sint | D32Float | R9G9B9E5Sharedexp => {
                uncompressed(4)
            }

            R8G8Typeless | R8G8Unorm | R8G8Uint | R8G8Snorm | R16Typeless | R16Float | R16Unorm | R16Uint | D16Unorm | B5G6R5Unorm | B5G5R5A1Unorm | B4G4R4A4Unorm => uncompressed(2),

            R8Typeless | R8Unorm | R8Uint | R8Snorm | A8Unorm => uncompressed(1),

            R8G8B8G8Unorm | G8R8G8B8Unorm | Yuy2 => block(2, 1, 4),
            Y210 | Y216 => block(2, 1, 8),

            Bc1Unorm | Bc1UnormSrgb | Bc4Unorm | Bc4Snorm => block(4, 4, 8),
            Bc2Unorm | Bc2UnormSrgb | Bc3Unorm | Bc3UnormSrgb | Bc5Unorm | Bc5Snorm | Bc6hUf16 | Bc6hSf16 | Bc7Unorm | Bc7UnormSrgb => block(4, 4, 16),

            Nv12 | Opaque420 => FormatInfo::Planar { planes: &PLANES_420_8BIT },
            P010 | P016 => FormatInfo::Planar { planes: &PLANES_420_16BIT },
            Nv11 => FormatInfo::Planar { planes: &PLANES_411_8BIT },
            P208 => FormatInfo::Planar { planes: &PLANES_422_8BIT },
            D24UnormS8Uint | D32FloatS8X24Uint => FormatInfo::Planar { planes: &PLANES_DEPTH_STENCIL },
        })
    }

    /// Sizing of one plane of this format
    ///
    /// # Errors
    /// [`FootprintError::UnsupportedFormat`] if the format has no layout, and
    /// [`FootprintError::InvalidPlane`] if `plane_slice` is past the last plane.
    pub fn plane_sizing(self, plane_slice: u32) -> Result<PlaneSizing, FootprintError> {
        self.info()?.plane(self, plane_slice).ok_or(FootprintError::InvalidPlane { format: self, plane: plane_slice })
    }

    /// Format reported for one plane, or `None` if the plane does not exist
    pub fn plane_format(self, plane_slice: u32) -> Option<PixelFormat> {
        self.plane_sizing(plane_slice).ok().map(|sizing| sizing.format)
    }

    /// Number of planes, or 0 if the format has no copyable layout
    pub fn plane_count(self) -> u32 {
        self.info().map_or(0, |info| info.plane_count())
    }

    /// Whether texels are stored in 4x4 compressed blocks
    pub fn is_block_compressed(self) -> bool {
        use PixelFormat::*;
        matches!(
            self,
            Bc1Unorm | Bc1UnormSrgb | Bc2Unorm | Bc2UnormSrgb | Bc3Unorm | Bc3UnormSrgb | Bc4Unorm | Bc4Snorm | Bc5Unorm | Bc5Snorm | Bc6hUf16 | Bc6hSf16 | Bc7Unorm | Bc7UnormSrgb
        )
    }

    /// Whether the format has more than one plane
    pub fn is_planar(self) -> bool {
        self.plane_count() > 1
    }

    /// Whether the format carries depth or stencil data
    pub fn is_depth_stencil(self) -> bool {
        matches!(self, Self::D16Unorm | Self::D32Float | Self::D24UnormS8Uint | Self::D32FloatS8X24Uint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncompressed_bytes_per_texel() {
        assert_eq!(PixelFormat::R8G8B8A8Unorm.info(), Ok(FormatInfo::Uncompressed { bytes_per_texel: 4 }));
        assert_eq!(PixelFormat::R32G32B32A32Float.info().unwrap().bytes_per_block(), 16);
        assert_eq!(PixelFormat::R32G32B32Float.info().unwrap().bytes_per_block(), 12);
        assert_eq!(PixelFormat::R16G16B16A16Float.info().unwrap().bytes_per_block(), 8);
        assert_eq!(PixelFormat::B5G6R5Unorm.info().unwrap().bytes_per_block(), 2);
        assert_eq!(PixelFormat::A8Unorm.info().unwrap().bytes_per_block(), 1);
        assert_eq!(PixelFormat::R8G8B8A8Unorm.info().unwrap().block_extent(), (1, 1));
    }

    #[test]
    fn test_block_compressed_layouts() {
        for format in [PixelFormat::Bc1Unorm, PixelFormat::Bc1UnormSrgb, PixelFormat::Bc4Unorm, PixelFormat::Bc4Snorm] {
            let info = format.info().unwrap();
            assert_eq!(info.block_extent(), (4, 4), "{format:?}");
            assert_eq!(info.bytes_per_block(), 8, "{format:?}");
            assert!(format.is_block_compressed());
        }

        for format in [PixelFormat::Bc2Unorm, PixelFormat::Bc3Unorm, PixelFormat::Bc5Snorm, PixelFormat::Bc6hUf16, PixelFormat::Bc7UnormSrgb] {
            let info = format.info().unwrap();
            assert_eq!(info.block_extent(), (4, 4), "{format:?}");
            assert_eq!(info.bytes_per_block(), 16, "{format:?}");
        }
    }

    #[test]
    fn test_packed_422_formats_use_two_by_one_blocks() {
        assert_eq!(PixelFormat::Yuy2.info().unwrap().block_extent(), (2, 1));
        assert_eq!(PixelFormat::Yuy2.info().unwrap().bytes_per_block(), 4);
        assert_eq!(PixelFormat::Y216.info().unwrap().bytes_per_block(), 8);
        assert!(!PixelFormat::Yuy2.is_block_compressed());
    }

    #[test]
    fn test_nv12_planes() {
        let info = PixelFormat::Nv12.info().unwrap();
        assert_eq!(info.plane_count(), 2);

        let luma = PixelFormat::Nv12.plane_sizing(0).unwrap();
        assert_eq!(luma.format, PixelFormat::R8Typeless);
        assert_eq!(luma.bytes_per_block, 1);
        assert_eq!((luma.subsample_x, luma.subsample_y), (1, 1));

        let chroma = PixelFormat::Nv12.plane_sizing(1).unwrap();
        assert_eq!(chroma.format, PixelFormat::R8G8Typeless);
        assert_eq!(chroma.bytes_per_block, 2);
        assert_eq!(chroma.plane_extent(100, 100), (50, 50));
    }

    #[test]
    fn test_chroma_extent_rounds_up_and_never_reaches_zero() {
        let chroma = PixelFormat::P010.plane_sizing(1).unwrap();
        assert_eq!(chroma.bytes_per_block, 4);
        assert_eq!(chroma.plane_extent(25, 25), (13, 13));
        assert_eq!(chroma.plane_extent(1, 1), (1, 1));

        let nv11_chroma = PixelFormat::Nv11.plane_sizing(1).unwrap();
        assert_eq!(nv11_chroma.plane_extent(100, 100), (25, 100));
    }

    #[test]
    fn test_depth_stencil_planes() {
        assert_eq!(PixelFormat::D24UnormS8Uint.plane_count(), 2);
        assert_eq!(PixelFormat::D24UnormS8Uint.plane_format(0), Some(PixelFormat::R32Typeless));
        assert_eq!(PixelFormat::D24UnormS8Uint.plane_format(1), Some(PixelFormat::R8Typeless));
        assert!(PixelFormat::D24UnormS8Uint.is_depth_stencil());
        assert!(PixelFormat::D24UnormS8Uint.is_planar());
        assert!(!PixelFormat::D32Float.is_planar());
    }

    #[test]
    fn test_non_planar_format_reports_itself_for_plane_zero() {
        let sizing = PixelFormat::Bc3Unorm.plane_sizing(0).unwrap();
        assert_eq!(sizing.format, PixelFormat::Bc3Unorm);
        assert_eq!((sizing.block_width, sizing.block_height, sizing.bytes_per_block), (4, 4, 16));
        assert_eq!(
            PixelFormat::Bc3Unorm.plane_sizing(1),
            Err(FootprintError::InvalidPlane {
                format: PixelFormat::Bc3Unorm,
                plane: 1
            })
        );
    }

    #[test]
    fn test_unknown_format_is_unsupported() {
        assert_eq!(PixelFormat::Unknown.info(), Err(FootprintError::UnsupportedFormat { format: PixelFormat::Unknown }));
        assert_eq!(PixelFormat::Unknown.plane_count(), 0);
        assert_eq!(PixelFormat::Unknown.plane_format(0), None);
    }

    #[test]
    fn test_block_rows_and_row_size() {
        let bc1 = PixelFormat::Bc1Unorm.plane_sizing(0).unwrap();
        assert_eq!(bc1.block_rows(16), 4);
        assert_eq!(bc1.block_rows(2), 1);
        assert_eq!(bc1.row_size(16), Ok(32));
        assert_eq!(bc1.row_size(5), Ok(16));

        let rgba = PixelFormat::R8G8B8A8Unorm.plane_sizing(0).unwrap();
        assert_eq!(rgba.block_rows(100), 100);
        assert_eq!(rgba.row_size(100), Ok(400));
    }
}
