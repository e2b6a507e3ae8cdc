//! Subresource indexing
//!
//! Subresources are numbered with the mip level varying fastest, then the
//! array slice, then the plane:
//! `index = plane * (mip_levels * array_size) + array_slice * mip_levels + mip_level`.

use crate::{FootprintError, ResourceDescription};

/// One addressable `(mip level, array slice, plane)` unit of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubresourceCoordinate {
    pub mip_level: u32,
    pub array_slice: u32,
    pub plane_slice: u32,
}

/// Computes the linear subresource index of a coordinate
///
/// Wraps on overflow; indices of a validated description never do.
pub fn calc_subresource(mip_level: u32, array_slice: u32, plane_slice: u32, mip_levels: u32, array_size: u32) -> u32 {
    mip_level
        .wrapping_add(array_slice.wrapping_mul(mip_levels))
        .wrapping_add(plane_slice.wrapping_mul(mip_levels).wrapping_mul(array_size))
}

/// Decodes a linear subresource index into its coordinate
///
/// # Panics
/// If `mip_levels` or `array_size` is zero.
pub fn decompose_subresource(subresource: u32, mip_levels: u32, array_size: u32) -> SubresourceCoordinate {
    let per_plane = mip_levels * array_size;
    SubresourceCoordinate {
        mip_level: subresource % mip_levels,
        array_slice: (subresource % per_plane) / mip_levels,
        plane_slice: subresource / per_plane,
    }
}

/// Expands a contiguous subresource range into coordinates, in index order
///
/// Validates `desc` first and resolves a mip count of 0 to the full chain.
///
/// # Errors
/// Anything [`ResourceDescription::validate`] reports, and
/// [`FootprintError::Range`] if `count` is zero or `first + count` exceeds the
/// resource's subresource count.
pub fn expand(desc: &ResourceDescription, first: u32, count: u32) -> Result<Vec<SubresourceCoordinate>, FootprintError> {
    desc.validate()?;

    let total = desc.subresource_count()?;
    let in_range = first.checked_add(count).is_some_and(|end| end <= total);
    if count == 0 || !in_range {
        return Err(FootprintError::Range { first, count, total });
    }

    let mip_levels = desc.mip_level_count() as u32;
    let array_size = desc.array_size() as u32;
    Ok((first..first + count).map(|index| decompose_subresource(index, mip_levels, array_size)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelFormat;

    fn coordinate(mip_level: u32, array_slice: u32, plane_slice: u32) -> SubresourceCoordinate {
        SubresourceCoordinate {
            mip_level,
            array_slice,
            plane_slice,
        }
    }

    #[test]
    fn test_calc_and_decompose_agree() {
        let (mip_levels, array_size) = (7, 5);
        for index in 0..(mip_levels * array_size * 2) {
            let c = decompose_subresource(index, mip_levels, array_size);
            assert!(c.mip_level < mip_levels && c.array_slice < array_size && c.plane_slice < 2);
            assert_eq!(calc_subresource(c.mip_level, c.array_slice, c.plane_slice, mip_levels, array_size), index);
        }
    }

    #[test]
    fn test_mip_varies_fastest_then_slice_then_plane() {
        assert_eq!(decompose_subresource(0, 3, 2), coordinate(0, 0, 0));
        assert_eq!(decompose_subresource(2, 3, 2), coordinate(2, 0, 0));
        assert_eq!(decompose_subresource(3, 3, 2), coordinate(0, 1, 0));
        assert_eq!(decompose_subresource(5, 3, 2), coordinate(2, 1, 0));
        assert_eq!(decompose_subresource(6, 3, 2), coordinate(0, 0, 1));
        assert_eq!(decompose_subresource(11, 3, 2), coordinate(2, 1, 1));
    }

    #[test]
    fn test_expand_full_mip_chain() {
        let desc = ResourceDescription::texture_2d(PixelFormat::R8G8B8A8Unorm, 100, 100, 1).with_mip_levels(0);
        let coordinates = expand(&desc, 0, 7).unwrap();
        assert_eq!(coordinates.len(), 7);
        for (mip, c) in coordinates.iter().enumerate() {
            assert_eq!(*c, coordinate(mip as u32, 0, 0));
        }
    }

    #[test]
    fn test_expand_partial_range_of_planar_array() {
        let desc = ResourceDescription::texture_2d(PixelFormat::Nv12, 64, 64, 3);
        let coordinates = expand(&desc, 2, 3).unwrap();
        assert_eq!(coordinates, vec![coordinate(0, 2, 0), coordinate(0, 0, 1), coordinate(0, 1, 1)]);
    }

    #[test]
    fn test_expand_volume_texture_ignores_depth_for_slices() {
        let desc = ResourceDescription::texture_3d(PixelFormat::R8Unorm, 8, 8, 8).with_mip_levels(0);
        assert_eq!(desc.subresource_count(), Ok(4));
        let coordinates = expand(&desc, 0, 4).unwrap();
        assert!(coordinates.iter().all(|c| c.array_slice == 0 && c.plane_slice == 0));
    }

    #[test]
    fn test_expand_rejects_out_of_range() {
        let desc = ResourceDescription::texture_2d(PixelFormat::R8G8B8A8Unorm, 100, 100, 1);
        assert_eq!(expand(&desc, 1, 1), Err(FootprintError::Range { first: 1, count: 1, total: 1 }));
        assert_eq!(expand(&desc, 0, 2), Err(FootprintError::Range { first: 0, count: 2, total: 1 }));
        assert_eq!(expand(&desc, 0, 0), Err(FootprintError::Range { first: 0, count: 0, total: 1 }));
        assert_eq!(
            expand(&desc, u32::MAX, 2),
            Err(FootprintError::Range {
                first: u32::MAX,
                count: 2,
                total: 1
            })
        );
    }

    #[test]
    fn test_expand_validates_description() {
        let desc = ResourceDescription::texture_2d(PixelFormat::Unknown, 100, 100, 1);
        assert_eq!(expand(&desc, 0, 1), Err(FootprintError::UnsupportedFormat { format: PixelFormat::Unknown }));
    }
}
