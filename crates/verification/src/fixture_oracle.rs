//! Hand-computed fixture oracle
//!
//! Serves footprints worked out by hand from the copy engine's packing rules.
//! Needs no hardware, so it backs the unit and integration tests.

use crate::oracle::{OracleError, ReferenceOracle};
use copyable_footprints::{FootprintBatch, PixelFormat, PlacedFootprint, ResourceDescription, SubresourceFootprint};

/// Expected footprints for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// Short identifier used in reports
    pub name: &'static str,
    /// The resource
    pub resource: ResourceDescription,
    /// First subresource of the request
    pub first: u32,
    /// Number of subresources in the request
    pub count: u32,
    /// Footprints for the request, placed from offset 0
    pub batch: FootprintBatch,
}

/// Oracle backed by a list of fixtures
#[derive(Debug, Clone, Default)]
pub struct FixtureOracle {
    fixtures: Vec<Fixture>,
}

/// One row of a fixture table: `(offset, format, width, height, depth, row_pitch, num_rows, row_size)`
type Row = (u64, PixelFormat, u32, u32, u32, u32, u32, u64);

fn batch(rows: &[Row], total_bytes: u64) -> FootprintBatch {
    FootprintBatch {
        layouts: rows
            .iter()
            .map(|&(offset, format, width, height, depth, row_pitch, _, _)| PlacedFootprint {
                offset,
                footprint: SubresourceFootprint {
                    format,
                    width,
                    height,
                    depth,
                    row_pitch,
                },
            })
            .collect(),
        num_rows: rows.iter().map(|row| row.6).collect(),
        row_sizes_in_bytes: rows.iter().map(|row| row.7).collect(),
        total_bytes,
    }
}

impl FixtureOracle {
    /// Creates an oracle serving the given fixtures
    pub fn new(fixtures: Vec<Fixture>) -> Self {
        Self { fixtures }
    }

    /// Creates an oracle serving the built-in fixture set
    pub fn builtin() -> Self {
        use PixelFormat::*;

        let rgba8 = ResourceDescription::texture_2d(R8G8B8A8Unorm, 100, 100, 1);

        let slices: Vec<Row> = (0..5).map(|slice| (slice * 51200, R8G8B8A8Unorm, 100, 100, 1, 512, 100, 400)).collect();

        Self::new(vec![
            Fixture {
                name: "rgba8_100x100",
                resource: rgba8,
                first: 0,
                count: 1,
                batch: batch(&[(0, R8G8B8A8Unorm, 100, 100, 1, 512, 100, 400)], 51200),
            },
            Fixture {
                name: "rgba8_100x100_full_chain",
                resource: rgba8.with_mip_levels(0),
                first: 0,
                count: 7,
                batch: batch(
                    &[
                        (0, R8G8B8A8Unorm, 100, 100, 1, 512, 100, 400),
                        (51200, R8G8B8A8Unorm, 50, 50, 1, 256, 50, 200),
                        (64000, R8G8B8A8Unorm, 25, 25, 1, 256, 25, 100),
                        (70656, R8G8B8A8Unorm, 12, 12, 1, 256, 12, 48),
                        (73728, R8G8B8A8Unorm, 6, 6, 1, 256, 6, 24),
                        (75264, R8G8B8A8Unorm, 3, 3, 1, 256, 3, 12),
                        (76288, R8G8B8A8Unorm, 1, 1, 1, 256, 1, 4),
                    ],
                    76544,
                ),
            },
            Fixture {
                name: "rgba8_100x100_array_5",
                resource: ResourceDescription::texture_2d(R8G8B8A8Unorm, 100, 100, 5),
                first: 0,
                count: 5,
                batch: batch(&slices, 256000),
            },
            Fixture {
                name: "nv12_100x100",
                resource: ResourceDescription::texture_2d(Nv12, 100, 100, 1),
                first: 0,
                count: 2,
                batch: batch(&[(0, R8Typeless, 100, 100, 1, 256, 100, 100), (25600, R8G8Typeless, 50, 50, 1, 256, 50, 100)], 38400),
            },
            Fixture {
                name: "bc1_16x16_full_chain",
                resource: ResourceDescription::texture_2d(Bc1Unorm, 16, 16, 1).with_mip_levels(0),
                first: 0,
                count: 5,
                batch: batch(
                    &[
                        (0, Bc1Unorm, 16, 16, 1, 256, 4, 32),
                        (1024, Bc1Unorm, 8, 8, 1, 256, 2, 16),
                        (1536, Bc1Unorm, 4, 4, 1, 256, 1, 8),
                        (2048, Bc1Unorm, 2, 2, 1, 256, 1, 8),
                        (2560, Bc1Unorm, 1, 1, 1, 256, 1, 8),
                    ],
                    2816,
                ),
            },
            Fixture {
                name: "rgba8_volume_64x64x8",
                resource: ResourceDescription::texture_3d(R8G8B8A8Unorm, 64, 64, 8).with_mip_levels(0),
                first: 0,
                count: 2,
                batch: batch(&[(0, R8G8B8A8Unorm, 64, 64, 8, 256, 64, 256), (131072, R8G8B8A8Unorm, 32, 32, 4, 256, 32, 128)], 163840),
            },
            Fixture {
                name: "r32_float_1d_1000",
                resource: ResourceDescription::texture_1d(R32Float, 1000, 1),
                first: 0,
                count: 1,
                batch: batch(&[(0, R32Float, 1000, 1, 1, 4096, 1, 4000)], 4096),
            },
            Fixture {
                name: "d32_s8_64x64",
                resource: ResourceDescription::texture_2d(D32FloatS8X24Uint, 64, 64, 1),
                first: 0,
                count: 2,
                batch: batch(&[(0, R32Typeless, 64, 64, 1, 256, 64, 256), (16384, R8Typeless, 64, 64, 1, 256, 64, 64)], 32768),
            },
            Fixture {
                name: "buffer_1000",
                resource: ResourceDescription::buffer(1000),
                first: 0,
                count: 1,
                batch: batch(&[(0, Unknown, 1000, 1, 1, 1024, 1, 1000)], 1024),
            },
        ])
    }

    /// All fixtures served by this oracle
    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }
}

impl ReferenceOracle for FixtureOracle {
    fn name(&self) -> &'static str {
        "fixture"
    }

    fn query_reference_footprints(&self, desc: &ResourceDescription, first: u32, count: u32) -> Result<FootprintBatch, OracleError> {
        self.fixtures
            .iter()
            .find(|fixture| fixture.resource == *desc && fixture.first == first && fixture.count == count)
            .map(|fixture| fixture.batch.clone())
            .ok_or(OracleError::MissingFixture { format: desc.format, first, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_lookup() {
        let oracle = FixtureOracle::builtin();
        let desc = ResourceDescription::texture_2d(PixelFormat::Nv12, 100, 100, 1);

        let batch = oracle.query_reference_footprints(&desc, 0, 2).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.total_bytes, 38400);

        let missing = oracle.query_reference_footprints(&desc, 1, 1).unwrap_err();
        assert!(missing.is_unsupported());
    }

    #[test]
    fn test_builtin_fixtures_are_self_consistent() {
        for fixture in FixtureOracle::builtin().fixtures() {
            let batch = &fixture.batch;
            assert_eq!(batch.len(), fixture.count as usize, "{}", fixture.name);
            assert_eq!(batch.num_rows.len(), batch.len(), "{}", fixture.name);

            let last = batch.len() - 1;
            let end = batch.layouts[last].offset + batch.packed_size(last).unwrap();
            assert_eq!(batch.total_bytes, end, "{}", fixture.name);
        }
    }
}
