use copyable_footprints::{PixelFormat, ResourceDescription, compute_footprints, required_intermediate_size};
use copyable_footprints_verification::{
    ReferenceOracle,
    compare::{CompareResult, compare_batches},
    fixture_oracle::FixtureOracle,
    manifest::CaseManifest,
    wgpu_oracle::WgpuTableOracle,
};

#[test]
fn test_core_matches_fixtures() {
    let oracle = FixtureOracle::builtin();
    for fixture in oracle.fixtures() {
        let reference = oracle.query_reference_footprints(&fixture.resource, fixture.first, fixture.count).unwrap();
        let candidate = compute_footprints(&fixture.resource, fixture.first, fixture.count, 0).unwrap();
        assert_eq!(compare_batches(&reference, &candidate), CompareResult::Match, "{}", fixture.name);
    }
}

#[test]
fn test_wgpu_tables_match_fixtures() {
    for fixture in FixtureOracle::builtin().fixtures() {
        let reference = WgpuTableOracle.query_reference_footprints(&fixture.resource, fixture.first, fixture.count).unwrap();
        assert_eq!(compare_batches(&reference, &fixture.batch), CompareResult::Match, "{}", fixture.name);
    }
}

#[test]
fn test_core_matches_wgpu_tables_across_formats() {
    let formats = [
        PixelFormat::R8Unorm,
        PixelFormat::R8G8Snorm,
        PixelFormat::R16G16Float,
        PixelFormat::R10G10B10A2Unorm,
        PixelFormat::B8G8R8A8UnormSrgb,
        PixelFormat::R16G16B16A16Uint,
        PixelFormat::R32G32Float,
        PixelFormat::R32G32B32A32Float,
        PixelFormat::Bc1Unorm,
        PixelFormat::Bc4Snorm,
        PixelFormat::Bc5Unorm,
        PixelFormat::Bc6hUf16,
        PixelFormat::Bc7UnormSrgb,
        PixelFormat::Nv12,
    ];

    for format in formats {
        for (width, height, array_size) in [(256, 256, 1), (100, 60, 3), (36, 20, 2)] {
            let desc = ResourceDescription::texture_2d(format, width, height, array_size).with_mip_levels(0);
            let total = desc.subresource_count().unwrap();

            let reference = WgpuTableOracle.query_reference_footprints(&desc, 0, total).unwrap();
            let candidate = compute_footprints(&desc, 0, total, 0).unwrap();
            assert_eq!(compare_batches(&reference, &candidate), CompareResult::Match, "{format:?} {width}x{height}x{array_size}");
        }
    }
}

#[test]
fn test_core_matches_wgpu_tables_for_volumes_and_subranges() {
    let desc = ResourceDescription::texture_3d(PixelFormat::R16G16B16A16Float, 64, 40, 24).with_mip_levels(0);
    let total = desc.subresource_count().unwrap();
    for first in 0..total {
        let count = total - first;
        let reference = WgpuTableOracle.query_reference_footprints(&desc, first, count).unwrap();
        let candidate = compute_footprints(&desc, first, count, 0).unwrap();
        assert_eq!(compare_batches(&reference, &candidate), CompareResult::Match, "first {first}");
    }
}

#[test]
fn test_default_manifest_cases_pass_the_core() {
    let manifest = CaseManifest::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/cases/default.yaml")).unwrap();
    assert!(!manifest.cases.is_empty());

    for case in &manifest.cases {
        let count = case.resolved_count().unwrap();
        let batch = compute_footprints(&case.resource, case.first, count, case.base_offset).unwrap();
        if let Some(expected) = case.expected_total_bytes {
            assert_eq!(batch.total_bytes, expected, "{}", case.name);
        }
        if case.first == 0 && case.base_offset == 0 {
            assert_eq!(required_intermediate_size(&case.resource, 0, count), Ok(batch.total_bytes), "{}", case.name);
        }
    }
}
