//! Footprint verification binary
//!
//! Runs every case of a YAML manifest through the core and the reference
//! oracles, and optionally round-trips the data through a GPU device.

use clap::Parser;
use copyable_footprints::compute_footprints;
use copyable_footprints_verification::{
    OracleError, ReferenceOracle,
    compare::{CompareResult, compare_batches},
    device_validator::DeviceCopyValidator,
    fixture_oracle::FixtureOracle,
    manifest::{CaseManifest, FootprintCase},
    wgpu_oracle::WgpuTableOracle,
};
use std::path::PathBuf;

/// Command-line arguments for the footprint verifier
#[derive(Parser)]
#[command(version, about = "Checks copyable footprints against reference oracles")]
struct Args {
    /// YAML case manifest
    #[arg(default_value = "crates/verification/cases/default.yaml")]
    manifest: PathBuf,

    /// Also validate each case on a GPU device
    #[arg(long, short)]
    device: bool,

    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(long, short, default_value = "info")]
    log_level: tracing::Level,
}

/// Checks one case against every oracle, returning whether it passed
fn verify_case(case: &FootprintCase, oracles: &[&dyn ReferenceOracle], validator: Option<&DeviceCopyValidator>) -> bool {
    let name = &case.name;
    let count = match case.resolved_count() {
        Ok(count) => count,
        Err(e) => {
            eprintln!("✗ {name}: {e}");
            return false;
        }
    };

    let placed = match compute_footprints(&case.resource, case.first, count, case.base_offset) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("✗ {name}: core rejected the case: {e}");
            return false;
        }
    };
    if let Some(expected) = case.expected_total_bytes.filter(|&expected| expected != placed.total_bytes) {
        eprintln!("✗ {name}: total {} bytes, expected {expected}", placed.total_bytes);
        return false;
    }

    let candidate = match case.base_offset {
        0 => placed,
        _ => match compute_footprints(&case.resource, case.first, count, 0) {
            Ok(batch) => batch,
            Err(e) => {
                eprintln!("✗ {name}: core rejected the unplaced case: {e}");
                return false;
            }
        },
    };

    let mut passed = true;
    for oracle in oracles {
        let oracle_name = oracle.name();
        let reference = match oracle.query_reference_footprints(&case.resource, case.first, count) {
            Ok(reference) => reference,
            Err(e) if e.is_unsupported() => {
                tracing::debug!(case = %name, oracle = oracle_name, "skipped: {e}");
                continue;
            }
            Err(e) => {
                eprintln!("✗ {name}: {oracle_name} oracle failed: {e}");
                passed = false;
                continue;
            }
        };

        match compare_batches(&reference, &candidate) {
            CompareResult::Match => {
                println!("✓ {name} matches {oracle_name} ({} subresources, {} bytes)", candidate.len(), candidate.total_bytes);
            }
            CompareResult::LengthMismatch { reference_len, candidate_len } => {
                eprintln!("✗ {name}: {oracle_name} has {reference_len} entries, core has {candidate_len}");
                passed = false;
            }
            CompareResult::EntryMismatch { index, field } => {
                eprintln!("✗ {name}: {oracle_name} disagrees on {field} of entry {index}");
                passed = false;
            }
            CompareResult::TotalMismatch { reference_total, candidate_total } => {
                eprintln!("✗ {name}: {oracle_name} total {reference_total}, core total {candidate_total}");
                passed = false;
            }
        }
    }

    if let Some(validator) = validator {
        match validator.validate(&case.resource, case.first, &candidate) {
            Ok(()) => println!("✓ {name} round-trips on {}", validator.adapter_name()),
            Err(e @ OracleError::Unsupported { .. }) => tracing::debug!(case = %name, "device skipped: {e}"),
            Err(e) => {
                eprintln!("✗ {name}: device validation failed: {e}");
                passed = false;
            }
        }
    }

    passed
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt().with_max_level(args.log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let manifest = CaseManifest::from_file(&args.manifest).map_err(|e| format!("Failed to read manifest {}: {e}", args.manifest.display()))?;
    tracing::info!(cases = manifest.cases.len(), manifest = %args.manifest.display(), "loaded case manifest");

    let validator = if args.device { Some(DeviceCopyValidator::new().await?) } else { None };

    let fixture_oracle = FixtureOracle::builtin();
    let oracles: [&dyn ReferenceOracle; 2] = [&fixture_oracle, &WgpuTableOracle];

    let failures = manifest.cases.iter().filter(|case| !verify_case(case, &oracles, validator.as_ref())).count();
    if failures > 0 {
        tracing::warn!(failures, "footprint verification failed");
        std::process::exit(1);
    }

    tracing::info!("all cases passed");
    Ok(())
}
