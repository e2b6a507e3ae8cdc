//! Footprint dump binary
//!
//! Prints the copyable footprints of a single resource, either described on
//! the command line or taken from a named manifest case.
//!
//! # Usage
//! ```bash
//! dump_footprints --format nv12 --width 100 --height 100 --json
//! dump_footprints --manifest crates/verification/cases/default.yaml --case bc1_16x16_full_chain
//! ```

use clap::Parser;
use copyable_footprints::{PixelFormat, ResourceDescription, ResourceDimension, TextureLayout, compute_footprints};
use copyable_footprints_verification::manifest::CaseManifest;
use std::path::PathBuf;

/// Command-line arguments for the footprint dumper
#[derive(Parser)]
#[command(version, about = "Prints the copyable footprints of a resource")]
struct Args {
    /// Manifest to take the case from
    #[arg(long, requires = "case")]
    manifest: Option<PathBuf>,

    /// Name of the manifest case to dump
    #[arg(long, requires = "manifest")]
    case: Option<String>,

    /// Resource dimension (buffer, texture1d, texture2d, texture3d)
    #[arg(long, default_value = "texture2d")]
    dimension: String,

    /// Pixel format, e.g. r8_g8_b8_a8_unorm, bc1_unorm, nv12
    #[arg(long, short, default_value = "r8_g8_b8_a8_unorm")]
    format: String,

    /// Width in texels, or size in bytes for buffers
    #[arg(long, short = 'W', default_value = "1")]
    width: u64,

    /// Height in texels
    #[arg(long, short = 'H', default_value = "1")]
    height: u32,

    /// Array size, or depth for volume textures
    #[arg(long, short = 'D', default_value = "1")]
    depth_or_array_size: u16,

    /// Mip level count; 0 for the full chain
    #[arg(long, short, default_value = "1")]
    mip_levels: u16,

    /// First subresource
    #[arg(long, default_value = "0")]
    first: u32,

    /// Number of subresources; all remaining when omitted
    #[arg(long)]
    count: Option<u32>,

    /// Offset at which the data is placed
    #[arg(long, default_value = "0")]
    base_offset: u64,

    /// Print JSON instead of the debug representation
    #[arg(long)]
    json: bool,
}

/// Parses a value by its serialized name
fn parse_name<T: serde::de::DeserializeOwned>(name: &str) -> Result<T, serde_json::Error> {
    serde_json::from_value(serde_json::Value::String(name.to_lowercase()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt().with_max_level(tracing::Level::WARN).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (resource, first, count, base_offset) = match (&args.manifest, &args.case) {
        (Some(manifest_path), Some(case_name)) => {
            let manifest = CaseManifest::from_file(manifest_path)?;
            let case = manifest.cases.into_iter().find(|case| &case.name == case_name).ok_or(format!("No case named {case_name} in {}", manifest_path.display()))?;
            (case.resource, case.first, case.count, case.base_offset)
        }
        _ => {
            let dimension: ResourceDimension = parse_name(&args.dimension).map_err(|e| format!("Invalid dimension '{}': {e}", args.dimension))?;
            let format: PixelFormat = parse_name(&args.format).map_err(|e| format!("Invalid format '{}': {e}", args.format))?;
            let resource = ResourceDescription {
                dimension,
                width: args.width,
                height: args.height,
                depth_or_array_size: args.depth_or_array_size,
                mip_levels: args.mip_levels,
                format,
                sample_count: 1,
                layout: TextureLayout::Unknown,
            };
            (resource, args.first, args.count, args.base_offset)
        }
    };

    let count = match count {
        Some(count) => count,
        None => resource.subresource_count()?.saturating_sub(first),
    };
    let batch = compute_footprints(&resource, first, count, base_offset)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        println!("{resource:?}");
        for (index, entry) in (first..).zip(batch.iter()) {
            let footprint = entry.layout.footprint;
            println!(
                "  [{index}] offset {} {:?} {}x{}x{} pitch {} rows {} row size {}",
                entry.layout.offset, footprint.format, footprint.width, footprint.height, footprint.depth, footprint.row_pitch, entry.num_rows, entry.row_size_in_bytes
            );
        }
        println!("  total {} bytes", batch.total_bytes);
    }

    Ok(())
}
