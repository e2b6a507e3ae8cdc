//! Footprint batch comparison
//!
//! Compares a candidate batch (usually from the core) against a reference
//! batch from an oracle, reporting the first difference found.

use copyable_footprints::{FootprintBatch, FootprintEntry};

/// Result of comparing two footprint batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareResult {
    /// Batches match exactly
    Match,
    /// Batches have different entry counts
    LengthMismatch {
        /// Entries in the reference batch
        reference_len: usize,
        /// Entries in the candidate batch
        candidate_len: usize,
    },
    /// An entry differs in one field
    EntryMismatch {
        /// Position of the first differing entry
        index: usize,
        /// Name of the first differing field in that entry
        field: &'static str,
    },
    /// All entries match but the total span differs
    TotalMismatch {
        /// Total bytes of the reference batch
        reference_total: u64,
        /// Total bytes of the candidate batch
        candidate_total: u64,
    },
}

/// Returns the name of the first field that differs between two entries
fn first_differing_field(reference: &FootprintEntry<'_>, candidate: &FootprintEntry<'_>) -> Option<&'static str> {
    let (r, c) = (&reference.layout.footprint, &candidate.layout.footprint);
    let fields = [
        ("offset", reference.layout.offset == candidate.layout.offset),
        ("format", r.format == c.format),
        ("width", r.width == c.width),
        ("height", r.height == c.height),
        ("depth", r.depth == c.depth),
        ("row_pitch", r.row_pitch == c.row_pitch),
        ("num_rows", reference.num_rows == candidate.num_rows),
        ("row_size_in_bytes", reference.row_size_in_bytes == candidate.row_size_in_bytes),
    ];
    fields.into_iter().find(|&(_, equal)| !equal).map(|(field, _)| field)
}

/// Compares two footprint batches entry by entry
///
/// # Arguments
/// * `reference` - Batch produced by a reference oracle
/// * `candidate` - Batch under test
///
/// # Returns
/// A `CompareResult` describing the first difference, or `Match`
pub fn compare_batches(reference: &FootprintBatch, candidate: &FootprintBatch) -> CompareResult {
    if reference.len() != candidate.len() {
        return CompareResult::LengthMismatch {
            reference_len: reference.len(),
            candidate_len: candidate.len(),
        };
    }

    for (index, (r, c)) in reference.iter().zip(candidate.iter()).enumerate() {
        if let Some(field) = first_differing_field(&r, &c) {
            return CompareResult::EntryMismatch { index, field };
        }
    }

    if reference.total_bytes != candidate.total_bytes {
        return CompareResult::TotalMismatch {
            reference_total: reference.total_bytes,
            candidate_total: candidate.total_bytes,
        };
    }

    CompareResult::Match
}
