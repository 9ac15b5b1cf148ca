#![forbid(unsafe_code)]

use ms_case::QuerySet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("query rank {rank} exceeds array size {size}")]
    RankOutOfBounds { rank: usize, size: usize },
    #[error("query rank 0 is invalid; ranks are 1-indexed")]
    ZeroRank,
}

/// Computes the ground-truth answer row: for each rank `r` in query order,
/// the element at sorted position `r` (1-indexed, ascending).
///
/// Comparison is value-only; duplicate values at adjacent ranks are valid
/// and resolve independently. Deterministic for a fixed `(values, queries)`
/// pair — this is deliberately nothing smarter than a full sort, so it can
/// stand as the correctness authority for solvers that are.
pub fn evaluate(values: &[u64], queries: &QuerySet) -> Result<Vec<u64>, OracleError> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mut out = Vec::with_capacity(queries.len());
    for &rank in queries.ranks() {
        if rank == 0 {
            return Err(OracleError::ZeroRank);
        }
        if rank > sorted.len() {
            return Err(OracleError::RankOutOfBounds {
                rank,
                size: sorted.len(),
            });
        }
        out.push(sorted[rank - 1]);
    }
    Ok(out)
}
