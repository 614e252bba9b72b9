//! Job listings preparation for salary regression.
//!
//! Loads a raw listings table, fills missing text, parses salaries, derives
//! posting date, seniority, skill count and industry features, and splits the
//! result into a feature table and a `salary_value` target.

pub mod clean;
pub mod columns;
pub mod conf;
pub mod engineer;
pub mod error;
pub mod manifest;
pub mod output;
pub mod prepare;
pub mod s3;
pub mod source;

use polars::prelude::*;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

pub use clean::{clean, Dedup};
pub use engineer::{engineer, DatePolicy};
pub use error::{PrepError, Result};
pub use manifest::{FeatureManifest, CANONICAL_FEATURES};
pub use output::write_table;
pub use prepare::{prepare, prepare_table, split_features_and_target, PrepOptions, PreparedData};
pub use source::{Locator, RawSource, TableFormat};

/// Shuffle rows with a fixed seed and split off `test_fraction` of them for
/// evaluation. Returns `(train, test)`.
pub fn train_test_split(
    data: &PreparedData,
    test_fraction: f64,
    seed: u64,
) -> Result<(PreparedData, PreparedData)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PrepError::InvalidSplit(test_fraction));
    }

    let mut indices: Vec<u32> = (0..data.len() as u32).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    // the test side is rounded up, so any non-empty table tests on at least one row
    let test_len = (data.len() as f64 * test_fraction).ceil() as usize;
    let (test_indices, train_indices) = indices.split_at(test_len);

    Ok((take_rows(data, train_indices)?, take_rows(data, test_indices)?))
}

fn take_rows(data: &PreparedData, indices: &[u32]) -> Result<PreparedData> {
    let idx = UInt32Chunked::from_vec("", indices.to_vec());
    let target = match &data.target {
        Some(target) => Some(target.take(&idx)?),
        None => None,
    };

    Ok(PreparedData {
        table: data.table.take(&idx)?,
        features: data.features.take(&idx)?,
        target,
        used_features: data.used_features.clone(),
    })
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
