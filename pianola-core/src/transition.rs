//! Per-degree Markov transition model.
//!
//! Each scale degree owns a row of cumulative-probability breakpoints. The
//! next degree is the target of the first breakpoint whose bound is at least
//! the random draw; the final entry of a row catches whatever is left, which
//! absorbs rows whose bounds fall short of 1.0 and floating-point edge cases.

use pianola_types::{Scale, TransitionRow, TransitionTable};

use crate::error::{Error, Result};
use crate::random::RandomSource;

/// Validated transition rows for one scale.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionModel {
    rows: Vec<TransitionRow>,
}

impl TransitionModel {
    /// Build a model for a scale with `degree_count` degrees.
    ///
    /// Tables may carry more rows than the scale has degrees (the stock table
    /// has a row for an octave-repeated root); the extra rows are dropped.
    pub fn new(table: &TransitionTable, degree_count: usize) -> Result<Self> {
        if table.rows.len() < degree_count {
            return Err(Error::InvalidConfiguration(format!(
                "transition table '{}' has {} rows, scale needs {}",
                table.id,
                table.rows.len(),
                degree_count
            )));
        }
        let rows: Vec<TransitionRow> = table.rows[..degree_count].to_vec();
        for (degree, row) in rows.iter().enumerate() {
            validate_row(&table.id, degree, row, degree_count)?;
        }
        Ok(Self { rows })
    }

    /// Build the model for a scale from a table, checking the pair fits.
    pub fn for_scale(scale: &Scale, table: &TransitionTable) -> Result<Self> {
        Self::new(table, scale.len())
    }

    pub fn degree_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, degree: usize) -> Option<&TransitionRow> {
        self.rows.get(degree)
    }

    /// Pick the degree following `current` for a draw `random_unit` in `[0, 1)`.
    pub fn next_degree(&self, current: usize, random_unit: f64) -> Result<usize> {
        let row = self.rows.get(current).ok_or_else(|| {
            Error::InvalidState(format!(
                "degree {} outside scale of {} degrees",
                current,
                self.rows.len()
            ))
        })?;
        // Rows are validated non-empty
        let last = row.entries.len() - 1;
        let hit = row.entries[..last]
            .iter()
            .find(|entry| random_unit <= entry.bound)
            .unwrap_or(&row.entries[last]);
        Ok(hit.target)
    }

    /// Draw from `rng` and pick the next degree.
    pub fn sample(&self, current: usize, rng: &mut dyn RandomSource) -> Result<usize> {
        let roll = rng.next_unit();
        self.next_degree(current, roll)
    }
}

fn validate_row(table_id: &str, degree: usize, row: &TransitionRow, degree_count: usize) -> Result<()> {
    if row.entries.is_empty() {
        return Err(Error::InvalidConfiguration(format!(
            "transition table '{}': row {} is empty",
            table_id, degree
        )));
    }
    let mut previous = 0.0;
    for entry in &row.entries {
        if !entry.bound.is_finite() || !(0.0..=1.0).contains(&entry.bound) {
            return Err(Error::InvalidConfiguration(format!(
                "transition table '{}': row {} bound {} outside [0, 1]",
                table_id, degree, entry.bound
            )));
        }
        if entry.bound < previous {
            return Err(Error::InvalidConfiguration(format!(
                "transition table '{}': row {} bounds decrease ({} after {})",
                table_id, degree, entry.bound, previous
            )));
        }
        if entry.target >= degree_count {
            return Err(Error::InvalidConfiguration(format!(
                "transition table '{}': row {} targets degree {} of a {}-degree scale",
                table_id, degree, entry.target, degree_count
            )));
        }
        previous = entry.bound;
    }
    Ok(())
}
