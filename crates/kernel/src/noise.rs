use serde::{Deserialize, Serialize};

use crate::world::KernelError;

/// A square grid of noise samples for one chunk, stored row-major.
///
/// Deserialization goes through [`NoiseGrid::from_samples`], so a grid
/// always holds exactly `size * size` samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNoiseGrid")]
pub struct NoiseGrid {
    size: usize,
    samples: Vec<f32>,
}

#[derive(Deserialize)]
struct RawNoiseGrid {
    size: usize,
    samples: Vec<f32>,
}

impl TryFrom<RawNoiseGrid> for NoiseGrid {
    type Error = KernelError;

    fn try_from(raw: RawNoiseGrid) -> Result<Self, Self::Error> {
        NoiseGrid::from_samples(raw.size, raw.samples)
    }
}

impl NoiseGrid {
    /// A `size × size` grid filled with `value`.
    pub fn filled(size: usize, value: f32) -> Self {
        Self {
            size,
            samples: vec![value; size * size],
        }
    }

    /// Build from row-major samples. `samples.len()` must equal `size * size`.
    pub fn from_samples(size: usize, samples: Vec<f32>) -> Result<Self, KernelError> {
        let expected = size.checked_mul(size).ok_or(KernelError::GridShape {
            size,
            detail: "side length overflows".into(),
        })?;
        if samples.len() != expected {
            return Err(KernelError::GridShape {
                size,
                detail: format!("expected {expected} samples, got {}", samples.len()),
            });
        }
        Ok(Self { size, samples })
    }

    /// Build from rows. Every row must be as long as there are rows.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, KernelError> {
        let size = rows.len();
        let mut samples = Vec::with_capacity(size * size);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(KernelError::GridShape {
                    size,
                    detail: format!("row {i} has {} samples", row.len()),
                });
            }
            samples.extend(row);
        }
        Ok(Self { size, samples })
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.samples.get(row * self.size + col).copied()
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) -> bool {
        if row >= self.size || col >= self.size {
            return false;
        }
        self.samples[row * self.size + col] = value;
        true
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on 0; an empty grid simply has no rows.
        self.samples.chunks_exact(self.size.max(1))
    }

    /// All samples in row-major order.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_is_row_major() {
        let grid = NoiseGrid::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(grid.size(), 2);
        assert_eq!(grid.samples(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(grid.get(1, 0), Some(3.0));
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = NoiseGrid::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, KernelError::GridShape { size: 2, .. }));
    }

    #[test]
    fn wrong_sample_count_rejected() {
        assert!(NoiseGrid::from_samples(3, vec![0.0; 8]).is_err());
        assert!(NoiseGrid::from_samples(3, vec![0.0; 9]).is_ok());
    }

    #[test]
    fn rows_iterates_in_order() {
        let grid = NoiseGrid::from_samples(2, vec![0.5, 0.25, -1.0, 2.0]).unwrap();
        let rows: Vec<&[f32]> = grid.rows().collect();
        let expected: Vec<&[f32]> = vec![&[0.5, 0.25][..], &[-1.0, 2.0][..]];
        assert_eq!(rows, expected);
    }

    #[test]
    fn empty_grid_has_no_rows() {
        let grid = NoiseGrid::filled(0, 0.0);
        assert_eq!(grid.rows().count(), 0);
    }

    #[test]
    fn deserialize_rejects_short_sample_list() {
        let err = serde_json::from_str::<NoiseGrid>(r#"{"size":3,"samples":[1.0]}"#).unwrap_err();
        assert!(err.to_string().contains("expected 9 samples"), "{err}");
    }

    #[test]
    fn serde_roundtrip_keeps_shape() {
        let grid = NoiseGrid::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        let back: NoiseGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn set_updates_sample() {
        let mut grid = NoiseGrid::filled(2, 0.0);
        assert!(grid.set(0, 1, 7.5));
        assert!(!grid.set(2, 0, 1.0));
        assert_eq!(grid.get(0, 1), Some(7.5));
    }
}
