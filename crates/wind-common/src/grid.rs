//! Row-major 2D fields and GRIB scanning modes.

use serde::{Deserialize, Serialize};

use crate::error::{WindError, WindResult};

/// A 2D field stored row-major: `data[row * width + col]`.
///
/// Row 0 holds the first scanned row of the source grid, so for the usual
/// north-to-south scan it is the northernmost row.
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl GridField {
    /// Wrap a row-major buffer, checking that its length matches the shape.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> WindResult<Self> {
        if data.len() != width * height {
            return Err(WindError::ShapeMismatch {
                expected_width: width,
                expected_height: height,
                width: data.len(),
                height: 1,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A field with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Value at (col, row), or `None` outside the grid.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// `(width, height)` of the field.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Fail unless `other` has the same shape as `self`.
    pub fn ensure_same_shape(&self, other: &GridField) -> WindResult<()> {
        if self.shape() != other.shape() {
            return Err(WindError::ShapeMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: other.width,
                height: other.height,
            });
        }
        Ok(())
    }

    /// Minimum and maximum over the finite cells, `None` if there are none.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Apply `f` to every cell.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> GridField {
        GridField {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two fields of the same shape cell by cell.
    pub fn zip_with(
        &self,
        other: &GridField,
        f: impl Fn(f32, f32) -> f32,
    ) -> WindResult<GridField> {
        self.ensure_same_shape(other)?;
        Ok(GridField {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }
}

/// Scan mode flags for grid data ordering.
///
/// The bit layout is shared by GRIB1 (octet 28 of the GDS) and GRIB2
/// (Flag Table 3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMode {
    /// +i direction: false = +x (east), true = -x (west)
    pub i_negative: bool,
    /// +j direction: false = -y (south), true = +y (north)
    pub j_positive: bool,
    /// Adjacent points: false = i direction, true = j direction
    pub j_consecutive: bool,
    /// Row scan direction alternates
    pub alternating_rows: bool,
}

impl ScanMode {
    /// Create from the GRIB scanning mode flag byte.
    pub fn from_flag(flag: u8) -> Self {
        Self {
            i_negative: (flag & 0x80) != 0,
            j_positive: (flag & 0x40) != 0,
            j_consecutive: (flag & 0x20) != 0,
            alternating_rows: (flag & 0x10) != 0,
        }
    }

    /// Reorder a decoded value sequence into a row-major field of `ni` columns
    /// and `nj` rows, keeping the scan's own i/j directions.
    pub fn to_row_major(&self, values: Vec<f32>, ni: usize, nj: usize) -> WindResult<GridField> {
        if values.len() != ni * nj {
            return Err(WindError::ShapeMismatch {
                expected_width: ni,
                expected_height: nj,
                width: values.len(),
                height: 1,
            });
        }

        let mut data = if self.j_consecutive {
            // Column-major order
            let mut out = vec![f32::NAN; ni * nj];
            for i in 0..ni {
                for j in 0..nj {
                    out[j * ni + i] = values[i * nj + j];
                }
            }
            out
        } else {
            values
        };

        if self.alternating_rows && !self.j_consecutive {
            for row in data.chunks_mut(ni).skip(1).step_by(2) {
                row.reverse();
            }
        }

        GridField::new(ni, nj, data)
    }
}
