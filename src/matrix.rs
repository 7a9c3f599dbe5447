use std::ops::{Index, IndexMut};

use crate::{Result, ShortVec, TransformError};

/// Dense matrix of `f64`.
///
/// Used as the linear part of a transformation from N to M dimensions,
/// in which case it has M rows and N columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    /// Row-major / C-ordered matrix data.
    data: Vec<f64>,
    nrows: usize,
    ncols: usize,
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        self.get(index.0, index.1)
            .expect("index should be in bounds")
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        assert!(
            index.0 < self.nrows && index.1 < self.ncols,
            "index should be in bounds"
        );
        &mut self.data[index.0 * self.ncols + index.1]
    }
}

impl Matrix {
    pub fn builder() -> MatrixBuilder {
        MatrixBuilder::default()
    }

    /// Row-major/ C order data
    pub fn try_new(data: Vec<f64>, ncols: usize) -> Result<Self> {
        if ncols == 0 {
            return Err(TransformError::invalid("Matrix must have at least one column"));
        }
        if data.len() % ncols != 0 {
            return Err(TransformError::invalid(format!(
                "Matrix data length {} is not divisible by ncols {}",
                data.len(),
                ncols
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(TransformError::invalid("Matrix contains non-finite values"));
        }
        let nrows = data.len() / ncols;
        Ok(Self { data, nrows, ncols })
    }

    /// Build a matrix from a slice of equal-length rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let mut builder = Self::builder();
        for row in rows.iter() {
            builder.add_row(row.as_ref())?;
        }
        builder.build()
    }

    pub fn identity(ndim: usize) -> Self {
        let mut data = vec![0.0; ndim * ndim];
        for idx in 0..ndim {
            data[idx * ndim + idx] = 1.0;
        }
        Self {
            data,
            nrows: ndim,
            ncols: ndim,
        }
    }

    /// The inverse of a matrix with orthonormal rows.
    pub fn transpose(&self) -> Matrix {
        let mut data = vec![0.0; self.data.len()];
        for r in 0..self.nrows {
            for c in 0..self.ncols {
                data[c * self.nrows + r] = self[(r, c)];
            }
        }
        Matrix {
            data,
            nrows: self.ncols,
            ncols: self.nrows,
        }
    }

    pub fn matmul(&self, coord: &[f64]) -> ShortVec<f64> {
        let mut result = smallvec::smallvec![f64::NAN; self.nrows];
        self.matmul_into(coord, &mut result);
        result
    }

    pub fn matmul_into(&self, coord: &[f64], buf: &mut [f64]) {
        buf.fill(0.0);
        for (idx, d) in self.data.iter().enumerate() {
            let r = idx / self.ncols;
            let c = idx % self.ncols;
            buf[r] += d * coord[c];
        }
    }

    /// Matrix product `self · other`.
    pub fn dot(&self, other: &Matrix) -> Result<Matrix> {
        if self.ncols != other.nrows {
            return Err(TransformError::dimension(
                self.ncols,
                other.nrows,
                "matrix product",
            ));
        }
        let mut data = vec![0.0; self.nrows * other.ncols];
        for r in 0..self.nrows {
            for k in 0..self.ncols {
                let lhs = self[(r, k)];
                if lhs == 0.0 {
                    continue;
                }
                for c in 0..other.ncols {
                    data[r * other.ncols + c] += lhs * other[(k, c)];
                }
            }
        }
        Ok(Matrix {
            data,
            nrows: self.nrows,
            ncols: other.ncols,
        })
    }

    /// Invert by Gauss-Jordan elimination with partial pivoting.
    ///
    /// Each row is first scaled so that its largest absolute entry is 1,
    /// so badly-scaled but well-conditioned matrices such as `diag(1e-13, 1)` invert.
    /// Returns `None` for non-square matrices,
    /// and for matrices with an all-zero row or a pivot of at most `tolerance`
    /// after that scaling.
    pub fn try_inverse(&self, tolerance: f64) -> Option<Matrix> {
        if !self.is_square() || self.nrows == 0 {
            return None;
        }
        let n = self.nrows;

        // inv(D·A)·D == inv(A), so eliminate on [D·A | D]
        let mut work = self.clone();
        let mut inv = Matrix::identity(n);
        for r in 0..n {
            let row = &mut work.data[r * n..(r + 1) * n];
            let max_abs = row.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
            if max_abs == 0.0 {
                return None;
            }
            row.iter_mut().for_each(|v| *v /= max_abs);
            inv[(r, r)] = 1.0 / max_abs;
        }

        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|a, b| work[(*a, col)].abs().total_cmp(&work[(*b, col)].abs()))?;
            let pivot = work[(pivot_row, col)];
            if pivot.abs() <= tolerance {
                return None;
            }
            work.swap_rows(col, pivot_row);
            inv.swap_rows(col, pivot_row);

            for c in 0..n {
                work[(col, c)] /= pivot;
                inv[(col, c)] /= pivot;
            }

            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = work[(r, col)];
                if factor == 0.0 {
                    continue;
                }
                for c in 0..n {
                    let (w, i) = (work[(col, c)], inv[(col, c)]);
                    work[(r, c)] -= factor * w;
                    inv[(r, c)] -= factor * i;
                }
            }
        }
        Some(inv)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.ncols {
            self.data.swap(a * self.ncols + c, b * self.ncols + c);
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&f64> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        self.data.get(row * self.ncols + col)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// Row-major data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Number of entries on the main diagonal.
    pub(crate) fn diagonal_len(&self) -> usize {
        self.nrows.min(self.ncols)
    }

    /// Whether every row has unit length and is orthogonal to every other row.
    pub fn has_orthonormal_rows(&self, tolerance: f64) -> bool {
        let mut rows: Vec<&[f64]> = Vec::with_capacity(self.nrows());
        for r in 0..self.nrows() {
            let start = r * self.ncols();
            let end = start + self.ncols();
            let new_vec = &self.data[start..end];

            if (magnitude(new_vec) - 1.0).abs() > tolerance {
                return false;
            }

            for row in rows.iter() {
                if dot(row, new_vec).abs() > tolerance {
                    return false;
                }
            }
            rows.push(new_vec);
        }
        true
    }
}

fn dot(v1: &[f64], v2: &[f64]) -> f64 {
    v1.iter().zip(v2.iter()).map(|(a, b)| a * b).sum()
}

fn magnitude(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

#[derive(Debug, Clone, Default)]
pub struct MatrixBuilder {
    row_len: Option<usize>,
    data: Vec<f64>,
}

impl MatrixBuilder {
    pub fn add_row(&mut self, row: &[f64]) -> Result<&mut Self> {
        if let Some(len) = self.row_len {
            if len != row.len() {
                return Err(TransformError::invalid(format!(
                    "MatrixBuilder: inconsistent row length {}, expected {}",
                    row.len(),
                    len
                )));
            }
        } else {
            self.row_len = Some(row.len());
        }
        self.data.extend_from_slice(row);
        Ok(self)
    }

    pub fn build(self) -> Result<Matrix> {
        Matrix::try_new(self.data, self.row_len.unwrap_or(0))
    }
}
