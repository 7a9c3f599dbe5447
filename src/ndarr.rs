//! Interop with [ndarray] 2-D arrays (rows are points, columns are dimensions).
use ndarray::{Array2, ArrayView2};

use crate::{Batch, CoordBatch, Direction, Result, Transformation, map_batch};

impl From<ArrayView2<'_, f64>> for CoordBatch {
    fn from(value: ArrayView2<'_, f64>) -> Self {
        let (n_points, ndim) = value.dim();
        let mut batch = CoordBatch::filled(n_points, ndim, f64::NAN);
        for (idx, row) in value.rows().into_iter().enumerate() {
            for (out, v) in batch.point_mut(idx).iter_mut().zip(row.iter()) {
                *out = *v;
            }
        }
        batch
    }
}

impl From<&Array2<f64>> for CoordBatch {
    fn from(value: &Array2<f64>) -> Self {
        value.view().into()
    }
}

impl From<CoordBatch> for Array2<f64> {
    fn from(value: CoordBatch) -> Self {
        Array2::from_shape_fn((value.n_points(), value.ndim()), |(r, c)| {
            value.point(r)[c]
        })
    }
}

/// Map an array of points through a transformation.
///
/// Same semantics as [map_batch]; any unit tag is not representable here and is dropped.
pub fn map_array<T: Transformation + ?Sized>(
    transform: &T,
    points: ArrayView2<'_, f64>,
    direction: Direction,
) -> Result<Array2<f64>> {
    let batch = CoordBatch::from(points);
    Ok(map_batch(transform, &batch, direction)?.into())
}
