//! Mapping whole batches of points through a transformation.
use crate::{Batch, CoordBatch, Direction, Result, TransformError, Transformation};

/// Transform every point of `batch` in the requested direction.
///
/// The direction is first resolved against the transformation's reversed flag.
/// The leading columns of each point feed the transformation;
/// any further columns are copied unchanged after its output,
/// so the result has `produced + (batch.ndim() - required)` columns.
/// The batch's unit tag is carried over.
///
/// Points are independent; with the `rayon` feature they are mapped in parallel.
pub fn map_batch<T, B>(transform: &T, batch: &B, direction: Direction) -> Result<CoordBatch>
where
    T: Transformation + ?Sized,
    B: Batch + Sync + ?Sized,
{
    let effective = transform.effective(direction);
    let (required, produced) = transform.ndims_for(direction);
    let ndim = batch.ndim();
    if ndim < required {
        return Err(TransformError::dimension(
            required,
            ndim,
            format!("columns for {effective:?} '{}'", transform.name()),
        ));
    }
    transform.check_direction(effective)?;

    let n_points = batch.n_points();
    let out_ndim = produced + (ndim - required);
    log::trace!(
        "Mapping {n_points} points {effective:?} through '{}' ({ndim} -> {out_ndim} columns)",
        transform.name()
    );

    let mut out = CoordBatch::filled(n_points, out_ndim, f64::NAN).with_unit(batch.unit().cloned());
    if out_ndim == 0 || n_points == 0 {
        return Ok(out);
    }

    let map_point = |(idx, row): (usize, &mut [f64])| -> Result<()> {
        let pt = batch.point(idx);
        transform.transform_into(&pt[..required], &mut row[..produced], effective)?;
        row[produced..].copy_from_slice(&pt[required..]);
        Ok(())
    };

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        out.as_mut_slice()
            .par_chunks_mut(out_ndim)
            .enumerate()
            .try_for_each(map_point)?;
    }
    #[cfg(not(feature = "rayon"))]
    {
        out.as_mut_slice()
            .chunks_exact_mut(out_ndim)
            .enumerate()
            .try_for_each(map_point)?;
    }

    Ok(out)
}
