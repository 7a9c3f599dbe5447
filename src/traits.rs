use std::ops::Not;
use std::sync::Arc;

use crate::{CoordBatch, Result, Sequence, TransformError, map_batch};

/// Whether a transformation is applied in its nominal or its inverse sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    /// The direction actually executed by a transformation
    /// whose reversed flag is `reversed`.
    pub fn resolve(self, reversed: bool) -> Self {
        if reversed { !self } else { self }
    }
}

impl Not for Direction {
    type Output = Direction;

    fn not(self) -> Self::Output {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Core coordinate transformation interface.
///
/// Transformations are immutable once built and may be shared between threads
/// and between any number of [Sequence]s.
///
/// Implementors provide the point kernel [Transformation::transform_into]
/// in their natural sense; reversal, dimension checks and batching are handled
/// by [map_batch], which backs the provided [Transformation::apply].
pub trait Transformation: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Input dimensionality in the natural (unreversed) sense.
    fn domain_ndim(&self) -> usize;

    /// Output dimensionality in the natural (unreversed) sense.
    fn codomain_ndim(&self) -> usize;

    /// Whether a backward kernel exists.
    fn is_invertible(&self) -> bool;

    /// Whether forward and backward are swapped for this instance.
    fn is_reversed(&self) -> bool {
        false
    }

    /// Transform a single point, writing to a pre-allocated output buffer.
    ///
    /// `direction` is the effective direction, i.e. already resolved against the reversed flag.
    /// `pt` has exactly the required number of dimensions for that direction,
    /// and `buf` exactly the produced number.
    fn transform_into(&self, pt: &[f64], buf: &mut [f64], direction: Direction) -> Result<()>;

    /// Check that the effective `direction` can be executed.
    fn check_direction(&self, direction: Direction) -> Result<()> {
        if direction == Direction::Backward && !self.is_invertible() {
            return Err(TransformError::non_invertible(self.name()));
        }
        Ok(())
    }

    /// Return the inverse transformation.
    fn inverse(&self) -> Result<Arc<dyn Transformation>>;

    /// Chain `other` after this transformation.
    ///
    /// Fails if this transformation's output dimensionality
    /// does not match `other`'s input dimensionality.
    fn compose(self: Arc<Self>, other: Arc<dyn Transformation>) -> Result<Sequence>;

    /// Downcast used to flatten nested sequences.
    fn as_sequence(&self) -> Option<&Sequence> {
        None
    }

    /// Effective input dimensionality, accounting for the reversed flag.
    fn input_ndim(&self) -> usize {
        self.ndims_for(Direction::Forward).0
    }

    /// Effective output dimensionality, accounting for the reversed flag.
    fn output_ndim(&self) -> usize {
        self.ndims_for(Direction::Forward).1
    }

    /// The direction executed when `requested` is asked for.
    fn effective(&self, requested: Direction) -> Direction {
        requested.resolve(self.is_reversed())
    }

    /// (required, produced) dimensionalities when `requested` is asked for.
    fn ndims_for(&self, requested: Direction) -> (usize, usize) {
        match self.effective(requested) {
            Direction::Forward => (self.domain_ndim(), self.codomain_ndim()),
            Direction::Backward => (self.codomain_ndim(), self.domain_ndim()),
        }
    }

    /// Transform a batch of points in the requested direction.
    ///
    /// Columns beyond the required dimensionality are passed through unchanged.
    fn apply(&self, data: &CoordBatch, direction: Direction) -> Result<CoordBatch> {
        map_batch(self, data, direction)
    }

    /// Shorthand for applying backward.
    fn invert(&self, data: &CoordBatch) -> Result<CoordBatch> {
        self.apply(data, Direction::Backward)
    }
}
