//! Composable, invertible coordinate transformations between N-dimensional spaces.
//!
//! A [Transformation] maps batches of points forward or backward.
//! [Linear] is the affine case, built from sparse [LinearOptions];
//! [Sequence] chains transformations into one.
//!
//! ```
//! use std::sync::Arc;
//! use coord_transforms::{CoordBatch, Direction, Linear, LinearOptions, Transformation};
//!
//! let scale = Arc::new(Linear::try_new(LinearOptions::default().scale(2.0).dims(2)).unwrap());
//! let shift = Arc::new(Linear::try_new(LinearOptions::default().post(&[1.0, 0.0])).unwrap());
//! let pipeline = scale.compose(shift).unwrap();
//!
//! let pts = CoordBatch::from_points(&[[1.0, 1.0, 99.0]]).unwrap();
//! let out = pipeline.apply(&pts, Direction::Forward).unwrap();
//! assert_eq!(out.as_slice(), &[3.0, 2.0, 99.0]);
//! assert_eq!(pipeline.invert(&out).unwrap(), pts);
//! ```
use smallvec::SmallVec;

mod error;
pub use error::{Result, TransformError};

mod traits;
pub use traits::{Direction, Transformation};

mod matrix;
pub use matrix::{Matrix, MatrixBuilder};

mod options;
pub use options::{LinearOptions, Param, SINGULAR_TOLERANCE, SNAP_TOLERANCE, Tolerances};

mod resolve;
pub use resolve::{DEFAULT_DIMS, DimsSource, LinearParams, resolve};

mod batch;
pub use batch::{Batch, CoordBatch, Unit};

mod map;
pub use map::map_batch;

mod transforms;
pub use transforms::{Identity, Linear, Sequence, SequenceBuilder};

#[cfg(feature = "ndarray")]
mod ndarr;
#[cfg(feature = "ndarray")]
pub use ndarr::map_array;

pub const COORD_SIZE: usize = 6;

/// A short vector type alias for convenience,
/// which may be replaced by arrayvec/smallvec/tinyvec in future
/// as an optimisation.
type ShortVec<T> = SmallVec<[T; COORD_SIZE]>;
