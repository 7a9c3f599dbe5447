//! Construction options for [Linear](crate::Linear) transformations.
use crate::Matrix;

/// Magnitude below which computed rotation entries are snapped to exactly zero.
pub const SNAP_TOLERANCE: f64 = 1e-10;

/// Pivot magnitude, after scaling each row to a largest entry of 1,
/// at or below which a matrix is treated as singular.
pub const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Numerical tolerances used while resolving parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub snap: f64,
    pub singular: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            snap: SNAP_TOLERANCE,
            singular: SINGULAR_TOLERANCE,
        }
    }
}

/// A numeric option value which may be a scalar, a 1-D array or a 2-D array.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Scalar(f64),
    Vector(Vec<f64>),
    Array(Matrix),
}

impl Param {
    /// Number of axes.
    pub fn rank(&self) -> usize {
        match self {
            Param::Scalar(_) => 0,
            Param::Vector(_) => 1,
            Param::Array(_) => 2,
        }
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        match self {
            Param::Scalar(_) => 1,
            Param::Vector(v) => v.len(),
            Param::Array(m) => m.nrows() * m.ncols(),
        }
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Scalar(value)
    }
}

impl From<Vec<f64>> for Param {
    fn from(value: Vec<f64>) -> Self {
        Param::Vector(value)
    }
}

impl From<&[f64]> for Param {
    fn from(value: &[f64]) -> Self {
        Param::Vector(value.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Param {
    fn from(value: [f64; N]) -> Self {
        Param::Vector(value.to_vec())
    }
}

impl From<Matrix> for Param {
    fn from(value: Matrix) -> Self {
        Param::Array(value)
    }
}

/// Sparse user parameters for a linear transformation,
/// `output = matrix · (input + pre) + post`.
///
/// Any subset may be left unset; see [resolve](crate::resolve) for how
/// the missing pieces are filled in.
///
/// ```
/// use coord_transforms::{Linear, LinearOptions};
///
/// let t = Linear::try_new(LinearOptions::default().scale(2.0).dims(3)).unwrap();
/// assert_eq!(t.matrix().nrows(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LinearOptions {
    /// Linear part; rows are output dimensions, columns are input dimensions.
    pub matrix: Option<Matrix>,
    /// Degrees. A scalar for 2-D, or X-Y-Z Euler angles for 3-D.
    pub rotation: Option<Param>,
    /// Multiplies the diagonal; a scalar, or one factor per dimension.
    pub scale: Option<Param>,
    /// Added to the input before multiplication.
    pub pre: Option<Vec<f64>>,
    /// Added to the output after multiplication.
    pub post: Option<Vec<f64>>,
    /// Dimensionality, when nothing else determines it.
    pub dims: Option<usize>,
    /// Swap the meaning of forward and backward.
    pub reversed: bool,
    pub name: Option<String>,
    pub tolerances: Tolerances,
}

impl LinearOptions {
    pub fn matrix(mut self, matrix: Matrix) -> Self {
        self.matrix = Some(matrix);
        self
    }

    pub fn rotation<P: Into<Param>>(mut self, rotation: P) -> Self {
        self.rotation = Some(rotation.into());
        self
    }

    pub fn scale<P: Into<Param>>(mut self, scale: P) -> Self {
        self.scale = Some(scale.into());
        self
    }

    pub fn pre(mut self, pre: &[f64]) -> Self {
        self.pre = Some(pre.to_vec());
        self
    }

    pub fn post(mut self, post: &[f64]) -> Self {
        self.post = Some(post.to_vec());
        self
    }

    pub fn dims(mut self, dims: usize) -> Self {
        self.dims = Some(dims);
        self
    }

    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }
}
