//! Resolution of sparse [LinearOptions] into a complete set of linear parameters.
use smallvec::{ToSmallVec, smallvec};

use crate::{LinearOptions, Matrix, Param, Result, ShortVec, TransformError};

/// Dimensionality assumed when no option determines it.
pub const DEFAULT_DIMS: usize = 2;

/// Which option determined the dimensionality of a resolved transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimsSource {
    Matrix,
    Scale,
    Pre,
    Post,
    Dims,
    Rotation,
    /// Nothing did; [DEFAULT_DIMS] was assumed.
    Default,
}

/// Fully-resolved parameters of a linear transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearParams {
    matrix: Matrix,
    inverse: Option<Matrix>,
    pre: ShortVec<f64>,
    post: ShortVec<f64>,
    dims_source: DimsSource,
}

impl LinearParams {
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Cached inverse of [LinearParams::matrix], if it is square and non-singular.
    pub fn inverse(&self) -> Option<&Matrix> {
        self.inverse.as_ref()
    }

    pub fn pre(&self) -> &[f64] {
        &self.pre
    }

    pub fn post(&self) -> &[f64] {
        &self.post
    }

    pub fn dims_source(&self) -> DimsSource {
        self.dims_source
    }

    pub fn input_ndim(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn output_ndim(&self) -> usize {
        self.matrix.nrows()
    }
}

/// Resolve the options into a matrix, offsets and (where possible) an inverse.
///
/// Dimensionality comes from the matrix if given.
/// Otherwise it is taken from the first of a vector `scale`, `pre`, `post`, `dims`
/// or `rotation` which is set, falling back to [DEFAULT_DIMS].
/// Inferring it from the rotation or the default logs a warning.
///
/// The rotation, if any, pre-multiplies the base matrix (given, or identity);
/// the scale then multiplies the diagonal.
/// A matrix which cannot be inverted is not an error.
pub fn resolve(opts: &LinearOptions) -> Result<LinearParams> {
    let tol = opts.tolerances;

    let (base, dims_source) = match &opts.matrix {
        Some(m) => (m.clone(), DimsSource::Matrix),
        None => {
            let (ndim, source) = infer_dims(opts)?;
            (Matrix::identity(ndim), source)
        }
    };

    let mut matrix = match &opts.rotation {
        Some(rot) => {
            let r = rotation_matrix(rot, base.nrows(), tol.snap)?;
            r.dot(&base)?
        }
        None => base,
    };

    if let Some(scale) = &opts.scale {
        apply_scale(&mut matrix, scale)?;
    }

    let pre = offset(opts.pre.as_deref(), matrix.ncols(), "pre")?;
    let post = offset(opts.post.as_deref(), matrix.nrows(), "post")?;

    let inverse = matrix.try_inverse(tol.singular);
    log::debug!(
        "Resolved {}x{} linear matrix from {:?}; invertible: {}",
        matrix.nrows(),
        matrix.ncols(),
        dims_source,
        inverse.is_some()
    );

    Ok(LinearParams {
        matrix,
        inverse,
        pre,
        post,
        dims_source,
    })
}

fn infer_dims(opts: &LinearOptions) -> Result<(usize, DimsSource)> {
    let (ndim, source) = if let Some(Param::Vector(s)) = &opts.scale {
        (s.len(), DimsSource::Scale)
    } else if let Some(pre) = &opts.pre {
        (pre.len(), DimsSource::Pre)
    } else if let Some(post) = &opts.post {
        (post.len(), DimsSource::Post)
    } else if let Some(dims) = opts.dims {
        (dims, DimsSource::Dims)
    } else if let Some(rot) = &opts.rotation {
        let ndim = if rot.size() == 3 { 3 } else { DEFAULT_DIMS };
        log::warn!("Assuming {ndim}-D transform from the rotation (set the dims option)");
        (ndim, DimsSource::Rotation)
    } else {
        log::warn!("Assuming {DEFAULT_DIMS}-D transform (set the dims option)");
        (DEFAULT_DIMS, DimsSource::Default)
    };
    if ndim == 0 {
        return Err(TransformError::invalid(format!(
            "{source:?} implies a 0-dimensional transform"
        )));
    }
    Ok((ndim, source))
}

fn rotation_matrix(rot: &Param, ndim: usize, snap_tol: f64) -> Result<Matrix> {
    let angles: &[f64] = match rot {
        Param::Scalar(a) => std::slice::from_ref(a),
        Param::Vector(v) if v.len() == 1 || v.len() == 3 => v.as_slice(),
        _ => return Err(TransformError::invalid("strange rot option")),
    };
    if angles.iter().any(|a| !a.is_finite()) {
        return Err(TransformError::invalid("rotation angle is not finite"));
    }
    let rot_ndim = if angles.len() == 1 { 2 } else { 3 };
    if rot_ndim != ndim {
        return Err(TransformError::invalid(format!(
            "{}-element rotation needs a {rot_ndim}-D transform, but it is {ndim}-D",
            angles.len()
        )));
    }

    let m = if let [theta] = angles {
        rotation_2d(*theta)
    } else {
        rotation_3d(angles[0], angles[1], angles[2])?
    };
    let snapped = m.as_slice().iter().map(|v| snap(*v, snap_tol)).collect();
    Matrix::try_new(snapped, m.ncols())
}

fn snap(value: f64, tolerance: f64) -> f64 {
    if value.abs() < tolerance { 0.0 } else { value }
}

fn rotation_2d(degrees: f64) -> Matrix {
    let (s, c) = degrees.to_radians().sin_cos();
    let mut m = Matrix::identity(2);
    m[(0, 0)] = c;
    m[(0, 1)] = -s;
    m[(1, 0)] = s;
    m[(1, 1)] = c;
    m
}

/// Extrinsic X-Y-Z rotation, i.e. `Rz · Ry · Rx`.
fn rotation_3d(x_deg: f64, y_deg: f64, z_deg: f64) -> Result<Matrix> {
    let (sx, cx) = x_deg.to_radians().sin_cos();
    let (sy, cy) = y_deg.to_radians().sin_cos();
    let (sz, cz) = z_deg.to_radians().sin_cos();

    #[rustfmt::skip]
    let rx = Matrix::try_new(vec![
        1.0, 0.0, 0.0,
        0.0, cx, -sx,
        0.0, sx, cx,
    ], 3)?;
    #[rustfmt::skip]
    let ry = Matrix::try_new(vec![
        cy, 0.0, sy,
        0.0, 1.0, 0.0,
        -sy, 0.0, cy,
    ], 3)?;
    #[rustfmt::skip]
    let rz = Matrix::try_new(vec![
        cz, -sz, 0.0,
        sz, cz, 0.0,
        0.0, 0.0, 1.0,
    ], 3)?;
    rz.dot(&ry)?.dot(&rx)
}

fn apply_scale(matrix: &mut Matrix, scale: &Param) -> Result<()> {
    match scale {
        Param::Scalar(s) => {
            check_finite_scale(std::slice::from_ref(s))?;
            for j in 0..matrix.diagonal_len() {
                matrix[(j, j)] *= s;
            }
        }
        Param::Vector(factors) => {
            check_finite_scale(factors)?;
            if !matrix.is_square() {
                return Err(TransformError::invalid(format!(
                    "vector scale needs a square matrix, got {}x{}",
                    matrix.nrows(),
                    matrix.ncols()
                )));
            }
            if factors.len() != matrix.nrows() {
                return Err(TransformError::invalid(format!(
                    "scale has {} elements for a {}-D transform",
                    factors.len(),
                    matrix.nrows()
                )));
            }
            for (j, s) in factors.iter().enumerate() {
                matrix[(j, j)] *= s;
            }
        }
        Param::Array(_) => {
            return Err(TransformError::invalid(
                "scale only accepts scalars and 1-D arrays",
            ));
        }
    }
    Ok(())
}

fn check_finite_scale(factors: &[f64]) -> Result<()> {
    if factors.iter().any(|s| !s.is_finite()) {
        return Err(TransformError::invalid("scale is not finite"));
    }
    Ok(())
}

fn offset(values: Option<&[f64]>, ndim: usize, which: &str) -> Result<ShortVec<f64>> {
    let Some(values) = values else {
        return Ok(smallvec![0.0; ndim]);
    };
    if values.len() != ndim {
        return Err(TransformError::invalid(format!(
            "{which} offset has {} elements, expected {ndim}",
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(TransformError::invalid(format!("{which} offset is not finite")));
    }
    Ok(values.to_smallvec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tolerances;
    use crate::tests::{SMALL_NUMBER, init_logger};
    use approx::assert_abs_diff_eq;

    fn opts() -> LinearOptions {
        init_logger();
        LinearOptions::default()
    }

    #[test]
    fn test_default_dims() {
        let params = resolve(&opts()).unwrap();
        assert_eq!(params.dims_source(), DimsSource::Default);
        assert_eq!(params.matrix(), &Matrix::identity(2));
        assert_eq!(params.inverse(), Some(&Matrix::identity(2)));
        assert_eq!(params.pre(), &[0.0, 0.0]);
    }

    #[test]
    fn test_dims_from_pre() {
        let params = resolve(&opts().pre(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(params.dims_source(), DimsSource::Pre);
        assert_eq!(params.input_ndim(), 3);
        assert_eq!(params.output_ndim(), 3);
    }

    #[test]
    fn test_dims_priority() {
        let params = resolve(
            &opts()
                .scale([1.0, 2.0, 3.0, 4.0])
                .dims(2)
                .rotation([0.0, 0.0, 0.0]),
        );
        // vector scale wins over dims, then clashes with the 3-vector rotation
        assert!(matches!(params, Err(TransformError::InvalidParameter(_))));

        let params = resolve(&opts().post(&[1.0, 1.0, 1.0]).dims(5)).unwrap();
        assert_eq!(params.dims_source(), DimsSource::Post);
        assert_eq!(params.output_ndim(), 3);

        let params = resolve(&opts().dims(4).scale(3.0)).unwrap();
        assert_eq!(params.dims_source(), DimsSource::Dims);
        assert_eq!(params.matrix()[(3, 3)], 3.0);
    }

    #[test]
    fn test_dims_from_rotation() {
        let params = resolve(&opts().rotation([10.0, 20.0, 30.0])).unwrap();
        assert_eq!(params.dims_source(), DimsSource::Rotation);
        assert_eq!(params.output_ndim(), 3);
    }

    #[test]
    fn test_dims_from_scalar_rotation() {
        let params = resolve(&opts().rotation(45.0)).unwrap();
        assert_eq!(params.dims_source(), DimsSource::Rotation);
        assert_eq!(params.output_ndim(), DEFAULT_DIMS);
    }

    #[test]
    fn test_zero_dims_rejected() {
        assert!(resolve(&opts().dims(0)).is_err());
        assert!(resolve(&opts().pre(&[])).is_err());
    }

    #[test]
    fn test_matrix_shape_sets_dims() {
        let m = Matrix::from_rows(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]).unwrap();
        let params = resolve(&opts().matrix(m).dims(7)).unwrap();
        assert_eq!(params.dims_source(), DimsSource::Matrix);
        assert_eq!(params.input_ndim(), 3);
        assert_eq!(params.output_ndim(), 2);
        assert!(params.inverse().is_none());
    }

    #[test]
    fn test_pure_scale() {
        let params = resolve(&opts().scale(2.0).dims(2)).unwrap();
        assert_eq!(
            params.matrix(),
            &Matrix::from_rows(&[[2.0, 0.0], [0.0, 2.0]]).unwrap()
        );
        assert_eq!(
            params.inverse().unwrap(),
            &Matrix::from_rows(&[[0.5, 0.0], [0.0, 0.5]]).unwrap()
        );
    }

    #[test]
    fn test_vector_scale() {
        let params = resolve(&opts().scale([1.0, 2.0, 3.0])).unwrap();
        assert_eq!(params.dims_source(), DimsSource::Scale);
        let diag: Vec<_> = (0..3).map(|j| params.matrix()[(j, j)]).collect();
        assert_eq!(diag, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_scale_rank_two_rejected() {
        let err = resolve(&opts().scale(Matrix::identity(2))).unwrap_err();
        assert_eq!(
            err,
            TransformError::invalid("scale only accepts scalars and 1-D arrays")
        );
    }

    #[test]
    fn test_vector_scale_needs_square() {
        let m = Matrix::from_rows(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]).unwrap();
        assert!(resolve(&opts().matrix(m.clone()).scale([2.0, 2.0])).is_err());
        // scalar scale is fine on a rectangular matrix
        let params = resolve(&opts().matrix(m).scale(2.0)).unwrap();
        assert_eq!(params.matrix()[(1, 1)], 2.0);
        assert_eq!(params.matrix()[(1, 2)], 0.0);
    }

    #[test]
    fn test_vector_scale_length_checked() {
        assert!(resolve(&opts().scale([2.0, 2.0]).pre(&[0.0, 0.0, 0.0])).is_err());
    }

    #[test]
    fn test_pure_rotation() {
        let params = resolve(&opts().rotation(90.0).dims(2)).unwrap();
        // snapped to exact zeros
        assert_eq!(params.matrix()[(0, 0)], 0.0);
        assert_eq!(params.matrix()[(1, 1)], 0.0);
        assert_abs_diff_eq!(params.matrix()[(0, 1)], -1.0, epsilon = SMALL_NUMBER);
        assert_abs_diff_eq!(params.matrix()[(1, 0)], 1.0, epsilon = SMALL_NUMBER);
        assert!(params.matrix().has_orthonormal_rows(SMALL_NUMBER));
    }

    #[test]
    fn test_snap_tolerance_is_configurable() {
        let tolerances = Tolerances {
            snap: 0.0,
            ..Default::default()
        };
        let params = resolve(&opts().rotation(90.0).tolerances(tolerances)).unwrap();
        let cos = params.matrix()[(0, 0)];
        assert!(cos != 0.0 && cos.abs() < SMALL_NUMBER);
    }

    #[test]
    fn test_euler_rotation() {
        let params = resolve(&opts().rotation([0.0, 0.0, 90.0])).unwrap();
        #[rustfmt::skip]
        let expected = Matrix::try_new(vec![
            0.0, -1.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 0.0, 1.0,
        ], 3).unwrap();
        assert_abs_diff_eq!(
            params.matrix().as_slice(),
            expected.as_slice(),
            epsilon = SMALL_NUMBER
        );

        let params = resolve(&opts().rotation([30.0, -45.0, 120.0])).unwrap();
        let m = params.matrix();
        assert!(m.has_orthonormal_rows(SMALL_NUMBER));
        assert_abs_diff_eq!(
            params.inverse().unwrap().as_slice(),
            m.transpose().as_slice(),
            epsilon = SMALL_NUMBER
        );
    }

    #[test]
    fn test_euler_order_is_x_then_y_then_z() {
        // x by 90 then z by 90 sends the y axis to z, then z stays z
        let params = resolve(&opts().rotation([90.0, 0.0, 90.0])).unwrap();
        let out = params.matrix().matmul(&[0.0, 1.0, 0.0]);
        assert_abs_diff_eq!(out.as_slice(), [0.0, 0.0, 1.0].as_slice(), epsilon = SMALL_NUMBER);
    }

    #[test]
    fn test_strange_rotation() {
        for rot in [Param::from([1.0, 2.0]), Param::from(Matrix::identity(2))] {
            let err = resolve(&opts().rotation(rot).dims(2)).unwrap_err();
            assert_eq!(err, TransformError::invalid("strange rot option"));
        }
    }

    #[test]
    fn test_rotation_dimension_must_match() {
        assert!(resolve(&opts().rotation(30.0).dims(3)).is_err());
        assert!(resolve(&opts().rotation([1.0, 2.0, 3.0]).dims(2)).is_err());
    }

    #[test]
    fn test_rotation_premultiplies_matrix() {
        let base = Matrix::from_rows(&[[2.0, 0.0], [0.0, 1.0]]).unwrap();
        let params = resolve(&opts().matrix(base).rotation(90.0)).unwrap();
        // x is stretched first, then rotated onto y
        let out = params.matrix().matmul(&[1.0, 0.0]);
        assert_abs_diff_eq!(out.as_slice(), [0.0, 2.0].as_slice(), epsilon = SMALL_NUMBER);
    }

    #[test]
    fn test_offsets_validated() {
        let err = resolve(&opts().pre(&[0.0, 0.0]).post(&[1.0, 2.0, 3.0])).unwrap_err();
        assert_eq!(
            err,
            TransformError::invalid("post offset has 3 elements, expected 2")
        );

        // post decides the dimensionality before dims does
        let params = resolve(&opts().dims(2).post(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(params.dims_source(), DimsSource::Post);
        assert_eq!(params.output_ndim(), 3);

        let m = Matrix::from_rows(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]).unwrap();
        let params = resolve(&opts().matrix(m).pre(&[1.0, 2.0, 3.0]).post(&[4.0, 5.0])).unwrap();
        assert_eq!(params.pre(), &[1.0, 2.0, 3.0]);
        assert_eq!(params.post(), &[4.0, 5.0]);
    }

    #[test]
    fn test_singular_not_an_error() {
        let m = Matrix::from_rows(&[[1.0, 1.0], [1.0, 1.0]]).unwrap();
        let params = resolve(&opts().matrix(m)).unwrap();
        assert!(params.inverse().is_none());
    }
}
