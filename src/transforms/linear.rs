use std::sync::Arc;

use crate::resolve::{DimsSource, LinearParams, resolve};
use crate::{
    Direction, LinearOptions, Matrix, Result, Sequence, ShortVec, TransformError, Transformation,
};

/// Affine transformation `output = matrix · (input + pre) + post`.
///
/// The matrix may be rectangular to change dimensionality.
/// If it is square and non-singular, the inverse is computed once at construction
/// and the transformation can be applied backward:
/// `input = inverse · (output - post) - pre`.
#[derive(Debug, Clone)]
pub struct Linear {
    name: String,
    params: Arc<LinearParams>,
    reversed: bool,
}

impl Linear {
    pub fn try_new(opts: LinearOptions) -> Result<Self> {
        let params = resolve(&opts)?;
        Ok(Self {
            name: opts.name.unwrap_or_else(|| "linear".to_string()),
            params: Arc::new(params),
            reversed: opts.reversed,
        })
    }

    pub fn params(&self) -> &LinearParams {
        &self.params
    }

    pub fn matrix(&self) -> &Matrix {
        self.params.matrix()
    }

    /// Which option determined the dimensionality.
    pub fn dims_source(&self) -> DimsSource {
        self.params.dims_source()
    }
}

impl Transformation for Linear {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain_ndim(&self) -> usize {
        self.params.input_ndim()
    }

    fn codomain_ndim(&self) -> usize {
        self.params.output_ndim()
    }

    fn is_invertible(&self) -> bool {
        self.params.inverse().is_some()
    }

    fn is_reversed(&self) -> bool {
        self.reversed
    }

    fn transform_into(&self, pt: &[f64], buf: &mut [f64], direction: Direction) -> Result<()> {
        let p = &self.params;
        match direction {
            Direction::Forward => {
                let shifted: ShortVec<f64> =
                    pt.iter().zip(p.pre().iter()).map(|(v, o)| v + o).collect();
                p.matrix().matmul_into(&shifted, buf);
                for (b, o) in buf.iter_mut().zip(p.post().iter()) {
                    *b += o;
                }
            }
            Direction::Backward => {
                let Some(inverse) = p.inverse() else {
                    return Err(TransformError::non_invertible(&self.name));
                };
                let shifted: ShortVec<f64> =
                    pt.iter().zip(p.post().iter()).map(|(v, o)| v - o).collect();
                inverse.matmul_into(&shifted, buf);
                for (b, o) in buf.iter_mut().zip(p.pre().iter()) {
                    *b -= o;
                }
            }
        }
        Ok(())
    }

    /// The same parameters with the reversed flag toggled.
    fn inverse(&self) -> Result<Arc<dyn Transformation>> {
        self.check_direction(self.effective(Direction::Backward))?;
        Ok(Arc::new(Self {
            name: self.name.clone(),
            params: self.params.clone(),
            reversed: !self.reversed,
        }))
    }

    fn compose(self: Arc<Self>, other: Arc<dyn Transformation>) -> Result<Sequence> {
        Sequence::try_new(vec![self as Arc<dyn Transformation>, other])
    }
}
