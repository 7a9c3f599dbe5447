use std::sync::Arc;

use crate::{Direction, Result, Sequence, Transformation};

/// A no-op transform which returns a copy of the input point.
///
/// Defined for one dimensionality.
/// The default is 0-dimensional, so every column of a batch is passed through.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Identity(usize);

impl Identity {
    pub fn new(ndim: usize) -> Self {
        Self(ndim)
    }
}

impl Transformation for Identity {
    fn name(&self) -> &str {
        "identity"
    }

    fn domain_ndim(&self) -> usize {
        self.0
    }

    fn codomain_ndim(&self) -> usize {
        self.0
    }

    fn is_invertible(&self) -> bool {
        true
    }

    fn transform_into(&self, pt: &[f64], buf: &mut [f64], _direction: Direction) -> Result<()> {
        buf.copy_from_slice(pt);
        Ok(())
    }

    fn inverse(&self) -> Result<Arc<dyn Transformation>> {
        Ok(Arc::new(*self))
    }

    fn compose(self: Arc<Self>, other: Arc<dyn Transformation>) -> Result<Sequence> {
        Sequence::try_new(vec![self as Arc<dyn Transformation>, other])
    }
}
