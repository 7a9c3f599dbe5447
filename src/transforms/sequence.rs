use std::sync::Arc;

use smallvec::smallvec;

use crate::{Direction, Result, ShortVec, TransformError, Transformation};

/// Apply a sequence of transforms in order.
///
/// Backward application runs the elements' backward senses in reverse order.
/// Nested sequences are flattened on construction,
/// so element indices reported in errors refer to the flattened order.
#[derive(Debug, Clone)]
pub struct Sequence {
    transforms: Vec<Arc<dyn Transformation>>,
    max_inner_ndim: usize,
    invertible: bool,
}

impl Sequence {
    pub fn try_new(transforms: Vec<Arc<dyn Transformation>>) -> Result<Self> {
        let mut builder = SequenceBuilder::with_capacity(transforms.len());
        for t in transforms {
            builder.add_arced(t)?;
        }
        builder.build()
    }

    pub fn builder() -> SequenceBuilder {
        SequenceBuilder(vec![])
    }

    /// The (flattened) elements, in forward order.
    pub fn transforms(&self) -> &[Arc<dyn Transformation>] {
        &self.transforms
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    fn transform_into_inner<'a, I>(
        &self,
        steps: I,
        pt: &[f64],
        out_buf: &mut [f64],
        direction: Direction,
    ) -> Result<()>
    where
        I: Iterator<Item = (usize, &'a Arc<dyn Transformation>)>,
    {
        let last = self.transforms.len() - 1;
        let mut buf0: ShortVec<f64> = smallvec![f64::NAN; self.max_inner_ndim];
        let mut buf1: ShortVec<f64> = smallvec![f64::NAN; self.max_inner_ndim];

        for (step, (idx, t)) in steps.enumerate() {
            let d = t.effective(direction);
            let (required, produced) = t.ndims_for(direction);

            let res = if last == 0 {
                t.transform_into(pt, out_buf, d)
            } else if step == 0 {
                t.transform_into(pt, &mut buf1[..produced], d)
            } else if step == last {
                t.transform_into(&buf0[..required], out_buf, d)
            } else {
                t.transform_into(&buf0[..required], &mut buf1[..produced], d)
            };
            res.map_err(|e| e.in_element(idx))?;
            (buf0, buf1) = (buf1, buf0);
        }
        Ok(())
    }
}

impl Transformation for Sequence {
    fn name(&self) -> &str {
        "sequence"
    }

    fn domain_ndim(&self) -> usize {
        self.transforms.first().map_or(0, |t| t.input_ndim())
    }

    fn codomain_ndim(&self) -> usize {
        self.transforms.last().map_or(0, |t| t.output_ndim())
    }

    fn is_invertible(&self) -> bool {
        self.invertible
    }

    fn transform_into(&self, pt: &[f64], buf: &mut [f64], direction: Direction) -> Result<()> {
        match direction {
            Direction::Forward => {
                self.transform_into_inner(self.transforms.iter().enumerate(), pt, buf, direction)
            }
            Direction::Backward => self.transform_into_inner(
                self.transforms.iter().enumerate().rev(),
                pt,
                buf,
                direction,
            ),
        }
    }

    /// Checks every element in the order it would be reached.
    fn check_direction(&self, direction: Direction) -> Result<()> {
        check_elements(&self.transforms, direction)
    }

    /// Element inverses in reverse order.
    fn inverse(&self) -> Result<Arc<dyn Transformation>> {
        let mut inv_transforms = Vec::with_capacity(self.transforms.len());
        for (idx, t) in self.transforms.iter().enumerate().rev() {
            inv_transforms.push(t.inverse().map_err(|e| e.in_element(idx))?);
        }
        Ok(Arc::new(Sequence::try_new(inv_transforms)?))
    }

    fn compose(self: Arc<Self>, other: Arc<dyn Transformation>) -> Result<Sequence> {
        Sequence::try_new(vec![self as Arc<dyn Transformation>, other])
    }

    fn as_sequence(&self) -> Option<&Sequence> {
        Some(self)
    }
}

fn check_elements(transforms: &[Arc<dyn Transformation>], direction: Direction) -> Result<()> {
    let check = |(idx, t): (usize, &Arc<dyn Transformation>)| {
        t.check_direction(t.effective(direction))
            .map_err(|e| e.in_element(idx))
    };
    match direction {
        Direction::Forward => transforms.iter().enumerate().try_for_each(check),
        Direction::Backward => transforms.iter().enumerate().rev().try_for_each(check),
    }
}

#[derive(Debug, Default)]
pub struct SequenceBuilder(Vec<Arc<dyn Transformation>>);

impl SequenceBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Append a shared transformation, flattening it if it is itself a sequence.
    pub fn add_arced(&mut self, t: Arc<dyn Transformation>) -> Result<&mut Self> {
        if let Some(seq) = t.as_sequence() {
            for inner in seq.transforms.iter() {
                self.push_checked(inner.clone())?;
            }
        } else {
            self.push_checked(t)?;
        }
        Ok(self)
    }

    pub fn add_transform<T: Transformation + 'static>(&mut self, t: T) -> Result<&mut Self> {
        self.add_arced(Arc::new(t))
    }

    fn push_checked(&mut self, t: Arc<dyn Transformation>) -> Result<()> {
        if let Some(prev) = self.0.last() {
            if t.input_ndim() != prev.output_ndim() {
                return Err(TransformError::dimension(
                    prev.output_ndim(),
                    t.input_ndim(),
                    format!(
                        "input of '{}' (element {}) against output of '{}'",
                        t.name(),
                        self.0.len(),
                        prev.name()
                    ),
                ));
            }
        }
        self.0.push(t);
        Ok(())
    }

    pub fn build(self) -> Result<Sequence> {
        if self.0.is_empty() {
            return Err(TransformError::invalid(
                "Sequence must have at least one transformation",
            ));
        }
        let max_inner_ndim = self
            .0
            .iter()
            .flat_map(|t| [t.input_ndim(), t.output_ndim()])
            .max()
            .unwrap_or(0);
        let invertible = check_elements(&self.0, Direction::Backward).is_ok();
        Ok(Sequence {
            transforms: self.0,
            max_inner_ndim,
            invertible,
        })
    }
}
