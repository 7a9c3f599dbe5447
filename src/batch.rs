//! Batches of coordinates: one row per point, one column per dimension.
use std::fmt;
use std::sync::Arc;

use crate::{Result, TransformError};

/// An opaque physical-unit tag.
///
/// Never interpreted; transformations carry it from input to output unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Unit(Arc<str>);

impl Unit {
    pub fn new(name: &str) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Unit {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read access to a 2-D array of points, as needed by [map_batch](crate::map_batch).
pub trait Batch {
    fn n_points(&self) -> usize;

    /// Number of coordinate dimensions per point.
    fn ndim(&self) -> usize;

    /// Coordinates of one point; has length [Batch::ndim].
    ///
    /// May panic if `idx` is out of bounds.
    fn point(&self, idx: usize) -> &[f64];

    fn unit(&self) -> Option<&Unit> {
        None
    }
}

/// Row-major batch of points with an optional unit tag.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordBatch {
    data: Vec<f64>,
    n_points: usize,
    ndim: usize,
    unit: Option<Unit>,
}

impl CoordBatch {
    /// Row-major data: `data[i * ndim + j]` is dimension `j` of point `i`.
    pub fn try_new(data: Vec<f64>, ndim: usize) -> Result<Self> {
        if ndim == 0 {
            if !data.is_empty() {
                return Err(TransformError::invalid(
                    "0-dimensional batch cannot hold coordinate data",
                ));
            }
            return Ok(Self::filled(0, 0, 0.0));
        }
        if data.len() % ndim != 0 {
            return Err(TransformError::invalid(format!(
                "Batch data length {} is not divisible by ndim {}",
                data.len(),
                ndim
            )));
        }
        Ok(Self {
            n_points: data.len() / ndim,
            data,
            ndim,
            unit: None,
        })
    }

    /// Build a batch from equal-length points.
    pub fn from_points<P: AsRef<[f64]>>(points: &[P]) -> Result<Self> {
        let Some(ndim) = points.first().map(|p| p.as_ref().len()) else {
            return Ok(Self::filled(0, 0, 0.0));
        };
        let mut data = Vec::with_capacity(points.len() * ndim);
        for (idx, p) in points.iter().enumerate() {
            let p = p.as_ref();
            if p.len() != ndim {
                return Err(TransformError::dimension(
                    ndim,
                    p.len(),
                    format!("point {idx} of batch"),
                ));
            }
            data.extend_from_slice(p);
        }
        Ok(Self {
            data,
            n_points: points.len(),
            ndim,
            unit: None,
        })
    }

    pub fn filled(n_points: usize, ndim: usize, value: f64) -> Self {
        Self {
            data: vec![value; n_points * ndim],
            n_points,
            ndim,
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: Option<Unit>) -> Self {
        self.unit = unit;
        self
    }

    pub fn point_mut(&mut self, idx: usize) -> &mut [f64] {
        let start = idx * self.ndim;
        &mut self.data[start..start + self.ndim]
    }

    pub fn points(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.n_points).map(|idx| self.point(idx))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }
}

impl Batch for CoordBatch {
    fn n_points(&self) -> usize {
        self.n_points
    }

    fn ndim(&self) -> usize {
        self.ndim
    }

    fn point(&self, idx: usize) -> &[f64] {
        assert!(idx < self.n_points, "point index out of bounds");
        let start = idx * self.ndim;
        &self.data[start..start + self.ndim]
    }

    fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }
}
