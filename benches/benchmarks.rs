use coord_transforms::{
    CoordBatch, Direction, Identity, Linear, LinearOptions, Matrix, Sequence, Transformation,
};
use criterion::{Criterion, criterion_group, criterion_main};
use faer::rand::{Rng, SeedableRng, rngs::SmallRng};
use std::{hint::black_box, sync::Arc};

fn coords(n_rows: usize, n_cols: usize) -> CoordBatch {
    let mut rng = SmallRng::seed_from_u64(1991);
    let mut data = Vec::with_capacity(n_rows * n_cols);
    for _ in 0..(n_rows * n_cols) {
        data.push(rng.random::<f64>() * 100.0);
    }
    CoordBatch::try_new(data, n_cols).unwrap()
}

struct Bencher<'c> {
    name: String,
    criterion: &'c mut Criterion,
}

impl<'c> Bencher<'c> {
    fn new<S: Into<String>>(name: S, criterion: &'c mut Criterion) -> Self {
        Self {
            name: name.into(),
            criterion,
        }
    }

    fn batch<T: Transformation>(&mut self, t: &T) {
        let batch = coords(1000, 3);
        self.criterion
            .bench_function(&format!("{}[forward]", self.name), |b| {
                b.iter(|| black_box(t.apply(&batch, Direction::Forward).unwrap()))
            });

        if t.is_invertible() {
            self.criterion
                .bench_function(&format!("{}[backward]", self.name), |b| {
                    b.iter(|| black_box(t.apply(&batch, Direction::Backward).unwrap()))
                });
        }

        let wide = coords(1000, 6);
        self.criterion
            .bench_function(&format!("{}[pass-through]", self.name), |b| {
                b.iter(|| black_box(t.apply(&wide, Direction::Forward).unwrap()))
            });
    }
}

fn identity(c: &mut Criterion) {
    let mut bencher = Bencher::new(stringify!(Identity), c);
    let t = Identity::new(3);
    bencher.batch(&t);
}

fn scale(c: &mut Criterion) {
    let mut bencher = Bencher::new("Linear(scale)", c);
    let t = Linear::try_new(LinearOptions::default().scale([2.0, 3.0, 4.0])).unwrap();
    bencher.batch(&t);
}

fn affine(c: &mut Criterion) {
    let mut bencher = Bencher::new("Linear(affine)", c);
    #[rustfmt::skip]
    let matrix = Matrix::try_new(vec![
        1.0, 0.2, 0.0,
        0.0, 1.0, 0.3,
        0.1, 0.0, 1.0,
    ], 3).unwrap();
    let t = Linear::try_new(
        LinearOptions::default()
            .matrix(matrix)
            .rotation([10.0, 20.0, 30.0])
            .pre(&[1.0, 2.0, 3.0])
            .post(&[-1.0, -2.0, -3.0]),
    )
    .unwrap();
    bencher.batch(&t);
}

fn sequence(c: &mut Criterion) {
    let mut bencher = Bencher::new(stringify!(Sequence), c);
    let mut builder = Sequence::builder();
    for _ in 0..3 {
        builder.add_transform(Identity::new(3)).unwrap();
    }
    let t = builder.build().unwrap();
    bencher.batch(&t);
}

fn linear_sequence(c: &mut Criterion) {
    let mut bencher = Bencher::new("Sequence(linear)", c);
    let rot = Arc::new(Linear::try_new(LinearOptions::default().rotation([0.0, 45.0, 0.0])).unwrap());
    let shift = Arc::new(Linear::try_new(LinearOptions::default().post(&[1.0, 1.0, 1.0])).unwrap());
    let t = rot.compose(shift).unwrap();
    bencher.batch(&t);
}

criterion_group!(atoms, identity, scale, affine, sequence, linear_sequence);
criterion_main!(atoms);
